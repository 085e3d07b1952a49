//! Scheduling engine trait.

use crate::error::TrainerResult;
use crate::types::{Card, Rating, ReviewLog};

/// External scheduling capability: given a card and a rating it computes
/// the card's next memory state and due date, and from accumulated review
/// history it can fit better global parameters.
///
/// Implementations are CPU-bound and synchronous; callers run them under
/// the trainer's single-writer lock and accept the added latency of the
/// batch optimization pass.
#[cfg_attr(test, mockall::automock)]
pub trait SchedulingEngine: Send {
    /// Review a card with the given rating and optional measured answer
    /// latency, returning the updated card and the log entry to append.
    fn review(
        &self,
        card: &Card,
        rating: Rating,
        duration_secs: Option<u32>,
    ) -> TrainerResult<(Card, ReviewLog)>;

    /// Recompute a card's due date from its review-log subsequence under
    /// the engine's current parameters, without a new review.
    fn reschedule(&self, card: &Card, logs: &[ReviewLog]) -> TrainerResult<Card>;

    /// Fit optimal global parameters from the full review history.
    fn compute_optimal_parameters(&self, logs: &[ReviewLog]) -> TrainerResult<Vec<f32>>;

    /// The active parameter vector, as persisted in snapshots.
    fn parameters(&self) -> Vec<f32>;

    /// Replace the active parameter set. On failure the previous
    /// parameters remain in effect.
    fn set_parameters(&mut self, parameters: Vec<f32>) -> TrainerResult<()>;
}
