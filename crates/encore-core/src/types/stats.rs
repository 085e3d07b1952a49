//! Schedule statistics exposed to the front end.

use serde::{Deserialize, Serialize};

/// Counts describing the current state of the training queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Cards whose due time has passed, including a checked-out card that
    /// was drawn from the due pool and not yet answered.
    pub cards_due: usize,
    /// Never-reviewed cards waiting in the new-card pool.
    pub new_cards: usize,
    /// All tracked cards, including the checked-out one if any.
    pub total_cards: usize,
}
