//! FSRS-backed scheduling engine.
//!
//! Wraps the fsrs crate behind the [`SchedulingEngine`] trait: reviews and
//! reschedules go through `next_states`, batch optimization through
//! `compute_parameters`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use fsrs::{
    ComputeParametersInput, FSRSItem, FSRSReview, MemoryState, NextStates, DEFAULT_PARAMETERS,
    FSRS,
};

use crate::error::TrainerResult;
use crate::traits::SchedulingEngine;
use crate::types::{Card, MemoryParams, Rating, ReviewLog};

/// Scheduling engine backed by FSRS.
pub struct FsrsEngine {
    fsrs: FSRS,
    parameters: Vec<f32>,
    desired_retention: f32,
}

impl FsrsEngine {
    /// Create an engine with the FSRS default parameters.
    pub fn new(desired_retention: f32) -> TrainerResult<Self> {
        Self::with_parameters(DEFAULT_PARAMETERS.to_vec(), desired_retention)
    }

    /// Create an engine from a persisted parameter vector.
    pub fn with_parameters(parameters: Vec<f32>, desired_retention: f32) -> TrainerResult<Self> {
        let fsrs = FSRS::new(Some(&parameters))?;
        Ok(Self {
            fsrs,
            parameters,
            desired_retention,
        })
    }

    /// The post-review memory state and interval (in days) for a rating.
    fn pick(states: &NextStates, rating: Rating) -> (MemoryState, f32) {
        let state = match rating {
            Rating::Again => &states.again,
            Rating::Hard => &states.hard,
            Rating::Good => &states.good,
            Rating::Easy => &states.easy,
        };
        (state.memory, state.interval)
    }

    /// Whole days between two review timestamps, clamped at zero.
    fn elapsed_days(from: Option<DateTime<Utc>>, to: DateTime<Utc>) -> u32 {
        from.map(|t| to.signed_duration_since(t).num_days().max(0) as u32)
            .unwrap_or(0)
    }

    /// Due date after an interval in (possibly fractional) days.
    fn due_after(reviewed_at: DateTime<Utc>, interval_days: f32) -> DateTime<Utc> {
        let secs = (interval_days.max(0.0) * 86_400.0).round() as i64;
        reviewed_at + Duration::seconds(secs)
    }

    fn to_memory_state(memory: Option<MemoryParams>) -> Option<MemoryState> {
        memory.map(|m| MemoryState {
            stability: m.stability,
            difficulty: m.difficulty,
        })
    }

    fn from_memory_state(state: MemoryState) -> MemoryParams {
        MemoryParams {
            stability: state.stability,
            difficulty: state.difficulty,
        }
    }
}

impl SchedulingEngine for FsrsEngine {
    fn review(
        &self,
        card: &Card,
        rating: Rating,
        duration_secs: Option<u32>,
    ) -> TrainerResult<(Card, ReviewLog)> {
        let now = Utc::now();
        let elapsed = Self::elapsed_days(card.last_review, now);
        let states = self.fsrs.next_states(
            Self::to_memory_state(card.memory),
            self.desired_retention,
            elapsed,
        )?;
        let (next_memory, interval) = Self::pick(&states, rating);

        let reviewed = Card {
            card_id: card.card_id,
            due: Self::due_after(now, interval),
            last_review: Some(now),
            memory: Some(Self::from_memory_state(next_memory)),
        };
        let log = ReviewLog {
            card_id: card.card_id,
            rating,
            reviewed_at: now,
            duration_secs,
        };
        Ok((reviewed, log))
    }

    fn reschedule(&self, card: &Card, logs: &[ReviewLog]) -> TrainerResult<Card> {
        let mut memory: Option<MemoryState> = None;
        let mut previous: Option<DateTime<Utc>> = None;
        let mut last: Option<(DateTime<Utc>, f32)> = None;

        for log in logs.iter().filter(|l| l.card_id == card.card_id) {
            let elapsed = Self::elapsed_days(previous, log.reviewed_at);
            let states = self
                .fsrs
                .next_states(memory, self.desired_retention, elapsed)?;
            let (next_memory, interval) = Self::pick(&states, log.rating);
            memory = Some(next_memory);
            last = Some((log.reviewed_at, interval));
            previous = Some(log.reviewed_at);
        }

        // A card with no recorded reviews keeps its current schedule.
        let Some((reviewed_at, interval)) = last else {
            return Ok(card.clone());
        };
        Ok(Card {
            card_id: card.card_id,
            due: Self::due_after(reviewed_at, interval),
            last_review: Some(reviewed_at),
            memory: memory.map(Self::from_memory_state),
        })
    }

    fn compute_optimal_parameters(&self, logs: &[ReviewLog]) -> TrainerResult<Vec<f32>> {
        let train_set = build_train_set(logs);
        let parameters = self.fsrs.compute_parameters(ComputeParametersInput {
            train_set,
            ..Default::default()
        })?;
        Ok(parameters)
    }

    fn parameters(&self) -> Vec<f32> {
        self.parameters.clone()
    }

    fn set_parameters(&mut self, parameters: Vec<f32>) -> TrainerResult<()> {
        self.fsrs = FSRS::new(Some(&parameters))?;
        self.parameters = parameters;
        Ok(())
    }
}

/// Build per-card cumulative training items from the review history.
///
/// Each item covers one card's reviews up to and including review `i`.
/// First-review items carry no interval information and same-day reviews
/// have `delta_t == 0`, so both are excluded from the training set.
fn build_train_set(logs: &[ReviewLog]) -> Vec<FSRSItem> {
    let mut per_card: HashMap<i64, Vec<&ReviewLog>> = HashMap::new();
    for log in logs {
        per_card.entry(log.card_id).or_default().push(log);
    }

    let mut items = Vec::new();
    for card_logs in per_card.into_values() {
        let mut reviews: Vec<FSRSReview> = Vec::with_capacity(card_logs.len());
        let mut previous: Option<DateTime<Utc>> = None;
        for log in card_logs {
            let delta_t = previous
                .map(|p| log.reviewed_at.signed_duration_since(p).num_days().max(0) as u32)
                .unwrap_or(0);
            reviews.push(FSRSReview {
                rating: log.rating.to_rating(),
                delta_t,
            });
            if reviews.len() > 1 && delta_t > 0 {
                items.push(FSRSItem {
                    reviews: reviews.clone(),
                });
            }
            previous = Some(log.reviewed_at);
        }
    }
    items
}
