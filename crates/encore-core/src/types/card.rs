//! Card state tracked by the training queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduler memory parameters carried by a card.
///
/// Owned entirely by the scheduling engine; the queue and the persistence
/// layer round-trip these values unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryParams {
    /// Stability: days for recall probability to drop to 90%.
    pub stability: f32,
    /// Difficulty on the 1.0-10.0 scale (higher = harder to remember).
    pub difficulty: f32,
}

/// One learnable item: a catalogue song the user can be quizzed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// External catalogue song id. Unique and stable.
    pub card_id: i64,
    /// When the card should next be shown.
    pub due: DateTime<Utc>,
    /// Last completed review. `None` means the card has never been seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
    /// Scheduler state, absent until the first review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryParams>,
}

impl Card {
    /// Create a brand-new card due immediately.
    pub fn new(card_id: i64, due: DateTime<Utc>) -> Self {
        Self {
            card_id,
            due,
            last_review: None,
            memory: None,
        }
    }

    /// Whether this card has never been reviewed.
    pub fn is_new(&self) -> bool {
        self.last_review.is_none()
    }
}
