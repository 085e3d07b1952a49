//! Ratings and review history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Performance rating for one review (maps to fsrs rating values 1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Rating {
    /// No answer was given before the song ended.
    Again = 1,
    /// Answered, but slowly.
    Hard = 2,
    /// Answered within the medium threshold.
    Good = 3,
    /// Answered within the fast threshold.
    Easy = 4,
}

impl Rating {
    /// Derive a rating from the measured answer latency in seconds.
    ///
    /// `None` means the user never answered. The thresholds come from
    /// configuration (`fast_answer_secs`, `medium_answer_secs`).
    pub fn from_answer_time(answer_secs: Option<u32>, fast_secs: u32, medium_secs: u32) -> Self {
        match answer_secs {
            None => Rating::Again,
            Some(secs) if secs <= fast_secs => Rating::Easy,
            Some(secs) if secs <= medium_secs => Rating::Good,
            Some(_) => Rating::Hard,
        }
    }

    /// Convert to the fsrs rating value (1-4).
    pub fn to_rating(self) -> u32 {
        self as u32
    }

    /// Create from an fsrs rating value. Returns `None` outside 1-4.
    pub fn from_rating(rating: u32) -> Option<Self> {
        match rating {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }
}

/// Append-only record of one completed review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    /// Card the review belongs to.
    pub card_id: i64,
    /// Rating derived from the answer.
    pub rating: Rating,
    /// When the review happened.
    pub reviewed_at: DateTime<Utc>,
    /// Measured answer latency in seconds, if the user answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 10;
    const MEDIUM: u32 = 15;

    #[test]
    fn test_no_answer_is_again() {
        assert_eq!(Rating::from_answer_time(None, FAST, MEDIUM), Rating::Again);
    }

    #[test]
    fn test_fast_answer_is_easy() {
        assert_eq!(
            Rating::from_answer_time(Some(8), FAST, MEDIUM),
            Rating::Easy
        );
        assert_eq!(
            Rating::from_answer_time(Some(10), FAST, MEDIUM),
            Rating::Easy
        );
    }

    #[test]
    fn test_medium_answer_is_good() {
        assert_eq!(
            Rating::from_answer_time(Some(12), FAST, MEDIUM),
            Rating::Good
        );
        assert_eq!(
            Rating::from_answer_time(Some(15), FAST, MEDIUM),
            Rating::Good
        );
    }

    #[test]
    fn test_slow_answer_is_hard() {
        assert_eq!(
            Rating::from_answer_time(Some(20), FAST, MEDIUM),
            Rating::Hard
        );
    }

    #[test]
    fn test_rating_round_trip() {
        for rating in [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy] {
            assert_eq!(Rating::from_rating(rating.to_rating()), Some(rating));
        }
        assert_eq!(Rating::from_rating(0), None);
        assert_eq!(Rating::from_rating(5), None);
    }
}
