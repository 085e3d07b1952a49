//! Card queue: the due-sorted pool, the new-card pool, and the single
//! checked-out card.
//!
//! Selection policy: overdue cards first, in due order; when nothing is
//! due, a uniformly random never-seen card. Overdue reinforcement is never
//! starved by novelty.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::types::{Card, ScheduleStats};

/// The three disjoint card collections the trainer draws from.
///
/// Invariants: `existing_cards` is sorted non-decreasing by due time and
/// holds only previously-reviewed cards; `new_cards` holds only
/// never-reviewed cards; no card id appears in more than one of
/// {existing, new, current}.
#[derive(Debug, Default)]
pub struct CardQueue {
    existing_cards: Vec<Card>,
    new_cards: Vec<Card>,
    current: Option<Card>,
}

impl CardQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted pools. Order of `existing` is not
    /// trusted; it is re-sorted by due time.
    pub fn from_parts(mut existing: Vec<Card>, new: Vec<Card>) -> Self {
        existing.sort_by_key(|card| card.due);
        Self {
            existing_cards: existing,
            new_cards: new,
            current: None,
        }
    }

    /// Pick the next card to present and check it out.
    ///
    /// A previously checked-out card is returned to its pool first. Then
    /// the earliest-due card is taken if it is due at `now`; otherwise a
    /// random new card; otherwise the queue is exhausted for now.
    pub fn select_next(&mut self, now: DateTime<Utc>) -> Option<i64> {
        if let Some(card) = self.current.take() {
            if card.is_new() {
                self.new_cards.push(card);
            } else {
                Self::insert_sorted(&mut self.existing_cards, card);
            }
        }

        if self.existing_cards.first().is_some_and(|c| c.due <= now) {
            self.current = Some(self.existing_cards.remove(0));
        } else if !self.new_cards.is_empty() {
            let idx = rand::thread_rng().gen_range(0..self.new_cards.len());
            self.current = Some(self.new_cards.swap_remove(idx));
        } else {
            return None;
        }
        self.current.as_ref().map(|c| c.card_id)
    }

    /// Insert a reviewed card into the due-sorted pool.
    pub fn insert_reviewed(&mut self, card: Card) {
        Self::insert_sorted(&mut self.existing_cards, card);
    }

    /// Ordered insertion; cards with equal due times keep their insertion
    /// order (earlier-inserted cards stay in front).
    fn insert_sorted(cards: &mut Vec<Card>, card: Card) {
        let idx = cards.partition_point(|c| c.due <= card.due);
        cards.insert(idx, card);
    }

    /// Add a brand-new card unless its id is already tracked anywhere in
    /// the queue. Returns whether the card was added.
    pub fn seed_new(&mut self, card: Card) -> bool {
        debug_assert!(card.is_new());
        if self.contains(card.card_id) {
            return false;
        }
        self.new_cards.push(card);
        true
    }

    /// Whether a card id is present in any of the three collections.
    pub fn contains(&self, card_id: i64) -> bool {
        self.current.as_ref().is_some_and(|c| c.card_id == card_id)
            || self.existing_cards.iter().any(|c| c.card_id == card_id)
            || self.new_cards.iter().any(|c| c.card_id == card_id)
    }

    /// The card currently checked out for presentation, if any.
    pub fn current(&self) -> Option<&Card> {
        self.current.as_ref()
    }

    /// Commit the answer for the checked-out card: the reviewed
    /// replacement enters the due-sorted pool and the checkout is cleared.
    ///
    /// Callers must have taken `current()` through the scheduling engine
    /// first; this keeps the pools untouched until the review succeeded.
    pub fn finish_current(&mut self, reviewed: Card) {
        debug_assert!(self
            .current
            .as_ref()
            .is_some_and(|c| c.card_id == reviewed.card_id));
        self.current = None;
        self.insert_reviewed(reviewed);
    }

    /// Queue counts at `now`.
    ///
    /// The due count is a prefix scan of the sorted pool, plus the
    /// checked-out card when it came from the due pool (it stays "due"
    /// until answered).
    pub fn stats(&self, now: DateTime<Utc>) -> ScheduleStats {
        let mut cards_due = self
            .existing_cards
            .iter()
            .take_while(|c| c.due <= now)
            .count();
        if self.current.as_ref().is_some_and(|c| !c.is_new()) {
            cards_due += 1;
        }

        ScheduleStats {
            cards_due,
            new_cards: self.new_cards.len(),
            total_cards: self.existing_cards.len()
                + self.new_cards.len()
                + usize::from(self.current.is_some()),
        }
    }

    /// The due-sorted pool, earliest due first.
    pub fn existing_cards(&self) -> &[Card] {
        &self.existing_cards
    }

    /// The new-card pool, in no particular order.
    pub fn new_cards(&self) -> &[Card] {
        &self.new_cards
    }

    /// Replace the due-sorted pool after a bulk reschedule. The
    /// replacement must be the same card set; it is re-sorted here.
    pub fn replace_existing(&mut self, mut cards: Vec<Card>) {
        debug_assert_eq!(cards.len(), self.existing_cards.len());
        cards.sort_by_key(|card| card.due);
        self.existing_cards = cards;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reviewed(card_id: i64, due: DateTime<Utc>) -> Card {
        Card {
            card_id,
            due,
            last_review: Some(due - Duration::days(1)),
            memory: None,
        }
    }

    fn is_sorted(cards: &[Card]) -> bool {
        cards.windows(2).all(|w| w[0].due <= w[1].due)
    }

    #[test]
    fn test_insert_reviewed_keeps_sorted() {
        let now = Utc::now();
        let mut queue = CardQueue::new();
        for offset in [5i64, -3, 12, 0, -7, 12] {
            queue.insert_reviewed(reviewed(offset, now + Duration::minutes(offset)));
        }
        assert!(is_sorted(queue.existing_cards()));
    }

    #[test]
    fn test_equal_due_ties_keep_insertion_order() {
        let now = Utc::now();
        let mut queue = CardQueue::new();
        queue.insert_reviewed(reviewed(1, now));
        queue.insert_reviewed(reviewed(2, now));
        queue.insert_reviewed(reviewed(3, now));

        let ids: Vec<i64> = queue.existing_cards().iter().map(|c| c.card_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_overdue_beats_new() {
        let now = Utc::now();
        let existing = vec![
            reviewed(1, now - Duration::seconds(10)),
            reviewed(2, now + Duration::seconds(10)),
        ];
        let new = vec![Card::new(5, now), Card::new(7, now)];
        let mut queue = CardQueue::from_parts(existing, new);

        assert_eq!(queue.select_next(now), Some(1));
        assert_eq!(queue.current().unwrap().card_id, 1);
        assert!(!queue.existing_cards().iter().any(|c| c.card_id == 1));
    }

    #[test]
    fn test_new_card_drawn_when_nothing_due() {
        let now = Utc::now();
        let existing = vec![reviewed(1, now + Duration::hours(1))];
        let new = vec![Card::new(5, now), Card::new(7, now), Card::new(9, now)];
        let mut queue = CardQueue::from_parts(existing, new);

        let picked = queue.select_next(now).unwrap();
        assert!([5, 7, 9].contains(&picked));
        assert_eq!(queue.new_cards().len(), 2);
        assert!(!queue.new_cards().iter().any(|c| c.card_id == picked));
    }

    #[test]
    fn test_exhausted_queue_returns_none() {
        let now = Utc::now();
        let existing = vec![reviewed(1, now + Duration::hours(1))];
        let mut queue = CardQueue::from_parts(existing, Vec::new());

        assert_eq!(queue.select_next(now), None);
        assert!(queue.current().is_none());
        assert_eq!(queue.existing_cards().len(), 1);
    }

    #[test]
    fn test_select_next_reinserts_previous_current() {
        let now = Utc::now();
        let existing = vec![
            reviewed(1, now - Duration::seconds(20)),
            reviewed(2, now - Duration::seconds(10)),
        ];
        let mut queue = CardQueue::from_parts(existing, Vec::new());

        assert_eq!(queue.select_next(now), Some(1));
        // Skipping card 1 without answering puts it back in due order.
        assert_eq!(queue.select_next(now), Some(1));
        assert_eq!(queue.existing_cards()[0].card_id, 2);
    }

    #[test]
    fn test_unanswered_new_card_returns_to_new_pool() {
        let now = Utc::now();
        let mut queue = CardQueue::from_parts(Vec::new(), vec![Card::new(5, now)]);

        assert_eq!(queue.select_next(now), Some(5));
        assert!(queue.new_cards().is_empty());
        assert_eq!(queue.select_next(now), Some(5));
        assert_eq!(queue.stats(now).total_cards, 1);
    }

    #[test]
    fn test_pools_stay_disjoint_across_draw_and_answer() {
        let now = Utc::now();
        let mut queue = CardQueue::from_parts(
            vec![reviewed(1, now - Duration::seconds(5))],
            vec![Card::new(5, now)],
        );

        let drawn = queue.select_next(now).unwrap();
        assert_eq!(drawn, 1);
        assert!(queue.contains(1));
        assert!(!queue.existing_cards().iter().any(|c| c.card_id == 1));

        queue.finish_current(reviewed(1, now + Duration::days(1)));
        assert!(queue.current().is_none());
        let in_existing = queue.existing_cards().iter().filter(|c| c.card_id == 1);
        assert_eq!(in_existing.count(), 1);
    }

    #[test]
    fn test_seed_new_rejects_duplicates() {
        let now = Utc::now();
        let mut queue = CardQueue::new();
        assert!(queue.seed_new(Card::new(5, now)));
        assert!(!queue.seed_new(Card::new(5, now)));

        queue.select_next(now);
        // Still tracked while checked out.
        assert!(!queue.seed_new(Card::new(5, now)));
        assert_eq!(queue.stats(now).total_cards, 1);
    }

    #[test]
    fn test_stats_counts_due_prefix_and_checked_out_card() {
        let now = Utc::now();
        let existing = vec![
            reviewed(1, now - Duration::seconds(30)),
            reviewed(2, now - Duration::seconds(20)),
            reviewed(3, now + Duration::hours(2)),
        ];
        let mut queue = CardQueue::from_parts(existing, vec![Card::new(5, now)]);

        let stats = queue.stats(now);
        assert_eq!(stats.cards_due, 2);
        assert_eq!(stats.new_cards, 1);
        assert_eq!(stats.total_cards, 4);

        // Drawing the overdue card keeps it counted as due until answered.
        assert_eq!(queue.select_next(now), Some(1));
        let stats = queue.stats(now);
        assert_eq!(stats.cards_due, 2);
        assert_eq!(stats.total_cards, 4);
    }

    #[test]
    fn test_replace_existing_resorts() {
        let now = Utc::now();
        let mut queue = CardQueue::from_parts(
            vec![
                reviewed(1, now - Duration::seconds(10)),
                reviewed(2, now + Duration::seconds(10)),
            ],
            Vec::new(),
        );

        // Rescheduling swaps the two cards' due order.
        queue.replace_existing(vec![
            reviewed(1, now + Duration::days(2)),
            reviewed(2, now + Duration::days(1)),
        ]);

        let ids: Vec<i64> = queue.existing_cards().iter().map(|c| c.card_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(is_sorted(queue.existing_cards()));
    }
}
