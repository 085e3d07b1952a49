//! The trainer: catalogue sync, card queue, review recording, parameter
//! optimization, and snapshot persistence behind one facade.
//!
//! Ownership rule: the trainer mutates the queue, the log, and the engine;
//! collaborators only ever see references or copies. Callers are expected
//! to hold the trainer behind a single-writer lock.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::catalogue::{CatalogueSync, Readiness};
use crate::config::TrainerConfig;
use crate::engine::FsrsEngine;
use crate::error::{TrainerError, TrainerResult};
use crate::queue::CardQueue;
use crate::store::{Snapshot, SnapshotStore};
use crate::traits::{SchedulingEngine, SessionClient};
use crate::types::{
    Card, MasterCatalogue, Rating, ReviewLog, ScheduleStats, SongInfo, SongLink, UserAnimeList,
};

/// Spaced-repetition trainer for song-identification quizzes.
pub struct Trainer {
    config: TrainerConfig,
    engine: Box<dyn SchedulingEngine>,
    queue: CardQueue,
    catalogue: CatalogueSync,
    review_logs: Vec<ReviewLog>,
    store: SnapshotStore,
}

impl Trainer {
    /// Assemble a trainer from its parts, restoring state from the store's
    /// snapshot. Persisted scheduler parameters take effect immediately.
    pub fn new(
        config: TrainerConfig,
        mut engine: Box<dyn SchedulingEngine>,
        store: SnapshotStore,
    ) -> TrainerResult<Self> {
        config.validate()?;
        let snapshot = store.load()?;
        if !snapshot.scheduler_parameters.is_empty() {
            engine.set_parameters(snapshot.scheduler_parameters.clone())?;
        }
        info!(
            "trainer restored: {} existing cards, {} new cards, {} review logs",
            snapshot.existing_cards.len(),
            snapshot.new_cards.len(),
            snapshot.review_logs.len()
        );

        Ok(Self {
            catalogue: CatalogueSync::new(config.include_planned),
            queue: CardQueue::from_parts(snapshot.existing_cards, snapshot.new_cards),
            review_logs: snapshot.review_logs,
            engine,
            store,
            config,
        })
    }

    /// Convenience constructor wiring the default FSRS engine and a file
    /// store at the configured snapshot path.
    pub fn from_config(config: TrainerConfig) -> TrainerResult<Self> {
        let engine = FsrsEngine::new(config.desired_retention)?;
        let store = SnapshotStore::new(&config.snapshot_path);
        Self::new(config, Box::new(engine), store)
    }

    /// Catalogue sync progress.
    pub fn readiness(&self) -> Readiness {
        self.catalogue.readiness()
    }

    /// Whether card-serving operations may proceed.
    pub fn is_ready(&self) -> bool {
        self.catalogue.is_ready()
    }

    fn ensure_ready(&self) -> TrainerResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(TrainerError::NotReady)
        }
    }

    /// Ingest the master catalogue payload from the session transport.
    pub fn on_master_catalogue(&mut self, master: MasterCatalogue) -> TrainerResult<()> {
        info!("master catalogue received: {} anime", master.anime_map.len());
        self.catalogue.set_master(master);
        self.seed_missing_cards()
    }

    /// Ingest the user's anime list from the session transport.
    pub fn on_user_list(&mut self, user_list: UserAnimeList) -> TrainerResult<()> {
        info!("user anime list received: {} entries", user_list.len());
        self.catalogue.set_user_list(user_list);
        self.seed_missing_cards()
    }

    /// Create new cards for tracked songs the queue does not know yet.
    ///
    /// Seeding order is shuffled so the id order of the catalogue does not
    /// bias which songs are drawn first. Runs on every catalogue change
    /// and never duplicates an already-tracked card.
    fn seed_missing_cards(&mut self) -> TrainerResult<()> {
        if !self.is_ready() {
            return Ok(());
        }

        let mut song_ids = self.catalogue.tracked_song_ids()?;
        song_ids.shuffle(&mut rand::thread_rng());

        let now = Utc::now();
        let mut seeded = 0usize;
        for song_id in song_ids {
            if self.queue.seed_new(Card::new(song_id, now)) {
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!("seeded {} new cards from the catalogue", seeded);
            self.persist()?;
        }
        Ok(())
    }

    /// Draw the next card to quiz on. Returns `None` when no card is due
    /// and no new cards remain.
    pub fn next_card(&mut self) -> TrainerResult<Option<i64>> {
        self.ensure_ready()?;
        Ok(self.queue.select_next(Utc::now()))
    }

    /// The card currently checked out, if any.
    pub fn current_card(&self) -> Option<&Card> {
        self.queue.current()
    }

    /// Record the answer for the checked-out card.
    ///
    /// `answer_secs` is the measured answer latency; `None` means the user
    /// never answered. The rating falls out of the configured thresholds.
    /// Every `optimize_batch`-th recorded answer triggers a parameter
    /// optimization pass; its failure is logged and swallowed so an answer
    /// is never lost to a bad fit.
    pub fn record_answer(&mut self, answer_secs: Option<u32>) -> TrainerResult<ReviewLog> {
        self.ensure_ready()?;
        let card = self.queue.current().ok_or(TrainerError::NoActiveCard)?;

        let rating = Rating::from_answer_time(
            answer_secs,
            self.config.fast_answer_secs,
            self.config.medium_answer_secs,
        );
        let (reviewed, log) = self.engine.review(card, rating, answer_secs)?;
        self.queue.finish_current(reviewed);
        self.review_logs.push(log.clone());

        if self.review_logs.len() % self.config.optimize_batch == 0 {
            if let Err(err) = self.optimize() {
                warn!("parameter optimization failed, keeping prior parameters: {}", err);
            }
        }

        self.persist()?;
        Ok(log)
    }

    /// Fit scheduler parameters to the accumulated review history and
    /// reschedule every reviewed card under the new fit.
    ///
    /// All-or-nothing: the queue is only touched once every card has been
    /// rescheduled successfully, and a reschedule failure restores the
    /// prior parameter vector so parameters and due dates never diverge.
    pub fn optimize(&mut self) -> TrainerResult<()> {
        let started = Instant::now();
        let parameters = self
            .engine
            .compute_optimal_parameters(&self.review_logs)
            .map_err(|err| TrainerError::optimization(err.to_string()))?;
        let previous = self.engine.parameters();
        self.engine
            .set_parameters(parameters)
            .map_err(|err| TrainerError::optimization(err.to_string()))?;

        let mut rescheduled = Vec::with_capacity(self.queue.existing_cards().len());
        for card in self.queue.existing_cards() {
            match self.engine.reschedule(card, &self.review_logs) {
                Ok(card) => rescheduled.push(card),
                Err(err) => {
                    if let Err(restore) = self.engine.set_parameters(previous) {
                        warn!("failed to restore prior parameters: {}", restore);
                    }
                    return Err(TrainerError::optimization(err.to_string()));
                }
            }
        }
        self.queue.replace_existing(rescheduled);

        info!(
            "optimizer took {:.2}s over {} reviews",
            started.elapsed().as_secs_f64(),
            self.review_logs.len()
        );
        Ok(())
    }

    /// Queue counts at this moment.
    pub fn schedule_stats(&self) -> TrainerResult<ScheduleStats> {
        self.ensure_ready()?;
        Ok(self.queue.stats(Utc::now()))
    }

    /// Write the current state to the snapshot store.
    ///
    /// An unanswered checked-out card is folded back into its pool in the
    /// snapshot, so restarting mid-question loses nothing.
    pub fn persist(&self) -> TrainerResult<()> {
        self.store.save(&self.snapshot())
    }

    fn snapshot(&self) -> Snapshot {
        let mut existing_cards = self.queue.existing_cards().to_vec();
        let mut new_cards = self.queue.new_cards().to_vec();
        if let Some(card) = self.queue.current() {
            if card.is_new() {
                new_cards.push(card.clone());
            } else {
                existing_cards.push(card.clone());
            }
        }

        Snapshot {
            scheduler_parameters: self.engine.parameters(),
            new_cards,
            existing_cards,
            review_logs: self.review_logs.clone(),
        }
    }

    /// The full review history, oldest first.
    pub fn review_logs(&self) -> &[ReviewLog] {
        &self.review_logs
    }

    /// Every catalogue anime with its display names.
    pub fn all_anime(&self) -> TrainerResult<HashMap<i64, Vec<String>>> {
        self.catalogue.all_anime()
    }

    /// Accepted anime answers for one catalogue song, keyed by the
    /// catalogue-wide song id.
    pub fn valid_answers(&self, song_id: i64) -> TrainerResult<Vec<String>> {
        self.ensure_ready()?;
        self.catalogue.valid_answers(song_id)
    }

    /// The catalogue link for one tracked song.
    pub fn song_link(&self, ann_song_id: i64) -> TrainerResult<&SongLink> {
        self.ensure_ready()?;
        self.catalogue.song_link(ann_song_id)
    }

    /// Extended metadata for one catalogue song, keyed by the
    /// catalogue-wide song id.
    pub fn song_info(&self, song_id: i64) -> TrainerResult<SongInfo> {
        self.ensure_ready()?;
        self.catalogue.song_info(song_id)
    }

    /// Upstream metadata for the checked-out card, fetched through the
    /// session transport.
    pub async fn current_song_metadata(
        &self,
        client: &dyn SessionClient,
    ) -> TrainerResult<serde_json::Value> {
        self.ensure_ready()?;
        let card = self.queue.current().ok_or(TrainerError::NoActiveCard)?;
        client.extended_song_info(card.card_id).await
    }
}
