//! # encore-core
//!
//! Spaced-repetition trainer for song-identification quizzes.
//!
//! The trainer joins a master song catalogue against the user's anime list
//! to decide which songs to track, schedules them with FSRS, and quizzes
//! the most at-risk song first. State persists as a single JSON snapshot.
//!
//! ```no_run
//! use encore_core::{Trainer, TrainerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut trainer = Trainer::from_config(TrainerConfig::default())?;
//!     // Feed catalogue payloads from the session transport, then:
//!     if let Some(song_id) = trainer.next_card()? {
//!         // ... play the song, collect the answer ...
//!         let log = trainer.record_answer(Some(9))?;
//!         println!("rated {:?} for song {}", log.rating, song_id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalogue;
pub mod config;
pub mod engine;
pub mod error;
pub mod queue;
pub mod session;
pub mod store;
pub mod trainer;
pub mod traits;
pub mod types;

pub use catalogue::{CatalogueSync, Readiness};
pub use config::TrainerConfig;
pub use engine::FsrsEngine;
pub use error::{TrainerError, TrainerResult};
pub use queue::CardQueue;
pub use session::{CorrelationTable, RequestId};
pub use store::{Snapshot, SnapshotStore};
pub use trainer::Trainer;
pub use traits::{SchedulingEngine, SessionClient};
pub use types::{
    Card, MasterCatalogue, MemoryParams, Rating, ReviewLog, ScheduleStats, SongInfo, SongLink,
    UserAnimeList,
};
