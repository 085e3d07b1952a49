//! Core types for encore.

mod card;
mod catalogue;
mod review;
mod stats;

pub use card::{Card, MemoryParams};
pub use catalogue::{
    AnimeEntry, AnimeName, MasterCatalogue, SongInfo, SongLink, SongLinks, SongRecord,
    UserAnimeList, PLANNED_STATUS,
};
pub use review::{Rating, ReviewLog};
pub use stats::ScheduleStats;
