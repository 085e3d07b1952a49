//! Session client trait.

use async_trait::async_trait;

use crate::error::TrainerResult;

/// External quiz-session capability.
///
/// The transport itself (authentication, socket lifecycle, catalogue
/// retrieval) lives outside this crate; it pushes the master catalogue and
/// the user list into the trainer and answers on-demand metadata lookups
/// through this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Extended metadata for one song, keyed by its external song id.
    async fn extended_song_info(&self, ann_song_id: i64) -> TrainerResult<serde_json::Value>;
}
