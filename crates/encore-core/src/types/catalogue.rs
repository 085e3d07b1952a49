//! Typed records for the upstream catalogue payloads.
//!
//! The session transport delivers these as deeply nested JSON; they are
//! validated and filtered once on ingestion instead of on every access.
//! Field names follow the upstream camelCase wire shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-list status code meaning "planned / not owned".
pub const PLANNED_STATUS: i64 = 5;

/// The user's ownership list: anime id (as sent, a JSON object key) to
/// status code.
pub type UserAnimeList = HashMap<String, i64>;

/// One song link inside an anime's catalogue entry.
///
/// Only the fields needed for card identity and filtering are modeled;
/// everything else rides along untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongLink {
    /// External song id used as the card id.
    pub ann_song_id: i64,
    /// Catalogue-wide song id shared across anime.
    pub song_id: i64,
    /// Upload availability flag; `0` means the song cannot be played.
    #[serde(default)]
    pub uploaded: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl SongLink {
    /// Whether the song has an uploaded recording and can be quizzed.
    pub fn is_uploaded(&self) -> bool {
        self.uploaded != 0
    }
}

/// Song links of one anime, grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongLinks {
    #[serde(rename = "OP", default)]
    pub openings: Vec<SongLink>,
    #[serde(rename = "ED", default)]
    pub endings: Vec<SongLink>,
    #[serde(rename = "INS", default)]
    pub inserts: Vec<SongLink>,
}

impl SongLinks {
    /// All links across the three groups.
    pub fn iter(&self) -> impl Iterator<Item = &SongLink> {
        self.openings
            .iter()
            .chain(self.endings.iter())
            .chain(self.inserts.iter())
    }
}

/// One display name of an anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeName {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One anime entry from the master catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeEntry {
    pub ann_id: i64,
    #[serde(default)]
    pub names: Vec<AnimeName>,
    #[serde(default)]
    pub song_links: SongLinks,
}

/// Extended song metadata from the catalogue's song map.
///
/// Kept open-ended: only the artist/group references are resolved here,
/// the rest is presentation data the front end consumes as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    #[serde(default)]
    pub song_artist_id: Option<i64>,
    #[serde(default)]
    pub song_group_id: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A song record with its artist/group references resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    #[serde(flatten)]
    pub record: SongRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Value>,
}

/// The master song/anime catalogue delivered by the session transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCatalogue {
    #[serde(default)]
    pub anime_map: HashMap<String, AnimeEntry>,
    #[serde(default)]
    pub song_map: HashMap<String, SongRecord>,
    #[serde(default)]
    pub artist_map: HashMap<String, Value>,
    #[serde(default)]
    pub group_map: HashMap<String, Value>,
}
