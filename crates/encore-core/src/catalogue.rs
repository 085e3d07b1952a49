//! Catalogue synchronization.
//!
//! Joins the master song catalogue against the user's anime list to derive
//! the tracked song set. Both payloads arrive independently from the
//! session transport, in either order; the derived state is rebuilt from
//! scratch whenever either side changes.
//!
//! Two scopes coexist here. The tracked song set is filtered to what the
//! user owns and what has an uploaded recording; the song-to-anime reverse
//! index spans the whole master catalogue, because an answer naming any
//! anime the song appears in is correct even when the user does not own
//! that anime.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{TrainerError, TrainerResult};
use crate::types::{MasterCatalogue, SongInfo, SongLink, UserAnimeList, PLANNED_STATUS};

/// How much of the catalogue sync has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Neither payload has arrived.
    Uninitialized,
    /// Exactly one of the two payloads has arrived.
    PartiallyReady,
    /// Both payloads arrived and the tracked song set is derived.
    Ready,
}

/// Holds the two upstream payloads and the state derived from them.
///
/// Derivation is a full recompute, so replacing either payload with
/// identical content leaves the derived state unchanged.
#[derive(Debug)]
pub struct CatalogueSync {
    include_planned: bool,
    master: Option<MasterCatalogue>,
    user_list: Option<UserAnimeList>,
    /// Catalogue-wide song id to every anime carrying it. Built from the
    /// whole master catalogue, unfiltered.
    song_to_anime: HashMap<i64, Vec<i64>>,
    /// Tracked songs keyed by their external song id (the card id).
    /// Filtered to owned anime and uploaded links; absent until both
    /// payloads have arrived.
    tracked_song_links: Option<HashMap<i64, SongLink>>,
}

impl CatalogueSync {
    /// Create an empty sync. `include_planned` controls whether anime the
    /// user has only planned (status code 5) count as owned.
    pub fn new(include_planned: bool) -> Self {
        Self {
            include_planned,
            master: None,
            user_list: None,
            song_to_anime: HashMap::new(),
            tracked_song_links: None,
        }
    }

    /// Ingest (or replace) the master catalogue.
    pub fn set_master(&mut self, master: MasterCatalogue) {
        self.song_to_anime.clear();
        for entry in master.anime_map.values() {
            for link in entry.song_links.iter() {
                let anime_ids = self.song_to_anime.entry(link.song_id).or_default();
                if !anime_ids.contains(&entry.ann_id) {
                    anime_ids.push(entry.ann_id);
                }
            }
        }
        self.master = Some(master);
        self.rebuild();
    }

    /// Ingest (or replace) the user's anime list.
    pub fn set_user_list(&mut self, user_list: UserAnimeList) {
        self.user_list = Some(user_list);
        self.rebuild();
    }

    /// Current sync state.
    pub fn readiness(&self) -> Readiness {
        match (&self.master, &self.user_list) {
            (None, None) => Readiness::Uninitialized,
            (Some(_), Some(_)) => Readiness::Ready,
            _ => Readiness::PartiallyReady,
        }
    }

    /// Whether card-serving operations may proceed.
    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    fn rebuild(&mut self) {
        let (Some(master), Some(user_list)) = (&self.master, &self.user_list) else {
            return;
        };

        let mut tracked = HashMap::new();
        let mut skipped = 0usize;
        for (anime_id, status) in user_list {
            if *status == PLANNED_STATUS && !self.include_planned {
                continue;
            }
            let Some(entry) = master.anime_map.get(anime_id) else {
                skipped += 1;
                continue;
            };
            for link in entry.song_links.iter().filter(|l| l.is_uploaded()) {
                tracked
                    .entry(link.ann_song_id)
                    .or_insert_with(|| link.clone());
            }
        }

        if skipped > 0 {
            warn!(
                "{} anime from the user list are missing from the master catalogue",
                skipped
            );
        }
        debug!(
            "catalogue rebuilt: {} tracked songs, {} song ids indexed",
            tracked.len(),
            self.song_to_anime.len()
        );
        self.tracked_song_links = Some(tracked);
    }

    fn tracked(&self) -> TrainerResult<&HashMap<i64, SongLink>> {
        self.tracked_song_links.as_ref().ok_or(TrainerError::NotReady)
    }

    /// Ids of every tracked song, in no particular order.
    pub fn tracked_song_ids(&self) -> TrainerResult<Vec<i64>> {
        Ok(self.tracked()?.keys().copied().collect())
    }

    /// The catalogue link for one tracked song.
    pub fn song_link(&self, ann_song_id: i64) -> TrainerResult<&SongLink> {
        self.tracked()?
            .get(&ann_song_id)
            .ok_or(TrainerError::UnknownSong(ann_song_id))
    }

    /// All accepted anime answers for one catalogue song: every display
    /// name of every anime the song appears in, sorted and deduplicated.
    /// Spans the whole catalogue, owned or not.
    pub fn valid_answers(&self, song_id: i64) -> TrainerResult<Vec<String>> {
        let master = self.master.as_ref().ok_or(TrainerError::NotReady)?;
        let anime_ids = self
            .song_to_anime
            .get(&song_id)
            .ok_or(TrainerError::UnknownSong(song_id))?;

        let mut answers = BTreeSet::new();
        for ann_id in anime_ids {
            if let Some(entry) = master.anime_map.get(&ann_id.to_string()) {
                answers.extend(entry.names.iter().map(|n| n.name.clone()));
            }
        }
        Ok(answers.into_iter().collect())
    }

    /// Every anime in the master catalogue with its display names, keyed by
    /// anime id.
    pub fn all_anime(&self) -> TrainerResult<HashMap<i64, Vec<String>>> {
        if !self.is_ready() {
            return Err(TrainerError::NotReady);
        }
        let master = self.master.as_ref().ok_or(TrainerError::NotReady)?;
        Ok(master
            .anime_map
            .values()
            .map(|entry| {
                let names = entry.names.iter().map(|n| n.name.clone()).collect();
                (entry.ann_id, names)
            })
            .collect())
    }

    /// Extended metadata for one catalogue song, with the artist and group
    /// references resolved against their catalogue maps. Keyed by the
    /// catalogue-wide song id, tracked or not.
    pub fn song_info(&self, song_id: i64) -> TrainerResult<SongInfo> {
        let master = self.master.as_ref().ok_or(TrainerError::NotReady)?;
        let record = master
            .song_map
            .get(&song_id.to_string())
            .cloned()
            .ok_or(TrainerError::UnknownSong(song_id))?;

        let artist = record
            .song_artist_id
            .and_then(|id| master.artist_map.get(&id.to_string()).cloned());
        let group = record
            .song_group_id
            .and_then(|id| master.group_map.get(&id.to_string()).cloned());

        Ok(SongInfo {
            record,
            artist,
            group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn master() -> MasterCatalogue {
        serde_json::from_value(json!({
            "animeMap": {
                "100": {
                    "annId": 100,
                    "names": [{"name": "Cowboy Bebop"}, {"name": "カウボーイビバップ"}],
                    "songLinks": {
                        "OP": [{"annSongId": 1, "songId": 10, "uploaded": 1}],
                        "ED": [{"annSongId": 2, "songId": 11, "uploaded": 0}]
                    }
                },
                "200": {
                    "annId": 200,
                    "names": [{"name": "Cowboy Bebop: The Movie"}],
                    "songLinks": {
                        "INS": [{"annSongId": 3, "songId": 10, "uploaded": 1}]
                    }
                },
                "300": {
                    "annId": 300,
                    "names": [{"name": "Trigun"}],
                    "songLinks": {
                        "OP": [{"annSongId": 4, "songId": 20, "uploaded": 1}]
                    }
                },
                "400": {
                    "annId": 400,
                    "names": [{"name": "Cowboy Bebop: Knockin' on Heaven's Door"}],
                    "songLinks": {
                        "INS": [{"annSongId": 5, "songId": 10, "uploaded": 0}]
                    }
                }
            },
            "songMap": {
                "10": {"songArtistId": 55, "songName": "Tank!"},
                "11": {"songName": "The Real Folk Blues"}
            },
            "artistMap": {
                "55": {"name": "Seatbelts"}
            }
        }))
        .unwrap()
    }

    fn user_list() -> UserAnimeList {
        // 300 is planned only; 999 is not in the master catalogue; 400 is
        // not in the list at all.
        [("100", 1), ("200", 2), ("300", 5), ("999", 1)]
            .into_iter()
            .map(|(id, status)| (id.to_string(), status))
            .collect()
    }

    #[test]
    fn test_readiness_progression() {
        let mut sync = CatalogueSync::new(false);
        assert_eq!(sync.readiness(), Readiness::Uninitialized);
        assert!(sync.tracked_song_ids().is_err());
        assert!(matches!(sync.valid_answers(10), Err(TrainerError::NotReady)));

        sync.set_master(master());
        assert_eq!(sync.readiness(), Readiness::PartiallyReady);
        assert!(matches!(
            sync.tracked_song_ids(),
            Err(TrainerError::NotReady)
        ));

        sync.set_user_list(user_list());
        assert_eq!(sync.readiness(), Readiness::Ready);
        assert!(sync.tracked_song_ids().is_ok());
    }

    #[test]
    fn test_either_delivery_order_gives_same_tracked_set() {
        let mut master_first = CatalogueSync::new(false);
        master_first.set_master(master());
        master_first.set_user_list(user_list());

        let mut list_first = CatalogueSync::new(false);
        list_first.set_user_list(user_list());
        list_first.set_master(master());

        let mut a = master_first.tracked_song_ids().unwrap();
        let mut b = list_first.tracked_song_ids().unwrap();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert_eq!(a, vec![1, 3]);
    }

    #[test]
    fn test_filters_unuploaded_and_planned() {
        let mut sync = CatalogueSync::new(false);
        sync.set_master(master());
        sync.set_user_list(user_list());

        let ids = sync.tracked_song_ids().unwrap();
        // 2 is unuploaded, 4 belongs to the planned-only anime, 5 to an
        // anime the user does not have at all.
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&4));
        assert!(!ids.contains(&5));
    }

    #[test]
    fn test_include_planned_admits_planned_anime() {
        let mut sync = CatalogueSync::new(true);
        sync.set_master(master());
        sync.set_user_list(user_list());

        assert!(sync.tracked_song_ids().unwrap().contains(&4));
    }

    #[test]
    fn test_reingesting_same_payload_is_idempotent() {
        let mut sync = CatalogueSync::new(false);
        sync.set_master(master());
        sync.set_user_list(user_list());
        let mut before = sync.tracked_song_ids().unwrap();
        let answers_before = sync.valid_answers(10).unwrap();

        sync.set_master(master());
        let mut after = sync.tracked_song_ids().unwrap();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
        assert_eq!(answers_before, sync.valid_answers(10).unwrap());
    }

    #[test]
    fn test_valid_answers_spans_the_whole_catalogue() {
        let mut sync = CatalogueSync::new(false);
        sync.set_master(master());
        sync.set_user_list(user_list());

        // Song 10 appears in three anime. Anime 400 is not on the user's
        // list and its link is unuploaded, but naming it is still a
        // correct answer; both filters apply to tracking only.
        let answers = sync.valid_answers(10).unwrap();
        assert_eq!(
            answers,
            vec![
                "Cowboy Bebop".to_string(),
                "Cowboy Bebop: Knockin' on Heaven's Door".to_string(),
                "Cowboy Bebop: The Movie".to_string(),
                "カウボーイビバップ".to_string(),
            ]
        );
        assert!(!sync.tracked_song_ids().unwrap().contains(&5));

        // Song 20 belongs only to the planned (untracked) anime.
        assert_eq!(sync.valid_answers(20).unwrap(), vec!["Trigun".to_string()]);
    }

    #[test]
    fn test_unknown_song_is_rejected() {
        let mut sync = CatalogueSync::new(false);
        sync.set_master(master());
        sync.set_user_list(user_list());

        assert!(matches!(
            sync.song_link(9999),
            Err(TrainerError::UnknownSong(9999))
        ));
        assert!(matches!(
            sync.valid_answers(9999),
            Err(TrainerError::UnknownSong(9999))
        ));
        assert!(matches!(
            sync.song_info(9999),
            Err(TrainerError::UnknownSong(9999))
        ));
    }

    #[test]
    fn test_song_info_resolves_artist() {
        let mut sync = CatalogueSync::new(false);
        sync.set_master(master());
        sync.set_user_list(user_list());

        let info = sync.song_info(10).unwrap();
        assert_eq!(info.artist.unwrap()["name"], json!("Seatbelts"));
        assert!(info.group.is_none());
        assert_eq!(info.record.extra["songName"], json!("Tank!"));

        // No tracked-link requirement: song 11's only link is unuploaded.
        let info = sync.song_info(11).unwrap();
        assert!(info.artist.is_none());
        assert_eq!(info.record.extra["songName"], json!("The Real Folk Blues"));
    }

    #[test]
    fn test_all_anime_lists_whole_catalogue() {
        let mut sync = CatalogueSync::new(false);
        assert!(sync.all_anime().is_err());

        sync.set_master(master());
        sync.set_user_list(user_list());
        let anime = sync.all_anime().unwrap();
        assert_eq!(anime.len(), 4);
        assert_eq!(anime[&300], vec!["Trigun".to_string()]);
    }
}
