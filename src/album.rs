//! # Album Grouping Module
//!
//! Turns a flat queue into albums and picks one at random.
//!
//! Albums are a view, not an entity: an [`AlbumIndex`] is rebuilt from the
//! live queue every time an operation needs it and is never cached across
//! operations, because MPD may renumber song ids at any time.
//!
//! ## Invariants
//!
//! - Every input song lands in exactly one album, keyed by
//!   [`Song::album_name`] (untagged songs share the `"None"` album).
//! - Albums keep first-seen order; songs inside an album keep queue order.

use crate::session::Song;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Songs sharing an album key, in queue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub songs: Vec<Song>,
}

impl Album {
    /// The song playback starts from.
    pub fn first_song(&self) -> Option<&Song> {
        self.songs.first()
    }
}

/// Albums keyed by name, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AlbumIndex {
    albums: Vec<Album>,
    positions: HashMap<String, usize>,
}

impl AlbumIndex {
    pub fn get(&self, name: &str) -> Option<&Album> {
        self.positions.get(name).map(|&i| &self.albums[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Album names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.albums.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Album> {
        self.albums.iter()
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Total number of songs across all albums.
    pub fn song_count(&self) -> usize {
        self.albums.iter().map(|a| a.songs.len()).sum()
    }

    fn push(&mut self, song: Song) {
        let name = song.album_name();
        match self.positions.get(name) {
            Some(&i) => self.albums[i].songs.push(song),
            None => {
                let name = name.to_string();
                self.positions.insert(name.clone(), self.albums.len());
                self.albums.push(Album { name, songs: vec![song] });
            }
        }
    }
}

/// Group songs into albums, preserving first-seen album order.
pub fn group_albums<I>(songs: I) -> AlbumIndex
where
    I: IntoIterator<Item = Song>,
{
    let mut index = AlbumIndex::default();
    for song in songs {
        index.push(song);
    }
    index
}

/// Pick a uniformly random album name, excluding `current` when it is one of
/// the albums. Returns `None` when nothing else is left.
pub fn pick_random_album<R: Rng + ?Sized>(
    index: &AlbumIndex,
    current: Option<&str>,
    rng: &mut R,
) -> Option<String> {
    let candidates: Vec<&str> = index
        .names()
        .filter(|name| Some(*name) != current)
        .collect();
    debug!(
        "Choosing among {} of {} albums (excluding {:?})",
        candidates.len(),
        index.len(),
        current
    );
    candidates.choose(rng).map(|name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UNKNOWN_ALBUM;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn song(id: u32, album: Option<&str>) -> Song {
        Song {
            id,
            pos: id - 1,
            file: format!("song{id}.flac"),
            album: album.map(str::to_string),
            ..Default::default()
        }
    }

    fn sample_playlist() -> Vec<Song> {
        vec![
            song(1, Some("A")),
            song(2, Some("B")),
            song(3, Some("A")),
            song(4, None),
            song(5, Some("C")),
            song(6, None),
        ]
    }

    #[test]
    fn test_group_albums_preserves_first_seen_order() {
        let index = group_albums(sample_playlist());
        let names: Vec<&str> = index.names().collect();
        assert_eq!(names, vec!["A", "B", UNKNOWN_ALBUM, "C"]);
    }

    #[test]
    fn test_group_albums_keeps_queue_order_within_album() {
        let index = group_albums(sample_playlist());
        let a: Vec<u32> = index.get("A").unwrap().songs.iter().map(|s| s.id).collect();
        let unknown: Vec<u32> = index
            .get(UNKNOWN_ALBUM)
            .unwrap()
            .songs
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(a, vec![1, 3]);
        assert_eq!(unknown, vec![4, 6]);
    }

    #[test]
    fn test_group_albums_preserves_song_count() {
        let playlist = sample_playlist();
        let total = playlist.len();
        let index = group_albums(playlist);
        assert_eq!(index.song_count(), total);
    }

    #[test]
    fn test_every_song_in_exactly_one_bucket() {
        let index = group_albums(sample_playlist());
        let mut seen = HashSet::new();
        for album in index.iter() {
            for s in &album.songs {
                assert_eq!(s.album_name(), album.name);
                assert!(seen.insert(s.id), "song {} appears twice", s.id);
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_group_albums_empty_input() {
        let index = group_albums(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.song_count(), 0);
    }

    #[test]
    fn test_pick_never_returns_current_album() {
        let index = group_albums(vec![
            song(1, Some("A")),
            song(2, Some("A")),
            song(3, Some("B")),
            song(4, Some("C")),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut picked = HashSet::new();
        for _ in 0..200 {
            let choice = pick_random_album(&index, Some("B"), &mut rng).unwrap();
            assert_ne!(choice, "B");
            picked.insert(choice);
        }
        assert_eq!(picked, HashSet::from(["A".to_string(), "C".to_string()]));
    }

    #[test]
    fn test_pick_with_unknown_current_excludes_nothing() {
        let index = group_albums(vec![song(1, Some("A"))]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            pick_random_album(&index, Some("Not Queued"), &mut rng),
            Some("A".to_string())
        );
    }

    #[test]
    fn test_pick_returns_none_when_no_candidates() {
        let mut rng = StdRng::seed_from_u64(3);

        let empty = group_albums(Vec::new());
        assert_eq!(pick_random_album(&empty, None, &mut rng), None);

        let only_current = group_albums(vec![song(1, Some("A")), song(2, Some("A"))]);
        assert_eq!(pick_random_album(&only_current, Some("A"), &mut rng), None);
        assert_eq!(
            pick_random_album(&only_current, None, &mut rng),
            Some("A".to_string())
        );
    }
}
