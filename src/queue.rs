//! # Queue Reordering Module
//!
//! Moves whole albums around the MPD queue with `moveid`.
//!
//! [`shuffle_albums`] rewrites the queue album by album: every album is moved,
//! in a random order, to a running position starting at 0. Songs inside an
//! album keep their relative order, and the set of queued songs is unchanged.

use crate::album::{group_albums, Album};
use crate::session::MpdSession;
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

/// Move every song of `album` to consecutive positions starting at `target`.
///
/// Returns the position right after the last moved song.
pub fn move_album<S: MpdSession + ?Sized>(session: &mut S, album: &Album, target: u32) -> Result<u32> {
    let mut pos = target;
    for song in &album.songs {
        session
            .move_id(song.id, pos)
            .with_context(|| format!("Failed to move song id {} to position {pos}", song.id))?;
        pos += 1;
    }
    debug!("Moved album '{}' to positions {target}..{pos}", album.name);
    Ok(pos)
}

/// Shuffle the order of albums in the queue. Returns the number of albums.
pub fn shuffle_albums<S, R>(session: &mut S, rng: &mut R) -> Result<usize>
where
    S: MpdSession + ?Sized,
    R: Rng + ?Sized,
{
    let albums = group_albums(session.playlist_info().context("Failed to read the queue")?);
    let mut names: Vec<&str> = albums.names().collect();
    names.shuffle(rng);

    let mut pos = 0;
    for name in &names {
        let album = albums
            .get(name)
            .ok_or_else(|| anyhow!("Album '{name}' vanished from the index"))?;
        pos = move_album(session, album, pos)?;
    }

    info!("Shuffled {} albums ({pos} songs)", names.len());
    Ok(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::memory::{track, MemoryServer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn interleaved_server() -> MemoryServer {
        let server = MemoryServer::new();
        server.enqueue(track("a/1.flac", Some("A"), None));
        server.enqueue(track("b/1.flac", Some("B"), None));
        server.enqueue(track("a/2.flac", Some("A"), None));
        server.enqueue(track("c/1.flac", Some("C"), None));
        server.enqueue(track("b/2.flac", Some("B"), None));
        server.enqueue(track("a/3.flac", Some("A"), None));
        server
    }

    fn files(server: &MemoryServer) -> Vec<String> {
        server.queue().into_iter().map(|s| s.file).collect()
    }

    #[test]
    fn test_move_album_returns_next_position() {
        let server = interleaved_server();
        let mut session = server.connect();
        let albums = group_albums(session.playlist_info().unwrap());

        let next = move_album(&mut session, albums.get("B").unwrap(), 0).unwrap();
        assert_eq!(next, 2);
        assert_eq!(&files(&server)[..2], &["b/1.flac", "b/2.flac"]);
    }

    #[test]
    fn test_move_album_chains() {
        let server = interleaved_server();
        let mut session = server.connect();
        let albums = group_albums(session.playlist_info().unwrap());

        let next = move_album(&mut session, albums.get("C").unwrap(), 0).unwrap();
        let next = move_album(&mut session, albums.get("A").unwrap(), next).unwrap();
        assert_eq!(next, 4);
        assert_eq!(
            files(&server),
            vec!["c/1.flac", "a/1.flac", "a/2.flac", "a/3.flac", "b/1.flac", "b/2.flac"]
        );
    }

    #[test]
    fn test_shuffle_is_a_permutation_with_contiguous_albums() {
        let server = interleaved_server();
        let before: HashSet<String> = files(&server).into_iter().collect();
        let mut session = server.connect();
        let mut rng = StdRng::seed_from_u64(42);

        let moved = shuffle_albums(&mut session, &mut rng).unwrap();
        assert_eq!(moved, 3);

        let after = server.queue();
        let after_files: HashSet<String> = after.iter().map(|s| s.file.clone()).collect();
        assert_eq!(after.len(), 6);
        assert_eq!(before, after_files);

        // Each album is contiguous and keeps its internal order.
        let albums = group_albums(after.clone());
        for album in albums.iter() {
            let positions: Vec<u32> = album.songs.iter().map(|s| s.pos).collect();
            let first = positions[0];
            let expected: Vec<u32> = (first..first + positions.len() as u32).collect();
            assert_eq!(positions, expected, "album {} not contiguous", album.name);

            let mut sorted = album.songs.iter().map(|s| s.file.clone()).collect::<Vec<_>>();
            sorted.sort();
            let actual: Vec<String> = album.songs.iter().map(|s| s.file.clone()).collect();
            assert_eq!(actual, sorted, "album {} lost its order", album.name);
        }
    }

    #[test]
    fn test_shuffle_reaches_every_album_order() {
        let mut orders = HashSet::new();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let server = interleaved_server();
            let mut session = server.connect();
            shuffle_albums(&mut session, &mut rng).unwrap();
            let order: Vec<String> = group_albums(server.queue())
                .names()
                .map(str::to_string)
                .collect();
            orders.insert(order);
        }
        assert_eq!(orders.len(), 6);
    }

    #[test]
    fn test_shuffle_empty_queue() {
        let server = MemoryServer::new();
        let mut session = server.connect();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(shuffle_albums(&mut session, &mut rng).unwrap(), 0);
        assert_eq!(server.command_count("moveid"), 0);
    }
}
