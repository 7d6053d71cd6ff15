//! # MPD Session Module
//!
//! This module defines the seam between mpdrandom's album logic and the MPD
//! protocol. Everything that talks to a server does so through the
//! [`MpdSession`] trait, which mirrors the handful of MPD commands the program
//! needs:
//!
//! | Method            | MPD command     |
//! |-------------------|-----------------|
//! | `playlist_info`   | `playlistinfo`  |
//! | `current_song`    | `currentsong`   |
//! | `play_id`         | `playid`        |
//! | `move_id`         | `moveid`        |
//! | `find_add`        | `findadd`       |
//! | `list`            | `list`          |
//! | `idle`            | `idle`          |
//! | `clear`           | `clear`         |
//!
//! The real implementation lives in [`crate::mpd_client`]. The `memory`
//! submodule provides an in-memory server used by tests and benchmarks; it is
//! compiled for unit tests and behind the `test-util` feature.

use anyhow::Result;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

/// Grouping key for songs that carry no album tag.
pub const UNKNOWN_ALBUM: &str = "None";

/// Rendered in user-facing notices when a tag is missing.
pub const PLACEHOLDER: &str = "Unknown";

/// A read-only snapshot of a queued (or library) song.
///
/// Library songs returned by an in-memory server carry `id == 0` and
/// `pos == 0` until they are queued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    /// Server-assigned queue identifier, unique within the current queue
    pub id: u32,
    /// Position in the queue
    pub pos: u32,
    /// Path relative to MPD's music directory
    pub file: String,
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
}

impl Song {
    /// Album key used for grouping. Untagged songs share [`UNKNOWN_ALBUM`].
    pub fn album_name(&self) -> &str {
        self.album.as_deref().unwrap_or(UNKNOWN_ALBUM)
    }

    pub fn album_or_placeholder(&self) -> &str {
        self.album.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn artist_or_placeholder(&self) -> &str {
        self.artist.as_deref().unwrap_or(PLACEHOLDER)
    }
}

/// MPD idle subsystems mpdrandom waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// Playback state changes (play, stop, pause, seek, song change)
    Player,
}

/// Typed request/response access to a single MPD connection.
///
/// A session serializes its commands, so it must never be shared between
/// threads. Components that need to block on [`MpdSession::idle`] while
/// another component issues commands open a second session.
pub trait MpdSession {
    /// Every song in the queue, in queue order.
    fn playlist_info(&mut self) -> Result<Vec<Song>>;

    /// The current song, or `None` when nothing is current.
    fn current_song(&mut self) -> Result<Option<Song>>;

    /// Start playback at the queued song with the given id.
    fn play_id(&mut self, id: u32) -> Result<()>;

    /// Move the queued song with the given id to `pos`.
    fn move_id(&mut self, id: u32, pos: u32) -> Result<()>;

    /// Append every library song whose `tag` equals `value` to the queue.
    fn find_add(&mut self, tag: &str, value: &str) -> Result<()>;

    /// Distinct values of `tag` in the library, optionally restricted to a
    /// base directory.
    fn list(&mut self, tag: &str, base: Option<&str>) -> Result<Vec<String>>;

    /// Block until one of `subsystems` changes. Returns the changed subsystems.
    fn idle(&mut self, subsystems: &[Subsystem]) -> Result<Vec<Subsystem>>;

    /// Remove every song from the queue.
    fn clear(&mut self) -> Result<()>;
}
