//! In-memory MPD server.
//!
//! [`MemoryServer`] keeps a queue, a library and a current song behind a
//! mutex, and hands out [`MemorySession`] connections implementing
//! [`MpdSession`]. Each connection has its own pending idle events: a change
//! made while a connection is not idling is reported by that connection's next
//! `idle` call without blocking, the way MPD does it.

use super::{MpdSession, Song, Subsystem};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ServerState {
    queue: Vec<Song>,
    library: Vec<Song>,
    current: Option<u32>,
    next_id: u32,
    pending: Vec<HashSet<Subsystem>>,
    commands: Vec<&'static str>,
    disconnected: bool,
}

impl ServerState {
    fn notify(&mut self, subsystem: Subsystem) {
        for pending in &mut self.pending {
            pending.insert(subsystem);
        }
    }

    fn renumber(&mut self) {
        for (pos, song) in self.queue.iter_mut().enumerate() {
            song.pos = pos as u32;
        }
    }

    fn append(&mut self, mut song: Song) -> u32 {
        self.next_id += 1;
        song.id = self.next_id;
        song.pos = self.queue.len() as u32;
        self.queue.push(song);
        self.next_id
    }

    fn record(&mut self, command: &'static str) -> Result<()> {
        if self.disconnected {
            bail!("Connection closed by server");
        }
        self.commands.push(command);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<ServerState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builds a library song with the given tags.
pub fn track(file: &str, album: Option<&str>, artist: Option<&str>) -> Song {
    Song {
        file: file.to_string(),
        title: None,
        album: album.map(str::to_string),
        artist: artist.map(str::to_string),
        ..Default::default()
    }
}

/// Shared in-memory server. Cloning yields another handle to the same server.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    shared: Arc<Shared>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new connection with an empty pending-event set.
    pub fn connect(&self) -> MemorySession {
        let mut state = self.shared.lock();
        state.pending.push(HashSet::new());
        MemorySession {
            shared: Arc::clone(&self.shared),
            conn: state.pending.len() - 1,
        }
    }

    /// Replace the library contents.
    pub fn set_library(&self, songs: Vec<Song>) {
        self.shared.lock().library = songs;
    }

    /// Append a song to the queue and return its id.
    pub fn enqueue(&self, song: Song) -> u32 {
        let mut state = self.shared.lock();
        state.append(song)
    }

    /// Make the queued song with `id` current, or stop playback with `None`.
    pub fn set_current(&self, id: Option<u32>) {
        let mut state = self.shared.lock();
        state.current = id;
        state.notify(Subsystem::Player);
        self.shared.changed.notify_all();
    }

    /// Simulate a non-terminal player event such as pause or seek.
    pub fn touch_player(&self) {
        let mut state = self.shared.lock();
        state.notify(Subsystem::Player);
        self.shared.changed.notify_all();
    }

    pub fn queue(&self) -> Vec<Song> {
        self.shared.lock().queue.clone()
    }

    pub fn current(&self) -> Option<Song> {
        let state = self.shared.lock();
        let id = state.current?;
        state.queue.iter().find(|s| s.id == id).cloned()
    }

    /// How many times `command` was issued across all connections.
    pub fn command_count(&self, command: &str) -> usize {
        self.shared
            .lock()
            .commands
            .iter()
            .filter(|c| **c == command)
            .count()
    }

    /// Drop every connection. Blocked and future calls fail.
    pub fn disconnect(&self) {
        self.shared.lock().disconnected = true;
        self.shared.changed.notify_all();
    }
}

/// One connection to a [`MemoryServer`].
#[derive(Debug)]
pub struct MemorySession {
    shared: Arc<Shared>,
    conn: usize,
}

fn tag_value<'a>(song: &'a Song, tag: &str) -> Option<&'a str> {
    match tag.to_ascii_lowercase().as_str() {
        "album" => song.album.as_deref(),
        "artist" => song.artist.as_deref(),
        "title" => song.title.as_deref(),
        _ => None,
    }
}

fn under_base(file: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    base.is_empty()
        || file == base
        || file
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl MpdSession for MemorySession {
    fn playlist_info(&mut self) -> Result<Vec<Song>> {
        let mut state = self.shared.lock();
        state.record("playlistinfo")?;
        Ok(state.queue.clone())
    }

    fn current_song(&mut self) -> Result<Option<Song>> {
        let mut state = self.shared.lock();
        state.record("currentsong")?;
        let Some(id) = state.current else {
            return Ok(None);
        };
        Ok(state.queue.iter().find(|s| s.id == id).cloned())
    }

    fn play_id(&mut self, id: u32) -> Result<()> {
        let mut state = self.shared.lock();
        state.record("playid")?;
        if !state.queue.iter().any(|s| s.id == id) {
            bail!("No such song: {id}");
        }
        state.current = Some(id);
        state.notify(Subsystem::Player);
        self.shared.changed.notify_all();
        Ok(())
    }

    fn move_id(&mut self, id: u32, pos: u32) -> Result<()> {
        let mut state = self.shared.lock();
        state.record("moveid")?;
        let Some(from) = state.queue.iter().position(|s| s.id == id) else {
            bail!("No such song: {id}");
        };
        let to = pos as usize;
        if to >= state.queue.len() {
            bail!("Bad song index: {pos}");
        }
        let song = state.queue.remove(from);
        state.queue.insert(to, song);
        state.renumber();
        Ok(())
    }

    fn find_add(&mut self, tag: &str, value: &str) -> Result<()> {
        let mut state = self.shared.lock();
        state.record("findadd")?;
        let matches: Vec<Song> = state
            .library
            .iter()
            .filter(|s| tag_value(s, tag) == Some(value))
            .cloned()
            .collect();
        for song in matches {
            state.append(song);
        }
        Ok(())
    }

    fn list(&mut self, tag: &str, base: Option<&str>) -> Result<Vec<String>> {
        let mut state = self.shared.lock();
        state.record("list")?;
        let mut values: Vec<String> = state
            .library
            .iter()
            .filter(|s| base.map_or(true, |b| under_base(&s.file, b)))
            .map(|s| tag_value(s, tag).unwrap_or_default().to_string())
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    fn idle(&mut self, subsystems: &[Subsystem]) -> Result<Vec<Subsystem>> {
        let mut state = self.shared.lock();
        state.record("idle")?;
        loop {
            if state.disconnected {
                bail!("Connection closed by server");
            }
            let pending = &mut state.pending[self.conn];
            let fired: Vec<Subsystem> = subsystems
                .iter()
                .copied()
                .filter(|s| pending.contains(s))
                .collect();
            if !fired.is_empty() {
                for subsystem in &fired {
                    pending.remove(subsystem);
                }
                return Ok(fired);
            }
            state = self
                .shared
                .changed
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    fn clear(&mut self) -> Result<()> {
        let mut state = self.shared.lock();
        state.record("clear")?;
        state.queue.clear();
        state.current = None;
        state.notify(Subsystem::Player);
        self.shared.changed.notify_all();
        Ok(())
    }
}
