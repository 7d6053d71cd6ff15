//! # Playback Driver Module
//!
//! Starts a randomly chosen album, either from the current queue
//! ([`Source::Playlist`]) or from the whole library ([`Source::Library`]).
//!
//! ## Library Mode
//!
//! Library mode picks from every album name MPD knows about, not from the
//! queue, so the current album is not excluded. When the chosen album is not
//! queued yet it is appended with `findadd`, and the queue is read a second
//! time: MPD assigns song ids on insertion, so the ids needed for `playid`
//! only exist after the album has been added.

use crate::album::{group_albums, pick_random_album, Album};
use crate::session::MpdSession;
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

/// Where random albums are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Albums already in the queue
    #[default]
    Playlist,
    /// Every album in MPD's database
    Library,
}

/// How `play_random` chooses and queues an album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackMode {
    pub source: Source,
    /// Library mode: clear the queue before adding the chosen album
    pub clear: bool,
    /// Library mode: only pick albums under this music-directory path
    pub base: Option<String>,
}

impl PlaybackMode {
    pub fn playlist() -> Self {
        Self::default()
    }

    pub fn library(clear: bool, base: Option<String>) -> Self {
        Self {
            source: Source::Library,
            clear,
            base,
        }
    }
}

/// Result of a `play_random` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback started at the first song of the named album
    Played(String),
    /// No album other than the current one was available
    NothingToPlay,
}

/// Play the first song of `album`.
pub fn play_album<S: MpdSession + ?Sized>(session: &mut S, album: &Album) -> Result<()> {
    let song = album
        .first_song()
        .ok_or_else(|| anyhow!("Album '{}' has no songs", album.name))?;

    println!(
        "Playing album \"{} - {}\".",
        song.artist_or_placeholder(),
        song.album_or_placeholder()
    );
    info!("Starting album '{}' at song id {}", album.name, song.id);

    session
        .play_id(song.id)
        .with_context(|| format!("Failed to play song id {} ({})", song.id, song.file))
}

/// Play a random album according to `mode`.
pub fn play_random<S, R>(session: &mut S, mode: &PlaybackMode, rng: &mut R) -> Result<PlayOutcome>
where
    S: MpdSession + ?Sized,
    R: Rng + ?Sized,
{
    match mode.source {
        Source::Playlist => play_random_from_playlist(session, rng),
        Source::Library => play_random_from_library(session, mode, rng),
    }
}

fn play_random_from_playlist<S, R>(session: &mut S, rng: &mut R) -> Result<PlayOutcome>
where
    S: MpdSession + ?Sized,
    R: Rng + ?Sized,
{
    let albums = group_albums(session.playlist_info().context("Failed to read the queue")?);
    let current = session
        .current_song()
        .context("Failed to read the current song")?;
    // An untagged current song excludes nothing.
    let current_album = current.as_ref().and_then(|s| s.album.as_deref());

    let Some(name) = pick_random_album(&albums, current_album, rng) else {
        println!("Nothing to play.");
        info!("No album to switch to ({} albums queued)", albums.len());
        return Ok(PlayOutcome::NothingToPlay);
    };

    let album = albums
        .get(&name)
        .ok_or_else(|| anyhow!("Album '{name}' vanished from the index"))?;
    play_album(session, album)?;
    Ok(PlayOutcome::Played(name))
}

fn play_random_from_library<S, R>(
    session: &mut S,
    mode: &PlaybackMode,
    rng: &mut R,
) -> Result<PlayOutcome>
where
    S: MpdSession + ?Sized,
    R: Rng + ?Sized,
{
    if mode.clear {
        debug!("Clearing queue before adding a library album");
        session.clear().context("Failed to clear the queue")?;
    }

    // Untagged songs show up as an empty name and cannot be added by album.
    let names: Vec<String> = session
        .list("album", mode.base.as_deref())
        .context("Failed to list library albums")?
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect();
    debug!("Library has {} albums", names.len());

    let Some(name) = names.choose(rng).cloned() else {
        println!("Nothing to play.");
        info!("No albums found in the library (base: {:?})", mode.base);
        return Ok(PlayOutcome::NothingToPlay);
    };

    let queued = group_albums(session.playlist_info().context("Failed to read the queue")?);
    if !queued.contains(&name) {
        info!("Queueing library album '{name}'");
        session
            .find_add("album", &name)
            .with_context(|| format!("Failed to add album '{name}' to the queue"))?;
    }

    let queued = group_albums(session.playlist_info().context("Failed to read the queue")?);
    let album = queued
        .get(&name)
        .ok_or_else(|| anyhow!("Album '{name}' is not in the queue after adding it"))?;
    play_album(session, album)?;
    Ok(PlayOutcome::Played(name))
}
