//! # MPD Client Module
//!
//! [`MpdSession`] implementation backed by the `mpd` crate's TCP client.
//!
//! ## Command Mapping
//!
//! - `playlist_info` → `playlistinfo` ([`mpd::Client::queue`])
//! - `play_id` → `playid` ([`mpd::Client::switch`] with an [`Id`])
//! - `move_id` → `moveid` ([`mpd::Client::shift`] with an [`Id`])
//! - `find_add` → `findadd <tag> <value>`
//! - `list` → `list <tag> [base <path>]`
//! - `idle` → `idle <subsystems>` ([`mpd::Idle::wait`])
//!
//! Every command runs on the one connection owned by the client; open a
//! second client for anything that needs to block in `idle` concurrently.

use crate::config::ConnectionConfig;
use crate::session::{MpdSession, Song, Subsystem};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use mpd::song::Id;
use mpd::{Client, Idle, Query, Term};
use std::borrow::Cow;

/// A connection to an MPD server.
pub struct MpdClient {
    client: Client,
}

impl MpdClient {
    /// Connect to the configured server and authenticate when a password is set.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let address = config.address();
        debug!("Connecting to MPD at {address}");

        let mut client = Client::connect(address.as_str())
            .with_context(|| format!("Failed to connect to MPD at {address}"))?;

        if let Some(password) = &config.password {
            client
                .login(password)
                .with_context(|| format!("MPD at {address} rejected the password"))?;
        }

        info!("Connected to MPD at {address}");
        Ok(Self { client })
    }
}

/// Look up a tag case-insensitively; MPD reports `Album`, but not every
/// server build agrees on case.
fn find_tag(tags: &[(String, String)], key: &str) -> Option<String> {
    tags.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.clone())
}

fn convert_song(song: mpd::Song) -> Option<Song> {
    let Some(place) = song.place else {
        warn!("Ignoring song without a queue position: {}", song.file);
        return None;
    };
    let album = find_tag(&song.tags, "Album");
    let artist = song.artist.or_else(|| find_tag(&song.tags, "Artist"));
    Some(Song {
        id: place.id.0,
        pos: place.pos,
        file: song.file,
        title: song.title,
        album,
        artist,
    })
}

fn to_mpd_subsystem(subsystem: Subsystem) -> mpd::Subsystem {
    match subsystem {
        Subsystem::Player => mpd::Subsystem::Player,
    }
}

fn from_mpd_subsystem(subsystem: mpd::Subsystem) -> Option<Subsystem> {
    match subsystem {
        mpd::Subsystem::Player => Some(Subsystem::Player),
        _ => None,
    }
}

impl MpdSession for MpdClient {
    fn playlist_info(&mut self) -> Result<Vec<Song>> {
        let songs = self.client.queue().context("playlistinfo failed")?;
        Ok(songs.into_iter().filter_map(convert_song).collect())
    }

    fn current_song(&mut self) -> Result<Option<Song>> {
        let song = self.client.currentsong().context("currentsong failed")?;
        Ok(song.and_then(convert_song))
    }

    fn play_id(&mut self, id: u32) -> Result<()> {
        self.client
            .switch(Id(id))
            .with_context(|| format!("playid {id} failed"))
    }

    fn move_id(&mut self, id: u32, pos: u32) -> Result<()> {
        self.client
            .shift(Id(id), pos as usize)
            .with_context(|| format!("moveid {id} {pos} failed"))
    }

    fn find_add(&mut self, tag: &str, value: &str) -> Result<()> {
        let mut query = Query::new();
        query.and(Term::Tag(Cow::Borrowed(tag)), value);
        self.client
            .findadd(&query)
            .with_context(|| format!("findadd {tag} \"{value}\" failed"))
    }

    fn list(&mut self, tag: &str, base: Option<&str>) -> Result<Vec<String>> {
        let mut query = Query::new();
        if let Some(base) = base {
            query.and(Term::Base, base);
        }
        self.client
            .list(&Term::Tag(Cow::Borrowed(tag)), &query)
            .with_context(|| format!("list {tag} failed"))
    }

    fn idle(&mut self, subsystems: &[Subsystem]) -> Result<Vec<Subsystem>> {
        let wanted: Vec<mpd::Subsystem> = subsystems.iter().copied().map(to_mpd_subsystem).collect();
        let fired = self.client.wait(&wanted).context("idle failed")?;
        Ok(fired.into_iter().filter_map(from_mpd_subsystem).collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.client.clear().context("clear failed")
    }
}
