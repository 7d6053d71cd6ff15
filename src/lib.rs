//! Adds album-level randomness to MPD.
//!
//! Core modules:
//! - [`album`] - Grouping the queue into albums, random album choice
//! - [`playback`] - Playing a random album from the queue or the library
//! - [`queue`] - Moving and shuffling whole albums in the queue
//! - [`daemon`] - Idle-driven loop that rotates albums when playback stops
//! - [`session`] - The MPD command seam (plus an in-memory server with `test-util`)
//!
//! ### Supporting Modules
//!
//! - [`mpd_client`] - [`session::MpdSession`] over a real MPD connection
//! - [`config`] - Connection parameters and the optional config file
//! - [`cli`] - Command-line flags with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use mpdrandom::config::ConnectionConfig;
//! use mpdrandom::mpd_client::MpdClient;
//! use mpdrandom::playback::{play_random, PlaybackMode};
//! use mpdrandom::queue::shuffle_albums;
//!
//! let mut client = MpdClient::connect(&ConnectionConfig::default())?;
//! let mut rng = rand::thread_rng();
//!
//! // Rearrange the queue album by album, then start a random album
//! shuffle_albums(&mut client, &mut rng)?;
//! play_random(&mut client, &PlaybackMode::playlist(), &mut rng)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Testing Without a Server
//!
//! With the `test-util` feature, [`session`] also exposes an in-memory server.
//!
//! ```
//! use mpdrandom::playback::{play_random, PlayOutcome, PlaybackMode};
//! use mpdrandom::session::memory::{track, MemoryServer};
//! use rand::SeedableRng;
//!
//! let server = MemoryServer::new();
//! server.enqueue(track("a/1.flac", Some("A"), Some("Artist")));
//! let current = server.enqueue(track("b/1.flac", Some("B"), Some("Artist")));
//! server.set_current(Some(current));
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let outcome = play_random(&mut server.connect(), &PlaybackMode::playlist(), &mut rng)?;
//! assert_eq!(outcome, PlayOutcome::Played("A".to_string()));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Daemon Mode
//!
//! The daemon keeps two MPD connections: one blocks in `idle player`, the
//! other issues playback commands. See [`daemon`] for how the idle watcher,
//! the console watcher and the reactor share a single-slot trigger queue.
//!
//! ## Error Handling
//!
//! All public functions return `Result<T, anyhow::Error>`. Missing tags and
//! empty queues are not errors; lost connections are, and end the process.

pub mod album;
pub mod cli;
pub mod completion;
pub mod config;
pub mod daemon;
pub mod mpd_client;
pub mod playback;
pub mod queue;
pub mod session;
