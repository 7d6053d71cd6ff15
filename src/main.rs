//! # mpdrandom
//!
//! Picks a random album from the current MPD playlist (or the library) and
//! plays it, shuffles album order, or keeps rotating albums in daemon mode.
//!
//! ## Usage
//!
//! ```bash
//! mpdrandom            # play a random album other than the current one
//! mpdrandom --shuffle  # shuffle album order in the queue
//! mpdrandom --daemon   # rotate albums whenever playback stops
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use mpdrandom::cli::{self, Action};
use mpdrandom::config::{self, ConnectionConfig};
use mpdrandom::daemon::{AlbumDaemon, Control};
use mpdrandom::mpd_client::MpdClient;
use mpdrandom::playback::play_random;
use mpdrandom::{completion, queue};
use std::io::{self, BufReader};

/// Connect to MPD, explaining the usual causes when it fails.
fn connect(connection: &ConnectionConfig) -> Result<MpdClient> {
    MpdClient::connect(connection).map_err(|e| {
        eprintln!("Failed to connect to MPD at {}:", connection.address());
        eprintln!("  {e:#}");
        eprintln!();
        eprintln!("This error typically means:");
        eprintln!("  1. MPD is not running or not accessible");
        eprintln!("  2. The host or port is wrong (see --host/--port, MPD_HOST/MPD_PORT)");
        eprintln!("  3. MPD requires a password (see --password)");
        eprintln!();
        eprintln!("To fix this:");
        eprintln!("  1. Start MPD: systemctl --user start mpd");
        eprintln!("  2. Check MPD config: ~/.config/mpd/mpd.conf");
        e
    })
}

/// Main entry point for mpdrandom.
///
/// Initializes logging, resolves settings (flags, environment, config file)
/// and runs exactly one action.
///
/// # Logging
///
/// Controlled via `RUST_LOG`:
/// - `RUST_LOG=debug mpdrandom -d` - Show idle wakeups and trigger handling
/// - `RUST_LOG=mpdrandom::daemon=debug mpdrandom -d` - Daemon only
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    if let Some(shell) = &args.completions {
        let mut cmd = cli::Args::command();
        completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::get_config_path()?,
    };
    let settings = args.apply_to(config::load_settings(&config_path)?);
    let connection = settings.connection();
    let mode = settings.playback_mode();
    debug!("Playback mode: {mode:?}");

    let mut client = connect(&connection)?;
    let mut rng = rand::thread_rng();

    match args.action() {
        Action::PlayOnce => {
            play_random(&mut client, &mode, &mut rng)?;
        }
        Action::Shuffle => {
            let albums = queue::shuffle_albums(&mut client, &mut rng)?;
            info!("Shuffled {albums} albums");
        }
        Action::Daemon => {
            // The idle watcher blocks on its own connection.
            let idle_client = connect(&connection)?;

            let daemon = AlbumDaemon::new(client, mode, rng);
            let control = daemon.control();
            ctrlc::set_handler(move || {
                let _ = control.send(Control::Interrupted);
            })
            .context("Failed to install Ctrl-C handler")?;

            println!("Going into daemon mode, press Enter to skip an album, Ctrl-C to exit.");
            daemon.watch_idle(idle_client)?;
            daemon.watch_console(BufReader::new(io::stdin()))?;
            daemon.run()?;
        }
    }

    Ok(())
}
