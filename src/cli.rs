//! # Command-Line Interface Module
//!
//! Flag definitions for mpdrandom using Clap derive macros.
//!
//! With no action flag mpdrandom plays one random album and exits.
//!
//! ## Examples
//!
//! ```bash
//! mpdrandom                 # play a random album from the queue
//! mpdrandom -z              # shuffle album order in the queue
//! mpdrandom -d              # keep playing random albums, Enter skips
//! mpdrandom -d -l -c -b jazz
//! MPD_HOST=secret@music.local mpdrandom
//! ```

use crate::config::Settings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Pick and play a random album from the current MPD playlist.
///
/// Run with no arguments to play a random album other than the current one.
#[derive(Parser, Debug)]
#[command(name = "mpdrandom")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Run in daemon mode: start a new random album whenever playback stops.
    ///
    /// Press Enter to skip to another album, Ctrl-C to exit.
    #[arg(short, long)]
    pub daemon: bool,

    /// Use the whole library instead of the playlist.
    #[arg(short, long)]
    pub library: bool,

    /// Pick from the playlist even if the config file enables library mode.
    #[arg(long, conflicts_with = "library")]
    pub playlist: bool,

    /// Clear the queue before adding a library album (library mode).
    #[arg(short, long)]
    pub clear: bool,

    /// Keep the queue even if the config file enables clearing.
    #[arg(long, conflicts_with = "clear")]
    pub no_clear: bool,

    /// Shuffle the albums in the current playlist, then exit.
    #[arg(short = 'z', long, conflicts_with = "daemon")]
    pub shuffle: bool,

    /// MPD port (defaults to 6600)
    #[arg(short, long, env = "MPD_PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// MPD host (defaults to 127.0.0.1); `password@host` is accepted
    #[arg(short = 'u', long, env = "MPD_HOST", value_name = "HOST")]
    pub host: Option<String>,

    /// MPD password
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Only pick library albums under this music-directory path (library mode)
    #[arg(short, long, value_name = "PATH")]
    pub base: Option<String>,

    /// Read defaults from this JSON file instead of the platform config file
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// The one top-level thing a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PlayOnce,
    Shuffle,
    Daemon,
}

impl Args {
    pub fn action(&self) -> Action {
        if self.daemon {
            Action::Daemon
        } else if self.shuffle {
            Action::Shuffle
        } else {
            Action::PlayOnce
        }
    }

    /// Layer command-line values over `settings` loaded from the config file.
    pub fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(host) = &self.host {
            settings.set_host(host);
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(password) = &self.password {
            settings.password = Some(password.clone());
        }
        if self.library {
            settings.library = true;
        } else if self.playlist {
            settings.library = false;
        }
        if self.clear {
            settings.clear = true;
        } else if self.no_clear {
            settings.clear = false;
        }
        if let Some(base) = &self.base {
            settings.base = Some(base.clone());
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_default_action_plays_once() {
        let args = Args::try_parse_from(["mpdrandom"]).unwrap();
        assert_eq!(args.action(), Action::PlayOnce);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "mpdrandom", "-d", "-l", "-c", "-b", "jazz", "-u", "music.local", "-p", "6601",
        ])
        .unwrap();
        assert_eq!(args.action(), Action::Daemon);
        assert!(args.library && args.clear);
        assert_eq!(args.base.as_deref(), Some("jazz"));
        assert_eq!(args.host.as_deref(), Some("music.local"));
        assert_eq!(args.port, Some(6601));
    }

    #[test]
    fn test_shuffle_conflicts_with_daemon() {
        assert!(Args::try_parse_from(["mpdrandom", "-z", "-d"]).is_err());
        let args = Args::try_parse_from(["mpdrandom", "--shuffle"]).unwrap();
        assert_eq!(args.action(), Action::Shuffle);
    }

    #[test]
    fn test_flags_override_settings() {
        let file = Settings {
            host: "file.local".to_string(),
            port: 7000,
            base: Some("rock".to_string()),
            ..Settings::default()
        };
        let args = Args::try_parse_from([
            "mpdrandom", "--host", "pw@cli.local", "--library", "--base", "jazz",
        ])
        .unwrap();

        let settings = args.apply_to(file);
        assert_eq!(settings.host, "cli.local");
        assert_eq!(settings.password.as_deref(), Some("pw"));
        assert!(settings.library);
        assert_eq!(settings.base.as_deref(), Some("jazz"));
    }

    #[test]
    fn test_flags_switch_off_config_defaults() {
        let file = Settings {
            library: true,
            clear: true,
            ..Settings::default()
        };

        let args = Args::try_parse_from(["mpdrandom", "--playlist", "--no-clear"]).unwrap();
        let settings = args.apply_to(file.clone());
        assert!(!settings.library);
        assert!(!settings.clear);

        let args = Args::try_parse_from(["mpdrandom"]).unwrap();
        let settings = args.apply_to(file);
        assert!(settings.library && settings.clear);
    }

    #[test]
    fn test_playlist_conflicts_with_library() {
        assert!(Args::try_parse_from(["mpdrandom", "--playlist", "--library"]).is_err());
        assert!(Args::try_parse_from(["mpdrandom", "--no-clear", "-c"]).is_err());
    }
}
