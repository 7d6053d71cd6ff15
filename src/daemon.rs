//! # Album Rotation Daemon
//!
//! This module keeps MPD playing random albums. It reacts to two events:
//!
//! - **Album finished**: nothing is current any more, i.e. playback ran off
//!   the end of the queue.
//! - **Skip requested**: the user pressed Enter on the console.
//!
//! ## Architecture
//!
//! ```text
//!  idle watcher (own MPD connection) ──┐
//!                                      ├──> trigger slot (capacity 1) ──> reactor (command connection)
//!  console watcher (stdin lines) ──────┘                                     │
//!  Ctrl-C handler / watcher failure ──────> control channel ─────────────────┘
//! ```
//!
//! MPD serializes commands per connection, so the idle watcher blocks in
//! `idle player` on a connection of its own while the reactor issues every
//! playback command on another one. Standard input cannot be multiplexed with
//! a socket read, so the console watcher is a plain detached thread.
//!
//! ## No Missed Wakeups
//!
//! The idle watcher checks `currentsong` *before* every `idle`. If playback
//! already stopped it posts a trigger straight away. MPD records changes that
//! happen while a connection is not idling and reports them on the next
//! `idle`, so a stop that lands between the check and the wait still wakes the
//! watcher.
//!
//! Pause, resume and seek also fire `player` events. Those wakeups re-check
//! the current song and go back to waiting; only an empty `currentsong`
//! rotates the album.
//!
//! ## Backpressure
//!
//! The trigger slot holds one trigger from `post` until the reactor calls
//! `ack` after it finished reacting. Producers never block: a trigger posted
//! while the slot is occupied is dropped, so a burst of Enter presses during a
//! reaction causes exactly one album change.

use crate::playback::{play_random, PlayOutcome, PlaybackMode};
use crate::session::{MpdSession, Subsystem};
use anyhow::{bail, Context, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use rand::Rng;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Why the reactor should pick a new album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Nothing is playing any more
    AlbumFinished,
    /// The user asked to skip to another album
    SkipRequested,
}

/// Out-of-band messages that end the daemon loop.
#[derive(Debug)]
pub enum Control {
    /// Ctrl-C; a normal exit
    Interrupted,
    /// The idle watcher hit a protocol or connection error
    WatcherFailed(anyhow::Error),
}

/// Producer half of the trigger slot.
#[derive(Debug, Clone)]
pub struct TriggerSender {
    tx: Sender<Trigger>,
    in_flight: Arc<AtomicBool>,
}

impl TriggerSender {
    /// Offer a trigger without blocking. Returns `false` if it was dropped
    /// because another trigger is still pending or being handled.
    pub fn post(&self, trigger: Trigger) -> bool {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Dropping {trigger:?}: a reaction is already pending");
            return false;
        }
        match self.tx.try_send(trigger) {
            Ok(()) => true,
            Err(e) => {
                self.in_flight.store(false, Ordering::Release);
                warn!("Could not post {trigger:?}: {e}");
                false
            }
        }
    }
}

/// Consumer half of the trigger slot.
#[derive(Debug)]
pub struct TriggerReceiver {
    rx: Receiver<Trigger>,
    in_flight: Arc<AtomicBool>,
}

impl TriggerReceiver {
    /// Wait up to `timeout` for a trigger. The slot stays occupied until
    /// [`TriggerReceiver::ack`].
    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Trigger> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Mark the received trigger as handled, freeing the slot.
    pub fn ack(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Create a single-slot trigger queue.
pub fn trigger_slot() -> (TriggerSender, TriggerReceiver) {
    let (tx, rx) = bounded(1);
    let in_flight = Arc::new(AtomicBool::new(false));
    (
        TriggerSender {
            tx,
            in_flight: Arc::clone(&in_flight),
        },
        TriggerReceiver { rx, in_flight },
    )
}

/// Watches the player subsystem on a dedicated connection.
pub struct IdleWatcher<S> {
    session: S,
    triggers: TriggerSender,
}

impl<S: MpdSession> IdleWatcher<S> {
    pub fn new(session: S, triggers: TriggerSender) -> Self {
        Self { session, triggers }
    }

    /// Inspect the current song. Returns a trigger when nothing is current.
    pub fn check(&mut self) -> Result<Option<Trigger>> {
        let current = self
            .session
            .current_song()
            .context("Failed to read the current song")?;
        match current {
            Some(song) => {
                debug!("Still playing '{}' (id {})", song.album_name(), song.id);
                Ok(None)
            }
            None => Ok(Some(Trigger::AlbumFinished)),
        }
    }

    /// Check, post if playback stopped, then block until the next player event.
    pub fn step(&mut self) -> Result<()> {
        if let Some(trigger) = self.check()? {
            info!("Playback stopped, requesting a new album");
            self.triggers.post(trigger);
        }
        let fired = self
            .session
            .idle(&[Subsystem::Player])
            .context("Idle wait for player events failed")?;
        debug!("Woke up on {fired:?}");
        Ok(())
    }

    /// Loop until the connection fails.
    pub fn run(mut self) -> Result<()> {
        loop {
            self.step()?;
        }
    }
}

/// Run `watcher` on its own thread. Errors are forwarded to `control`.
pub fn spawn_idle_watcher<S>(watcher: IdleWatcher<S>, control: Sender<Control>) -> Result<JoinHandle<()>>
where
    S: MpdSession + Send + 'static,
{
    thread::Builder::new()
        .name("idle-watcher".to_string())
        .spawn(move || {
            if let Err(e) = watcher.run() {
                error!("Idle watcher stopped: {e:#}");
                let _ = control.send(Control::WatcherFailed(e));
            }
        })
        .context("Failed to spawn idle watcher thread")
}

/// Post [`Trigger::SkipRequested`] for every line read from `reader`.
///
/// The thread is detached in practice: nothing joins it, and it does not keep
/// the process alive while blocked on a read.
pub fn spawn_console_watcher<B>(reader: B, triggers: TriggerSender) -> Result<JoinHandle<()>>
where
    B: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("console-watcher".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(_) => {
                        if triggers.post(Trigger::SkipRequested) {
                            info!("Skip requested from console");
                        }
                    }
                    Err(e) => {
                        warn!("Stopped reading console input: {e}");
                        return;
                    }
                }
            }
            debug!("Console input closed");
        })
        .context("Failed to spawn console watcher thread")
}

/// Handles triggers on the command connection, one at a time.
pub struct Reactor<S, R> {
    session: S,
    mode: PlaybackMode,
    rng: R,
}

impl<S: MpdSession, R: Rng> Reactor<S, R> {
    pub fn new(session: S, mode: PlaybackMode, rng: R) -> Self {
        Self { session, mode, rng }
    }

    /// Play a new random album in response to `trigger`.
    pub fn react(&mut self, trigger: Trigger) -> Result<PlayOutcome> {
        info!("Reacting to {trigger:?}");
        play_random(&mut self.session, &self.mode, &mut self.rng)
    }

    /// Serve triggers until interrupted or a watcher fails.
    pub fn run(&mut self, triggers: &TriggerReceiver, control: &Receiver<Control>) -> Result<()> {
        loop {
            select! {
                recv(triggers.rx) -> msg => {
                    let trigger = msg.context("Trigger channel closed")?;
                    let outcome = self.react(trigger);
                    triggers.ack();
                    let outcome = outcome?;
                    debug!("Reaction finished: {outcome:?}");
                }
                recv(control) -> msg => match msg {
                    Ok(Control::Interrupted) => {
                        info!("Interrupted, leaving daemon mode");
                        return Ok(());
                    }
                    Ok(Control::WatcherFailed(e)) => return Err(e.context("Lost the MPD idle connection")),
                    Err(_) => bail!("Control channel closed"),
                },
            }
        }
    }
}

/// Daemon mode: a reactor plus the channels its watchers feed.
pub struct AlbumDaemon<S, R> {
    reactor: Reactor<S, R>,
    trigger_tx: TriggerSender,
    trigger_rx: TriggerReceiver,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
}

impl<S: MpdSession, R: Rng> AlbumDaemon<S, R> {
    /// `session` is the command connection; watchers need their own.
    pub fn new(session: S, mode: PlaybackMode, rng: R) -> Self {
        let (trigger_tx, trigger_rx) = trigger_slot();
        let (control_tx, control_rx) = unbounded();
        Self {
            reactor: Reactor::new(session, mode, rng),
            trigger_tx,
            trigger_rx,
            control_tx,
            control_rx,
        }
    }

    /// Sender for out-of-band control, e.g. from a Ctrl-C handler.
    pub fn control(&self) -> Sender<Control> {
        self.control_tx.clone()
    }

    pub fn triggers(&self) -> TriggerSender {
        self.trigger_tx.clone()
    }

    /// Start an idle watcher on `session`, a connection distinct from the
    /// command connection.
    pub fn watch_idle<W>(&self, session: W) -> Result<JoinHandle<()>>
    where
        W: MpdSession + Send + 'static,
    {
        let watcher = IdleWatcher::new(session, self.triggers());
        spawn_idle_watcher(watcher, self.control())
    }

    /// Start a console watcher on `reader`.
    pub fn watch_console<B>(&self, reader: B) -> Result<JoinHandle<()>>
    where
        B: BufRead + Send + 'static,
    {
        spawn_console_watcher(reader, self.triggers())
    }

    /// Block serving triggers. Returns `Ok(())` on [`Control::Interrupted`].
    pub fn run(mut self) -> Result<()> {
        self.reactor.run(&self.trigger_rx, &self.control_rx)
    }
}
