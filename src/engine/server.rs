// Game server: owns one RoundLifecycle on a tokio task, drives the session
// clock and the deferred round advance, and publishes snapshots to watchers.

use std::future::pending;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};

use super::candidate::CandidateSource;
use super::clock::ClockEvent;
use super::config::TICK_INTERVAL;
use super::evaluator::GuessResult;
use super::lifecycle::{LifecycleSnapshot, RoundLifecycle};
use crate::error::GameError;

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Requests processed one at a time by the server loop. A request that
/// arrives while a round is being selected waits in the channel.
enum Command {
    Guess { text: String, reply: Reply<GuessResult> },
    Skip { reply: Reply<()> },
    Restart { reply: Reply<()> },
    Reload {
        source: CandidateSource,
        reply: Reply<()>,
    },
    Shutdown,
}

/// Handle to a running game. Dropping it stops the loop, the session clock and
/// any pending advance.
pub struct GameServer {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<LifecycleSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl GameServer {
    /// Start the loop. The first round is selected from `source` before any
    /// command is served.
    pub fn spawn(lifecycle: RoundLifecycle, source: CandidateSource) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (snap_tx, snap_rx) = watch::channel(lifecycle.snapshot());

        let worker = Worker {
            lifecycle,
            commands: cmd_rx,
            snapshots: snap_tx,
            ticker: None,
        };
        let task = tokio::spawn(worker.run(source));

        Self {
            commands: cmd_tx,
            snapshots: snap_rx,
            task: Some(task),
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> LifecycleSnapshot {
        self.snapshots.borrow().clone()
    }

    pub async fn guess(&self, text: impl Into<String>) -> Result<GuessResult, GameError> {
        let text = text.into();
        self.request(|reply| Command::Guess { text, reply }).await
    }

    pub async fn skip(&self) -> Result<(), GameError> {
        self.request(|reply| Command::Skip { reply }).await
    }

    pub async fn restart(&self) -> Result<(), GameError> {
        self.request(|reply| Command::Restart { reply }).await
    }

    /// Supply a new candidate list after a failed load.
    pub async fn reload(&self, source: CandidateSource) -> Result<(), GameError> {
        self.request(|reply| Command::Reload { source, reply }).await
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, GameError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| GameError::ServerClosed)?;
        rx.await.map_err(|_| GameError::ServerClosed)?
    }
}

impl Drop for GameServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Worker {
    lifecycle: RoundLifecycle,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<LifecycleSnapshot>,
    /// Present only while the session clock is ticking.
    ticker: Option<Interval>,
}

impl Worker {
    async fn run(mut self, source: CandidateSource) {
        if let Err(e) = self.lifecycle.on_candidates_loaded(source).await {
            tracing::warn!("Initial round selection failed: {e}");
        }
        self.publish();

        loop {
            self.sync_ticker();
            let advance_due = self.lifecycle.advance_due();

            // Ticks win over the deferred advance so that expiry at the same
            // instant cancels it.
            tokio::select! {
                biased;
                _ = next_tick(&mut self.ticker) => {
                    if self.lifecycle.on_tick() == ClockEvent::Expired {
                        self.ticker = None;
                    }
                }
                _ = wait_until(advance_due) => {
                    if let Err(e) = self.lifecycle.on_advance_due().await {
                        tracing::debug!("Deferred advance dropped: {e}");
                    }
                }
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd).await,
                },
            }
            self.publish();
        }

        tracing::info!(mode = %self.lifecycle.mode(), "Game server stopped");
    }

    async fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Guess { text, reply } => {
                let result = self.lifecycle.on_guess_submitted(&text);
                self.respond(reply, result);
            }
            Command::Skip { reply } => {
                let result = self.lifecycle.on_skip().await;
                self.respond(reply, result);
            }
            Command::Restart { reply } => {
                let result = self.lifecycle.on_restart().await;
                self.respond(reply, result);
            }
            Command::Reload { source, reply } => {
                let result = self.lifecycle.on_candidates_loaded(source).await;
                self.respond(reply, result);
            }
            Command::Shutdown => {}
        }
    }

    /// Publish before replying so callers observe the new state on return.
    fn respond<T>(&mut self, reply: Reply<T>, result: Result<T, GameError>) {
        self.sync_ticker();
        self.publish();
        let _ = reply.send(result);
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.lifecycle.snapshot());
    }

    fn sync_ticker(&mut self) {
        let ticking = self.lifecycle.clock().is_ticking();
        if ticking && self.ticker.is_none() {
            let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            // Seconds lost while a selection was in flight are replayed.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            self.ticker = Some(ticker);
        } else if !ticking {
            self.ticker = None;
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
