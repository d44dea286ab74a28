// Round lifecycle: the state machine every game screen runs.
//
// Loading -> Ready -> Finished -> (restart) -> Ready. A failed load parks the
// machine in LoadFailed until candidates are supplied again. Each method takes
// `&mut self`, so a second operation cannot start while a selection is still
// awaiting asset resolution.

use std::fmt;

use serde::Serialize;
use tokio::time::Instant;

use super::candidate::{CandidateSource, Mode};
use super::clock::{ClockEvent, ClockState, SessionClock};
use super::config::ADVANCE_DELAY;
use super::evaluator::{evaluate, GuessResult};
use super::ledger::ScoreLedger;
use super::selector::{Round, RoundSelector};
use crate::error::GameError;
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Waiting for the candidate list.
    Loading,
    /// No candidate could be shown. Stays here until candidates are reloaded.
    LoadFailed,
    /// A round is active; the clock is idle or ticking.
    Ready,
    /// The clock expired; only restart is accepted.
    Finished,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Loading => "loading",
            LifecycleState::LoadFailed => "load failed",
            LifecycleState::Ready => "ready",
            LifecycleState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Session phase as the player sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    Running,
    Over,
}

impl From<ClockState> for SessionPhase {
    fn from(state: ClockState) -> Self {
        match state {
            ClockState::Idle => SessionPhase::NotStarted,
            ClockState::Ticking => SessionPhase::Running,
            ClockState::Expired => SessionPhase::Over,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub time_remaining_seconds: u32,
    pub running_score: u32,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleSnapshot {
    pub mode: Mode,
    pub state: LifecycleState,
    pub round: Option<Round>,
    pub session: SessionState,
    pub last_result: Option<GuessResult>,
    pub high_scores: Vec<u32>,
    pub advance_pending: bool,
}

pub struct RoundLifecycle {
    mode: Mode,
    session_seconds: u32,
    source: Option<CandidateSource>,
    selector: RoundSelector,
    clock: SessionClock,
    ledger: ScoreLedger,
    state: LifecycleState,
    round: Option<Round>,
    last_result: Option<GuessResult>,
    advance_at: Option<Instant>,
}

impl RoundLifecycle {
    pub fn new(selector: RoundSelector, session_seconds: u32) -> Self {
        Self {
            mode: selector.mode(),
            session_seconds,
            source: None,
            selector,
            clock: SessionClock::new(session_seconds),
            ledger: ScoreLedger::new(),
            state: LifecycleState::Loading,
            round: None,
            last_result: None,
            advance_at: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn last_result(&self) -> Option<GuessResult> {
        self.last_result
    }

    /// Deadline of the pending post-answer advance, if one is scheduled.
    pub fn advance_due(&self) -> Option<Instant> {
        self.advance_at
    }

    pub fn session(&self) -> SessionState {
        SessionState {
            phase: self.clock.state().into(),
            time_remaining_seconds: self.clock.time_remaining(),
            running_score: self.ledger.running_score(),
        }
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            mode: self.mode,
            state: self.state,
            round: self.round.clone(),
            session: self.session(),
            last_result: self.last_result,
            high_scores: self.ledger.high_scores().entries().to_vec(),
            advance_pending: self.advance_at.is_some(),
        }
    }

    fn reject(&self, op: &'static str) -> GameError {
        tracing::debug!(op, state = %self.state, "Rejected lifecycle operation");
        GameError::InvalidTransition {
            op,
            state: self.state,
        }
    }

    /// Loading (or LoadFailed) -> Ready with the first round.
    pub async fn on_candidates_loaded(&mut self, source: CandidateSource) -> Result<(), GameError> {
        if !matches!(
            self.state,
            LifecycleState::Loading | LifecycleState::LoadFailed
        ) {
            return Err(self.reject("load candidates"));
        }
        tracing::info!(mode = %self.mode, candidates = source.len(), "Candidates loaded");
        self.source = Some(source);
        self.next_round().await
    }

    /// Score a guess against the current round. The first guess of a session
    /// starts the clock.
    pub fn on_guess_submitted(&mut self, text: &str) -> Result<GuessResult, GameError> {
        if self.state != LifecycleState::Ready {
            return Err(self.reject("guess"));
        }
        if self.advance_at.is_some() {
            // Already answered; the next round is on its way.
            return Err(self.reject("guess"));
        }
        let Some(round) = self.round.as_ref() else {
            return Err(self.reject("guess"));
        };

        if self.clock.start() {
            tracing::info!(
                mode = %self.mode,
                seconds = self.clock.time_remaining(),
                "Session started"
            );
        }

        let result = evaluate(self.mode, text, &round.candidate.name);
        let verdict = if result.correct { "correct" } else { "incorrect" };
        metrics::GUESSES_TOTAL
            .with_label_values(&[self.mode.as_str(), verdict])
            .inc();

        if result.correct {
            self.ledger.add_points(result.points_awarded);
            self.advance_at = Some(Instant::now() + ADVANCE_DELAY);
            tracing::debug!(
                points = result.points_awarded,
                score = self.ledger.running_score(),
                "Correct guess"
            );
        }
        self.last_result = Some(result);
        Ok(result)
    }

    /// Drop the current round and draw a new one. No scoring effect.
    pub async fn on_skip(&mut self) -> Result<(), GameError> {
        if self.state != LifecycleState::Ready {
            return Err(self.reject("skip"));
        }
        self.next_round().await
    }

    /// Feed one elapsed second. Expiry finishes the session.
    pub fn on_tick(&mut self) -> ClockEvent {
        if self.state != LifecycleState::Ready {
            return ClockEvent::Ignored;
        }
        let event = self.clock.tick();
        if event == ClockEvent::Expired {
            // State is Ready, so this cannot be rejected.
            let _ = self.on_clock_expired();
        }
        event
    }

    /// Ready -> Finished once the clock has run out. Records the score
    /// exactly once per session.
    pub fn on_clock_expired(&mut self) -> Result<(), GameError> {
        if self.state != LifecycleState::Ready || self.clock.state() != ClockState::Expired {
            return Err(self.reject("expire"));
        }
        self.state = LifecycleState::Finished;
        self.advance_at = None;
        self.ledger.finalize_session();

        let score = self.ledger.running_score();
        metrics::SESSIONS_FINISHED_TOTAL
            .with_label_values(&[self.mode.as_str()])
            .inc();
        metrics::SESSION_SCORE
            .with_label_values(&[self.mode.as_str()])
            .observe(score as f64);
        tracing::info!(mode = %self.mode, score, "Session over");
        Ok(())
    }

    /// Run the deferred advance scheduled by a correct guess.
    pub async fn on_advance_due(&mut self) -> Result<(), GameError> {
        if self.state != LifecycleState::Ready || self.advance_at.is_none() {
            return Err(self.reject("advance"));
        }
        self.next_round().await
    }

    /// Finished -> Ready with a zeroed score, a fresh clock and a new round.
    pub async fn on_restart(&mut self) -> Result<(), GameError> {
        if self.state != LifecycleState::Finished {
            return Err(self.reject("restart"));
        }
        self.ledger.reset();
        self.clock.reset(self.session_seconds);
        self.last_result = None;
        self.next_round().await
    }

    async fn next_round(&mut self) -> Result<(), GameError> {
        self.advance_at = None;
        self.last_result = None;
        let Some(source) = self.source.as_ref() else {
            return Err(self.reject("select round"));
        };

        match self.selector.select_round(source).await {
            Ok(round) => {
                self.round = Some(round);
                self.state = LifecycleState::Ready;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(mode = %self.mode, "No playable candidates left");
                // The interrupted session is abandoned, not recorded.
                self.round = None;
                self.ledger.reset();
                self.clock.reset(self.session_seconds);
                self.state = LifecycleState::LoadFailed;
                Err(err)
            }
        }
    }
}
