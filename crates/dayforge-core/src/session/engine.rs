//! Timeboxed session engine.
//!
//! A tick-driven countdown state machine. It owns no thread and no timer:
//! the caller invokes `tick()` once per second (or as fast as it likes in
//! tests).
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> Running <-> Paused
//! Running -> Completed        (last phase of last cycle ran out)
//! NotStarted | Running | Paused -> Abandoned
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(PhasePlan::study(&config)?);
//! engine.start()?;
//! // Once per second:
//! if let Some(event) = engine.tick()? { /* phase changed or completed */ }
//! ```

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phases::{Phase, PhaseKind, PhasePlan, SessionMode};
use super::summary::{Reward, RewardPolicy, SessionSummary};
use crate::error::SessionError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    Completed,
    Abandoned,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Abandoned)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::NotStarted => "not started",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
            SessionState::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// Core session engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEngine {
    plan: PhasePlan,
    rewards: RewardPolicy,
    state: SessionState,
    /// 1-based.
    cycle_index: u32,
    phase_index: usize,
    seconds_remaining: u64,
    total_focused_secs: u64,
    elapsed_secs: u64,
    cycles_completed: u32,
    #[serde(default)]
    summary: Option<SessionSummary>,
}

impl SessionEngine {
    pub fn new(plan: PhasePlan) -> Self {
        Self::with_rewards(plan, RewardPolicy::default())
    }

    pub fn with_rewards(plan: PhasePlan, rewards: RewardPolicy) -> Self {
        let seconds_remaining = plan.phases().first().map(|p| p.duration_secs).unwrap_or(0);
        Self {
            plan,
            rewards,
            state: SessionState::NotStarted,
            cycle_index: 1,
            phase_index: 0,
            seconds_remaining,
            total_focused_secs: 0,
            elapsed_secs: 0,
            cycles_completed: 0,
            summary: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    pub fn cycle_index(&self) -> u32 {
        self.cycle_index
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn total_focused_secs(&self) -> u64 {
        self.total_focused_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        if self.state.is_terminal() {
            return None;
        }
        self.plan.phases().get(self.phase_index)
    }

    /// Set once the session reaches `Completed` or `Abandoned`.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// 0.0 .. 100.0 progress across all cycles.
    pub fn progress_pct(&self) -> f64 {
        let total = self.plan.total_secs();
        if total == 0 {
            return 0.0;
        }
        (self.elapsed_secs as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            phase: self.current_phase().map(|p| p.kind),
            cycle_index: self.cycle_index,
            seconds_remaining: self.seconds_remaining,
            total_focused_secs: self.total_focused_secs,
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Event, SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(self.invalid("start"));
        }
        let phase = *self.current_phase().ok_or_else(|| self.invalid("start"))?;
        self.state = SessionState::Running;
        tracing::debug!(mode = ?self.plan.mode(), cycles = self.plan.cycle_count(), "session started");
        Ok(Event::SessionStarted {
            mode: self.plan.mode(),
            phase: phase.kind,
            cycle_index: self.cycle_index,
            cycle_count: self.plan.cycle_count(),
            duration_secs: phase.duration_secs,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Ok(None)` while paused or mid-phase, `Ok(Some(PhaseChanged))`
    /// when a phase ran out, and `Ok(Some(SessionCompleted))` after the last one.
    pub fn tick(&mut self) -> Result<Option<Event>, SessionError> {
        match self.state {
            SessionState::Running => {}
            SessionState::Paused => return Ok(None),
            _ => return Err(self.invalid("tick")),
        }
        let kind = self.current_phase().map(|p| p.kind).ok_or_else(|| self.invalid("tick"))?;

        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        self.elapsed_secs += 1;
        if kind.is_focus() {
            self.total_focused_secs += 1;
        }

        if self.seconds_remaining > 0 {
            return Ok(None);
        }
        Ok(Some(self.advance()))
    }

    pub fn pause(&mut self) -> Result<Event, SessionError> {
        if self.state != SessionState::Running {
            return Err(self.invalid("pause"));
        }
        self.state = SessionState::Paused;
        Ok(Event::SessionPaused {
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Result<Event, SessionError> {
        if self.state != SessionState::Paused {
            return Err(self.invalid("resume"));
        }
        self.state = SessionState::Running;
        Ok(Event::SessionResumed {
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Stop early and report partial credit.
    pub fn abandon(&mut self) -> Result<SessionSummary, SessionError> {
        if self.state.is_terminal() {
            return Err(self.invalid("abandon"));
        }
        self.state = SessionState::Abandoned;
        let reward = match self.plan.mode() {
            SessionMode::Study => Reward::Xp(self.rewards.partial(self.total_focused_secs)),
            SessionMode::Breathing => Reward::WellnessMinutes(secs_to_minutes_floor(self.elapsed_secs)),
        };
        let summary = SessionSummary {
            mode: self.plan.mode(),
            cycles_completed: self.cycles_completed,
            total_work_minutes: secs_to_minutes_floor(self.total_focused_secs),
            total_focused_secs: self.total_focused_secs,
            elapsed_secs: self.elapsed_secs,
            reward,
            completed_fully: false,
        };
        tracing::info!(
            focused_secs = self.total_focused_secs,
            reward = summary.reward.amount(),
            "session abandoned"
        );
        self.summary = Some(summary);
        Ok(summary)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> Event {
        if self.phase_index + 1 < self.plan.phases().len() {
            self.phase_index += 1;
        } else {
            self.cycles_completed += 1;
            if self.cycle_index >= self.plan.cycle_count() {
                return self.complete();
            }
            self.cycle_index += 1;
            self.phase_index = 0;
        }

        let phase = self.plan.phases()[self.phase_index];
        self.seconds_remaining = phase.duration_secs;
        Event::PhaseChanged {
            phase: phase.kind,
            cycle_index: self.cycle_index,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    fn complete(&mut self) -> Event {
        self.state = SessionState::Completed;
        self.seconds_remaining = 0;
        let cycles = self.plan.cycle_count();
        let work_minutes =
            secs_to_minutes_floor(self.plan.work_secs_per_cycle().saturating_mul(u64::from(cycles)));
        let reward = match self.plan.mode() {
            SessionMode::Study => Reward::Xp(self.rewards.full(work_minutes)),
            SessionMode::Breathing => Reward::WellnessMinutes(secs_to_minutes_ceil(self.elapsed_secs)),
        };
        let summary = SessionSummary {
            mode: self.plan.mode(),
            cycles_completed: cycles,
            total_work_minutes: work_minutes,
            total_focused_secs: self.total_focused_secs,
            elapsed_secs: self.elapsed_secs,
            reward,
            completed_fully: true,
        };
        tracing::info!(cycles, reward = reward.amount(), "session completed");
        self.summary = Some(summary);
        Event::SessionCompleted {
            summary,
            at: Utc::now(),
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            action,
            state: self.state,
        }
    }
}

fn secs_to_minutes_floor(secs: u64) -> u32 {
    u32::try_from(secs / 60).unwrap_or(u32::MAX)
}

fn secs_to_minutes_ceil(secs: u64) -> u32 {
    u32::try_from(secs.div_ceil(60)).unwrap_or(u32::MAX)
}

/// Drive an engine to its natural end. Returns every event emitted.
pub fn run_to_completion(engine: &mut SessionEngine) -> Result<Vec<Event>, SessionError> {
    let mut events = Vec::new();
    if engine.state() == SessionState::NotStarted {
        events.push(engine.start()?);
    }
    while engine.state() == SessionState::Running {
        if let Some(event) = engine.tick()? {
            events.push(event);
        }
    }
    Ok(events)
}
