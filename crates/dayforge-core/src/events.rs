use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::planner::DailyPlan;
use crate::session::{PhaseKind, SessionMode, SessionState, SessionSummary};

/// Every state change in the system produces an Event.
/// The CLI prints them; collaborators (ledger, store, notifier) consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        mode: SessionMode,
        phase: PhaseKind,
        cycle_index: u32,
        cycle_count: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown ran out and the next phase began.
    PhaseChanged {
        phase: PhaseKind,
        cycle_index: u32,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        phase: Option<PhaseKind>,
        cycle_index: u32,
        seconds_remaining: u64,
        total_focused_secs: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
    PlanGenerated {
        date: NaiveDate,
        activity_count: usize,
        study_blocks: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn plan_generated(plan: &DailyPlan) -> Self {
        Event::PlanGenerated {
            date: plan.date,
            activity_count: plan.activities.len(),
            study_blocks: plan.study_blocks().count(),
            at: Utc::now(),
        }
    }
}
