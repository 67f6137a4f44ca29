//! Activity records: one scheduled block of the day.

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::error::ValidationError;

/// Whether the institution block is a school or a college day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstitutionKind {
    #[default]
    School,
    College,
}

/// Kind of a scheduled block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    WakeUp,
    Institution(InstitutionKind),
    Study,
    BreakRest,
    Meal,
    Tuition,
    ExtraClass,
    Exercise,
    FreeTime,
    Sleep,
    Game,
}

impl ActivityKind {
    /// Default display icon (an SF Symbols-style name). Presentation only.
    pub fn icon(self) -> &'static str {
        match self {
            ActivityKind::WakeUp => "sunrise.fill",
            ActivityKind::Institution(InstitutionKind::School) => "building.columns.fill",
            ActivityKind::Institution(InstitutionKind::College) => "graduationcap.fill",
            ActivityKind::Study => "book.fill",
            ActivityKind::BreakRest => "cup.and.saucer.fill",
            ActivityKind::Meal => "fork.knife",
            ActivityKind::Tuition => "person.2.fill",
            ActivityKind::ExtraClass => "music.note",
            ActivityKind::Exercise => "figure.walk",
            ActivityKind::FreeTime => "sparkles",
            ActivityKind::Sleep => "moon.zzz.fill",
            ActivityKind::Game => "puzzlepiece.fill",
        }
    }

    /// Default display color. Presentation only.
    pub fn color(self) -> &'static str {
        match self {
            ActivityKind::WakeUp => "#f59e0b",
            ActivityKind::Institution(_) => "#3b82f6",
            ActivityKind::Study => "#8b5cf6",
            ActivityKind::BreakRest => "#10b981",
            ActivityKind::Meal => "#f97316",
            ActivityKind::Tuition => "#6366f1",
            ActivityKind::ExtraClass => "#ec4899",
            ActivityKind::Exercise => "#22c55e",
            ActivityKind::FreeTime => "#14b8a6",
            ActivityKind::Sleep => "#1e3a8a",
            ActivityKind::Game => "#eab308",
        }
    }
}

/// Work/rest cycle parameters handed to the session engine when a study
/// block is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cycle_count: u32,
    pub work_minutes: u32,
    pub rest_minutes: u32,
}

impl SessionConfig {
    pub fn new(cycle_count: u32, work_minutes: u32, rest_minutes: u32) -> Self {
        Self {
            cycle_count,
            work_minutes,
            rest_minutes,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cycle_count == 0 {
            return Err(ValidationError::InvalidValue {
                field: "cycle_count".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.work_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "work_minutes".into(),
                message: "must be greater than 0".into(),
            });
        }
        Ok(())
    }

    /// Length of one work + rest pair.
    pub fn cycle_minutes(&self) -> u32 {
        self.work_minutes.saturating_add(self.rest_minutes)
    }

    /// Wall-clock footprint of the whole session.
    pub fn total_minutes(&self) -> u32 {
        self.cycle_count.saturating_mul(self.cycle_minutes())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(2, 25, 5)
    }
}

/// One scheduled unit of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub kind: ActivityKind,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub is_completed: bool,
    /// Present only on `Study` blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_config: Option<SessionConfig>,
}

impl Activity {
    /// Create a non-study activity with a fresh id.
    pub fn new(
        title: impl Into<String>,
        kind: ActivityKind,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            kind,
            start_time,
            end_time,
            is_completed: false,
            session_config: None,
        }
    }

    /// Create a study block carrying its session parameters.
    pub fn study(
        title: impl Into<String>,
        start_time: ClockTime,
        end_time: ClockTime,
        config: SessionConfig,
    ) -> Self {
        Self {
            session_config: Some(config),
            ..Self::new(title, ActivityKind::Study, start_time, end_time)
        }
    }

    /// The only block allowed to end "before" it starts.
    pub fn is_overnight(&self) -> bool {
        self.kind == ActivityKind::Sleep && self.end_time <= self.start_time
    }

    pub fn duration_minutes(&self) -> u32 {
        if self.is_overnight() {
            u32::from(self.start_time.wrapping_minutes_until(self.end_time))
        } else {
            self.start_time.minutes_until(self.end_time).max(0) as u32
        }
    }

    /// Same-day interval overlap. Overnight blocks never count.
    pub fn overlaps(&self, other: &Activity) -> bool {
        if self.is_overnight() || other.is_overnight() {
            return false;
        }
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    pub fn mark_completed(&mut self) {
        self.is_completed = true;
    }
}
