//! Planner inputs: the user's profile and the generator's tuning knobs.
//!
//! Both live in `config.toml` under `[profile]` and `[planner]`.

use serde::{Deserialize, Serialize};

use crate::activity::{InstitutionKind, SessionConfig};
use crate::clock::ClockTime;

/// An anchor that may be switched off (tuition, extra class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalBlock {
    #[serde(default)]
    pub enabled: bool,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl OptionalBlock {
    pub fn disabled(start: ClockTime, end: ClockTime) -> Self {
        Self {
            enabled: false,
            start,
            end,
        }
    }

    pub fn enabled(start: ClockTime, end: ClockTime) -> Self {
        Self {
            enabled: true,
            start,
            end,
        }
    }

    /// The range, if switched on.
    pub fn active(&self) -> Option<(ClockTime, ClockTime)> {
        self.enabled.then_some((self.start, self.end))
    }
}

/// Work/rest recommendation derived from the student's age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyRecommendation {
    pub work_minutes: u32,
    pub rest_minutes: u32,
    pub cycle_count: u32,
}

impl StudyRecommendation {
    pub const DEFAULT_CYCLES: u32 = 2;

    pub fn for_age(age: u8) -> Self {
        let (work_minutes, rest_minutes) = match age {
            0..=9 => (15, 5),
            10..=13 => (20, 5),
            _ => (25, 5),
        };
        Self {
            work_minutes,
            rest_minutes,
            cycle_count: Self::DEFAULT_CYCLES,
        }
    }
}

/// Everything the user told us about their day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub institution: InstitutionKind,
    #[serde(default = "default_institution_start")]
    pub institution_start: ClockTime,
    #[serde(default = "default_institution_end")]
    pub institution_end: ClockTime,
    #[serde(default = "default_tuition")]
    pub tuition: OptionalBlock,
    #[serde(default = "default_extra_class")]
    pub extra_class: OptionalBlock,
    #[serde(default = "default_breakfast")]
    pub breakfast: ClockTime,
    #[serde(default = "default_lunch")]
    pub lunch: ClockTime,
    #[serde(default = "default_dinner")]
    pub dinner: ClockTime,
    /// Ordered; only the first few make it into the day.
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub age: Option<u8>,
    /// Explicit study rhythm. Unset fields follow the age recommendation.
    #[serde(default)]
    pub work_minutes: Option<u32>,
    #[serde(default)]
    pub rest_minutes: Option<u32>,
    #[serde(default)]
    pub cycle_count: Option<u32>,
}

fn default_institution_start() -> ClockTime {
    ClockTime::new(8, 0)
}
fn default_institution_end() -> ClockTime {
    ClockTime::new(14, 30)
}
fn default_tuition() -> OptionalBlock {
    OptionalBlock::disabled(ClockTime::new(16, 0), ClockTime::new(17, 30))
}
fn default_extra_class() -> OptionalBlock {
    OptionalBlock::disabled(ClockTime::new(18, 0), ClockTime::new(19, 0))
}
fn default_breakfast() -> ClockTime {
    ClockTime::new(6, 30)
}
fn default_lunch() -> ClockTime {
    ClockTime::new(15, 0)
}
fn default_dinner() -> ClockTime {
    ClockTime::new(20, 0)
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            institution: InstitutionKind::default(),
            institution_start: default_institution_start(),
            institution_end: default_institution_end(),
            tuition: default_tuition(),
            extra_class: default_extra_class(),
            breakfast: default_breakfast(),
            lunch: default_lunch(),
            dinner: default_dinner(),
            subjects: Vec::new(),
            age: None,
            work_minutes: None,
            rest_minutes: None,
            cycle_count: None,
        }
    }
}

impl ProfileConfig {
    /// Assumed when the profile leaves `age` unset.
    pub const DEFAULT_AGE: u8 = 15;

    /// Default profile for a student of `age`, rhythm left to the recommendation.
    pub fn for_age(age: u8) -> Self {
        Self {
            age: Some(age),
            ..Self::default()
        }
    }

    pub fn recommendation(&self) -> StudyRecommendation {
        StudyRecommendation::for_age(self.age.unwrap_or(Self::DEFAULT_AGE))
    }

    /// Session parameters attached to every subject block.
    pub fn session_config(&self) -> SessionConfig {
        let rec = self.recommendation();
        SessionConfig::new(
            self.cycle_count.unwrap_or(rec.cycle_count).max(1),
            self.work_minutes.unwrap_or(rec.work_minutes).max(1),
            self.rest_minutes.unwrap_or(rec.rest_minutes),
        )
    }
}

/// What a 5-29 minute gap becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShortGapPolicy {
    /// A free-time rest block.
    #[default]
    Rest,
    /// A suggested 5-minute mind game.
    MindGame,
}

/// Generator constants. Defaults reproduce the reference day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerSettings {
    #[serde(default = "default_day_start")]
    pub day_start: ClockTime,
    #[serde(default = "default_day_end")]
    pub day_end: ClockTime,
    #[serde(default = "default_day_end")]
    pub sleep_start: ClockTime,
    #[serde(default = "default_day_start")]
    pub sleep_end: ClockTime,
    #[serde(default = "default_30")]
    pub wake_minutes: u32,
    #[serde(default = "default_30")]
    pub prep_buffer_minutes: u32,
    #[serde(default = "default_30")]
    pub post_institution_rest_minutes: u32,
    #[serde(default = "default_30")]
    pub meal_minutes: u32,
    #[serde(default = "default_15")]
    pub tuition_study_pad_minutes: u32,
    #[serde(default = "default_30")]
    pub lunch_study_pad_minutes: u32,
    /// No new subject session starts at or after this time.
    #[serde(default = "default_study_cutoff")]
    pub study_cutoff: ClockTime,
    #[serde(default = "default_max_subjects")]
    pub max_subjects: usize,
    #[serde(default)]
    pub short_gap_policy: ShortGapPolicy,
}

fn default_day_start() -> ClockTime {
    ClockTime::new(6, 0)
}
fn default_day_end() -> ClockTime {
    ClockTime::new(22, 0)
}
fn default_study_cutoff() -> ClockTime {
    ClockTime::new(21, 0)
}
fn default_30() -> u32 {
    30
}
fn default_15() -> u32 {
    15
}
fn default_max_subjects() -> usize {
    3
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            day_start: default_day_start(),
            day_end: default_day_end(),
            sleep_start: default_day_end(),
            sleep_end: default_day_start(),
            wake_minutes: 30,
            prep_buffer_minutes: 30,
            post_institution_rest_minutes: 30,
            meal_minutes: 30,
            tuition_study_pad_minutes: 15,
            lunch_study_pad_minutes: 30,
            study_cutoff: default_study_cutoff(),
            max_subjects: default_max_subjects(),
            short_gap_policy: ShortGapPolicy::default(),
        }
    }
}
