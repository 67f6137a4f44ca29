use serde::{Deserialize, Serialize};

use crate::activity::{Activity, SessionConfig};
use crate::error::ValidationError;

/// Countdown mode within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Work,
    Rest,
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl PhaseKind {
    /// Only work seconds count towards focused time.
    pub fn is_focus(self) -> bool {
        self == PhaseKind::Work
    }

    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Work => "Focus",
            PhaseKind::Rest => "Rest",
            PhaseKind::Inhale => "Breathe in",
            PhaseKind::HoldIn => "Hold",
            PhaseKind::Exhale => "Breathe out",
            PhaseKind::HoldOut => "Hold empty",
        }
    }
}

/// What the session is for; decides the completion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Study,
    Breathing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration_secs: u64,
}

/// Guided breathing pattern, durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingConfig {
    pub inhale_secs: u64,
    pub hold_in_secs: u64,
    pub exhale_secs: u64,
    pub hold_out_secs: u64,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_rounds() -> u32 {
    1
}

impl Default for BreathingConfig {
    /// Box breathing.
    fn default() -> Self {
        Self {
            inhale_secs: 4,
            hold_in_secs: 4,
            exhale_secs: 4,
            hold_out_secs: 4,
            rounds: default_rounds(),
        }
    }
}

/// The phase sequence of one cycle, repeated `cycle_count` times.
///
/// Zero-length phases are dropped at construction, so the engine never
/// visits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    mode: SessionMode,
    phases: Vec<Phase>,
    cycle_count: u32,
}

impl PhasePlan {
    fn new(mode: SessionMode, phases: Vec<Phase>, cycle_count: u32) -> Result<Self, ValidationError> {
        if cycle_count == 0 {
            return Err(ValidationError::InvalidValue {
                field: "cycle_count".into(),
                message: "must be at least 1".into(),
            });
        }
        let phases: Vec<Phase> = phases.into_iter().filter(|p| p.duration_secs > 0).collect();
        if phases.is_empty() {
            return Err(ValidationError::EmptySession);
        }
        Ok(Self {
            mode,
            phases,
            cycle_count,
        })
    }

    /// Work/rest cycles for a study block.
    pub fn study(config: &SessionConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Self::new(
            SessionMode::Study,
            vec![
                Phase {
                    kind: PhaseKind::Work,
                    duration_secs: u64::from(config.work_minutes) * 60,
                },
                Phase {
                    kind: PhaseKind::Rest,
                    duration_secs: u64::from(config.rest_minutes) * 60,
                },
            ],
            config.cycle_count,
        )
    }

    pub fn breathing(config: &BreathingConfig) -> Result<Self, ValidationError> {
        Self::new(
            SessionMode::Breathing,
            vec![
                Phase {
                    kind: PhaseKind::Inhale,
                    duration_secs: config.inhale_secs,
                },
                Phase {
                    kind: PhaseKind::HoldIn,
                    duration_secs: config.hold_in_secs,
                },
                Phase {
                    kind: PhaseKind::Exhale,
                    duration_secs: config.exhale_secs,
                },
                Phase {
                    kind: PhaseKind::HoldOut,
                    duration_secs: config.hold_out_secs,
                },
            ],
            config.rounds,
        )
    }

    /// Plan for a scheduled study block.
    pub fn for_activity(activity: &Activity) -> Result<Self, ValidationError> {
        let config = activity
            .session_config
            .as_ref()
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "session_config".into(),
                message: format!("'{}' is not a study block", activity.title),
            })?;
        Self::study(config)
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn work_secs_per_cycle(&self) -> u64 {
        self.phases
            .iter()
            .filter(|p| p.kind.is_focus())
            .map(|p| p.duration_secs)
            .sum()
    }

    pub fn cycle_secs(&self) -> u64 {
        self.phases.iter().map(|p| p.duration_secs).sum()
    }

    pub fn total_secs(&self) -> u64 {
        self.cycle_secs().saturating_mul(u64::from(self.cycle_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityKind;
    use crate::clock::ClockTime;

    #[test]
    fn study_plan_has_work_then_rest() {
        let plan = PhasePlan::study(&SessionConfig::new(2, 25, 5)).unwrap();
        let kinds: Vec<_> = plan.phases().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PhaseKind::Work, PhaseKind::Rest]);
        assert_eq!(plan.total_secs(), 2 * 30 * 60);
        assert_eq!(plan.work_secs_per_cycle(), 25 * 60);
    }

    #[test]
    fn zero_rest_is_skipped() {
        let plan = PhasePlan::study(&SessionConfig::new(1, 10, 0)).unwrap();
        assert_eq!(plan.phases().len(), 1);
    }

    #[test]
    fn breathing_drops_zero_phases() {
        let plan = PhasePlan::breathing(&BreathingConfig {
            hold_out_secs: 0,
            ..BreathingConfig::default()
        })
        .unwrap();
        assert!(plan.phases().iter().all(|p| p.kind != PhaseKind::HoldOut));
        assert_eq!(plan.phases().len(), 3);
        assert_eq!(plan.mode(), SessionMode::Breathing);
        assert_eq!(plan.work_secs_per_cycle(), 0);
    }

    #[test]
    fn invalid_plans_are_rejected() {
        assert!(PhasePlan::study(&SessionConfig::new(0, 25, 5)).is_err());
        let silent = BreathingConfig {
            inhale_secs: 0,
            hold_in_secs: 0,
            exhale_secs: 0,
            hold_out_secs: 0,
            rounds: 1,
        };
        assert_eq!(PhasePlan::breathing(&silent), Err(ValidationError::EmptySession));
    }

    #[test]
    fn only_study_activities_have_a_plan() {
        let t = ClockTime::new;
        let meal = Activity::new("Lunch", ActivityKind::Meal, t(13, 0), t(13, 30));
        assert!(PhasePlan::for_activity(&meal).is_err());
        let study = Activity::study("Study: Math", t(15, 0), t(16, 0), SessionConfig::default());
        assert_eq!(PhasePlan::for_activity(&study).unwrap().cycle_count(), 2);
    }
}
