//! Daily plan generation.
//!
//! This module provides:
//! - Profile and generator settings (`[profile]` / `[planner]` in config)
//! - The single-pass [`DailyPlanGenerator`]
//! - Gap detection with duration-bucketed filler activities
//! - [`DailyPlan`] queries and a once-per-day [`PlanCache`]

mod gap;
mod generator;
mod plan;
mod profile;

pub use gap::{FillerSource, FirstChoice, GapBucket, GapFiller, SeededFillers};
pub use generator::DailyPlanGenerator;
pub use plan::{DailyPlan, PlanCache};
pub use profile::{OptionalBlock, PlannerSettings, ProfileConfig, ShortGapPolicy, StudyRecommendation};
