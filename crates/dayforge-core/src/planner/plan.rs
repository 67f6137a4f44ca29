//! The generated day and the helpers its consumers need.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityKind};
use crate::clock::{ClockTime, MINUTES_PER_DAY};
use crate::error::{CoreError, Result};

use super::gap::FillerSource;
use super::generator::DailyPlanGenerator;
use super::profile::ProfileConfig;

/// Ordered, non-overlapping activities for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
}

impl DailyPlan {
    pub fn new(date: NaiveDate, activities: Vec<Activity>) -> Self {
        Self { date, activities }
    }

    pub fn find(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Flag a block as done. Used by the execution layer, never the generator.
    pub fn mark_completed(&mut self, id: &str) -> Result<()> {
        let activity = self
            .activities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::ActivityNotFound(id.to_string()))?;
        activity.mark_completed();
        Ok(())
    }

    /// 0.0 .. 100.0 share of completed blocks, sleep excluded.
    pub fn progress_pct(&self) -> f64 {
        let countable: Vec<_> = self
            .activities
            .iter()
            .filter(|a| a.kind != ActivityKind::Sleep)
            .collect();
        if countable.is_empty() {
            return 0.0;
        }
        let done = countable.iter().filter(|a| a.is_completed).count();
        done as f64 / countable.len() as f64 * 100.0
    }

    /// The block running at `now`, if any.
    pub fn current_at(&self, now: ClockTime) -> Option<&Activity> {
        self.activities.iter().find(|a| {
            if a.is_overnight() {
                now >= a.start_time || now < a.end_time
            } else {
                a.start_time <= now && now < a.end_time
            }
        })
    }

    /// First block starting at or after `now`.
    pub fn next_after(&self, now: ClockTime) -> Option<&Activity> {
        self.activities.iter().find(|a| a.start_time >= now)
    }

    pub fn study_blocks(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(|a| a.kind == ActivityKind::Study)
    }

    /// Index pairs `(i, j)`, `i < j`, of same-day blocks that overlap.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.activities.iter().enumerate() {
            for (j, b) in self.activities.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Stretches of `[day_start, day_end)` that no block covers.
    pub fn uncovered_gaps(&self, day_start: ClockTime, day_end: ClockTime) -> Vec<(ClockTime, ClockTime)> {
        let mut spans: Vec<(u16, u16)> = self
            .activities
            .iter()
            .flat_map(|a| {
                let (s, e) = (a.start_time.minutes(), a.end_time.minutes());
                if a.is_overnight() {
                    vec![(s, MINUTES_PER_DAY), (0, e)]
                } else {
                    vec![(s, e)]
                }
            })
            .collect();
        spans.sort_unstable();

        let (start, end) = (day_start.minutes(), day_end.minutes());
        let mut gaps = Vec::new();
        let mut pointer = start;
        for (s, e) in spans {
            if s >= end {
                break;
            }
            if s > pointer {
                gaps.push((ClockTime::from_minutes(pointer), ClockTime::from_minutes(s)));
            }
            pointer = pointer.max(e);
        }
        if pointer < end {
            gaps.push((ClockTime::from_minutes(pointer), day_end));
        }
        gaps
    }

    /// Plain-text digest for the morning notification: start times and titles.
    pub fn morning_summary(&self) -> String {
        let mut out = format!("Your plan for {}:", self.date.format("%A, %B %-d"));
        for a in &self.activities {
            out.push_str(&format!("\n{}  {}", a.start_time, a.title));
        }
        out
    }
}

/// Holds the current day's plan and regenerates it when the date changes.
#[derive(Debug, Default)]
pub struct PlanCache {
    plan: Option<DailyPlan>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache with a previously stored plan.
    pub fn with_plan(plan: DailyPlan) -> Self {
        Self { plan: Some(plan) }
    }

    pub fn get_or_generate(
        &mut self,
        date: NaiveDate,
        generator: &DailyPlanGenerator,
        profile: &ProfileConfig,
        fillers: &mut dyn FillerSource,
    ) -> &mut DailyPlan {
        if self.plan.as_ref().is_some_and(|p| p.date != date) {
            tracing::debug!(%date, "cached plan is stale, regenerating");
            self.plan = None;
        }
        self.plan
            .get_or_insert_with(|| generator.generate(date, profile, fillers))
    }

    pub fn invalidate(&mut self) {
        self.plan = None;
    }

    pub fn plan(&self) -> Option<&DailyPlan> {
        self.plan.as_ref()
    }
}
