//! Gap detection and filler selection.
//!
//! Walks the sorted fixed activities with a pointer starting at day-start and
//! turns every empty stretch into exactly one filler block, picked by the
//! stretch's length.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityKind, SessionConfig};
use crate::clock::ClockTime;

use super::profile::ShortGapPolicy;

/// Size category of an empty stretch of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapBucket {
    Micro, // 1-4 minutes
    Short, // 5-29 minutes
    Medium, // 30-59 minutes
    Large, // 60+ minutes
}

impl GapBucket {
    /// Categorize a gap by its duration. Zero (or negative) gaps get nothing.
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        match minutes {
            i32::MIN..=0 => None,
            1..=4 => Some(Self::Micro),
            5..=29 => Some(Self::Short),
            30..=59 => Some(Self::Medium),
            _ => Some(Self::Large),
        }
    }

    /// Candidate filler titles for this bucket.
    fn titles(self, policy: ShortGapPolicy) -> &'static [&'static str] {
        match (self, policy) {
            (Self::Large, _) => &["Focused Study", "Focused Study: Revision", "Focused Study: Practice"],
            (Self::Medium, _) => &[
                "Quick Wellness: Stretch",
                "Quick Wellness: Walk",
                "Quick Wellness: Skipping",
            ],
            (Self::Short, ShortGapPolicy::Rest) => &["Short Rest", "Hydrate & Relax", "Look Outside"],
            (Self::Short, ShortGapPolicy::MindGame) => &[
                "Mind Game: Memory Match",
                "Mind Game: Number Puzzle",
                "Mind Game: Word Chain",
            ],
            (Self::Micro, _) => &["Micro Rest"],
        }
    }

    fn kind(self, policy: ShortGapPolicy) -> ActivityKind {
        match (self, policy) {
            (Self::Large, _) => ActivityKind::Study,
            (Self::Medium, _) => ActivityKind::Exercise,
            (Self::Short, ShortGapPolicy::MindGame) => ActivityKind::Game,
            (Self::Short, ShortGapPolicy::Rest) | (Self::Micro, _) => ActivityKind::FreeTime,
        }
    }
}

/// Source of the only non-determinism in planning: which filler title to use.
pub trait FillerSource {
    /// Return an index in `0..len`. `len` is never zero.
    fn choose(&mut self, len: usize) -> usize;
}

/// Pseudo-random titles from a PCG stream. Same seed, same plan.
#[derive(Debug, Clone)]
pub struct SeededFillers {
    rng: Pcg64,
}

impl SeededFillers {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Seed from the calendar date so a day's plan is stable across runs.
    pub fn for_date(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.num_days_from_ce() as u64)
    }
}

impl FillerSource for SeededFillers {
    fn choose(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl FillerSource for FirstChoice {
    fn choose(&mut self, _len: usize) -> usize {
        0
    }
}

/// Builds filler activities for detected gaps.
pub struct GapFiller<'a> {
    policy: ShortGapPolicy,
    study: SessionConfig,
    source: &'a mut dyn FillerSource,
}

impl<'a> GapFiller<'a> {
    pub fn new(policy: ShortGapPolicy, study: SessionConfig, source: &'a mut dyn FillerSource) -> Self {
        Self {
            policy,
            study,
            source,
        }
    }

    /// One filler for `[start, end)`, or `None` for an empty range.
    pub fn filler(&mut self, start: ClockTime, end: ClockTime) -> Option<Activity> {
        let minutes = start.minutes_until(end);
        let bucket = GapBucket::from_minutes(minutes)?;
        let titles = bucket.titles(self.policy);
        let title = titles[self.source.choose(titles.len()).min(titles.len() - 1)];

        let activity = match bucket.kind(self.policy) {
            ActivityKind::Study => {
                let cycle = self.study.cycle_minutes().max(1);
                let cycles = (minutes as u32 / cycle).max(1);
                let config = SessionConfig::new(cycles, self.study.work_minutes, self.study.rest_minutes);
                Activity::study(title, start, end, config)
            }
            kind => Activity::new(title, kind, start, end),
        };
        Some(activity)
    }

    /// Fill every gap between `day_start` and `day_end` around `fixed`.
    ///
    /// `fixed` must be sorted by start time. The pointer only moves forward,
    /// so a fixed block swallowed by an earlier overlapping one produces no
    /// filler of its own.
    pub fn fill(&mut self, fixed: &[Activity], day_start: ClockTime, day_end: ClockTime) -> Vec<Activity> {
        let mut fillers = Vec::new();
        let mut pointer = day_start;

        for activity in fixed {
            if activity.is_overnight() {
                continue;
            }
            let gap_end = activity.start_time.min(day_end);
            if gap_end > pointer {
                fillers.extend(self.filler(pointer, gap_end));
            }
            pointer = pointer.max(activity.end_time);
        }

        if pointer < day_end {
            fillers.extend(self.filler(pointer, day_end));
        }

        fillers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> ClockTime {
        ClockTime::new(h, m)
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(GapBucket::from_minutes(0), None);
        assert_eq!(GapBucket::from_minutes(-5), None);
        assert_eq!(GapBucket::from_minutes(1), Some(GapBucket::Micro));
        assert_eq!(GapBucket::from_minutes(4), Some(GapBucket::Micro));
        assert_eq!(GapBucket::from_minutes(5), Some(GapBucket::Short));
        assert_eq!(GapBucket::from_minutes(29), Some(GapBucket::Short));
        assert_eq!(GapBucket::from_minutes(30), Some(GapBucket::Medium));
        assert_eq!(GapBucket::from_minutes(59), Some(GapBucket::Medium));
        assert_eq!(GapBucket::from_minutes(60), Some(GapBucket::Large));
        assert_eq!(GapBucket::from_minutes(400), Some(GapBucket::Large));
    }

    #[test]
    fn filler_kinds_follow_buckets() {
        let mut src = FirstChoice;
        let mut filler = GapFiller::new(ShortGapPolicy::Rest, SessionConfig::default(), &mut src);
        assert_eq!(filler.filler(t(6, 0), t(7, 30)).unwrap().kind, ActivityKind::Study);
        assert_eq!(filler.filler(t(6, 0), t(6, 45)).unwrap().kind, ActivityKind::Exercise);
        assert_eq!(filler.filler(t(6, 0), t(6, 10)).unwrap().kind, ActivityKind::FreeTime);
        let micro = filler.filler(t(6, 0), t(6, 3)).unwrap();
        assert_eq!((micro.kind, micro.title.as_str()), (ActivityKind::FreeTime, "Micro Rest"));
        assert!(filler.filler(t(6, 0), t(6, 0)).is_none());
    }

    #[test]
    fn mind_game_policy_changes_short_gaps_only() {
        let mut src = FirstChoice;
        let mut filler = GapFiller::new(ShortGapPolicy::MindGame, SessionConfig::default(), &mut src);
        assert_eq!(filler.filler(t(9, 0), t(9, 20)).unwrap().kind, ActivityKind::Game);
        assert_eq!(filler.filler(t(9, 0), t(9, 2)).unwrap().kind, ActivityKind::FreeTime);
    }

    #[test]
    fn study_filler_sizes_cycles_to_the_gap() {
        let mut src = FirstChoice;
        let mut filler = GapFiller::new(ShortGapPolicy::Rest, SessionConfig::default(), &mut src);
        let block = filler.filler(t(18, 0), t(19, 45)).unwrap();
        assert_eq!(block.session_config, Some(SessionConfig::new(3, 25, 5)));
        let block = filler.filler(t(18, 0), t(19, 0)).unwrap();
        assert_eq!(block.session_config.unwrap().cycle_count, 2);
    }

    #[test]
    fn fill_covers_leading_middle_and_trailing_gaps() {
        let fixed = vec![
            Activity::new("A", ActivityKind::Meal, t(7, 0), t(8, 0)),
            Activity::new("B", ActivityKind::Meal, t(8, 30), t(9, 0)),
        ];
        let mut src = FirstChoice;
        let mut filler = GapFiller::new(ShortGapPolicy::Rest, SessionConfig::default(), &mut src);
        let gaps = filler.fill(&fixed, t(6, 0), t(10, 0));
        let spans: Vec<_> = gaps.iter().map(|a| (a.start_time, a.end_time)).collect();
        assert_eq!(
            spans,
            vec![(t(6, 0), t(7, 0)), (t(8, 0), t(8, 30)), (t(9, 0), t(10, 0))]
        );
    }

    #[test]
    fn overlapping_fixed_blocks_suppress_filler() {
        let fixed = vec![
            Activity::new("Long", ActivityKind::Tuition, t(6, 0), t(9, 0)),
            Activity::new("Inside", ActivityKind::Meal, t(7, 0), t(7, 30)),
        ];
        let mut src = FirstChoice;
        let mut filler = GapFiller::new(ShortGapPolicy::Rest, SessionConfig::default(), &mut src);
        let gaps = filler.fill(&fixed, t(6, 0), t(9, 0));
        assert!(gaps.is_empty());
    }

    #[test]
    fn seeded_fillers_are_repeatable() {
        let mut a = SeededFillers::new(42);
        let mut b = SeededFillers::new(42);
        let xs: Vec<_> = (0..16).map(|_| a.choose(3)).collect();
        let ys: Vec<_> = (0..16).map(|_| b.choose(3)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&i| i < 3));
    }
}
