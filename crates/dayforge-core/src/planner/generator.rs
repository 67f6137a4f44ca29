//! Daily plan generation.
//!
//! A single deterministic pass with fixed priority ordering:
//!
//! ```text
//! buffers -> institution -> meals -> tuition/extra class -> subject study
//!   -> sort -> fill gaps -> overnight sleep -> sort
//! ```
//!
//! Nothing here can fail. Missing optional anchors skip their step, and
//! degenerate ranges (end not after start) are dropped, leaving the time to
//! the gap filler.

use chrono::NaiveDate;

use crate::activity::{Activity, ActivityKind, InstitutionKind, SessionConfig};
use crate::clock::{ClockTime, MINUTES_PER_DAY};

use super::gap::{FillerSource, GapFiller};
use super::plan::DailyPlan;
use super::profile::{PlannerSettings, ProfileConfig};

/// Generates a full-day plan from a profile.
#[derive(Debug, Clone, Default)]
pub struct DailyPlanGenerator {
    settings: PlannerSettings,
}

impl DailyPlanGenerator {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Build the plan for `date`. Pure apart from the filler source.
    pub fn generate(
        &self,
        date: NaiveDate,
        profile: &ProfileConfig,
        fillers: &mut dyn FillerSource,
    ) -> DailyPlan {
        let s = &self.settings;
        let mut fixed = Vec::new();

        // Buffers around the institution block.
        let inst_start = profile.institution_start;
        let inst_end = profile.institution_end;
        let prep_start = self.earlier(inst_start, s.prep_buffer_minutes);
        let wake_start = self.earlier(prep_start, s.wake_minutes);
        push_block(
            &mut fixed,
            Activity::new("Wake Up & Freshen Up", ActivityKind::WakeUp, wake_start, prep_start),
        );
        push_block(
            &mut fixed,
            Activity::new(
                prep_title(profile.institution),
                ActivityKind::WakeUp,
                prep_start,
                inst_start,
            ),
        );
        let rest_end = self.later(inst_end, s.post_institution_rest_minutes);
        push_block(
            &mut fixed,
            Activity::new("Rest & Refresh", ActivityKind::BreakRest, inst_end, rest_end),
        );

        push_block(
            &mut fixed,
            Activity::new(
                institution_title(profile.institution),
                ActivityKind::Institution(profile.institution),
                inst_start,
                inst_end,
            ),
        );

        for (title, at) in [
            ("Breakfast", profile.breakfast),
            ("Lunch", profile.lunch),
            ("Dinner", profile.dinner),
        ] {
            let end = self.later(at, s.meal_minutes);
            push_block(&mut fixed, Activity::new(title, ActivityKind::Meal, at, end));
        }

        if let Some((start, end)) = profile.tuition.active() {
            push_block(&mut fixed, Activity::new("Tuition", ActivityKind::Tuition, start, end));
        }
        if let Some((start, end)) = profile.extra_class.active() {
            push_block(
                &mut fixed,
                Activity::new("Extra Class", ActivityKind::ExtraClass, start, end),
            );
        }

        let anchor = match profile.tuition.active() {
            Some((_, tuition_end)) => self.later(tuition_end, s.tuition_study_pad_minutes),
            None => self.later(profile.lunch, s.lunch_study_pad_minutes),
        };
        let study_start = anchor.max(rest_end);
        let session = profile.session_config();
        for block in self.subject_sessions(&profile.subjects, study_start, session) {
            push_block(&mut fixed, block);
        }

        sort_by_start(&mut fixed);

        let fillers = GapFiller::new(s.short_gap_policy, session, fillers).fill(
            &fixed,
            s.day_start,
            s.day_end,
        );
        let fixed_count = fixed.len();
        let filler_count = fillers.len();

        let mut activities = fixed;
        activities.extend(fillers);
        activities.push(Activity::new("Sleep", ActivityKind::Sleep, s.sleep_start, s.sleep_end));
        sort_by_start(&mut activities);

        tracing::debug!(
            %date,
            fixed = fixed_count,
            fillers = filler_count,
            total = activities.len(),
            "generated daily plan"
        );

        DailyPlan::new(date, activities)
    }

    /// Back-to-back subject sessions from `start`, one per subject.
    fn subject_sessions(
        &self,
        subjects: &[String],
        start: ClockTime,
        session: SessionConfig,
    ) -> Vec<Activity> {
        let s = &self.settings;
        let length = session.total_minutes();
        let mut clock = start;
        let mut blocks = Vec::new();

        for subject in subjects
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .take(s.max_subjects)
        {
            if clock >= s.study_cutoff {
                break;
            }
            let room = u32::from(s.day_end.minutes()).saturating_sub(u32::from(clock.minutes()));
            if length == 0 || length > room {
                break;
            }
            // `length <= room < MINUTES_PER_DAY`, so the cast is lossless.
            let end = clock.add_minutes(length as i32);
            blocks.push(Activity::study(format!("Study: {subject}"), clock, end, session));
            clock = end;
        }

        blocks
    }

    /// `at - minutes`, never before day-start.
    fn earlier(&self, at: ClockTime, minutes: u32) -> ClockTime {
        let floor = i64::from(self.settings.day_start.minutes());
        let target = (i64::from(at.minutes()) - i64::from(minutes)).max(floor);
        ClockTime::from_minutes(target as u16)
    }

    /// `at + minutes`, never past the last minute of the day.
    fn later(&self, at: ClockTime, minutes: u32) -> ClockTime {
        let ceiling = i64::from(MINUTES_PER_DAY) - 1;
        let target = (i64::from(at.minutes()) + i64::from(minutes)).min(ceiling);
        ClockTime::from_minutes(target as u16)
    }
}

fn prep_title(kind: InstitutionKind) -> &'static str {
    match kind {
        InstitutionKind::School => "Get Ready for School",
        InstitutionKind::College => "Get Ready for College",
    }
}

fn institution_title(kind: InstitutionKind) -> &'static str {
    match kind {
        InstitutionKind::School => "School",
        InstitutionKind::College => "College",
    }
}

/// Keep only well-formed same-day blocks.
fn push_block(out: &mut Vec<Activity>, activity: Activity) {
    if activity.start_time < activity.end_time {
        out.push(activity);
    } else {
        tracing::debug!(
            title = %activity.title,
            start = %activity.start_time,
            end = %activity.end_time,
            "dropping empty block"
        );
    }
}

fn sort_by_start(activities: &mut [Activity]) {
    activities.sort_by_key(|a| (a.start_time, a.end_time));
}
