//! Integration tests for a typical school day.

use chrono::NaiveDate;
use dayforge_core::{
    ActivityKind, ClockTime, DailyPlanGenerator, InstitutionKind, PlannerSettings, ProfileConfig,
    SeededFillers, SessionConfig,
};

fn t(h: u32, m: u32) -> ClockTime {
    ClockTime::new(h, m)
}

fn school_day_profile() -> ProfileConfig {
    ProfileConfig {
        subjects: vec!["Math".into(), "Physics".into(), "English".into()],
        work_minutes: Some(25),
        rest_minutes: Some(5),
        cycle_count: Some(2),
        ..ProfileConfig::default()
    }
}

#[test]
fn test_school_day_layout() {
    let profile = school_day_profile();
    assert_eq!(profile.institution_start, t(8, 0));
    assert_eq!(profile.institution_end, t(14, 30));
    assert!(!profile.tuition.enabled);

    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let plan = DailyPlanGenerator::default().generate(date, &profile, &mut SeededFillers::for_date(date));

    let wake = plan
        .activities
        .iter()
        .find(|a| a.title == "Wake Up & Freshen Up")
        .unwrap();
    assert_eq!(wake.kind, ActivityKind::WakeUp);
    assert!(wake.end_time <= t(8, 0));

    let school = plan
        .activities
        .iter()
        .find(|a| a.kind == ActivityKind::Institution(InstitutionKind::School))
        .unwrap();
    assert_eq!((school.start_time, school.end_time), (t(8, 0), t(14, 30)));

    let rest = plan
        .activities
        .iter()
        .find(|a| a.kind == ActivityKind::BreakRest)
        .unwrap();
    assert_eq!((rest.start_time, rest.end_time), (t(14, 30), t(15, 0)));

    let studies: Vec<_> = plan
        .study_blocks()
        .filter(|a| a.title.starts_with("Study: "))
        .collect();
    assert_eq!(studies.len(), 3);
    let lunch_plus_pad = profile.lunch.add_minutes(30);
    for block in &studies {
        assert_eq!(block.duration_minutes(), 60);
        assert!(block.start_time >= lunch_plus_pad);
        assert_eq!(block.session_config, Some(SessionConfig::new(2, 25, 5)));
    }
    assert_eq!(studies[0].title, "Study: Math");
    assert_eq!(studies[2].end_time, t(18, 30));

    let sleep = plan.activities.iter().find(|a| a.kind == ActivityKind::Sleep).unwrap();
    assert_eq!((sleep.start_time, sleep.end_time), (t(22, 0), t(6, 0)));
    assert!(sleep.is_overnight());

    assert!(plan.overlapping_pairs().is_empty());
    assert!(plan.uncovered_gaps(t(6, 0), t(22, 0)).is_empty());
}

#[test]
fn test_tuition_moves_study_after_it() {
    let mut profile = school_day_profile();
    profile.tuition.enabled = true;
    profile.lunch = t(15, 0);
    profile.tuition.start = t(16, 0);
    profile.tuition.end = t(17, 0);
    profile.dinner = t(20, 30);

    let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
    let plan = DailyPlanGenerator::default().generate(date, &profile, &mut SeededFillers::for_date(date));

    let first_study = plan
        .study_blocks()
        .find(|a| a.title.starts_with("Study: "))
        .unwrap();
    assert_eq!(first_study.start_time, t(17, 15));
    assert!(plan.activities.iter().any(|a| a.kind == ActivityKind::Tuition));
    assert!(plan.overlapping_pairs().is_empty());
}

#[test]
fn test_no_subjects_leaves_afternoon_to_fillers() {
    let profile = ProfileConfig::default();
    let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let plan = DailyPlanGenerator::default().generate(date, &profile, &mut SeededFillers::for_date(date));

    assert!(plan.study_blocks().all(|a| a.title.starts_with("Focused Study")));
    assert!(plan.uncovered_gaps(t(6, 0), t(22, 0)).is_empty());
}

#[test]
fn test_mind_game_policy_changes_short_fillers() {
    let mut profile = school_day_profile();
    // Leaves a 15-minute hole between lunch (15:00-15:30) and the rest block.
    profile.institution_end = t(14, 15);
    let settings = PlannerSettings {
        short_gap_policy: dayforge_core::ShortGapPolicy::MindGame,
        ..PlannerSettings::default()
    };
    let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
    let plan = DailyPlanGenerator::new(settings).generate(date, &profile, &mut SeededFillers::for_date(date));

    let game = plan
        .activities
        .iter()
        .find(|a| a.kind == ActivityKind::Game)
        .unwrap();
    assert_eq!((game.start_time, game.end_time), (t(14, 45), t(15, 0)));
    assert!(game.title.starts_with("Mind Game"));
}

#[test]
fn test_young_student_gets_shorter_sessions() {
    let profile: ProfileConfig = toml::from_str(
        r#"
        age = 8
        subjects = ["Math", "Reading"]
        "#,
    )
    .unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
    let plan = DailyPlanGenerator::default().generate(date, &profile, &mut SeededFillers::for_date(date));

    let studies: Vec<_> = plan
        .study_blocks()
        .filter(|a| a.title.starts_with("Study: "))
        .collect();
    assert_eq!(studies.len(), 2);
    for block in &studies {
        assert_eq!(block.session_config, Some(SessionConfig::new(2, 15, 5)));
        assert_eq!(block.duration_minutes(), 40);
    }
    assert_eq!((studies[0].start_time, studies[0].end_time), (t(15, 30), t(16, 10)));
    assert_eq!(studies[1].end_time, t(16, 50));
}
