//! The plan files shipped under `plans/` must stay loadable.

use std::path::PathBuf;

use roundbell_core::{Exercise, PlanIssue, WorkoutPlan, WorkoutSession, WorkoutType};

fn plans_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../plans")
}

fn timings(exercises: &[Exercise]) -> Vec<(&str, i64)> {
    exercises.iter().map(|e| (e.name.as_str(), e.duration)).collect()
}

fn load(name: &str) -> WorkoutPlan {
    WorkoutPlan::load(&plans_dir().join(name)).unwrap()
}

#[test]
fn every_shipped_plan_loads() {
    let mut count = 0;
    for entry in std::fs::read_dir(plans_dir()).unwrap() {
        let path = entry.unwrap().path();
        let plan = WorkoutPlan::load(&path)
            .unwrap_or_else(|e| panic!("{} failed to load: {e}", path.display()));
        assert!(!plan.title.is_empty(), "{} has no title", path.display());
        assert!(plan.total_rounds() > 0, "{} has no rounds", path.display());
        count += 1;
    }
    assert!(count >= 2);
}

#[test]
fn boxing_basic_matches_the_built_in_sample() {
    let plan = load("boxing_basic.toml");
    let sample = WorkoutPlan::sample_boxing();
    assert_eq!(plan.workout_type, WorkoutType::Boxing);
    assert_eq!(timings(&plan.warmup), timings(&sample.warmup));
    assert_eq!(timings(&plan.cooldown), timings(&sample.cooldown));
    assert_eq!(plan.total_rounds(), sample.total_rounds());
    for (ours, theirs) in plan.rounds.iter().zip(&sample.rounds) {
        assert_eq!(ours.work_time, theirs.work_time);
        assert_eq!(ours.rest_time, theirs.rest_time);
        assert_eq!(timings(&ours.exercises), timings(&theirs.exercises));
    }
    assert_eq!(plan.total_duration, Some(15));
    assert_eq!(
        plan.issues(),
        vec![PlanIssue::TotalDrift {
            authored_secs: 900,
            segment_secs: 855,
        }]
    );
}

#[test]
fn quick_gym_reads_camel_case_and_flags_bad_entries() {
    let plan = load("quick_gym.json");
    assert_eq!(plan.workout_type, WorkoutType::Gym);
    assert_eq!(plan.total_rounds(), 2);
    assert_eq!(plan.rounds[0].rest_time, 30);
    assert_eq!(
        plan.issues(),
        vec![
            PlanIssue::NonPositiveWarmup {
                index: 1,
                name: "Band Pull-Aparts".into(),
            },
            PlanIssue::TotalDrift {
                authored_secs: 480,
                segment_secs: 375,
            },
        ]
    );

    let mut session = WorkoutSession::silent(plan, Default::default());
    session.start();
    while !session.is_finished() {
        session.tick();
    }
    // 10 prep + 60 rowing + 60 rest + 120 + 30 + 120 + 45 stretch
    assert_eq!(session.summary().unwrap().duration_secs, 445);
}
