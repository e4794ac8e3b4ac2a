//! Pure progress calculations over a plan and the session's position in it.
//!
//! None of these drive transitions. The session uses the exercise index to
//! time announcements inside a round; everything else is display data.

use crate::plan::{Exercise, WorkoutPlan};
use crate::timer::{Phase, PhaseState, SegmentTiming, TimerState};

/// Index of the exercise active `elapsed` seconds into a round.
///
/// Exercises with a missing or zero duration count as
/// [`DEFAULT_EXERCISE_SECS`](crate::plan::DEFAULT_EXERCISE_SECS). Past the end
/// of the list the last index is returned. `None` only for an empty list.
pub fn current_exercise_index(elapsed: u32, exercises: &[Exercise]) -> Option<usize> {
    let last = exercises.len().checked_sub(1)?;
    let elapsed = u64::from(elapsed);
    let mut boundary = 0u64;
    for (i, ex) in exercises.iter().enumerate() {
        boundary += u64::from(ex.combo_secs());
        if elapsed < boundary {
            return Some(i);
        }
    }
    Some(last)
}

/// Seconds until the active exercise hands over to the next one. Zero once
/// `elapsed` runs past the whole list.
pub fn exercise_time_left(elapsed: u32, exercises: &[Exercise]) -> Option<u32> {
    let idx = current_exercise_index(elapsed, exercises)?;
    let boundary: u64 = exercises[..=idx]
        .iter()
        .map(|ex| u64::from(ex.combo_secs()))
        .sum();
    let left = boundary.saturating_sub(u64::from(elapsed));
    Some(u32::try_from(left).unwrap_or(u32::MAX))
}

/// Full length of the segment the session is in. Zero outside timed phases.
pub fn segment_secs(plan: &WorkoutPlan, state: &PhaseState, timing: SegmentTiming) -> u32 {
    match state.phase {
        Phase::Preview | Phase::Finished => 0,
        Phase::Preparation => timing.preparation_secs,
        Phase::Warmup if state.is_post_warmup_rest => timing.post_warmup_rest_secs,
        Phase::Warmup => plan
            .warmup
            .get(state.warmup_index)
            .and_then(Exercise::playable_secs)
            .unwrap_or(0),
        Phase::Workout => plan
            .round(state.round)
            .map(|r| if state.is_rest { r.rest_time } else { r.work_time })
            .unwrap_or(0),
        Phase::Cooldown => plan
            .cooldown
            .get(state.cooldown_index)
            .and_then(Exercise::playable_secs)
            .unwrap_or(0),
    }
}

/// Seconds already spent in the current segment.
pub fn segment_elapsed(
    plan: &WorkoutPlan,
    state: &PhaseState,
    timer: &TimerState,
    timing: SegmentTiming,
) -> u32 {
    segment_secs(plan, state, timing).saturating_sub(timer.remaining_secs)
}

/// Advisory seconds left in the whole session.
///
/// Starts from the plan's estimated total and subtracts what has been
/// consumed. Preparation and the post-warm-up rest are not part of the
/// estimate, so while they run their remaining countdown is added on top.
/// The authored estimate can disagree with the segment durations, in which
/// case this drifts and may go negative.
pub fn total_session_seconds_remaining(
    plan: &WorkoutPlan,
    state: &PhaseState,
    timer: &TimerState,
    timing: SegmentTiming,
) -> i64 {
    let total = as_i64(plan.estimated_total_secs());
    let remaining = i64::from(timer.remaining_secs);
    let elapsed = i64::from(segment_elapsed(plan, state, timer, timing));

    match state.phase {
        Phase::Preview => total + i64::from(timing.preparation_secs),
        Phase::Preparation => total + remaining,
        Phase::Warmup if state.is_post_warmup_rest => {
            total - as_i64(plan.warmup_secs()) + remaining
        }
        Phase::Warmup => total - as_i64(plan.warmup_secs_before(state.warmup_index)) - elapsed,
        Phase::Workout => {
            let in_round = match plan.round(state.round) {
                Some(r) if state.is_rest => i64::from(r.work_time) + elapsed,
                _ => elapsed,
            };
            total
                - as_i64(plan.warmup_secs())
                - as_i64(plan.round_secs_before(state.round))
                - in_round
        }
        Phase::Cooldown => {
            total
                - as_i64(plan.warmup_secs())
                - as_i64(plan.rounds_secs())
                - as_i64(plan.cooldown_secs_before(state.cooldown_index))
                - elapsed
        }
        Phase::Finished => 0,
    }
}

/// Name of the next exercise in plan order, looking past rests.
pub fn upcoming_exercise_name<'a>(
    plan: &'a WorkoutPlan,
    state: &PhaseState,
    round_elapsed: u32,
) -> Option<&'a str> {
    match state.phase {
        Phase::Preview | Phase::Preparation => plan
            .next_playable_warmup(0)
            .map(|i| plan.warmup[i].name.as_str())
            .or_else(|| after_round(plan, 0)),
        Phase::Warmup if state.is_post_warmup_rest => after_round(plan, 0),
        Phase::Warmup => plan
            .next_playable_warmup(state.warmup_index + 1)
            .map(|i| plan.warmup[i].name.as_str())
            .or_else(|| after_round(plan, 0)),
        Phase::Workout if !state.is_rest => {
            let exercises = plan
                .round(state.round)
                .map(|r| r.exercises.as_slice())
                .unwrap_or(&[]);
            match current_exercise_index(round_elapsed, exercises) {
                Some(i) if i + 1 < exercises.len() => Some(exercises[i + 1].name.as_str()),
                _ => after_round(plan, state.round),
            }
        }
        Phase::Workout => after_round(plan, state.round),
        Phase::Cooldown => plan
            .next_playable_cooldown(state.cooldown_index + 1)
            .map(|i| plan.cooldown[i].name.as_str()),
        Phase::Finished => None,
    }
}

/// First exercise of a later round with work time, else the first playable
/// cooldown exercise. `round` 0 means before the first round.
fn after_round(plan: &WorkoutPlan, round: u32) -> Option<&str> {
    let done = usize::try_from(round).unwrap_or(usize::MAX);
    plan.rounds
        .iter()
        .skip(done)
        .filter(|r| r.work_time > 0)
        .find_map(|r| r.exercises.first())
        .or_else(|| plan.next_playable_cooldown(0).map(|i| &plan.cooldown[i]))
        .map(|ex| ex.name.as_str())
}

fn as_i64(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Round;
    use proptest::prelude::*;

    fn combo() -> Vec<Exercise> {
        vec![
            Exercise::new("Jab", 10),
            Exercise::new("Cross", 0),
            Exercise::new("Hook", 20),
        ]
    }

    fn state(phase: Phase) -> PhaseState {
        PhaseState {
            phase,
            ..PhaseState::default()
        }
    }

    #[test]
    fn index_walks_boundaries() {
        let ex = combo();
        assert_eq!(current_exercise_index(0, &ex), Some(0));
        assert_eq!(current_exercise_index(9, &ex), Some(0));
        assert_eq!(current_exercise_index(10, &ex), Some(1));
        // zero duration counts as 30s
        assert_eq!(current_exercise_index(39, &ex), Some(1));
        assert_eq!(current_exercise_index(40, &ex), Some(2));
        assert_eq!(current_exercise_index(59, &ex), Some(2));
    }

    #[test]
    fn index_clamps_past_the_end() {
        assert_eq!(current_exercise_index(10_000, &combo()), Some(2));
    }

    #[test]
    fn index_of_empty_list_is_none() {
        assert_eq!(current_exercise_index(3, &[]), None);
        assert_eq!(exercise_time_left(3, &[]), None);
    }

    #[test]
    fn time_left_counts_to_boundary() {
        let ex = combo();
        assert_eq!(exercise_time_left(0, &ex), Some(10));
        assert_eq!(exercise_time_left(12, &ex), Some(28));
        assert_eq!(exercise_time_left(100, &ex), Some(0));
    }

    #[test]
    fn remaining_during_preparation_adds_prep_countdown() {
        let plan = WorkoutPlan {
            rounds: vec![Round::new(60, 30)],
            ..Default::default()
        };
        let timer = TimerState {
            remaining_secs: 7,
            is_running: true,
        };
        let timing = SegmentTiming::default();
        assert_eq!(
            total_session_seconds_remaining(&plan, &state(Phase::Preparation), &timer, timing),
            97
        );
        assert_eq!(
            total_session_seconds_remaining(&plan, &state(Phase::Preview), &timer, timing),
            100
        );
    }

    #[test]
    fn remaining_during_round_rest() {
        let plan = WorkoutPlan {
            warmup: vec![Exercise::new("a", 20)],
            rounds: vec![Round::new(60, 30), Round::new(60, 30)],
            ..Default::default()
        };
        let st = PhaseState {
            phase: Phase::Workout,
            round: 2,
            is_rest: true,
            ..PhaseState::default()
        };
        let timer = TimerState {
            remaining_secs: 10,
            is_running: true,
        };
        // 200 total - 20 warmup - 90 round one - (60 work + 20 rest elapsed)
        assert_eq!(
            total_session_seconds_remaining(&plan, &st, &timer, SegmentTiming::default()),
            10
        );
    }

    #[test]
    fn remaining_drifts_negative_with_short_estimate() {
        let plan = WorkoutPlan {
            total_duration: Some(1),
            rounds: vec![Round::new(120, 0)],
            ..Default::default()
        };
        let st = PhaseState {
            phase: Phase::Workout,
            ..PhaseState::default()
        };
        let timer = TimerState {
            remaining_secs: 10,
            is_running: true,
        };
        assert_eq!(
            total_session_seconds_remaining(&plan, &st, &timer, SegmentTiming::default()),
            -50
        );
    }

    #[test]
    fn remaining_is_zero_when_finished() {
        let plan = WorkoutPlan::sample_boxing();
        assert_eq!(
            total_session_seconds_remaining(
                &plan,
                &state(Phase::Finished),
                &TimerState::default(),
                SegmentTiming::default()
            ),
            0
        );
    }

    #[test]
    fn upcoming_name_follows_plan_order() {
        let plan = WorkoutPlan::sample_boxing();
        assert_eq!(
            upcoming_exercise_name(&plan, &state(Phase::Preparation), 0),
            Some("Jumping Jacks")
        );

        let last_warmup = PhaseState {
            phase: Phase::Warmup,
            warmup_index: 2,
            ..PhaseState::default()
        };
        assert_eq!(upcoming_exercise_name(&plan, &last_warmup, 0), Some("Jab"));

        let work = PhaseState {
            phase: Phase::Workout,
            round: 1,
            ..PhaseState::default()
        };
        assert_eq!(upcoming_exercise_name(&plan, &work, 0), Some("Jab Cross"));
        assert_eq!(upcoming_exercise_name(&plan, &work, 179), Some("Double Jab"));

        let final_rest = PhaseState {
            phase: Phase::Workout,
            round: 3,
            is_rest: true,
            ..PhaseState::default()
        };
        assert_eq!(
            upcoming_exercise_name(&plan, &final_rest, 0),
            Some("Shoulder Stretch")
        );
    }

    #[test]
    fn upcoming_name_looks_past_rounds_without_exercises() {
        let plan = WorkoutPlan {
            rounds: vec![
                Round::new(30, 10).with_exercises(vec![Exercise::new("Jab", 30)]),
                Round::new(30, 10),
                Round::new(0, 10).with_exercises(vec![Exercise::new("Ghost", 30)]),
                Round::new(30, 0).with_exercises(vec![Exercise::new("Hook", 30)]),
                Round::new(30, 0),
            ],
            cooldown: vec![Exercise::new("Broken", 0), Exercise::new("Stretch", 20)],
            ..Default::default()
        };
        let rest_after_first = PhaseState {
            phase: Phase::Workout,
            round: 1,
            is_rest: true,
            ..PhaseState::default()
        };
        assert_eq!(
            upcoming_exercise_name(&plan, &rest_after_first, 0),
            Some("Hook")
        );

        let last_work = PhaseState {
            phase: Phase::Workout,
            round: 4,
            ..PhaseState::default()
        };
        assert_eq!(upcoming_exercise_name(&plan, &last_work, 0), Some("Stretch"));
    }

    proptest! {
        #[test]
        fn index_is_monotonic_and_valid(
            durations in proptest::collection::vec(-5i64..120, 1..12),
            t in 0u32..5_000,
            dt in 0u32..500,
        ) {
            let exercises: Vec<Exercise> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| Exercise::new(format!("e{i}"), *d))
                .collect();
            let a = current_exercise_index(t, &exercises).unwrap();
            let b = current_exercise_index(t + dt, &exercises).unwrap();
            prop_assert!(a < exercises.len());
            prop_assert!(b < exercises.len());
            prop_assert!(a <= b);
        }
    }
}
