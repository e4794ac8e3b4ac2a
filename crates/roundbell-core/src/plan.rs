//! Workout plan model.
//!
//! A plan is produced by an external generator before a session starts and
//! stays immutable for the lifetime of that session. Plans can be authored as
//! TOML or JSON; the camelCase field names used by the mobile app are accepted
//! as aliases.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Seconds assumed for an exercise whose authored duration is missing or zero
/// when walking a round's exercise list.
pub const DEFAULT_EXERCISE_SECS: u32 = 30;

/// The kind of session a plan describes. Drives the calorie estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    #[default]
    Boxing,
    Gym,
    Running,
}

impl WorkoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutType::Boxing => "boxing",
            WorkoutType::Gym => "gym",
            WorkoutType::Running => "running",
        }
    }
}

impl std::str::FromStr for WorkoutType {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boxing" => Ok(WorkoutType::Boxing),
            "gym" => Ok(WorkoutType::Gym),
            "running" => Ok(WorkoutType::Running),
            other => Err(PlanError::UnknownWorkoutType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    /// Duration in seconds. Authored content may contain zero or negative
    /// values; the session skips those entries.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub description: String,
}

impl Exercise {
    pub fn new(name: impl Into<String>, duration: i64) -> Self {
        Self {
            name: name.into(),
            duration,
            description: String::new(),
        }
    }

    /// Duration usable as a countdown target, `None` for malformed entries.
    pub fn playable_secs(&self) -> Option<u32> {
        if self.duration > 0 {
            Some(u32::try_from(self.duration).unwrap_or(u32::MAX))
        } else {
            None
        }
    }

    /// Duration used when walking a round's combination list.
    pub fn combo_secs(&self) -> u32 {
        self.playable_secs().unwrap_or(DEFAULT_EXERCISE_SECS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Work segment length in seconds.
    #[serde(alias = "workTime")]
    pub work_time: u32,
    /// Rest segment length in seconds. Zero means no rest.
    #[serde(default, alias = "restTime")]
    pub rest_time: u32,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Round {
    pub fn new(work_time: u32, rest_time: u32) -> Self {
        Self {
            work_time,
            rest_time,
            exercises: Vec::new(),
        }
    }

    pub fn with_exercises(mut self, exercises: Vec<Exercise>) -> Self {
        self.exercises = exercises;
        self
    }

    pub fn total_secs(&self) -> u64 {
        u64::from(self.work_time) + u64::from(self.rest_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "workoutType")]
    pub workout_type: WorkoutType,
    /// Authored estimate of the whole session in minutes.
    #[serde(default, alias = "totalDuration")]
    pub total_duration: Option<u32>,
    #[serde(default)]
    pub warmup: Vec<Exercise>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub cooldown: Vec<Exercise>,
}

/// Something odd about a plan. The session recovers from all of these; they
/// exist so tooling can point authors at the problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanIssue {
    NonPositiveWarmup { index: usize, name: String },
    NonPositiveCooldown { index: usize, name: String },
    ZeroWorkTime { round: usize },
    EmptyCombination { round: usize },
    NoRounds,
    /// The authored `total_duration` disagrees with the sum of segments.
    TotalDrift { authored_secs: u64, segment_secs: u64 },
}

impl WorkoutPlan {
    /// Load a plan from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::ReadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, PlanError> {
        toml::from_str(content).map_err(|e| PlanError::ParseFailed(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self, PlanError> {
        serde_json::from_str(content).map_err(|e| PlanError::ParseFailed(e.to_string()))
    }

    pub fn total_rounds(&self) -> u32 {
        u32::try_from(self.rounds.len()).unwrap_or(u32::MAX)
    }

    pub fn round(&self, round: u32) -> Option<&Round> {
        let idx = usize::try_from(round).ok()?.checked_sub(1)?;
        self.rounds.get(idx)
    }

    /// Seconds of all playable warm-up exercises before `index`.
    pub fn warmup_secs_before(&self, index: usize) -> u64 {
        playable_sum(self.warmup.iter().take(index))
    }

    pub fn warmup_secs(&self) -> u64 {
        playable_sum(self.warmup.iter())
    }

    pub fn cooldown_secs_before(&self, index: usize) -> u64 {
        playable_sum(self.cooldown.iter().take(index))
    }

    pub fn cooldown_secs(&self) -> u64 {
        playable_sum(self.cooldown.iter())
    }

    /// Work plus rest of rounds strictly before `round` (1-based).
    pub fn round_secs_before(&self, round: u32) -> u64 {
        let n = usize::try_from(round.saturating_sub(1)).unwrap_or(usize::MAX);
        self.rounds.iter().take(n).map(Round::total_secs).sum()
    }

    pub fn rounds_secs(&self) -> u64 {
        self.rounds.iter().map(Round::total_secs).sum()
    }

    /// Exact sum of every authored segment, excluding preparation and the
    /// post-warm-up rest.
    pub fn segment_secs(&self) -> u64 {
        self.warmup_secs() + self.rounds_secs() + self.cooldown_secs()
    }

    /// Session length the remaining-time display starts from: the authored
    /// estimate when present, the exact segment sum otherwise.
    pub fn estimated_total_secs(&self) -> u64 {
        match self.total_duration {
            Some(min) => u64::from(min) * 60,
            None => self.segment_secs(),
        }
    }

    /// Index of the first playable warm-up exercise at or after `from`.
    pub fn next_playable_warmup(&self, from: usize) -> Option<usize> {
        next_playable(&self.warmup, from)
    }

    pub fn next_playable_cooldown(&self, from: usize) -> Option<usize> {
        next_playable(&self.cooldown, from)
    }

    pub fn issues(&self) -> Vec<PlanIssue> {
        let mut issues = Vec::new();
        for (index, ex) in self.warmup.iter().enumerate() {
            if ex.playable_secs().is_none() {
                issues.push(PlanIssue::NonPositiveWarmup {
                    index,
                    name: ex.name.clone(),
                });
            }
        }
        if self.rounds.is_empty() {
            issues.push(PlanIssue::NoRounds);
        }
        for (i, round) in self.rounds.iter().enumerate() {
            if round.work_time == 0 {
                issues.push(PlanIssue::ZeroWorkTime { round: i + 1 });
            }
            if round.exercises.is_empty() {
                issues.push(PlanIssue::EmptyCombination { round: i + 1 });
            }
        }
        for (index, ex) in self.cooldown.iter().enumerate() {
            if ex.playable_secs().is_none() {
                issues.push(PlanIssue::NonPositiveCooldown {
                    index,
                    name: ex.name.clone(),
                });
            }
        }
        if let Some(min) = self.total_duration {
            let authored_secs = u64::from(min) * 60;
            let segment_secs = self.segment_secs();
            if authored_secs != segment_secs {
                issues.push(PlanIssue::TotalDrift {
                    authored_secs,
                    segment_secs,
                });
            }
        }
        issues
    }

    /// A short three-round boxing session used by the CLI when no plan file
    /// is given.
    pub fn sample_boxing() -> Self {
        let combo = |names: &[(&str, i64)]| {
            names
                .iter()
                .map(|(n, d)| Exercise::new(*n, *d))
                .collect::<Vec<_>>()
        };
        Self {
            title: "Sample Boxing".into(),
            workout_type: WorkoutType::Boxing,
            total_duration: None,
            warmup: combo(&[
                ("Jumping Jacks", 30),
                ("Arm Circles", 30),
                ("Shadow Boxing", 60),
            ]),
            rounds: vec![
                Round::new(180, 60).with_exercises(combo(&[
                    ("Jab", 30),
                    ("Jab Cross", 45),
                    ("Hook", 45),
                    ("Freestyle", 60),
                ])),
                Round::new(180, 60).with_exercises(combo(&[
                    ("Double Jab", 45),
                    ("Cross Hook Cross", 60),
                    ("Slip and Counter", 75),
                ])),
                Round::new(180, 0).with_exercises(combo(&[
                    ("Uppercuts", 60),
                    ("Body Shots", 60),
                    ("Burnout", 60),
                ])),
            ],
            cooldown: combo(&[("Shoulder Stretch", 30), ("Hamstring Stretch", 45)]),
        }
    }
}

fn playable_sum<'a>(exercises: impl Iterator<Item = &'a Exercise>) -> u64 {
    exercises
        .filter_map(Exercise::playable_secs)
        .map(u64::from)
        .sum()
}

fn next_playable(list: &[Exercise], from: usize) -> Option<usize> {
    list.iter()
        .enumerate()
        .skip(from)
        .find(|(_, ex)| ex.playable_secs().is_some())
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_plan_totals() {
        let plan = WorkoutPlan::sample_boxing();
        assert_eq!(plan.total_rounds(), 3);
        assert_eq!(plan.warmup_secs(), 120);
        assert_eq!(plan.rounds_secs(), 240 + 240 + 180);
        assert_eq!(plan.cooldown_secs(), 75);
        assert_eq!(plan.estimated_total_secs(), 120 + 660 + 75);
    }

    #[test]
    fn authored_total_wins_over_segments() {
        let plan = WorkoutPlan {
            total_duration: Some(20),
            ..WorkoutPlan::sample_boxing()
        };
        assert_eq!(plan.estimated_total_secs(), 1200);
        assert!(plan
            .issues()
            .iter()
            .any(|i| matches!(i, PlanIssue::TotalDrift { authored_secs: 1200, .. })));
    }

    #[test]
    fn non_positive_exercises_are_not_playable() {
        assert_eq!(Exercise::new("x", 0).playable_secs(), None);
        assert_eq!(Exercise::new("x", -5).playable_secs(), None);
        assert_eq!(Exercise::new("x", 0).combo_secs(), DEFAULT_EXERCISE_SECS);
        assert_eq!(Exercise::new("x", 12).playable_secs(), Some(12));
    }

    #[test]
    fn next_playable_skips_malformed_entries() {
        let plan = WorkoutPlan {
            warmup: vec![Exercise::new("a", 10), Exercise::new("b", 0), Exercise::new("c", 15)],
            ..Default::default()
        };
        assert_eq!(plan.next_playable_warmup(0), Some(0));
        assert_eq!(plan.next_playable_warmup(1), Some(2));
        assert_eq!(plan.next_playable_warmup(3), None);
        assert_eq!(plan.warmup_secs_before(2), 10);
    }

    #[test]
    fn round_lookup_is_one_based() {
        let plan = WorkoutPlan::sample_boxing();
        assert!(plan.round(0).is_none());
        assert_eq!(plan.round(3).map(|r| r.rest_time), Some(0));
        assert!(plan.round(4).is_none());
        assert_eq!(plan.round_secs_before(3), 480);
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "title": "App plan",
            "workoutType": "gym",
            "totalDuration": 12,
            "warmup": [{"name": "Squats", "duration": 30, "description": "slow"}],
            "rounds": [{"workTime": 60, "restTime": 30, "exercises": []}],
            "cooldown": []
        }"#;
        let plan = WorkoutPlan::from_json(json).unwrap();
        assert_eq!(plan.workout_type, WorkoutType::Gym);
        assert_eq!(plan.total_duration, Some(12));
        assert_eq!(plan.rounds[0].rest_time, 30);
        assert_eq!(plan.warmup[0].description, "slow");
    }

    #[test]
    fn parses_toml() {
        let toml = r#"
            title = "Toml plan"
            [[rounds]]
            work_time = 90
            [[rounds.exercises]]
            name = "Jab"
            duration = 30
        "#;
        let plan = WorkoutPlan::from_toml(toml).unwrap();
        assert_eq!(plan.workout_type, WorkoutType::Boxing);
        assert_eq!(plan.rounds[0].rest_time, 0);
        assert_eq!(plan.rounds[0].exercises[0].name, "Jab");
    }

    #[test]
    fn rejects_unknown_workout_type() {
        assert!("yoga".parse::<WorkoutType>().is_err());
        assert_eq!("Boxing".parse::<WorkoutType>().unwrap(), WorkoutType::Boxing);
    }
}
