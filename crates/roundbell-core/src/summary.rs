//! Completed-session summary and the history collaborator it is handed to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HistoryError;
use crate::plan::WorkoutType;

/// Calories burned per minute for each workout type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieRates {
    #[serde(default = "default_boxing")]
    pub boxing: f64,
    #[serde(default = "default_gym")]
    pub gym: f64,
    #[serde(default = "default_running")]
    pub running: f64,
}

fn default_boxing() -> f64 {
    12.0
}
fn default_gym() -> f64 {
    8.0
}
fn default_running() -> f64 {
    11.0
}

impl Default for CalorieRates {
    fn default() -> Self {
        Self {
            boxing: default_boxing(),
            gym: default_gym(),
            running: default_running(),
        }
    }
}

impl CalorieRates {
    pub fn per_minute(&self, workout_type: WorkoutType) -> f64 {
        match workout_type {
            WorkoutType::Boxing => self.boxing,
            WorkoutType::Gym => self.gym,
            WorkoutType::Running => self.running,
        }
    }

    /// `round(minutes * rate)`.
    pub fn estimate(&self, workout_type: WorkoutType, duration_secs: u64) -> u32 {
        let minutes = duration_secs as f64 / 60.0;
        let kcal = (minutes * self.per_minute(workout_type)).round();
        if kcal <= 0.0 {
            0
        } else {
            kcal.min(f64::from(u32::MAX)) as u32
        }
    }
}

/// What a finished session exports to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub session_id: Uuid,
    pub title: String,
    pub workout_type: WorkoutType,
    /// Seconds the timer actually ran, pauses excluded.
    pub duration_secs: u64,
    pub estimated_calories: u32,
    pub skips_used: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl WorkoutSummary {
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }

    pub fn duration_min(&self) -> u64 {
        self.duration_secs / 60
    }
}

/// Records finished workouts. Failures go back to the host, which may offer
/// a retry; they never touch the timer.
pub trait HistorySink {
    fn record(&mut self, summary: &WorkoutSummary) -> Result<(), HistoryError>;
}

impl<S: HistorySink + ?Sized> HistorySink for Box<S> {
    fn record(&mut self, summary: &WorkoutSummary) -> Result<(), HistoryError> {
        (**self).record(summary)
    }
}

/// In-memory history, for hosts without storage and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    records: Vec<WorkoutSummary>,
    reject_with: Option<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every record with `message`.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            reject_with: Some(message.into()),
        }
    }

    pub fn records(&self) -> &[WorkoutSummary] {
        &self.records
    }
}

impl HistorySink for MemoryHistory {
    fn record(&mut self, summary: &WorkoutSummary) -> Result<(), HistoryError> {
        if let Some(message) = &self.reject_with {
            return Err(HistoryError::Rejected(message.clone()));
        }
        self.records.push(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(duration_secs: u64) -> WorkoutSummary {
        WorkoutSummary {
            session_id: Uuid::new_v4(),
            title: "t".into(),
            workout_type: WorkoutType::Boxing,
            duration_secs,
            estimated_calories: 0,
            skips_used: 0,
            notes: None,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn calories_round_to_nearest() {
        let rates = CalorieRates::default();
        assert_eq!(rates.estimate(WorkoutType::Boxing, 600), 120);
        // 1.5 min * 8 = 12
        assert_eq!(rates.estimate(WorkoutType::Gym, 90), 12);
        // 13s * 11/60 = 2.38
        assert_eq!(rates.estimate(WorkoutType::Running, 13), 2);
        assert_eq!(rates.estimate(WorkoutType::Boxing, 0), 0);
    }

    #[test]
    fn blank_notes_are_dropped() {
        assert_eq!(summary(60).with_notes("   ").notes, None);
        assert_eq!(
            summary(60).with_notes("felt strong").notes.as_deref(),
            Some("felt strong")
        );
    }

    #[test]
    fn memory_history_records_and_rejects() {
        let mut ok = MemoryHistory::new();
        ok.record(&summary(60)).unwrap();
        assert_eq!(ok.records().len(), 1);

        let mut bad = MemoryHistory::rejecting("offline");
        assert!(matches!(
            bad.record(&summary(60)),
            Err(HistoryError::Rejected(m)) if m == "offline"
        ));
        assert!(bad.records().is_empty());
    }
}
