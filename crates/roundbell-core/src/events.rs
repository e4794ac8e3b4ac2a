use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::summary::WorkoutSummary;
use crate::timer::{Phase, PhaseState};
use crate::view::SessionView;

/// Every state change of a session produces an Event.
/// Hosts render from them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        title: String,
        total_rounds: u32,
        at: DateTime<Utc>,
    },
    /// A new timed segment began.
    SegmentStarted {
        phase: Phase,
        round: u32,
        is_rest: bool,
        label: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// The active exercise inside a round changed.
    ExerciseChanged {
        round: u32,
        index: usize,
        name: String,
        at: DateTime<Utc>,
    },
    /// A warm-up or cooldown entry with no usable duration was passed over.
    MalformedExerciseSkipped {
        phase: Phase,
        index: usize,
        name: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// A budgeted skip is waiting for the athlete to confirm.
    SkipConfirmationRequested {
        prompt: String,
        at: DateTime<Utc>,
    },
    SkipCancelled {
        at: DateTime<Utc>,
    },
    SkipRejected {
        reason: String,
        at: DateTime<Utc>,
    },
    SegmentSkipped {
        from: PhaseState,
        to: PhaseState,
        skips_used: u32,
        at: DateTime<Utc>,
    },
    MuteChanged {
        muted: bool,
        at: DateTime<Utc>,
    },
    IndicesReset {
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    SessionFinished {
        summary: WorkoutSummary,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        view: SessionView,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-readable name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "session_started",
            Event::SegmentStarted { .. } => "segment_started",
            Event::ExerciseChanged { .. } => "exercise_changed",
            Event::MalformedExerciseSkipped { .. } => "malformed_exercise_skipped",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::SkipConfirmationRequested { .. } => "skip_confirmation_requested",
            Event::SkipCancelled { .. } => "skip_cancelled",
            Event::SkipRejected { .. } => "skip_rejected",
            Event::SegmentSkipped { .. } => "segment_skipped",
            Event::MuteChanged { .. } => "mute_changed",
            Event::IndicesReset { .. } => "indices_reset",
            Event::SessionReset { .. } => "session_reset",
            Event::SessionFinished { .. } => "session_finished",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
