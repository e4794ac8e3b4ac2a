//! View model handed to presentation.

use serde::{Deserialize, Serialize};

use crate::plan::Exercise;
use crate::timer::{Phase, SkipDecision};

/// Everything a phase screen needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: Phase,
    pub round: u32,
    pub total_rounds: u32,
    /// Seconds left in the current segment.
    pub time_left: u32,
    pub current_exercise: Option<Exercise>,
    pub next_exercise_name: Option<String>,
    /// Seconds left of the current exercise within a round's combination.
    pub combination_time_left: Option<u32>,
    /// Advisory; see [`crate::progress::total_session_seconds_remaining`].
    pub total_time_remaining: i64,
    pub is_running: bool,
    pub is_rest: bool,
    pub is_post_warmup_rest: bool,
    pub muted: bool,
    pub skip: SkipDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_prompt: Option<String>,
}

impl SessionView {
    /// `m:ss` rendering of `time_left`.
    pub fn clock(&self) -> String {
        format_clock(i64::from(self.time_left))
    }
}

/// `m:ss`, with a leading `-` for negative values.
pub fn format_clock(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    format!("{sign}{}:{:02}", secs / 60, secs % 60)
}
