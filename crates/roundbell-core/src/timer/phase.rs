use serde::{Deserialize, Serialize};

/// Coarse stage of a session.
///
/// `Preview` is the pre-session marker: the plan is loaded but the session
/// has not been started (or was fully reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Preview,
    Preparation,
    Warmup,
    Workout,
    Cooldown,
    Finished,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Preview => "preview",
            Phase::Preparation => "preparation",
            Phase::Warmup => "warmup",
            Phase::Workout => "workout",
            Phase::Cooldown => "cooldown",
            Phase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the session is within the plan.
///
/// Only the session mutates this; hosts get shared references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub phase: Phase,
    /// 1-based round number.
    pub round: u32,
    pub warmup_index: usize,
    pub cooldown_index: usize,
    pub is_rest: bool,
    pub is_post_warmup_rest: bool,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self {
            phase: Phase::Preview,
            round: 1,
            warmup_index: 0,
            cooldown_index: 0,
            is_rest: false,
            is_post_warmup_rest: false,
        }
    }
}

impl PhaseState {
    /// True for any segment where the athlete is resting: round rests and
    /// the rest after the warm-up.
    pub fn is_resting(&self) -> bool {
        match self.phase {
            Phase::Workout => self.is_rest,
            Phase::Warmup => self.is_post_warmup_rest,
            _ => false,
        }
    }

    /// True while a work segment of a round is active.
    pub fn is_round_work(&self) -> bool {
        self.phase == Phase::Workout && !self.is_rest
    }
}

/// Fixed segment lengths that are not part of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTiming {
    pub preparation_secs: u32,
    pub post_warmup_rest_secs: u32,
}

impl Default for SegmentTiming {
    fn default() -> Self {
        Self {
            preparation_secs: 10,
            post_warmup_rest_secs: 60,
        }
    }
}
