//! Skip policy.
//!
//! Whether the athlete may skip the current segment depends only on where the
//! session is, the mode, and how much of the skip budget is left. The policy
//! is a pure function; the session applies it.

use serde::{Deserialize, Serialize};

use super::phase::{Phase, PhaseState};

/// Default per-session budget for warm-up and cooldown skips.
pub const DEFAULT_SKIP_BUDGET: u32 = 99;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipMode {
    #[default]
    Normal,
    /// Allows skipping work segments, for testing plans quickly.
    Debug,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipState {
    pub skips_used: u32,
    /// A confirmation prompt is waiting for an answer.
    pub pending_confirmation: bool,
}

/// Outcome of asking whether the current segment can be skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipDecision {
    pub allowed: bool,
    pub needs_confirmation: bool,
    /// Whether an executed skip is charged to the budget.
    pub consumes_budget: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SkipDecision {
    fn free() -> Self {
        Self {
            allowed: true,
            needs_confirmation: false,
            consumes_budget: false,
            reason: None,
        }
    }

    fn budgeted() -> Self {
        Self {
            allowed: true,
            needs_confirmation: true,
            consumes_budget: true,
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            needs_confirmation: false,
            consumes_budget: false,
            reason: Some(reason.into()),
        }
    }
}

pub fn evaluate(state: &PhaseState, mode: SkipMode, skips: &SkipState, budget: u32) -> SkipDecision {
    if state.is_resting() {
        return SkipDecision::free();
    }
    match state.phase {
        Phase::Preparation => SkipDecision::free(),
        Phase::Warmup | Phase::Cooldown => {
            if skips.skips_used >= budget {
                SkipDecision::rejected(format!("No skips left ({budget} used)"))
            } else {
                SkipDecision::budgeted()
            }
        }
        Phase::Workout => match mode {
            SkipMode::Debug => SkipDecision::free(),
            SkipMode::Normal => SkipDecision::rejected("Rounds can't be skipped"),
        },
        Phase::Preview => SkipDecision::rejected("Session has not started"),
        Phase::Finished => SkipDecision::rejected("Session is finished"),
    }
}

/// Prompt shown before a budgeted skip.
pub fn confirmation_text(state: &PhaseState, skips: &SkipState, budget: u32) -> String {
    let what = match state.phase {
        Phase::Cooldown => "cooldown exercise",
        _ => "warm-up exercise",
    };
    let left = budget.saturating_sub(skips.skips_used);
    format!("Skip this {what}? {left} skips left.")
}
