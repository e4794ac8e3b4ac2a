mod countdown;
mod phase;
mod session;
pub mod skip;

pub use countdown::{Completion, Countdown, TimerState};
pub use phase::{Phase, PhaseState, SegmentTiming};
pub use session::{SessionConfig, UserAction, WorkoutSession};
pub use skip::{SkipDecision, SkipMode, SkipState, DEFAULT_SKIP_BUDGET};
