//! # Roundbell Core Library
//!
//! This library provides the core logic for the Roundbell interval workout
//! timer. All operations are available through the standalone `roundbell`
//! CLI; any other front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session**: A tick-driven state machine walking a plan through
//!   preparation, warm-up, rounds and cooldown. The caller invokes `tick()`
//!   once per second.
//! - **Progress**: Pure calculations for the current exercise inside a round
//!   and the (advisory) time left in the whole session
//! - **Announcements**: Port for spoken cues, with 3-2-1 de-duplication
//! - **Storage**: SQLite-based workout history and TOML-based configuration
//! - **Runner**: tokio driver that owns the clock, user input and history
//!
//! ## Key Components
//!
//! - [`WorkoutSession`]: Core session state machine
//! - [`WorkoutPlan`]: Immutable plan the session walks
//! - [`HistoryDb`]: Workout history persistence
//! - [`Config`]: Application configuration management
//! - [`Announcer`]: Trait for speech back-ends

pub mod announce;
pub mod error;
pub mod events;
pub mod notify;
pub mod plan;
pub mod progress;
pub mod runner;
pub mod storage;
pub mod summary;
pub mod timer;
pub mod view;

pub use announce::{Announcement, Announcer, RecordingAnnouncer, SilentAnnouncer};
pub use error::{AnnounceError, ConfigError, CoreError, HistoryError, NotifyError, PlanError};
pub use events::Event;
pub use notify::{NullNotifier, StatusNotifier};
pub use plan::{Exercise, PlanIssue, Round, WorkoutPlan, WorkoutType};
pub use runner::{RunOutcome, SessionRunner};
pub use storage::{Config, HistoryDb, HistoryStats, WorkoutRecord};
pub use summary::{CalorieRates, HistorySink, MemoryHistory, WorkoutSummary};
pub use timer::{
    Phase, PhaseState, SegmentTiming, SessionConfig, SkipDecision, SkipMode, TimerState,
    UserAction, WorkoutSession,
};
pub use view::SessionView;
