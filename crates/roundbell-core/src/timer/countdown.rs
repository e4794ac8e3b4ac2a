//! Single-segment countdown.
//!
//! The countdown does not own a clock. The host calls `tick()` once per
//! second; while running each tick removes one second. The tick that reaches
//! zero stops the countdown and hands back a [`Completion`] tagged with the
//! generation of the `set_time_and_start` call it belongs to.

use serde::{Deserialize, Serialize};

/// Remaining time and run flag of the current segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_secs: u32,
    pub is_running: bool,
}

/// Proof that a countdown ran out. Only the completion of the latest
/// generation is current; anything older is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    generation: u64,
}

impl Completion {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Countdown {
    state: TimerState,
    /// Bumped by every `set_time_and_start` and `reset`.
    generation: u64,
    /// Set once the current generation has produced its completion.
    completed: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `completion` belongs to the countdown currently loaded.
    pub fn is_current(&self, completion: &Completion) -> bool {
        completion.generation == self.generation
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load a new segment and start it. Any completion still held from the
    /// previous segment becomes stale.
    ///
    /// Zero is ignored: a zero-length countdown would never complete.
    pub fn set_time_and_start(&mut self, seconds: u32) {
        if seconds == 0 {
            tracing::debug!("ignoring zero-length countdown");
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        self.completed = false;
        self.state = TimerState {
            remaining_secs: seconds,
            is_running: true,
        };
    }

    /// Flip between running and paused. Does nothing once the countdown has
    /// run out.
    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn pause(&mut self) {
        self.state.is_running = false;
    }

    pub fn resume(&mut self) {
        if self.state.remaining_secs > 0 {
            self.state.is_running = true;
        }
    }

    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.completed = false;
        self.state = TimerState::default();
    }

    /// Advance one second. Returns the completion on the tick that reaches
    /// zero, at most once per generation.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.state.is_running || self.state.remaining_secs == 0 {
            return None;
        }
        self.state.remaining_secs -= 1;
        if self.state.remaining_secs > 0 || self.completed {
            return None;
        }
        self.state.is_running = false;
        self.completed = true;
        Some(Completion {
            generation: self.generation,
        })
    }
}
