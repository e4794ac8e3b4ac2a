//! Announcement port.
//!
//! The session speaks through an [`Announcer`]. Speech synthesis, sound
//! playback and the like live behind this trait. Calls are fire-and-forget:
//! a failing back-end is logged and the session carries on.

use serde::{Deserialize, Serialize};

use crate::error::AnnounceError;
use crate::timer::Phase;

pub const PHRASE_GET_READY: &str = "Get ready";
pub const PHRASE_WARMUP: &str = "Warm-up";
pub const PHRASE_REST: &str = "Rest";
pub const PHRASE_WARMUP_DONE: &str = "Warm-up complete. Rest before the first round";
pub const PHRASE_COOLDOWN: &str = "Cooldown";
pub const PHRASE_FINISHED: &str = "Workout complete";

pub fn round_phrase(round: u32, total: u32) -> String {
    if round == total {
        "Final round".to_string()
    } else {
        format!("Round {round}")
    }
}

pub trait Announcer {
    fn announce_exercise(&mut self, name: &str) -> Result<(), AnnounceError>;

    fn speak(&mut self, phrase: &str) -> Result<(), AnnounceError>;

    /// 3-2-1 style cue before a boundary.
    fn speak_countdown(&mut self, n: u32) -> Result<(), AnnounceError>;
}

impl<A: Announcer + ?Sized> Announcer for Box<A> {
    fn announce_exercise(&mut self, name: &str) -> Result<(), AnnounceError> {
        (**self).announce_exercise(name)
    }

    fn speak(&mut self, phrase: &str) -> Result<(), AnnounceError> {
        (**self).speak(phrase)
    }

    fn speak_countdown(&mut self, n: u32) -> Result<(), AnnounceError> {
        (**self).speak_countdown(n)
    }
}

/// Announcer that says nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce_exercise(&mut self, _name: &str) -> Result<(), AnnounceError> {
        Ok(())
    }

    fn speak(&mut self, _phrase: &str) -> Result<(), AnnounceError> {
        Ok(())
    }

    fn speak_countdown(&mut self, _n: u32) -> Result<(), AnnounceError> {
        Ok(())
    }
}

/// One call made on an announcer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Announcement {
    Exercise(String),
    Phrase(String),
    Countdown(u32),
}

/// Keeps every call in order. Used by tests and the simulator.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnnouncer {
    log: Vec<Announcement>,
    fail: bool,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls but reports each one as failed.
    pub fn failing() -> Self {
        Self {
            log: Vec::new(),
            fail: true,
        }
    }

    pub fn log(&self) -> &[Announcement] {
        &self.log
    }

    pub fn take(&mut self) -> Vec<Announcement> {
        std::mem::take(&mut self.log)
    }

    pub fn countdowns(&self) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Announcement::Countdown(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn exercises(&self) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|a| match a {
                Announcement::Exercise(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, a: Announcement) -> Result<(), AnnounceError> {
        self.log.push(a);
        if self.fail {
            Err(AnnounceError("speech unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce_exercise(&mut self, name: &str) -> Result<(), AnnounceError> {
        self.push(Announcement::Exercise(name.to_string()))
    }

    fn speak(&mut self, phrase: &str) -> Result<(), AnnounceError> {
        self.push(Announcement::Phrase(phrase.to_string()))
    }

    fn speak_countdown(&mut self, n: u32) -> Result<(), AnnounceError> {
        self.push(Announcement::Countdown(n))
    }
}

/// Identifies one spoken countdown number: which boundary it leads up to and
/// which second it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueKey {
    pub phase: Phase,
    pub round: u32,
    /// Warm-up/cooldown index, or the exercise index within a round.
    pub index: usize,
    pub is_rest: bool,
    pub second: u32,
}

/// Guarantees each countdown number is spoken at most once, however often
/// the cue is evaluated. Holds only the last key spoken.
#[derive(Debug, Clone, Default)]
pub struct CueGuard {
    last: Option<CueKey>,
}

impl CueGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `key` has not just been spoken; records it.
    pub fn should_speak(&mut self, key: CueKey) -> bool {
        if self.last == Some(key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
