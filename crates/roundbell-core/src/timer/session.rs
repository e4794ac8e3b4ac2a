//! Workout session state machine.
//!
//! The session is tick-driven and owns no clock or thread. The host calls
//! `tick()` once per second and feeds user actions in between; every call
//! returns the events it produced.
//!
//! ## Transitions
//!
//! ```text
//! Preview -> Preparation -> Warmup[0..n] -> post-warm-up rest
//!         -> Workout (round r: work -> rest)* -> Cooldown[0..m] -> Finished
//! ```
//!
//! Empty warm-up or cooldown lists are passed over, as are entries whose
//! duration is not positive. A final round without rest goes straight on.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = WorkoutSession::new(plan, SessionConfig::default(), SilentAnnouncer);
//! session.start();
//! // Once per second:
//! for event in session.tick() { /* render */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::countdown::{Countdown, TimerState};
use super::phase::{Phase, PhaseState, SegmentTiming};
use super::skip::{self, SkipDecision, SkipMode, SkipState, DEFAULT_SKIP_BUDGET};
use crate::announce::{self, Announcer, CueGuard, CueKey, SilentAnnouncer};
use crate::events::Event;
use crate::plan::WorkoutPlan;
use crate::progress;
use crate::summary::{CalorieRates, WorkoutSummary};
use crate::view::SessionView;

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub timing: SegmentTiming,
    /// Countdown numbers spoken before a boundary. Zero disables the cue.
    pub countdown_cue_secs: u32,
    pub skip_budget: u32,
    pub skip_mode: SkipMode,
    pub muted: bool,
    pub calories: CalorieRates,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timing: SegmentTiming::default(),
            countdown_cue_secs: 3,
            skip_budget: DEFAULT_SKIP_BUDGET,
            skip_mode: SkipMode::Normal,
            muted: false,
            calories: CalorieRates::default(),
        }
    }
}

/// Input from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    PlayPause,
    Skip,
    ConfirmSkip,
    CancelSkip,
    Reset,
    /// Leave the session. The session only pauses; the host tears it down.
    Back,
    Mute,
}

pub struct WorkoutSession<A = SilentAnnouncer> {
    plan: WorkoutPlan,
    config: SessionConfig,
    announcer: A,
    countdown: Countdown,
    state: PhaseState,
    skips: SkipState,
    cues: CueGuard,
    /// (round, exercise index) last announced inside a work segment.
    announced_exercise: Option<(u32, usize)>,
    muted: bool,
    session_id: Uuid,
    /// Seconds the countdown actually ran.
    elapsed_secs: u64,
    summary: Option<WorkoutSummary>,
}

impl WorkoutSession<SilentAnnouncer> {
    pub fn silent(plan: WorkoutPlan, config: SessionConfig) -> Self {
        Self::new(plan, config, SilentAnnouncer)
    }
}

impl<A: Announcer> WorkoutSession<A> {
    /// Create a session in the `Preview` phase.
    pub fn new(plan: WorkoutPlan, config: SessionConfig, announcer: A) -> Self {
        let muted = config.muted;
        Self {
            plan,
            config,
            announcer,
            countdown: Countdown::new(),
            state: PhaseState::default(),
            skips: SkipState::default(),
            cues: CueGuard::new(),
            announced_exercise: None,
            muted,
            session_id: Uuid::new_v4(),
            elapsed_secs: 0,
            summary: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase_state(&self) -> &PhaseState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn timer_state(&self) -> TimerState {
        self.countdown.state()
    }

    pub fn skip_state(&self) -> &SkipState {
        &self.skips
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == Phase::Finished
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Present once the session reached `Finished`.
    pub fn summary(&self) -> Option<&WorkoutSummary> {
        self.summary.as_ref()
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut A {
        &mut self.announcer
    }

    pub fn total_seconds_remaining(&self) -> i64 {
        progress::total_session_seconds_remaining(
            &self.plan,
            &self.state,
            &self.countdown.state(),
            self.config.timing,
        )
    }

    pub fn can_skip(&self) -> SkipDecision {
        skip::evaluate(
            &self.state,
            self.config.skip_mode,
            &self.skips,
            self.config.skip_budget,
        )
    }

    pub fn needs_confirmation(&self) -> bool {
        let decision = self.can_skip();
        decision.allowed && decision.needs_confirmation
    }

    pub fn confirmation_text(&self) -> String {
        skip::confirmation_text(&self.state, &self.skips, self.config.skip_budget)
    }

    pub fn view(&self) -> SessionView {
        let timer = self.countdown.state();
        let elapsed =
            progress::segment_elapsed(&self.plan, &self.state, &timer, self.config.timing);
        let combo = self.round_exercises();

        let current_exercise = match self.state.phase {
            Phase::Warmup if !self.state.is_post_warmup_rest => {
                self.plan.warmup.get(self.state.warmup_index).cloned()
            }
            Phase::Cooldown => self.plan.cooldown.get(self.state.cooldown_index).cloned(),
            Phase::Workout if !self.state.is_rest => {
                progress::current_exercise_index(elapsed, combo).map(|i| combo[i].clone())
            }
            _ => None,
        };
        let combination_time_left = if self.state.is_round_work() {
            progress::exercise_time_left(elapsed, combo)
        } else {
            None
        };

        SessionView {
            phase: self.state.phase,
            round: self.state.round,
            total_rounds: self.plan.total_rounds(),
            time_left: timer.remaining_secs,
            current_exercise,
            next_exercise_name: progress::upcoming_exercise_name(&self.plan, &self.state, elapsed)
                .map(str::to_string),
            combination_time_left,
            total_time_remaining: self.total_seconds_remaining(),
            is_running: timer.is_running,
            is_rest: self.state.is_rest,
            is_post_warmup_rest: self.state.is_post_warmup_rest,
            muted: self.muted,
            skip: self.can_skip(),
            skip_prompt: self
                .skips
                .pending_confirmation
                .then(|| self.confirmation_text()),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            view: self.view(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Leave `Preview` and begin the preparation countdown.
    pub fn start(&mut self) -> Vec<Event> {
        if self.state.phase != Phase::Preview {
            return Vec::new();
        }
        tracing::info!(
            "Starting session {} ({} rounds)",
            self.session_id,
            self.plan.total_rounds()
        );
        let mut events = vec![Event::SessionStarted {
            title: self.plan.title.clone(),
            total_rounds: self.plan.total_rounds(),
            at: Utc::now(),
        }];
        self.enter_preparation(&mut events);
        events
    }

    pub fn toggle(&mut self) -> Vec<Event> {
        match self.state.phase {
            Phase::Preview => self.start(),
            Phase::Finished => Vec::new(),
            _ if self.countdown.is_running() => self.pause().into_iter().collect(),
            _ => self.resume().into_iter().collect(),
        }
    }

    /// Stop decrementing. Calling it again while paused does nothing.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.countdown.is_running() {
            return None;
        }
        self.countdown.pause();
        Some(Event::TimerPaused {
            remaining_secs: self.countdown.remaining_secs(),
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.countdown.is_running() || self.countdown.remaining_secs() == 0 {
            return None;
        }
        self.countdown.resume();
        Some(Event::TimerResumed {
            remaining_secs: self.countdown.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Advance one second.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.countdown.is_running() {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.elapsed_secs += 1;
        match self.countdown.tick() {
            Some(done) if self.countdown.is_current(&done) => self.complete_segment(&mut events),
            Some(done) => {
                tracing::debug!("Ignoring stale completion (generation {})", done.generation());
            }
            None => {
                self.follow_round_exercise(&mut events);
                self.countdown_cue();
            }
        }
        events
    }

    /// Skip the current segment, asking for confirmation first when the
    /// policy wants it. A rejected skip leaves the session untouched.
    pub fn request_skip(&mut self) -> Vec<Event> {
        let decision = self.can_skip();
        if !decision.allowed {
            return vec![rejected(decision)];
        }
        if decision.needs_confirmation {
            self.skips.pending_confirmation = true;
            return vec![Event::SkipConfirmationRequested {
                prompt: self.confirmation_text(),
                at: Utc::now(),
            }];
        }
        self.execute_skip(decision.consumes_budget)
    }

    pub fn confirm_skip(&mut self) -> Vec<Event> {
        if !self.skips.pending_confirmation {
            return Vec::new();
        }
        self.skips.pending_confirmation = false;
        let decision = self.can_skip();
        if !decision.allowed {
            return vec![rejected(decision)];
        }
        self.execute_skip(decision.consumes_budget)
    }

    pub fn cancel_skip(&mut self) -> Option<Event> {
        if !self.skips.pending_confirmation {
            return None;
        }
        self.skips.pending_confirmation = false;
        Some(Event::SkipCancelled { at: Utc::now() })
    }

    pub fn reset_budget(&mut self) {
        self.skips = SkipState::default();
    }

    /// Zero the warm-up/cooldown positions. Does not touch the timer, the
    /// round or the skip budget.
    pub fn reset_indices(&mut self) -> Event {
        self.state.warmup_index = 0;
        self.state.cooldown_index = 0;
        self.state.is_post_warmup_rest = false;
        Event::IndicesReset { at: Utc::now() }
    }

    /// Abandon progress and return to `Preview` so the plan can be reviewed
    /// and started again.
    pub fn reset(&mut self) -> Event {
        self.countdown.reset();
        self.reset_indices();
        self.state = PhaseState::default();
        self.reset_budget();
        self.cues.clear();
        self.announced_exercise = None;
        self.elapsed_secs = 0;
        self.summary = None;
        self.session_id = Uuid::new_v4();
        tracing::debug!("Session reset to preview");
        Event::SessionReset { at: Utc::now() }
    }

    pub fn set_muted(&mut self, muted: bool) -> Event {
        self.muted = muted;
        Event::MuteChanged {
            muted,
            at: Utc::now(),
        }
    }

    pub fn toggle_mute(&mut self) -> Event {
        self.set_muted(!self.muted)
    }

    pub fn apply(&mut self, action: UserAction) -> Vec<Event> {
        match action {
            UserAction::PlayPause => self.toggle(),
            UserAction::Skip => self.request_skip(),
            UserAction::ConfirmSkip => self.confirm_skip(),
            UserAction::CancelSkip => self.cancel_skip().into_iter().collect(),
            UserAction::Reset => vec![self.reset()],
            UserAction::Back => self.pause().into_iter().collect(),
            UserAction::Mute => vec![self.toggle_mute()],
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn complete_segment(&mut self, events: &mut Vec<Event>) {
        let st = self.state;
        match st.phase {
            Phase::Preparation => self.after_preparation(events),
            Phase::Warmup if st.is_post_warmup_rest => self.enter_round_work(1, events),
            Phase::Warmup => self.enter_warmup(st.warmup_index + 1, events),
            Phase::Workout if st.is_rest => self.enter_round_work(st.round + 1, events),
            Phase::Workout => self.after_round_work(events),
            Phase::Cooldown => self.enter_cooldown(st.cooldown_index + 1, events),
            Phase::Preview | Phase::Finished => {}
        }
    }

    fn enter_preparation(&mut self, events: &mut Vec<Event>) {
        self.state = PhaseState {
            phase: Phase::Preparation,
            ..PhaseState::default()
        };
        self.say(announce::PHRASE_GET_READY);
        let secs = self.config.timing.preparation_secs;
        if secs > 0 {
            self.start_segment(secs, announce::PHRASE_GET_READY, events);
        } else {
            self.after_preparation(events);
        }
    }

    fn after_preparation(&mut self, events: &mut Vec<Event>) {
        if self.plan.warmup.is_empty() {
            self.enter_round_work(1, events);
        } else {
            self.say(announce::PHRASE_WARMUP);
            self.enter_warmup(0, events);
        }
    }

    /// Start the first playable warm-up exercise at or after `from`, or the
    /// post-warm-up rest when none is left.
    fn enter_warmup(&mut self, from: usize, events: &mut Vec<Event>) {
        let Some(index) = self.first_playable(Phase::Warmup, from, events) else {
            self.enter_post_warmup_rest(events);
            return;
        };
        let exercise = self.plan.warmup[index].clone();
        self.state.phase = Phase::Warmup;
        self.state.warmup_index = index;
        self.state.is_rest = false;
        self.state.is_post_warmup_rest = false;
        tracing::debug!("Warm-up {}: {}", index, exercise.name);
        self.announce_exercise(&exercise.name);
        self.start_segment(exercise.combo_secs(), &exercise.name, events);
    }

    fn enter_post_warmup_rest(&mut self, events: &mut Vec<Event>) {
        self.state.phase = Phase::Warmup;
        self.state.warmup_index = self.plan.warmup.len().saturating_sub(1);
        self.state.is_rest = false;
        self.state.is_post_warmup_rest = true;
        self.say(announce::PHRASE_WARMUP_DONE);
        let secs = self.config.timing.post_warmup_rest_secs;
        if secs > 0 {
            self.start_segment(secs, announce::PHRASE_REST, events);
        } else {
            self.enter_round_work(1, events);
        }
    }

    /// Start the first round at or after `from` that has any work or rest
    /// time, or the cooldown when none is left.
    fn enter_round_work(&mut self, from: u32, events: &mut Vec<Event>) {
        let mut round = from;
        let (work_time, rest_time) = loop {
            let Some(r) = self.plan.round(round) else {
                self.enter_cooldown(0, events);
                return;
            };
            if r.work_time > 0 || r.rest_time > 0 {
                break (r.work_time, r.rest_time);
            }
            tracing::debug!("Round {} has no work or rest time, moving on", round);
            round = round.saturating_add(1);
        };
        self.state.phase = Phase::Workout;
        self.state.round = round;
        self.state.is_rest = false;
        self.state.is_post_warmup_rest = false;
        self.announced_exercise = None;
        tracing::debug!("Round {} of {}", round, self.plan.total_rounds());
        self.say(&announce::round_phrase(round, self.plan.total_rounds()));
        if work_time == 0 {
            tracing::debug!("Round {} has no work time, moving on", round);
            self.enter_round_rest(rest_time, events);
            return;
        }
        self.start_segment(work_time, &format!("Round {round}"), events);
        self.follow_round_exercise(events);
    }

    fn after_round_work(&mut self, events: &mut Vec<Event>) {
        let round = self.state.round;
        let rest_time = self.plan.round(round).map(|r| r.rest_time).unwrap_or(0);
        if rest_time == 0 {
            self.enter_round_work(round + 1, events);
        } else {
            self.enter_round_rest(rest_time, events);
        }
    }

    fn enter_round_rest(&mut self, rest_time: u32, events: &mut Vec<Event>) {
        self.state.is_rest = true;
        self.say(announce::PHRASE_REST);
        self.start_segment(rest_time, announce::PHRASE_REST, events);
    }

    fn enter_cooldown(&mut self, from: usize, events: &mut Vec<Event>) {
        if from == 0 && !self.plan.cooldown.is_empty() {
            self.say(announce::PHRASE_COOLDOWN);
        }
        let Some(index) = self.first_playable(Phase::Cooldown, from, events) else {
            self.finish(events);
            return;
        };
        let exercise = self.plan.cooldown[index].clone();
        self.state.phase = Phase::Cooldown;
        self.state.cooldown_index = index;
        self.state.is_rest = false;
        self.state.is_post_warmup_rest = false;
        tracing::debug!("Cooldown {}: {}", index, exercise.name);
        self.announce_exercise(&exercise.name);
        self.start_segment(exercise.combo_secs(), &exercise.name, events);
    }

    fn finish(&mut self, events: &mut Vec<Event>) {
        self.countdown.reset();
        self.state.phase = Phase::Finished;
        self.state.is_rest = false;
        self.state.is_post_warmup_rest = false;
        self.skips.pending_confirmation = false;
        self.say(announce::PHRASE_FINISHED);

        let summary = WorkoutSummary {
            session_id: self.session_id,
            title: self.plan.title.clone(),
            workout_type: self.plan.workout_type,
            duration_secs: self.elapsed_secs,
            estimated_calories: self
                .config
                .calories
                .estimate(self.plan.workout_type, self.elapsed_secs),
            skips_used: self.skips.skips_used,
            notes: None,
            completed_at: Utc::now(),
        };
        tracing::info!(
            "Session {} finished: {}s, ~{} kcal",
            summary.session_id,
            summary.duration_secs,
            summary.estimated_calories
        );
        self.summary = Some(summary.clone());
        events.push(Event::SessionFinished {
            summary,
            at: Utc::now(),
        });
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Index of the first warm-up/cooldown entry at or after `from` with a
    /// positive duration. Malformed entries on the way are reported and
    /// passed over.
    fn first_playable(&self, phase: Phase, from: usize, events: &mut Vec<Event>) -> Option<usize> {
        let list = match phase {
            Phase::Cooldown => &self.plan.cooldown,
            _ => &self.plan.warmup,
        };
        for (index, exercise) in list.iter().enumerate().skip(from) {
            if exercise.playable_secs().is_some() {
                return Some(index);
            }
            tracing::debug!(
                "Skipping {} exercise '{}' with duration {}",
                phase,
                exercise.name,
                exercise.duration
            );
            events.push(Event::MalformedExerciseSkipped {
                phase,
                index,
                name: exercise.name.clone(),
                at: Utc::now(),
            });
        }
        None
    }

    fn start_segment(&mut self, secs: u32, label: &str, events: &mut Vec<Event>) {
        self.countdown.set_time_and_start(secs);
        self.cues.clear();
        self.skips.pending_confirmation = false;
        events.push(Event::SegmentStarted {
            phase: self.state.phase,
            round: self.state.round,
            is_rest: self.state.is_resting(),
            label: label.to_string(),
            duration_secs: secs,
            at: Utc::now(),
        });
    }

    fn execute_skip(&mut self, consumes_budget: bool) -> Vec<Event> {
        let from = self.state;
        if consumes_budget {
            self.skips.skips_used += 1;
        }
        let mut events = Vec::new();
        self.complete_segment(&mut events);
        tracing::debug!("Skipped {} segment, {} skips used", from.phase, self.skips.skips_used);
        events.insert(
            0,
            Event::SegmentSkipped {
                from,
                to: self.state,
                skips_used: self.skips.skips_used,
                at: Utc::now(),
            },
        );
        events
    }

    fn round_exercises(&self) -> &[crate::plan::Exercise] {
        match self.state.phase {
            Phase::Workout => self
                .plan
                .round(self.state.round)
                .map(|r| r.exercises.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }

    fn round_elapsed(&self) -> u32 {
        progress::segment_elapsed(
            &self.plan,
            &self.state,
            &self.countdown.state(),
            self.config.timing,
        )
    }

    /// Announce the exercise that is active now if it has not been yet.
    fn follow_round_exercise(&mut self, events: &mut Vec<Event>) {
        if !self.state.is_round_work() {
            return;
        }
        let round = self.state.round;
        let elapsed = self.round_elapsed();
        let Some(index) = progress::current_exercise_index(elapsed, self.round_exercises()) else {
            return;
        };
        if self.announced_exercise == Some((round, index)) {
            return;
        }
        self.announced_exercise = Some((round, index));
        let name = self.round_exercises()[index].name.clone();
        self.announce_exercise(&name);
        events.push(Event::ExerciseChanged {
            round,
            index,
            name,
            at: Utc::now(),
        });
    }

    /// Speak 3-2-1 ahead of the next boundary: the end of the current
    /// exercise inside a round, or the end of the segment.
    fn countdown_cue(&mut self) {
        let cue_secs = self.config.countdown_cue_secs;
        if cue_secs == 0 || !self.countdown.is_running() {
            return;
        }
        let remaining = self.countdown.remaining_secs();
        let (index, to_boundary) = match self.state.phase {
            Phase::Warmup => (self.state.warmup_index, remaining),
            Phase::Cooldown => (self.state.cooldown_index, remaining),
            Phase::Workout if !self.state.is_rest => {
                let elapsed = self.round_elapsed();
                let combo = self.round_exercises();
                let index = progress::current_exercise_index(elapsed, combo).unwrap_or(0);
                let left = progress::exercise_time_left(elapsed, combo)
                    .filter(|left| *left > 0)
                    .map_or(remaining, |left| left.min(remaining));
                (index, left)
            }
            _ => (0, remaining),
        };
        if to_boundary == 0 || to_boundary > cue_secs {
            return;
        }
        let key = CueKey {
            phase: self.state.phase,
            round: self.state.round,
            index,
            is_rest: self.state.is_resting(),
            second: to_boundary,
        };
        if self.cues.should_speak(key) && !self.muted {
            if let Err(e) = self.announcer.speak_countdown(to_boundary) {
                tracing::warn!("Countdown cue failed: {}", e);
            }
        }
    }

    fn say(&mut self, phrase: &str) {
        if self.muted {
            return;
        }
        if let Err(e) = self.announcer.speak(phrase) {
            tracing::warn!("Announcement '{}' failed: {}", phrase, e);
        }
    }

    fn announce_exercise(&mut self, name: &str) {
        if self.muted {
            return;
        }
        if let Err(e) = self.announcer.announce_exercise(name) {
            tracing::warn!("Exercise announcement '{}' failed: {}", name, e);
        }
    }
}

fn rejected(decision: SkipDecision) -> Event {
    Event::SkipRejected {
        reason: decision
            .reason
            .unwrap_or_else(|| "Skipping is not allowed".to_string()),
        at: Utc::now(),
    }
}
