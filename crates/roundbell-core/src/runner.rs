//! Drives a [`WorkoutSession`] in real time.
//!
//! The runner owns the once-per-second tick and the collaborators that sit
//! around a session: a status notifier and the workout history. User input
//! arrives over an mpsc channel; produced events can be forwarded to the host.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::announce::Announcer;
use crate::error::HistoryError;
use crate::events::Event;
use crate::notify::StatusNotifier;
use crate::summary::{HistorySink, WorkoutSummary};
use crate::timer::{UserAction, WorkoutSession};
use crate::view::SessionView;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The session reached `Finished`. `save_error` is set when the history
    /// refused the summary; the host decides whether to retry.
    Finished {
        summary: WorkoutSummary,
        save_error: Option<HistoryError>,
    },
    /// The athlete left (or the input channel closed) before the end.
    Abandoned { view: SessionView },
}

pub struct SessionRunner<A, N, H> {
    session: WorkoutSession<A>,
    notifier: N,
    history: H,
    tick_period: Duration,
    notes: Option<String>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl<A, N, H> SessionRunner<A, N, H>
where
    A: Announcer,
    N: StatusNotifier,
    H: HistorySink,
{
    pub fn new(session: WorkoutSession<A>, notifier: N, history: H) -> Self {
        Self {
            session,
            notifier,
            history,
            tick_period: Duration::from_secs(1),
            notes: None,
            events: None,
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Notes attached to the summary before it is recorded.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Forward every produced event to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn session(&self) -> &WorkoutSession<A> {
        &self.session
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Start the session and run it until it finishes or the athlete leaves.
    pub async fn run(&mut self, mut actions: mpsc::Receiver<UserAction>) -> RunOutcome {
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let started = self.session.start();
        self.publish(started);
        if let Err(e) = self.notifier.start(&self.session.view()) {
            tracing::warn!("{}", e);
        }

        while !self.session.is_finished() {
            tokio::select! {
                biased;
                action = actions.recv() => match action {
                    Some(UserAction::Back) | None => return self.abandon(),
                    Some(action) => {
                        let events = self.session.apply(action);
                        self.publish(events);
                    }
                },
                _ = ticker.tick() => {
                    let events = self.session.tick();
                    self.publish(events);
                }
            }
            if let Err(e) = self.notifier.update(&self.session.view()) {
                tracing::warn!("{}", e);
            }
        }

        self.stop_notifier();
        let Some(summary) = self.session.summary().cloned() else {
            return RunOutcome::Abandoned {
                view: self.session.view(),
            };
        };
        let summary = match self.notes.clone() {
            Some(notes) => summary.with_notes(notes),
            None => summary,
        };
        let save_error = self.save(&summary).err();
        RunOutcome::Finished {
            summary,
            save_error,
        }
    }

    /// Record a summary, e.g. again after a failed save.
    pub fn save(&mut self, summary: &WorkoutSummary) -> Result<(), HistoryError> {
        self.history.record(summary).map_err(|e| {
            tracing::warn!("Could not save workout {}: {}", summary.session_id, e);
            e
        })
    }

    fn abandon(&mut self) -> RunOutcome {
        if let Some(event) = self.session.pause() {
            self.publish(vec![event]);
        }
        self.stop_notifier();
        tracing::info!("Session {} abandoned", self.session.session_id());
        RunOutcome::Abandoned {
            view: self.session.view(),
        }
    }

    fn stop_notifier(&mut self) {
        if let Err(e) = self.notifier.stop() {
            tracing::warn!("{}", e);
        }
    }

    fn publish(&mut self, events: Vec<Event>) {
        let Some(tx) = &self.events else {
            return;
        };
        let delivered = events.into_iter().all(|event| tx.send(event).is_ok());
        if !delivered {
            tracing::debug!("Event receiver dropped");
            self.events = None;
        }
    }
}
