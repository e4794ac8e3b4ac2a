use std::path::PathBuf;

use clap::Subcommand;
use roundbell_core::{
    Config, Event, HistoryDb, HistorySink, MemoryHistory, RecordingAnnouncer, RunOutcome,
    SessionConfig, SessionRunner, SkipMode, UserAction, WorkoutSession,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::console::{ConsoleAnnouncer, ConsoleNotifier};
use super::load_plan;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a workout in the terminal, reading commands from stdin
    Run {
        /// Plan file (.toml or .json); defaults to the built-in sample
        file: Option<PathBuf>,
        /// Allow skipping work segments
        #[arg(long)]
        debug: bool,
        /// Start with announcements muted
        #[arg(long)]
        mute: bool,
        /// Preparation countdown in seconds
        #[arg(long)]
        prep: Option<u32>,
        /// Notes stored with the finished workout
        #[arg(long)]
        notes: Option<String>,
        /// Do not record the workout in history
        #[arg(long)]
        no_save: bool,
    },
    /// Run a workout to the end without waiting in real time
    Simulate {
        /// Plan file (.toml or .json); defaults to the built-in sample
        file: Option<PathBuf>,
        /// Skip through every segment (debug mode)
        #[arg(long)]
        skip_all: bool,
        /// Preparation countdown in seconds
        #[arg(long)]
        prep: Option<u32>,
        /// Print every event as a JSON line
        #[arg(long)]
        events: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        SessionAction::Run {
            file,
            debug,
            mute,
            prep,
            notes,
            no_save,
        } => {
            let plan = load_plan(file.as_deref())?;
            let mut session_config = config.session_config();
            apply_overrides(&mut session_config, debug, prep);
            session_config.muted |= mute;

            let history: Box<dyn HistorySink> = if no_save {
                Box::new(MemoryHistory::new())
            } else {
                Box::new(HistoryDb::open()?)
            };
            let session = WorkoutSession::new(plan, session_config, ConsoleAnnouncer);
            let runner = SessionRunner::new(session, ConsoleNotifier::default(), history)
                .with_notes(notes);

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = rt.block_on(run_interactive(runner));
            // The stdin reader may still be blocked on a read.
            rt.shutdown_background();
            result
        }
        SessionAction::Simulate {
            file,
            skip_all,
            prep,
            events,
        } => {
            let plan = load_plan(file.as_deref())?;
            let mut session_config = config.session_config();
            apply_overrides(&mut session_config, skip_all, prep);
            simulate(
                WorkoutSession::new(plan, session_config, RecordingAnnouncer::new()),
                skip_all,
                events,
            )
        }
    }
}

fn apply_overrides(session_config: &mut SessionConfig, debug: bool, prep: Option<u32>) {
    if debug {
        session_config.skip_mode = SkipMode::Debug;
    }
    if let Some(secs) = prep {
        session_config.timing.preparation_secs = secs;
    }
}

async fn run_interactive(
    mut runner: SessionRunner<ConsoleAnnouncer, ConsoleNotifier, Box<dyn HistorySink>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (action_tx, action_rx) = mpsc::channel(16);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    runner = runner.with_events(event_tx);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_action(&line) {
                Some(action) => {
                    if action_tx.send(action).await.is_err() {
                        break;
                    }
                }
                None => eprintln!("unknown command: {}", line.trim()),
            }
        }
    });
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(message) = describe(&event) {
                println!("{message}");
            }
        }
    });

    match runner.run(action_rx).await {
        RunOutcome::Finished {
            summary,
            save_error,
        } => {
            if let Some(e) = save_error {
                eprintln!("warning: {e}; retrying");
                runner.save(&summary)?;
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        RunOutcome::Abandoned { view } => {
            println!("session abandoned");
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

/// Deterministic run: one tick per simulated second, no waiting.
fn simulate(
    mut session: WorkoutSession<RecordingAnnouncer>,
    skip_all: bool,
    print_events: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let emit = |events: Vec<Event>| -> Result<(), serde_json::Error> {
        if print_events {
            for event in events {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Ok(())
    };

    emit(session.start())?;
    while !session.is_finished() {
        if skip_all {
            let events = session.request_skip();
            let rejected = events
                .iter()
                .any(|e| matches!(e, Event::SkipRejected { .. }));
            emit(events)?;
            if session.skip_state().pending_confirmation {
                emit(session.confirm_skip())?;
            }
            if rejected {
                emit(session.tick())?;
            }
        } else {
            emit(session.tick())?;
        }
    }

    let summary = session
        .summary()
        .ok_or("simulation ended without a summary")?;
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

fn parse_action(line: &str) -> Option<UserAction> {
    match line.trim() {
        "" | "p" => Some(UserAction::PlayPause),
        "s" => Some(UserAction::Skip),
        "y" => Some(UserAction::ConfirmSkip),
        "n" => Some(UserAction::CancelSkip),
        "r" => Some(UserAction::Reset),
        "m" => Some(UserAction::Mute),
        "q" => Some(UserAction::Back),
        _ => None,
    }
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::SkipConfirmationRequested { prompt, .. } => Some(format!("{prompt} (y/n)")),
        Event::SkipRejected { reason, .. } => Some(format!("can't skip: {reason}")),
        Event::TimerPaused { .. } => Some("paused".to_string()),
        Event::TimerResumed { .. } => Some("resumed".to_string()),
        Event::MuteChanged { muted, .. } => {
            Some(if *muted { "muted" } else { "unmuted" }.to_string())
        }
        Event::SessionReset { .. } => Some("reset; press p to start again".to_string()),
        _ => None,
    }
}
