//! Terminal back-ends for the announcement and status ports.

use std::io::Write;

use roundbell_core::view::format_clock;
use roundbell_core::{AnnounceError, Announcer, NotifyError, SessionView, StatusNotifier};

/// Prints what a speech back-end would say.
#[derive(Debug, Default)]
pub struct ConsoleAnnouncer;

impl ConsoleAnnouncer {
    fn say(&self, line: &str) -> Result<(), AnnounceError> {
        writeln!(std::io::stdout(), ">> {line}").map_err(|e| AnnounceError(e.to_string()))
    }
}

impl Announcer for ConsoleAnnouncer {
    fn announce_exercise(&mut self, name: &str) -> Result<(), AnnounceError> {
        self.say(name)
    }

    fn speak(&mut self, phrase: &str) -> Result<(), AnnounceError> {
        self.say(phrase)
    }

    fn speak_countdown(&mut self, n: u32) -> Result<(), AnnounceError> {
        self.say(&n.to_string())
    }
}

/// One status line per second while the clock runs.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    last: Option<(String, u32)>,
}

impl ConsoleNotifier {
    fn print(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        let key = (view.phase.to_string(), view.time_left);
        if self.last.as_ref() == Some(&key) {
            return Ok(());
        }
        self.last = Some(key);
        writeln!(std::io::stdout(), "{}", status_line(view)).map_err(|e| NotifyError(e.to_string()))
    }
}

impl StatusNotifier for ConsoleNotifier {
    fn start(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        writeln!(
            std::io::stdout(),
            "p pause/resume, s skip, y/n confirm, r reset, m mute, q quit"
        )
        .map_err(|e| NotifyError(e.to_string()))?;
        self.print(view)
    }

    fn update(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        self.print(view)
    }

    fn stop(&mut self) -> Result<(), NotifyError> {
        self.last = None;
        Ok(())
    }
}

pub fn status_line(view: &SessionView) -> String {
    let mut label = match view.phase {
        roundbell_core::Phase::Workout => {
            let part = if view.is_rest { "rest" } else { "work" };
            format!("round {}/{} {part}", view.round, view.total_rounds)
        }
        roundbell_core::Phase::Warmup if view.is_post_warmup_rest => "warmup rest".to_string(),
        phase => phase.to_string(),
    };
    if let Some(ex) = &view.current_exercise {
        label.push_str(&format!(" | {}", ex.name));
    }
    if let Some(next) = &view.next_exercise_name {
        label.push_str(&format!(" | next: {next}"));
    }
    let state = if view.is_running { "" } else { " (paused)" };
    format!(
        "[{}] {label} | total {}{state}",
        view.clock(),
        format_clock(view.total_time_remaining)
    )
}
