//! Status notification port.
//!
//! Mirrors the running session somewhere outside the main screen: a lock
//! screen widget, a tray icon, a terminal status line. Failures are logged
//! by the runner and otherwise ignored.

use crate::error::NotifyError;
use crate::view::SessionView;

pub trait StatusNotifier {
    fn start(&mut self, view: &SessionView) -> Result<(), NotifyError>;

    fn update(&mut self, view: &SessionView) -> Result<(), NotifyError>;

    fn stop(&mut self) -> Result<(), NotifyError>;
}

impl<N: StatusNotifier + ?Sized> StatusNotifier for Box<N> {
    fn start(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        (**self).start(view)
    }

    fn update(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        (**self).update(view)
    }

    fn stop(&mut self) -> Result<(), NotifyError> {
        (**self).stop()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl StatusNotifier for NullNotifier {
    fn start(&mut self, _view: &SessionView) -> Result<(), NotifyError> {
        Ok(())
    }

    fn update(&mut self, _view: &SessionView) -> Result<(), NotifyError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Remembers the last view it was shown. Used by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub started: bool,
    pub stopped: bool,
    pub updates: usize,
    pub last: Option<SessionView>,
}

impl StatusNotifier for RecordingNotifier {
    fn start(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        self.started = true;
        self.last = Some(view.clone());
        Ok(())
    }

    fn update(&mut self, view: &SessionView) -> Result<(), NotifyError> {
        self.updates += 1;
        self.last = Some(view.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), NotifyError> {
        self.stopped = true;
        Ok(())
    }
}
