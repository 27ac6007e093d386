use crate::logic::sync::schedule::schedule_once;
use crate::logic::types::{Notification, Severity};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Where the status line is drawn
pub trait StatusView {
    fn show_status(&self, note: &Notification);
}

/// Single-slot transient notification with auto-reset.
///
/// Each announcement replaces whatever is shown and restarts the reset timer,
/// so the status line always shows the latest message for its full duration
/// and then falls back to [`Notification::ready`]. Earlier messages are lost.
pub struct StatusAnnouncer {
    view: Rc<dyn StatusView>,
    reset_after: Duration,
    pending_reset: RefCell<Option<JoinHandle<()>>>,
}

impl StatusAnnouncer {
    pub fn new(view: Rc<dyn StatusView>, reset_after: Duration) -> Self {
        Self {
            view,
            reset_after,
            pending_reset: RefCell::new(None),
        }
    }

    /// Must be called from inside a `LocalSet`.
    pub fn announce(&self, message: impl Into<String>, severity: Severity) {
        let note = Notification::new(message, severity);
        debug!(?severity, message = %note.message, "status");
        self.view.show_status(&note);

        let view = Rc::clone(&self.view);
        let reset = schedule_once(self.reset_after, async move {
            view.show_status(&Notification::ready());
        });
        if let Some(previous) = self.pending_reset.replace(Some(reset)) {
            previous.abort();
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.announce(message, Severity::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.announce(message, Severity::Error);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.announce(message, Severity::Info);
    }
}

impl Drop for StatusAnnouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_reset.get_mut().take() {
            pending.abort();
        }
    }
}
