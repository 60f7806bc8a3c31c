//! Dirty tracking and debounced autosave.
//!
//! ```text
//!   Clean --edit--> Dirty --quiet period, id known--> Saving --ok--> Clean
//!                     ^                                  |
//!                     +------edit / manual save---- Error <--failed--+
//! ```
//!
//! The controller is a plain state machine: callers pass the current time
//! in and perform the persist call themselves when [`AutosaveController::poll`]
//! says so. Every edit restarts the quiet period (trailing debounce).

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    /// Nothing pending; no timer running.
    Clean,
    /// Unsaved edits; the quiet-period timer may be running.
    Dirty,
    /// A persist call is in flight.
    Saving,
    /// The last persist failed. The draft is intact.
    Error,
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaveState::Clean => "saved",
            SaveState::Dirty => "unsaved changes",
            SaveState::Saving => "saving",
            SaveState::Error => "save failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct AutosaveController {
    state: SaveState,
    delay: Duration,
    deadline: Option<Instant>,
    /// An edit arrived while a save was in flight.
    edited_while_saving: bool,
    last_error: Option<String>,
}

impl AutosaveController {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: SaveState::Clean,
            delay,
            deadline: None,
            edited_while_saving: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the running quiet-period timer expires, if one is running.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state != SaveState::Clean
    }

    /// The draft changed at `now`.
    pub fn on_edit(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        match self.state {
            SaveState::Saving => self.edited_while_saving = true,
            SaveState::Clean | SaveState::Dirty | SaveState::Error => {
                self.state = SaveState::Dirty;
            }
        }
        log::debug!("autosave: edit, state {:?}", self.state);
    }

    /// Check the timer. Returns `true` when the caller should persist now;
    /// the controller is then in `Saving` until told the outcome.
    ///
    /// Without a report id nothing fires: a new report must be created
    /// explicitly first. The edit stays pending.
    pub fn poll(&mut self, now: Instant, has_report_id: bool) -> bool {
        if self.state != SaveState::Dirty || !has_report_id {
            return false;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.state = SaveState::Saving;
                log::debug!("autosave: quiet period elapsed, saving");
                true
            }
            _ => false,
        }
    }

    /// A manual save or submit is starting. Cancels any pending timer so no
    /// trailing autosave duplicates it.
    pub fn begin_manual_save(&mut self) {
        self.deadline = None;
        self.edited_while_saving = false;
        self.state = SaveState::Saving;
    }

    /// The report got its first id. Pending edits now arm the timer.
    pub fn on_report_created(&mut self, now: Instant) {
        if self.state == SaveState::Dirty && self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
        }
    }

    pub fn on_save_succeeded(&mut self, now: Instant) {
        self.last_error = None;
        self.finish(now, SaveState::Clean);
    }

    pub fn on_save_failed(&mut self, now: Instant, error: impl Into<String>) {
        let error = error.into();
        log::debug!("autosave: save failed: {error}");
        self.last_error = Some(error);
        self.finish(now, SaveState::Error);
    }

    fn finish(&mut self, now: Instant, settled: SaveState) {
        if self.state != SaveState::Saving {
            return;
        }
        if std::mem::take(&mut self.edited_while_saving) {
            self.state = SaveState::Dirty;
            let rearm = now + self.delay;
            self.deadline = Some(self.deadline.map_or(rearm, |d| d.max(now)));
        } else {
            self.state = settled;
            self.deadline = None;
        }
    }
}

impl Default for AutosaveController {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}
