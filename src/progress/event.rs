//! Progress events.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::spinner::Spinner;

/// State of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Still running.
    #[default]
    Working,
    /// Finished successfully.
    Done,
    /// Failed.
    Error,
    /// Finished with a warning.
    Warning,
}

impl EventStatus {
    /// Whether the task has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        !matches!(self, EventStatus::Working)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Working => "working",
            EventStatus::Done => "done",
            EventStatus::Error => "error",
            EventStatus::Warning => "warning",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "working" => Ok(EventStatus::Working),
            "done" => Ok(EventStatus::Done),
            "error" => Ok(EventStatus::Error),
            "warning" => Ok(EventStatus::Warning),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// A status update for one task.
///
/// Events with the same `id` describe the same task. Writers merge them, so a
/// producer only needs to send what changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    /// Task identifier.
    pub id: String,

    /// Identifier of the parent task, empty for top-level tasks.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,

    /// Short description shown next to the id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Task state.
    #[serde(default)]
    pub status: EventStatus,

    /// Status shown in the status column.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_text: String,

    /// Work done so far, in bytes.
    #[serde(default)]
    pub current: u64,

    /// Total work, in bytes. Zero when unknown.
    #[serde(default)]
    pub total: u64,

    /// Completion, 0 to 100.
    #[serde(default)]
    pub percent: u8,

    #[serde(skip)]
    start_time: Option<Instant>,

    #[serde(skip)]
    end_time: Option<Instant>,

    #[serde(skip)]
    spinner: Spinner,
}

macro_rules! lifecycle_events {
    ($($(#[$doc:meta])* $working:ident => $working_text:literal, $done:ident => $done_text:literal;)*) => {
        impl Event {
            $(
                $(#[$doc])*
                pub fn $working(id: impl Into<String>) -> Self {
                    Self::new(id, EventStatus::Working, $working_text)
                }

                $(#[$doc])*
                pub fn $done(id: impl Into<String>) -> Self {
                    Self::new(id, EventStatus::Done, $done_text)
                }
            )*
        }
    };
}

lifecycle_events! {
    /// Container creation.
    creating => "Creating", created => "Created";
    /// Container start.
    starting => "Starting", started => "Started";
    /// Container stop.
    stopping => "Stopping", stopped => "Stopped";
    /// Container removal.
    removing => "Removing", removed => "Removed";
    /// Container kill.
    killing => "Killing", killed => "Killed";
    /// Container restart.
    restarting => "Restarting", restarted => "Restarted";
    /// Health check.
    waiting => "Waiting", healthy => "Healthy";
}

impl Event {
    /// Create an event with a status and status text.
    pub fn new(id: impl Into<String>, status: EventStatus, status_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            status_text: status_text.into(),
            ..Self::default()
        }
    }

    /// A finished container that is still running.
    pub fn running(id: impl Into<String>) -> Self {
        Self::new(id, EventStatus::Done, "Running")
    }

    /// A container that exited.
    pub fn exited(id: impl Into<String>) -> Self {
        Self::new(id, EventStatus::Done, "Exited")
    }

    /// A failed task with the generic status text.
    pub fn error(id: impl Into<String>) -> Self {
        Self::new(id, EventStatus::Error, "Error")
    }

    /// A failed task with a custom status text.
    pub fn error_message(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, EventStatus::Error, message)
    }

    /// Set the parent task.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self
    }

    /// Set the description.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set byte progress, deriving the percentage when `total` is known.
    pub fn with_progress(mut self, current: u64, total: u64) -> Self {
        self.current = current;
        self.total = total;
        if total > 0 {
            self.percent = (current.min(total).saturating_mul(100) / total) as u8;
        }
        self
    }

    /// Set the completion percentage, clamped to 100.
    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = percent.min(100);
        self
    }

    /// When the writer first saw this task.
    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    /// When the task last reached a terminal state.
    pub fn end_time(&self) -> Option<Instant> {
        self.end_time
    }

    /// The task's spinner.
    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    /// Time spent so far, frozen once the task has stopped.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let Some(start) = self.start_time else {
            return Duration::ZERO;
        };
        let end = self.end_time.unwrap_or(now);
        end.saturating_duration_since(start)
    }

    /// Initialize tracking for a task seen for the first time.
    pub(crate) fn begin(&mut self, now: Instant) {
        self.start_time = Some(now);
        self.end_time = None;
        self.spinner = Spinner::new();
        self.percent = self.percent.min(100);
        if self.status.is_terminal() {
            self.stop(now);
        }
    }

    /// Freeze the timer and the spinner.
    pub(crate) fn stop(&mut self, now: Instant) {
        self.end_time = Some(now);
        self.spinner.stop();
    }

    /// Resume a stopped task.
    pub(crate) fn has_more(&mut self) {
        self.end_time = None;
        self.spinner.restart();
    }

    /// Fold a newer update for the same task into this one.
    ///
    /// Progress counters never move backwards, and a known parent is only
    /// replaced when one side has none.
    pub(crate) fn merge(&mut self, update: Event, now: Instant) {
        match update.status {
            EventStatus::Done | EventStatus::Error | EventStatus::Warning => {
                if self.end_time.is_none() {
                    self.stop(now);
                }
            }
            EventStatus::Working => self.has_more(),
        }

        self.status = update.status;
        self.text = update.text;
        self.status_text = update.status_text;
        self.current = self.current.max(update.current);
        self.total = self.total.max(update.total);
        self.percent = self.percent.max(update.percent.min(100));
        if self.parent_id.is_empty() || update.parent_id.is_empty() {
            self.parent_id = update.parent_id;
        }
    }
}
