//! Newline-delimited JSON writer.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::cancel::{CancellationToken, Control, Signal};
use super::event::Event;
use super::{Output, Writer};
use crate::error::{ComposeError, Result};

/// One line of JSON progress output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonMessage {
    /// Set when running in dry-run mode.
    #[serde(rename = "dry-run", default, skip_serializing_if = "is_false")]
    pub dry_run: bool,

    /// Set for messages printed after the progress block.
    #[serde(default, skip_serializing_if = "is_false")]
    pub tail: bool,

    /// Task id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Task description or tail message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Status text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Writes one JSON object per event.
pub struct JsonWriter {
    out: Mutex<Output>,
    control: Control,
    dry_run: bool,
}

impl fmt::Debug for JsonWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWriter")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl JsonWriter {
    /// Create a JSON writer.
    pub fn new(out: Output, dry_run: bool) -> Self {
        Self {
            out: Mutex::new(out),
            control: Control::new(),
            dry_run,
        }
    }

    fn write_message(&self, message: &JsonMessage) {
        let Ok(line) = serde_json::to_string(message) else {
            return;
        };
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

impl Writer for JsonWriter {
    fn start(&self, cancel: &CancellationToken) -> Result<()> {
        match self.control.wait(cancel, None, || {}) {
            Signal::Stop => Ok(()),
            Signal::Cancel => Err(ComposeError::Cancelled),
        }
    }

    fn stop(&self) {
        self.control.stop();
    }

    fn event(&self, event: Event) {
        self.write_message(&JsonMessage {
            dry_run: self.dry_run,
            tail: false,
            id: event.id,
            text: event.text,
            status: event.status_text,
        });
    }

    fn tail_msgf(&self, args: fmt::Arguments<'_>) {
        self.write_message(&JsonMessage {
            dry_run: self.dry_run,
            tail: true,
            text: args.to_string(),
            ..JsonMessage::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::testing::SharedBuffer;

    #[test]
    fn event_line() {
        let buffer = SharedBuffer::default();
        let w = JsonWriter::new(Box::new(buffer.clone()), false);
        w.event(Event::created("web").with_text("container"));
        assert_eq!(
            buffer.contents(),
            "{\"id\":\"web\",\"text\":\"container\",\"status\":\"Created\"}\n"
        );
    }

    #[test]
    fn tail_line() {
        let buffer = SharedBuffer::default();
        let w = JsonWriter::new(Box::new(buffer.clone()), true);
        w.tail_msgf(format_args!("{} done", 2));
        assert_eq!(
            buffer.contents(),
            "{\"dry-run\":true,\"tail\":true,\"text\":\"2 done\"}\n"
        );
    }

    #[test]
    fn one_object_per_line() {
        let buffer = SharedBuffer::default();
        let w = JsonWriter::new(Box::new(buffer.clone()), false);
        w.events(vec![Event::starting("a"), Event::error_message("b", "boom")]);
        let messages: Vec<JsonMessage> = buffer
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].status, "boom");
    }
}
