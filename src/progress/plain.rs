//! Line-per-event writer for non-interactive output.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use super::cancel::{CancellationToken, Control, Signal};
use super::event::Event;
use super::{Output, Writer, DRY_RUN_PREFIX};
use crate::error::{ComposeError, Result};

/// Prints each event as soon as it arrives.
pub struct PlainWriter {
    out: Mutex<Output>,
    control: Control,
    dry_run: bool,
}

impl fmt::Debug for PlainWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainWriter")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl PlainWriter {
    /// Create a plain writer.
    pub fn new(out: Output, dry_run: bool) -> Self {
        Self {
            out: Mutex::new(out),
            control: Control::new(),
            dry_run,
        }
    }

    fn prefix(&self) -> &'static str {
        if self.dry_run {
            DRY_RUN_PREFIX
        } else {
            ""
        }
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

impl Writer for PlainWriter {
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
        let mut line = format!("{}{}", self.prefix(), event.id);
        for part in [&event.text, &event.status_text] {
            if !part.is_empty() {
                line.push(' ');
                line.push_str(part);
            }
        }
        self.write_line(&line);
    }

    fn tail_msgf(&self, args: fmt::Arguments<'_>) {
        self.write_line(&format!("{}{}", self.prefix(), args));
    }
}
