//! Progress reporting for long-running operations.
//!
//! Operations report [`Event`]s to a [`Writer`]. The writer chosen by
//! [`new_writer`] decides how they are shown:
//! - [`TtyWriter`] redraws a live block in an interactive terminal
//! - [`PlainWriter`] prints one line per event
//! - [`JsonWriter`] prints one JSON object per event
//! - [`NoopWriter`] discards everything
//!
//! [`run`] wires a writer to an operation: the writer renders on its own
//! thread while the operation runs, and the operation's result is returned.
//!
//! # Example
//!
//! ```
//! use compose_core::progress::{run, Event, Mode, RenderConfig};
//!
//! let config = RenderConfig::new(Mode::Plain).with_color(false);
//! let result = run(&config, Box::new(std::io::sink()), false, |w| {
//!     w.event(Event::creating("web"));
//!     w.event(Event::created("web"));
//!     Ok(42)
//! });
//! assert_eq!(result.unwrap(), 42);
//! ```

pub mod ansi;
mod cancel;
pub mod event;
pub mod json;
pub mod plain;
pub mod spinner;
pub mod theme;
pub mod tty;

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::thread;

pub use cancel::CancellationToken;
pub use event::{Event, EventStatus};
pub use json::{JsonMessage, JsonWriter};
pub use plain::PlainWriter;
pub use spinner::Spinner;
pub use theme::{should_use_colors, ProgressTheme};
pub use tty::{TerminalSize, TtyWriter};

use crate::error::Result;

/// Prefix marking output of a dry run.
pub const DRY_RUN_PREFIX: &str = "DRY-RUN MODE - ";

/// Destination for rendered output.
pub type Output = Box<dyn Write + Send>;

/// Receives progress events for an operation.
///
/// All methods take `&self`; writers are shared between the rendering thread
/// and any number of producer threads.
pub trait Writer: Send + Sync {
    /// Render until [`stop`](Self::stop) is called or `cancel` fires.
    ///
    /// Returns [`ComposeError::Cancelled`](crate::ComposeError::Cancelled)
    /// when cancelled.
    fn start(&self, cancel: &CancellationToken) -> Result<()>;

    /// Ask [`start`](Self::start) to return after a final render.
    fn stop(&self);

    /// Report one event.
    fn event(&self, event: Event);

    /// Report several events.
    fn events(&self, events: Vec<Event>) {
        for event in events {
            self.event(event);
        }
    }

    /// Queue a message to print after progress output.
    fn tail_msgf(&self, args: fmt::Arguments<'_>);
}

/// How progress is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Live display on a terminal, plain lines otherwise.
    #[default]
    Auto,
    /// Always the live display.
    Tty,
    /// One line per event.
    Plain,
    /// Nothing.
    Quiet,
    /// One JSON object per event.
    Json,
}

impl Mode {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Tty => "tty",
            Mode::Plain => "plain",
            Mode::Quiet => "quiet",
            Mode::Json => "json",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Mode::Auto),
            "tty" => Ok(Mode::Tty),
            "plain" => Ok(Mode::Plain),
            "quiet" => Ok(Mode::Quiet),
            "json" => Ok(Mode::Json),
            other => Err(format!(
                "unknown progress mode: {} (expected auto, tty, plain, quiet or json)",
                other
            )),
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Output mode.
    pub mode: Mode,
    /// Whether to emit colors.
    pub color: bool,
    /// Prefix output with [`DRY_RUN_PREFIX`].
    pub dry_run: bool,
    /// Title of the live display's header line.
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Auto,
            color: should_use_colors(),
            dry_run: false,
            title: "Running".to_string(),
        }
    }
}

impl RenderConfig {
    /// Defaults with the given mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Enable or disable colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Enable or disable dry-run prefixes.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the header title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Writer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWriter;

impl Writer for NoopWriter {
    fn start(&self, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }

    fn stop(&self) {}

    fn event(&self, _event: Event) {}

    fn tail_msgf(&self, _args: fmt::Arguments<'_>) {}
}

/// Pick a writer for `config`.
///
/// `is_terminal` tells whether `out` is an interactive terminal; it only
/// matters in [`Mode::Auto`].
pub fn new_writer(config: &RenderConfig, out: Output, is_terminal: bool) -> Box<dyn Writer> {
    let writer: Box<dyn Writer> = match config.mode {
        Mode::Quiet => Box::new(NoopWriter),
        Mode::Tty => Box::new(TtyWriter::new(out, config.clone())),
        Mode::Auto if is_terminal => Box::new(TtyWriter::new(out, config.clone())),
        Mode::Json => Box::new(JsonWriter::new(out, config.dry_run)),
        Mode::Auto | Mode::Plain => Box::new(PlainWriter::new(out, config.dry_run)),
    };
    tracing::debug!("Progress mode {} (terminal: {})", config.mode, is_terminal);
    writer
}

/// Run `operation` while a writer built from `config` renders its progress.
///
/// Returns the operation's own result; rendering problems never fail it.
pub fn run<T>(
    config: &RenderConfig,
    out: Output,
    is_terminal: bool,
    operation: impl FnOnce(&dyn Writer) -> Result<T>,
) -> Result<T> {
    let writer = new_writer(config, out, is_terminal);
    run_with_writer(writer.as_ref(), &CancellationToken::new(), operation)
}

/// Run `operation` while `writer` renders on a separate thread.
///
/// The writer is stopped when the operation returns, even by panicking, and
/// the rendering thread is joined before this returns.
pub fn run_with_writer<T>(
    writer: &dyn Writer,
    cancel: &CancellationToken,
    operation: impl FnOnce(&dyn Writer) -> Result<T>,
) -> Result<T> {
    thread::scope(|scope| {
        let renderer = scope.spawn(|| writer.start(cancel));
        let result = {
            let _stop = StopOnDrop(writer);
            operation(writer)
        };
        match renderer.join() {
            Ok(Err(e)) => tracing::debug!("Progress renderer ended: {}", e),
            Err(_) => tracing::warn!("Progress renderer panicked"),
            Ok(Ok(())) => {}
        }
        result
    })
}

struct StopOnDrop<'a>(&'a dyn Writer);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::SharedBuffer;
    use super::*;
    use crate::error::ComposeError;

    #[test]
    fn mode_parses() {
        assert_eq!("auto".parse::<Mode>().unwrap(), Mode::Auto);
        assert_eq!("TTY".parse::<Mode>().unwrap(), Mode::Tty);
        assert_eq!("json".parse::<Mode>().unwrap(), Mode::Json);
        assert!("fancy".parse::<Mode>().is_err());
    }

    #[test]
    fn mode_display_round_trips() {
        for mode in [Mode::Auto, Mode::Tty, Mode::Plain, Mode::Quiet, Mode::Json] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn auto_without_terminal_is_plain() {
        let buffer = SharedBuffer::default();
        let config = RenderConfig::new(Mode::Auto).with_color(false);
        let writer = new_writer(&config, Box::new(buffer.clone()), false);
        writer.event(Event::created("web"));
        assert_eq!(buffer.contents(), "web Created\n");
    }

    #[test]
    fn quiet_writes_nothing() {
        let buffer = SharedBuffer::default();
        let config = RenderConfig::new(Mode::Quiet);
        let result = run(&config, Box::new(buffer.clone()), true, |w| {
            w.event(Event::created("web"));
            w.tail_msgf(format_args!("bye"));
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn json_mode_selected() {
        let buffer = SharedBuffer::default();
        let config = RenderConfig::new(Mode::Json).with_dry_run(true);
        let writer = new_writer(&config, Box::new(buffer.clone()), true);
        writer.event(Event::created("web"));
        assert!(buffer.contents().starts_with("{\"dry-run\":true,"));
    }

    #[test]
    fn run_returns_operation_result() {
        let buffer = SharedBuffer::default();
        let config = RenderConfig::new(Mode::Tty)
            .with_color(false)
            .with_title("Pulling");
        let result = run(&config, Box::new(buffer.clone()), true, |w| {
            w.event(Event::creating("web"));
            w.event(Event::created("web"));
            Ok("status")
        });
        assert_eq!(result.unwrap(), "status");
        assert!(buffer.contents().contains("[+] Pulling 1/1"));
    }

    #[test]
    fn run_returns_operation_error() {
        let config = RenderConfig::new(Mode::Plain);
        let result: Result<()> = run(&config, Box::new(std::io::sink()), false, |_| {
            Err(ComposeError::invalid_template("${"))
        });
        assert!(result.unwrap_err().is_invalid_template());
    }

    #[test]
    fn cancelled_renderer_does_not_fail_operation() {
        let writer = PlainWriter::new(Box::new(std::io::sink()), false);
        let token = CancellationToken::new();
        token.cancel();
        let result = run_with_writer(&writer, &token, |_| Ok(7));
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn noop_writer_start_returns_immediately() {
        assert!(NoopWriter.start(&CancellationToken::new()).is_ok());
    }
}
