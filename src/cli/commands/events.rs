//! Events command implementation.
//!
//! The `compose-core events` command replays a recorded stream of progress
//! events through the selected progress writer. Each input line is a JSON
//! event object, or `{"tail": "..."}` for a trailing message.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::args::EventsArgs;
use crate::error::{ComposeError, Result};
use crate::progress::{self, Event, RenderConfig, Writer};

use super::dispatcher::{Command, CommandResult};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Tail { tail: String },
    Event(Event),
}

/// The events command implementation.
pub struct EventsCommand {
    render: RenderConfig,
    args: EventsArgs,
}

impl EventsCommand {
    /// Create a new events command.
    pub fn new(render: RenderConfig, args: EventsArgs) -> Self {
        Self { render, args }
    }

    /// Feed every line of `input` to `writer`, returning the number of
    /// events sent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` for a line that is neither an event nor a
    /// tail message.
    pub fn replay(&self, input: impl BufRead, writer: &dyn Writer) -> Result<usize> {
        let source = self.source_path();
        let mut count = 0;
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed: ReplayLine =
                serde_json::from_str(line).map_err(|e| ComposeError::ConfigParseError {
                    path: source.clone(),
                    message: format!("line {}: {}", index + 1, e),
                })?;
            match parsed {
                ReplayLine::Tail { tail } => writer.tail_msgf(format_args!("{}", tail)),
                ReplayLine::Event(event) => {
                    writer.event(event);
                    count += 1;
                }
            }
        }
        tracing::debug!("Replayed {} events from {}", count, source.display());
        Ok(count)
    }

    fn source_path(&self) -> PathBuf {
        self.args
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from("<stdin>"))
    }

    fn open(&self) -> Result<Box<dyn BufRead>> {
        match &self.args.file {
            Some(path) => Ok(Box::new(BufReader::new(open_file(path)?))),
            None => Ok(Box::new(io::stdin().lock())),
        }
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ComposeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ComposeError::Io(e)
        }
    })
}

impl Command for EventsCommand {
    /// Progress goes to the process stdout, which the writer needs to own;
    /// `out` is flushed first so earlier output stays ordered.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        out.flush()?;
        let input = self.open()?;
        let config = self.render.clone().with_title(self.args.title.clone());
        let is_terminal = console::Term::stdout().is_term();
        progress::run(&config, Box::new(io::stdout()), is_terminal, |writer| {
            self.replay(input, writer)
        })?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{EventStatus, Mode, TtyWriter};
    use std::io::Cursor;

    fn command() -> EventsCommand {
        EventsCommand::new(RenderConfig::new(Mode::Tty).with_color(false), EventsArgs::default())
    }

    #[test]
    fn replays_events_and_tail() {
        let writer = TtyWriter::new(Box::new(io::sink()), RenderConfig::new(Mode::Tty));
        let input = Cursor::new(
            r#"{"id":"web","status":"working","status_text":"Creating"}

{"id":"web","status":"done","status_text":"Created"}
{"tail":"attached to web"}
"#,
        );
        let count = command().replay(input, &writer).unwrap();
        assert_eq!(count, 2);
        let web = writer.snapshot("web").unwrap();
        assert_eq!(web.status, EventStatus::Done);
        assert!(web.end_time().is_some());
    }

    #[test]
    fn reports_bad_line_number() {
        let writer = progress::NoopWriter;
        let input = Cursor::new("{\"id\":\"a\"}\nnot json\n");
        let err = command().replay(input, &writer).unwrap_err();
        match err {
            ComposeError::ConfigParseError { path, message } => {
                assert_eq!(path, PathBuf::from("<stdin>"));
                assert!(message.starts_with("line 2:"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let cmd = EventsCommand::new(
            RenderConfig::new(Mode::Quiet),
            EventsArgs {
                file: Some(PathBuf::from("/nonexistent/events.jsonl")),
                ..EventsArgs::default()
            },
        );
        let result = cmd.execute(&mut Vec::new());
        assert!(matches!(result, Err(ComposeError::ConfigNotFound { .. })));
    }
}
