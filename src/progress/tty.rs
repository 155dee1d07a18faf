//! In-place terminal renderer.
//!
//! The writer keeps the latest state of every task and redraws the whole
//! block on a fixed interval, moving the cursor back over the previous frame
//! first. Producers only touch the shared state; all drawing happens on the
//! thread running [`Writer::start`].

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::ansi::{
    align, cursor_reposition, human_size, truncate_status, visible_width, HIDE_CURSOR,
    SHOW_CURSOR,
};
use super::cancel::{CancellationToken, Control, Signal};
use super::event::{Event, EventStatus};
use super::theme::ProgressTheme;
use super::{Output, RenderConfig, Writer, DRY_RUN_PREFIX};
use crate::error::{ComposeError, Result};

/// Redraw interval.
pub const TICK: Duration = Duration::from_millis(100);

const PERCENT_CHARS: &[&str] = &["⠀", "⡀", "⣀", "⣄", "⣤", "⣦", "⣶", "⣷", "⣿"];
const CHILD_PAD: &str = "  ";

/// Terminal dimensions used for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalSize {
    /// Ask the terminal on every frame.
    Detect,
    /// Fixed size.
    Fixed {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
}

impl TerminalSize {
    /// `(rows, cols)`.
    pub fn get(self) -> (usize, usize) {
        match self {
            TerminalSize::Detect => {
                let (rows, cols) = console::Term::stdout().size();
                (rows as usize, cols as usize)
            }
            TerminalSize::Fixed { rows, cols } => (rows, cols),
        }
    }
}

/// Renders progress as a live block of lines.
pub struct TtyWriter {
    inner: Mutex<TtyInner>,
    control: Control,
    config: RenderConfig,
    theme: ProgressTheme,
    size: TerminalSize,
}

struct TtyInner {
    out: Output,
    state: TtyState,
}

#[derive(Default)]
struct TtyState {
    events: HashMap<String, Event>,
    event_ids: Vec<String>,
    num_lines: Option<usize>,
    skip_child_events: bool,
    tail_events: Vec<String>,
}

impl fmt::Debug for TtyWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtyWriter")
            .field("config", &self.config)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl TtyWriter {
    /// Create a writer that detects the terminal size.
    pub fn new(out: Output, config: RenderConfig) -> Self {
        Self {
            inner: Mutex::new(TtyInner {
                out,
                state: TtyState::default(),
            }),
            control: Control::new(),
            theme: ProgressTheme::for_color(config.color),
            config,
            size: TerminalSize::Detect,
        }
    }

    /// Use a fixed terminal size instead of detecting it.
    pub fn with_size(mut self, rows: usize, cols: usize) -> Self {
        self.size = TerminalSize::Fixed { rows, cols };
        self
    }

    /// Draw one frame now.
    pub fn render(&self) {
        let (rows, cols) = self.size.get();
        let mut inner = self.lock();
        let TtyInner { out, state } = &mut *inner;
        if state.event_ids.is_empty() {
            return;
        }
        let frame = state.render_frame(&self.config, &self.theme, cols, rows, Instant::now());
        let _ = out.write_all(frame.as_bytes());
        let _ = out.flush();
    }

    /// Latest merged state of a task.
    pub fn snapshot(&self, id: &str) -> Option<Event> {
        self.lock().state.events.get(id).cloned()
    }

    /// Task ids in first-seen order.
    pub fn event_ids(&self) -> Vec<String> {
        self.lock().state.event_ids.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TtyInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn print_tail_events(&self) {
        let mut inner = self.lock();
        let TtyInner { out, state } = &mut *inner;
        for message in state.tail_events.drain(..) {
            let _ = writeln!(out, "{}", message);
        }
        let _ = out.flush();
    }
}

impl Writer for TtyWriter {
    fn start(&self, cancel: &CancellationToken) -> Result<()> {
        let signal = self.control.wait(cancel, Some(TICK), || self.render());
        self.render();
        self.print_tail_events();
        match signal {
            Signal::Stop => Ok(()),
            Signal::Cancel => Err(ComposeError::Cancelled),
        }
    }

    fn stop(&self) {
        self.control.stop();
    }

    fn event(&self, event: Event) {
        self.lock().state.apply(event, Instant::now());
    }

    fn events(&self, events: Vec<Event>) {
        let now = Instant::now();
        let mut inner = self.lock();
        for event in events {
            inner.state.apply(event, now);
        }
    }

    fn tail_msgf(&self, args: fmt::Arguments<'_>) {
        self.lock().state.tail_events.push(args.to_string());
    }
}

impl TtyState {
    fn apply(&mut self, event: Event, now: Instant) {
        match self.events.get_mut(&event.id) {
            Some(existing) => existing.merge(event, now),
            None => {
                let mut event = event;
                event.begin(now);
                self.event_ids.push(event.id.clone());
                self.events.insert(event.id.clone(), event);
            }
        }
    }

    fn known_parent(&self, event: &Event) -> Option<&Event> {
        if event.parent_id == event.id {
            return None;
        }
        self.events.get(&event.parent_id)
    }

    /// Whether `event` is drawn under its parent. Only top-level events
    /// have children, so self references and cycles draw at the top level.
    fn is_child(&self, event: &Event) -> bool {
        self.known_parent(event)
            .is_some_and(|parent| self.known_parent(parent).is_none())
    }

    fn children<'a>(&'a self, parent: &'a Event) -> impl Iterator<Item = &'a Event> + 'a {
        self.event_ids
            .iter()
            .filter_map(|id| self.events.get(id))
            .filter(move |e| e.parent_id == parent.id && self.is_child(e))
    }

    /// Column at which status text starts.
    fn status_column(&self) -> usize {
        self.event_ids
            .iter()
            .filter_map(|id| self.events.get(id))
            .map(|e| {
                let pad = if self.is_child(e) { CHILD_PAD.len() } else { 0 };
                pad + visible_width(&e.id) + 1 + visible_width(&e.text)
            })
            .max()
            .unwrap_or(0)
    }

    fn render_frame(
        &mut self,
        config: &RenderConfig,
        theme: &ProgressTheme,
        width: usize,
        height: usize,
        now: Instant,
    ) -> String {
        let mut frame = cursor_reposition(self.num_lines);
        frame.push_str(HIDE_CURSOR);

        let total = self.events.len();
        let done = self
            .events
            .values()
            .filter(|e| e.status == EventStatus::Done)
            .count();
        let header = format!("[+] {} {}/{}", config.title, done, total);
        if total > 0 && done == total {
            frame.push_str(&theme.done.apply_to(header).to_string());
        } else {
            frame.push_str(&header);
        }
        frame.push('\n');

        let limit = height.saturating_sub(2);
        if self.event_ids.len() > limit {
            self.skip_child_events = true;
        }

        let status_column = self.status_column();
        let mut lines = 0;
        for id in &self.event_ids {
            let Some(event) = self.events.get(id) else {
                continue;
            };
            if self.is_child(event) {
                continue;
            }
            let line = self.line_text(event, "", width, status_column, config, theme, now);
            frame.push_str(&line);
            frame.push('\n');
            lines += 1;

            if self.skip_child_events {
                continue;
            }
            for child in self.children(event) {
                let line = self.line_text(child, CHILD_PAD, width, status_column, config, theme, now);
                frame.push_str(&line);
                frame.push('\n');
                lines += 1;
            }
        }

        let previous = self.num_lines.unwrap_or(0);
        while lines < previous && lines < limit {
            frame.push_str(&" ".repeat(width));
            frame.push('\n');
            lines += 1;
        }

        frame.push_str(SHOW_CURSOR);
        self.num_lines = Some(lines);
        frame
    }

    #[allow(clippy::too_many_arguments)]
    fn line_text(
        &self,
        event: &Event,
        pad: &str,
        width: usize,
        status_column: usize,
        config: &RenderConfig,
        theme: &ProgressTheme,
        now: Instant,
    ) -> String {
        let mut hide_details = false;
        let mut current = 0u64;
        let mut total = 0u64;
        let mut completion = String::new();
        let mut children = 0;

        if event.status == EventStatus::Working {
            for child in self.children(event) {
                if child.status == EventStatus::Working && child.total == 0 {
                    hide_details = true;
                }
                current = current.saturating_add(child.current);
                total = total.saturating_add(child.total);
                completion.push_str(percent_glyph(child.percent));
                children += 1;
            }
        }
        if total == 0 {
            hide_details = true;
        }

        let txt = if children > 0 {
            let details = if hide_details {
                String::new()
            } else {
                format!(" {:>7} / {:<7}", human_size(current), human_size(total))
            };
            format!(
                "{} [{}]{} {}",
                event.id,
                theme.success.apply_to(completion),
                details,
                event.text
            )
        } else {
            format!("{} {}", event.id, event.text)
        };

        let text_len = visible_width(&txt);
        let padding = status_column.saturating_sub(pad.len() + text_len);
        let max_status = width.saturating_sub(text_len + status_column + 15);
        let status = truncate_status(&event.status_text, max_status);

        let prefix = if config.dry_run {
            theme.prefix.apply_to(DRY_RUN_PREFIX).to_string()
        } else {
            String::new()
        };
        let glyph = theme.glyph(event, event.spinner().frame(now));
        let left = format!(
            "{} {} {}{}{} {}",
            pad,
            glyph,
            prefix,
            txt,
            " ".repeat(padding),
            theme.status_text(event.status, &status)
        );
        let timer = format!("{:.1}s ", event.elapsed(now).as_secs_f64());
        align(&left, &theme.timer.apply_to(timer).to_string(), width)
    }
}

fn percent_glyph(percent: u8) -> &'static str {
    let index = (PERCENT_CHARS.len() - 1) * usize::from(percent.min(100)) / 100;
    PERCENT_CHARS[index]
}
