//! Colors and status glyphs for progress output.

use console::Style;

use super::event::{Event, EventStatus};

/// Style palette used by the progress writers.
#[derive(Debug, Clone)]
pub struct ProgressTheme {
    /// Finished tasks and the completion strip (green).
    pub success: Style,
    /// Warning glyph and status (yellow bold).
    pub warning: Style,
    /// Error glyph and status (red bold).
    pub error: Style,
    /// Header once every task is done (blue).
    pub done: Style,
    /// Elapsed time column (blue).
    pub timer: Style,
    /// Running spinner (yellow).
    pub count: Style,
    /// Dry-run prefix (cyan).
    pub prefix: Style,
}

impl Default for ProgressTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTheme {
    /// Colored palette.
    ///
    /// Styling is forced: the caller has already decided colors are wanted,
    /// even if the output is not stdout.
    pub fn new() -> Self {
        Self {
            success: Style::new().green().force_styling(true),
            warning: Style::new().yellow().bold().force_styling(true),
            error: Style::new().red().bold().force_styling(true),
            done: Style::new().blue().force_styling(true),
            timer: Style::new().blue().force_styling(true),
            count: Style::new().yellow().force_styling(true),
            prefix: Style::new().cyan().force_styling(true),
        }
    }

    /// Palette without colors.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            done: Style::new(),
            timer: Style::new(),
            count: Style::new(),
            prefix: Style::new(),
        }
    }

    /// Pick a palette from a color flag.
    pub fn for_color(color: bool) -> Self {
        if color {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Style for a status.
    pub fn status_style(&self, status: EventStatus) -> &Style {
        match status {
            EventStatus::Working => &self.count,
            EventStatus::Done => &self.success,
            EventStatus::Warning => &self.warning,
            EventStatus::Error => &self.error,
        }
    }

    /// Status glyph for `event`: the spinner frame while working.
    pub fn glyph(&self, event: &Event, frame: &str) -> String {
        let glyph = match event.status {
            EventStatus::Working => frame,
            EventStatus::Done => success_glyph(),
            EventStatus::Warning => "!",
            EventStatus::Error => "✘",
        };
        self.status_style(event.status).apply_to(glyph).to_string()
    }

    /// Status text colored by status.
    pub fn status_text(&self, status: EventStatus, text: &str) -> String {
        self.status_style(status).apply_to(text).to_string()
    }
}

fn success_glyph() -> &'static str {
    if cfg!(windows) {
        "-"
    } else {
        "✔"
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
