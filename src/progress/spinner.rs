//! Per-task spinner.

use std::cell::Cell;
use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_FRAMES: &[&str] = &["-", "\\", "|", "/"];

/// Minimum time between two frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// A spinner that advances at most once per [`FRAME_INTERVAL`].
///
/// Advancing only needs `&self`, so a renderer can draw spinners while it
/// holds shared references to the whole event set.
#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    done: &'static str,
    index: Cell<usize>,
    last_tick: Cell<Instant>,
    stopped: bool,
}

impl Spinner {
    /// Create a running spinner.
    pub fn new() -> Self {
        let (frames, done) = if cfg!(windows) {
            (ASCII_FRAMES, "-")
        } else {
            (FRAMES, "⠿")
        };
        Self {
            frames,
            done,
            index: Cell::new(0),
            last_tick: Cell::new(Instant::now()),
            stopped: false,
        }
    }

    /// Current frame, advancing if a frame interval has passed since `now`
    /// last moved it.
    pub fn frame(&self, now: Instant) -> &'static str {
        if self.stopped {
            return self.done;
        }
        if now.saturating_duration_since(self.last_tick.get()) >= FRAME_INTERVAL {
            self.index.set((self.index.get() + 1) % self.frames.len());
            self.last_tick.set(now);
        }
        self.frames[self.index.get()]
    }

    /// Freeze the spinner.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Resume a stopped spinner.
    pub fn restart(&mut self) {
        self.stopped = false;
        self.last_tick.set(Instant::now());
    }

    /// Whether the spinner is frozen.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}
