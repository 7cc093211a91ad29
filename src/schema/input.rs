//! Host input delivered to the turn sequencer.

use serde::{Deserialize, Serialize};

/// A discrete user action, queued by the host and consumed by the
/// sequencer at the start of the next step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// The advance button (or key) was pressed. While a reveal is running
    /// this skips to the end of the line instead.
    Advance,
    /// The player clicked the choice carrying this index.
    SelectChoice(usize),
    /// Open or close the backlog panel.
    ToggleBacklog,
    /// The backlog viewport moved; 1.0 is the top, 0.0 the bottom.
    BacklogScrolled(f32),
}

/// Snapshot of the auto/skip toggles, read once per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    pub auto: bool,
    pub skip: bool,
}

impl Toggles {
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn auto() -> Self {
        Self {
            auto: true,
            skip: false,
        }
    }

    pub fn skip() -> Self {
        Self {
            auto: false,
            skip: true,
        }
    }
}

/// Per-frame input: elapsed time and the toggle snapshot for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Unscaled seconds since the previous frame.
    pub delta: f32,
    pub toggles: Toggles,
}

impl Frame {
    pub fn new(delta: f32, toggles: Toggles) -> Self {
        Self { delta, toggles }
    }
}
