//! Stage configuration, loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Bounds for the per-character reveal interval, in seconds.
pub const MIN_SECONDS_PER_CHAR: f32 = 0.001;
pub const MAX_SECONDS_PER_CHAR: f32 = 1.0;

/// Floor for the computed auto-advance wait, in seconds.
pub const MIN_AUTO_WAIT: f32 = 0.05;

/// Upper bound for the backlog auto-scroll threshold.
pub const MAX_AUTO_SCROLL_THRESHOLD: f32 = 0.2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Timing, backlog and labelling settings for the presenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Seconds between revealed characters.
    pub seconds_per_char: f32,
    /// Fixed part of the auto-advance wait.
    pub auto_base_wait: f32,
    /// Additional auto-advance wait per character of the line.
    pub auto_per_char_wait: f32,
    /// Maximum number of backlog entries; 0 keeps everything.
    pub backlog_max_entries: usize,
    /// Viewport position (1 = top, 0 = bottom) at or below which new
    /// backlog entries scroll the panel to the bottom.
    pub backlog_auto_scroll_threshold: f32,
    /// Speaker label used when recording the player's choices.
    pub player_label: String,
    /// Treat `<...>` markup as zero-width when counting revealed characters.
    pub rich_text: bool,
    /// Most lines one frame may present before yielding to the host.
    /// Only reachable in skip mode; values below 1 count as 1.
    pub max_lines_per_step: usize,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            seconds_per_char: 0.03,
            auto_base_wait: 0.8,
            auto_per_char_wait: 0.02,
            backlog_max_entries: 300,
            backlog_auto_scroll_threshold: 0.02,
            player_label: "Player".to_string(),
            rich_text: false,
            max_lines_per_step: 64,
        }
    }
}

impl PresenterConfig {
    /// Reveal interval clamped to a sane range.
    pub fn char_delay(&self) -> f32 {
        if self.seconds_per_char.is_nan() {
            return MIN_SECONDS_PER_CHAR;
        }
        self.seconds_per_char
            .clamp(MIN_SECONDS_PER_CHAR, MAX_SECONDS_PER_CHAR)
    }

    /// Auto-advance wait for a line of `char_count` characters.
    pub fn auto_wait(&self, char_count: usize) -> f32 {
        let wait = self.auto_base_wait + self.auto_per_char_wait * char_count as f32;
        wait.max(MIN_AUTO_WAIT)
    }

    pub fn lines_per_step(&self) -> usize {
        self.max_lines_per_step.max(1)
    }

    pub fn auto_scroll_threshold(&self) -> f32 {
        self.backlog_auto_scroll_threshold
            .clamp(0.0, MAX_AUTO_SCROLL_THRESHOLD)
    }
}

/// Top-level configuration for a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Entry point to jump to at startup; blank means start wherever the
    /// story begins on its own.
    pub start_knot: String,
    pub presenter: PresenterConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            start_knot: "start".to_string(),
            presenter: PresenterConfig::default(),
        }
    }
}

impl StageConfig {
    pub fn load_from_ron(path: &Path) -> Result<StageConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<StageConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
