//! Presentation controller — the dialogue box, the choice menu, the
//! advance control and the backlog panel, as plain state.
//!
//! The presenter owns no widgets. The host renders whatever [`View`] says
//! each frame and feeds user actions back in as [`InputEvent`]s.

use tracing::{debug, warn};

use crate::core::advance::{AdvanceOutcome, AdvanceWait};
use crate::core::backlog::{should_auto_scroll, Backlog};
use crate::core::config::PresenterConfig;
use crate::core::measure::{measure_for, TextMeasure};
use crate::core::reveal::{Reveal, RevealStatus};
use crate::schema::choice::{Choice, ChoiceDescriptor};
use crate::schema::input::{InputEvent, Toggles};

/// Normalized scroll position of the backlog bottom.
const SCROLL_BOTTOM: f32 = 0.0;
const SCROLL_TOP: f32 = 1.0;

pub struct Presenter {
    config: PresenterConfig,
    measure: Box<dyn TextMeasure>,
    speaker: String,
    reveal: Reveal,
    wait: AdvanceWait,
    advance_requested: bool,
    advance_visible: bool,
    advance_prev_visible: bool,
    choices: Vec<ChoiceDescriptor>,
    choices_visible: bool,
    selection: Option<usize>,
    backlog: Backlog,
    backlog_open: bool,
    backlog_scroll: f32,
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub speaker: &'a str,
    /// The whole line, including any markup.
    pub text: &'a str,
    /// The part of the line revealed so far.
    pub visible_text: &'a str,
    pub typing: bool,
    /// Choice buttons to draw, in order. Empty when the menu is hidden.
    pub choices: &'a [ChoiceDescriptor],
    pub advance_visible: bool,
    pub backlog_open: bool,
    pub backlog_scroll: f32,
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presenter")
            .field("speaker", &self.speaker)
            .field("reveal", &self.reveal)
            .field("choices", &self.choices)
            .field("backlog_len", &self.backlog.len())
            .finish_non_exhaustive()
    }
}

impl Presenter {
    pub fn new(config: PresenterConfig) -> Self {
        let measure = measure_for(config.rich_text);
        let backlog = Backlog::new(config.backlog_max_entries);
        Self {
            config,
            measure,
            speaker: String::new(),
            reveal: Reveal::default(),
            wait: AdvanceWait::new(0.0),
            advance_requested: false,
            advance_visible: true,
            advance_prev_visible: true,
            choices: Vec::new(),
            choices_visible: false,
            selection: None,
            backlog,
            backlog_open: false,
            backlog_scroll: SCROLL_TOP,
        }
    }

    /// Replace the text measure, e.g. with one backed by a real layout engine.
    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Advance => self.on_advance_pressed(),
            InputEvent::SelectChoice(index) => {
                self.select(index);
            }
            InputEvent::ToggleBacklog => self.toggle_backlog(),
            InputEvent::BacklogScrolled(position) => {
                self.backlog_scroll = if position.is_nan() {
                    SCROLL_BOTTOM
                } else {
                    position.clamp(SCROLL_BOTTOM, SCROLL_TOP)
                };
            }
        }
    }

    /// The advance control: finishes a running reveal, otherwise requests
    /// the next line.
    pub fn on_advance_pressed(&mut self) {
        if self.reveal.request_skip() {
            return;
        }
        self.advance_requested = true;
    }

    pub fn set_speaker(&mut self, speaker: &str) {
        self.speaker = speaker.to_string();
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    // ------------------------------------------------------------------
    // Line presentation
    // ------------------------------------------------------------------

    /// Start revealing a line.
    pub fn begin_line(&mut self, text: &str, toggles: Toggles) -> RevealStatus {
        let total = self.measure.visible_len(text);
        self.reveal
            .begin(text, total, self.config.char_delay(), toggles.skip)
    }

    pub fn tick_reveal(&mut self, delta: f32, toggles: Toggles) -> RevealStatus {
        self.reveal.tick(delta, toggles.skip)
    }

    pub fn is_typing(&self) -> bool {
        self.reveal.is_typing()
    }

    pub fn skip_requested(&self) -> bool {
        self.reveal.skip_requested()
    }

    /// Start waiting for the player to move on from a line of
    /// `char_count` characters. Any stale advance request is dropped.
    pub fn begin_wait(&mut self, char_count: usize) {
        self.advance_requested = false;
        self.wait = AdvanceWait::new(self.config.auto_wait(char_count));
    }

    pub fn tick_wait(&mut self, delta: f32, toggles: Toggles) -> AdvanceOutcome {
        self.wait.tick(delta, toggles, &mut self.advance_requested)
    }

    pub fn advance_requested(&self) -> bool {
        self.advance_requested
    }

    // ------------------------------------------------------------------
    // Choices
    // ------------------------------------------------------------------

    /// Show the choice menu. Returns false (and leaves the menu hidden) when
    /// there is nothing to choose.
    pub fn show_choices(&mut self, choices: &[Choice]) -> bool {
        self.advance_prev_visible = self.advance_visible;
        self.advance_visible = false;
        self.choices.clear();
        self.selection = None;

        if choices.is_empty() {
            self.choices_visible = false;
            self.advance_visible = self.advance_prev_visible;
            return false;
        }

        self.choices = choices.iter().map(ChoiceDescriptor::from).collect();
        self.choices_visible = true;
        true
    }

    /// Player picked a choice. Stores the index for
    /// [`Presenter::take_selection`]; the menu stays up until
    /// [`Presenter::confirm_selection`].
    pub fn select(&mut self, index: usize) -> bool {
        if !self.choices_visible {
            warn!(index, "choice selected while no choices are shown");
            return false;
        }
        if let Some(pending) = self.selection {
            warn!(index, pending, "choice selected while another is pending");
            return false;
        }
        if !self.choices.iter().any(|c| c.index == index) {
            warn!(index, shown = self.choices.len(), "selected choice is not on screen");
            return false;
        }

        self.selection = Some(index);
        debug!(index, "choice selected");
        true
    }

    /// Hand over the pending selection, at most once per selection.
    pub fn take_selection(&mut self) -> Option<usize> {
        self.selection.take()
    }

    /// The source accepted `index`: record it to the backlog, close the menu
    /// and restore the advance control.
    pub fn confirm_selection(&mut self, index: usize) {
        let text = self
            .choices
            .iter()
            .find(|c| c.index == index)
            .map(|c| c.text.clone());
        if let Some(text) = text {
            let label = self.config.player_label.clone();
            self.add_backlog(&label, &text);
        }

        self.choices_visible = false;
        self.choices.clear();
        self.selection = None;
        self.advance_visible = self.advance_prev_visible;
    }

    pub fn choices_visible(&self) -> bool {
        self.choices_visible
    }

    pub fn advance_visible(&self) -> bool {
        self.advance_visible
    }

    /// Hosts may hide the advance control themselves; the choice menu
    /// restores whatever was set here.
    pub fn set_advance_visible(&mut self, visible: bool) {
        self.advance_visible = visible;
    }

    // ------------------------------------------------------------------
    // Backlog
    // ------------------------------------------------------------------

    pub fn add_backlog(&mut self, speaker: &str, line: &str) {
        if self.backlog.append(speaker, line) {
            self.auto_scroll_backlog(false);
        }
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    pub fn toggle_backlog(&mut self) {
        self.backlog_open = !self.backlog_open;
        if self.backlog_open {
            self.auto_scroll_backlog(true);
        }
    }

    pub fn backlog_open(&self) -> bool {
        self.backlog_open
    }

    pub fn backlog_scroll(&self) -> f32 {
        self.backlog_scroll
    }

    fn auto_scroll_backlog(&mut self, force_to_bottom: bool) {
        if !self.backlog_open {
            return;
        }
        if should_auto_scroll(
            self.backlog_scroll,
            self.config.auto_scroll_threshold(),
            force_to_bottom,
        ) {
            self.backlog_scroll = SCROLL_BOTTOM;
        }
    }

    pub fn view(&self) -> View<'_> {
        let text = self.reveal.text();
        let visible_text = if self.reveal.is_typing() {
            self.measure.visible_slice(text, self.reveal.visible())
        } else {
            text
        };
        let choices: &[ChoiceDescriptor] = if self.choices_visible {
            &self.choices
        } else {
            &[]
        };

        View {
            speaker: &self.speaker,
            text,
            visible_text,
            typing: self.reveal.is_typing(),
            choices,
            advance_visible: self.advance_visible,
            backlog_open: self.backlog_open,
            backlog_scroll: self.backlog_scroll,
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(PresenterConfig::default())
    }
}
