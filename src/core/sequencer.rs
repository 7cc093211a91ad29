//! The turn sequencer: pull lines → reveal → wait → … → choices → repeat.
//!
//! The host calls [`TurnSequencer::step`] once per frame. Each step first
//! drains the queued input events, then runs state transitions until it
//! reaches a point where it has to wait for time or input.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::{ConfigError, StageConfig};
use crate::core::presenter::{Presenter, View};
use crate::core::reveal::RevealStatus;
use crate::core::source::{NarrativeSource, StoryEngine, StoryError};
use crate::schema::choice::Choice;
use crate::schema::input::{Frame, InputEvent};
use crate::schema::line::Line;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("no narrative source was provided")]
    MissingStory,
    #[error("no presenter was provided")]
    MissingPresenter,
    #[error("story error: {0}")]
    Story(#[from] StoryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("both a config and a config path were provided")]
    ConflictingConfig,
}

/// Where a line is in its presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePhase {
    /// Ready to ask the source for the next line.
    Pull,
    /// Typewriter reveal running.
    Revealing,
    /// Line fully shown; waiting for manual or auto advance.
    AwaitingAdvance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Draining(LinePhase),
    AwaitingChoice,
    Ended,
}

impl TurnState {
    pub fn is_ended(self) -> bool {
        self == TurnState::Ended
    }
}

/// Drives a narrative source through a presenter. Built via
/// `TurnSequencer::builder()`.
#[derive(Debug)]
pub struct TurnSequencer<S> {
    engine: StoryEngine<S>,
    presenter: Presenter,
    state: TurnState,
    events: VecDeque<InputEvent>,
    current: Option<Line>,
    choices: Vec<Choice>,
    lines_presented: u64,
}

/// Builder for constructing a `TurnSequencer`.
pub struct TurnSequencerBuilder<S> {
    story: Option<S>,
    presenter: Option<Presenter>,
    config: Option<StageConfig>,
    config_path: Option<PathBuf>,
    start_knot: Option<String>,
}

impl<S: NarrativeSource> TurnSequencer<S> {
    pub fn builder() -> TurnSequencerBuilder<S> {
        TurnSequencerBuilder {
            story: None,
            presenter: None,
            config: None,
            config_path: None,
            start_knot: None,
        }
    }

    /// Queue a user action for the next step.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Run one frame.
    pub fn step(&mut self, frame: Frame) -> Result<TurnState, StageError> {
        while let Some(event) = self.events.pop_front() {
            self.presenter.handle_input(event);
        }

        let Frame { delta, toggles } = frame;
        let line_budget = self.presenter.config().lines_per_step();
        let mut lines_this_step = 0;

        loop {
            match self.state {
                TurnState::Ended => return Ok(TurnState::Ended),

                TurnState::Draining(LinePhase::Pull) => {
                    if self.engine.can_continue()? {
                        let line = self.engine.continue_line()?;
                        if line.has_speaker() {
                            self.presenter.set_speaker(&line.speaker);
                        }
                        self.presenter.begin_line(&line.text, toggles);
                        self.current = Some(line);
                        self.state = TurnState::Draining(LinePhase::Revealing);
                        continue;
                    }

                    let choices = self.engine.current_choices()?;
                    if self.presenter.show_choices(&choices) {
                        debug!(count = choices.len(), "awaiting choice");
                        self.choices = choices;
                        self.state = TurnState::AwaitingChoice;
                    } else {
                        info!(lines = self.lines_presented, "story ended (no continue, no choices)");
                        self.state = TurnState::Ended;
                    }
                    return Ok(self.state);
                }

                TurnState::Draining(LinePhase::Revealing) => {
                    if self.presenter.tick_reveal(delta, toggles) == RevealStatus::Pending {
                        return Ok(self.state);
                    }
                    if let Some(line) = &self.current {
                        self.presenter.add_backlog(&line.speaker, &line.text);
                        self.presenter.begin_wait(line.char_len());
                    }
                    self.state = TurnState::Draining(LinePhase::AwaitingAdvance);
                }

                TurnState::Draining(LinePhase::AwaitingAdvance) => {
                    let outcome = self.presenter.tick_wait(delta, toggles);
                    if !outcome.is_done() {
                        return Ok(self.state);
                    }
                    debug!(?outcome, "line advanced");
                    self.current = None;
                    self.lines_presented += 1;
                    self.state = TurnState::Draining(LinePhase::Pull);

                    lines_this_step += 1;
                    if lines_this_step >= line_budget {
                        debug!(lines = lines_this_step, "line budget spent; yielding");
                        return Ok(self.state);
                    }
                }

                TurnState::AwaitingChoice => {
                    let Some(index) = self.presenter.take_selection() else {
                        return Ok(self.state);
                    };
                    // The menu stays up until the source takes the index.
                    if let Err(e) = self.engine.choose(index) {
                        warn!(index, error = %e, "source rejected choice");
                        return Err(e.into());
                    }
                    self.presenter.confirm_selection(index);
                    self.choices.clear();
                    self.state = TurnState::Draining(LinePhase::Pull);
                }
            }
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    pub fn view(&self) -> View<'_> {
        self.presenter.view()
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut Presenter {
        &mut self.presenter
    }

    /// The line currently being revealed or waited on.
    pub fn current_line(&self) -> Option<&Line> {
        self.current.as_ref()
    }

    /// Choices on screen while awaiting a selection.
    pub fn current_choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn lines_presented(&self) -> u64 {
        self.lines_presented
    }

    pub fn story(&self) -> Option<&S> {
        self.engine.source()
    }
}

impl<S: NarrativeSource> TurnSequencerBuilder<S> {
    pub fn story(mut self, story: S) -> Self {
        self.story = Some(story);
        self
    }

    pub fn presenter(mut self, presenter: Presenter) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Use this config for the start knot and, unless a presenter is given
    /// explicitly, to build the presenter. Cannot be combined with
    /// [`TurnSequencerBuilder::config_path`].
    pub fn config(mut self, config: StageConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a RON file at build time. Cannot be combined
    /// with [`TurnSequencerBuilder::config`].
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the configured start knot. Blank means no jump.
    pub fn start_knot(mut self, knot: &str) -> Self {
        self.start_knot = Some(knot.to_string());
        self
    }

    pub fn build(self) -> Result<TurnSequencer<S>, StageError> {
        let config = match (self.config_path, self.config) {
            (Some(_), Some(_)) => return Err(StageError::ConflictingConfig),
            (Some(path), None) => Some(StageConfig::load_from_ron(&path)?),
            (None, config) => config,
        };

        let story = self.story.ok_or(StageError::MissingStory)?;
        let presenter = match self.presenter {
            Some(presenter) => presenter,
            None => config
                .as_ref()
                .map(|c| Presenter::new(c.presenter.clone()))
                .ok_or(StageError::MissingPresenter)?,
        };

        let start_knot = self
            .start_knot
            .or_else(|| config.map(|c| c.start_knot))
            .unwrap_or_default();

        let mut engine = StoryEngine::new();
        engine.initialize(story);
        engine.jump_to(&start_knot)?;

        info!(
            start_knot = %start_knot,
            can_continue = engine.can_continue()?,
            choices = engine.current_choices()?.len(),
            "story initialized"
        );

        Ok(TurnSequencer {
            engine,
            presenter,
            state: TurnState::Draining(LinePhase::Pull),
            events: VecDeque::new(),
            current: None,
            choices: Vec::new(),
            lines_presented: 0,
        })
    }
}
