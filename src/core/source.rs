//! Boundary with the narrative interpreter, plus the story engine wrapping it.

use thiserror::Error;
use tracing::debug;

use crate::schema::choice::Choice;
use crate::schema::line::Line;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("story cannot continue")]
    CannotContinue,
    #[error("choice index {index} out of range ({available} choices)")]
    ChoiceOutOfRange { index: usize, available: usize },
    #[error("unknown story path: {0}")]
    UnknownPath(String),
    #[error("narrative runtime error: {0}")]
    Runtime(String),
}

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("story engine is not initialized; provide a narrative source first")]
    Uninitialized,
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// The surface of an external narrative interpreter (an Ink runtime or
/// anything shaped like one). The stage only calls these operations; story
/// state, branching and path resolution stay inside the implementor.
pub trait NarrativeSource {
    /// Whether another line of content is available.
    fn can_continue(&self) -> bool;

    /// Produce the next line of raw text, including any trailing newline.
    fn continue_story(&mut self) -> Result<String, SourceError>;

    /// Tags attached to the line most recently produced by `continue_story`.
    fn current_tags(&self) -> Vec<String>;

    /// Choices available once the source can no longer continue.
    fn current_choices(&self) -> Vec<Choice>;

    fn choose_choice_index(&mut self, index: usize) -> Result<(), SourceError>;

    /// Move the story to a named entry point (knot or stitch path).
    fn choose_path_string(&mut self, path: &str) -> Result<(), SourceError>;
}

impl<S: NarrativeSource + ?Sized> NarrativeSource for Box<S> {
    fn can_continue(&self) -> bool {
        (**self).can_continue()
    }

    fn continue_story(&mut self) -> Result<String, SourceError> {
        (**self).continue_story()
    }

    fn current_tags(&self) -> Vec<String> {
        (**self).current_tags()
    }

    fn current_choices(&self) -> Vec<Choice> {
        (**self).current_choices()
    }

    fn choose_choice_index(&mut self, index: usize) -> Result<(), SourceError> {
        (**self).choose_choice_index(index)
    }

    fn choose_path_string(&mut self, path: &str) -> Result<(), SourceError> {
        (**self).choose_path_string(path)
    }
}

/// Wraps a narrative source and turns its output into [`Line`] records.
///
/// Every operation fails with [`StoryError::Uninitialized`] until a source
/// has been attached with [`StoryEngine::initialize`].
#[derive(Debug)]
pub struct StoryEngine<S> {
    story: Option<S>,
}

impl<S> Default for StoryEngine<S> {
    fn default() -> Self {
        Self { story: None }
    }
}

impl<S: NarrativeSource> StoryEngine<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, source: S) {
        self.story = Some(source);
    }

    pub fn is_initialized(&self) -> bool {
        self.story.is_some()
    }

    pub fn can_continue(&self) -> Result<bool, StoryError> {
        Ok(self.story()?.can_continue())
    }

    pub fn continue_line(&mut self) -> Result<Line, StoryError> {
        let story = self.story_mut()?;
        let raw = story.continue_story()?;
        let line = Line::from_raw(&raw, story.current_tags());
        debug!(speaker = %line.speaker, tags = line.tags.len(), "continued line");
        Ok(line)
    }

    pub fn current_choices(&self) -> Result<Vec<Choice>, StoryError> {
        Ok(self.story()?.current_choices())
    }

    pub fn choose(&mut self, index: usize) -> Result<(), StoryError> {
        self.story_mut()?.choose_choice_index(index)?;
        Ok(())
    }

    /// Jump to a named entry point. Blank names are ignored.
    pub fn jump_to(&mut self, knot: &str) -> Result<(), StoryError> {
        let story = self.story_mut()?;
        let knot = knot.trim();
        if knot.is_empty() {
            return Ok(());
        }
        story.choose_path_string(knot)?;
        Ok(())
    }

    /// Access the wrapped source, e.g. for inspection in a host.
    pub fn source(&self) -> Option<&S> {
        self.story.as_ref()
    }

    fn story(&self) -> Result<&S, StoryError> {
        self.story.as_ref().ok_or(StoryError::Uninitialized)
    }

    fn story_mut(&mut self) -> Result<&mut S, StoryError> {
        self.story.as_mut().ok_or(StoryError::Uninitialized)
    }
}
