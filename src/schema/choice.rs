use serde::{Deserialize, Serialize};

/// A choice offered by the narrative source.
///
/// The stage never mutates a choice: it shows `text` and hands `index`
/// back to the source once the player picks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub index: usize,
}

impl Choice {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }
}

/// What the rendering layer needs to draw one choice button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDescriptor {
    pub index: usize,
    pub text: String,
}

impl From<&Choice> for ChoiceDescriptor {
    fn from(choice: &Choice) -> Self {
        Self {
            index: choice.index,
            text: choice.text.clone(),
        }
    }
}
