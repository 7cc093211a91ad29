//! Scripted stories — a small, deterministic narrative source read from RON.
//!
//! A script is a set of named knots. Each knot plays its lines in order,
//! then either offers choices or diverts to another knot. A knot with
//! neither ends the story. There are no variables or conditions: anything
//! richer belongs in a real interpreter behind [`NarrativeSource`].

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::core::source::{NarrativeSource, SourceError};
use crate::schema::choice::Choice;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid script: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

fn default_entry() -> String {
    "start".to_string()
}

/// On-disk form of a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Knot the story begins in.
    #[serde(default = "default_entry")]
    pub entry: String,
    pub knots: FxHashMap<String, Knot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Knot {
    #[serde(default)]
    pub lines: Vec<ScriptLine>,
    #[serde(default)]
    pub choices: Vec<ScriptChoice>,
    /// Where to go after the last line when there are no choices.
    #[serde(default)]
    pub divert: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptLine {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptChoice {
    pub text: String,
    /// Knot to continue in; `None` ends the story.
    #[serde(default)]
    pub divert: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found by [`Script::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptIssue {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for ScriptIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "WARNING: {}", self.message),
            Severity::Error => write!(f, "ERROR: {}", self.message),
        }
    }
}

impl Script {
    pub fn load_from_ron(path: &Path) -> Result<Script, ScriptError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Script, ScriptError> {
        Ok(ron::from_str(input)?)
    }

    fn sorted_knot_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.knots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check the script for broken diverts, unreachable knots and similar.
    /// Issues are reported in knot-name order.
    pub fn lint(&self) -> Vec<ScriptIssue> {
        let mut issues = Vec::new();
        let error = |message: String| ScriptIssue {
            severity: Severity::Error,
            message,
        };
        let warning = |message: String| ScriptIssue {
            severity: Severity::Warning,
            message,
        };

        if !self.knots.contains_key(&self.entry) {
            issues.push(error(format!("entry knot '{}' does not exist", self.entry)));
        }

        for name in self.sorted_knot_names() {
            let knot = &self.knots[name];

            if let Some(target) = &knot.divert {
                if !self.knots.contains_key(target) {
                    issues.push(error(format!(
                        "knot '{}' diverts to non-existent knot '{}'",
                        name, target
                    )));
                }
                if !knot.choices.is_empty() {
                    issues.push(warning(format!(
                        "knot '{}' has both choices and a divert; the divert is never taken",
                        name
                    )));
                }
            }

            for (i, choice) in knot.choices.iter().enumerate() {
                if choice.text.trim().is_empty() {
                    issues.push(warning(format!("knot '{}' choice {} has no text", name, i)));
                }
                if let Some(target) = &choice.divert {
                    if !self.knots.contains_key(target) {
                        issues.push(error(format!(
                            "knot '{}' choice {} diverts to non-existent knot '{}'",
                            name, i, target
                        )));
                    }
                }
            }

            if knot.lines.is_empty() && knot.choices.is_empty() && knot.divert.is_none() {
                issues.push(warning(format!("knot '{}' is empty", name)));
            }

            if self.empty_divert_loop(name) {
                issues.push(error(format!(
                    "knot '{}' starts a divert loop that never produces a line",
                    name
                )));
            } else if self.endless_divert_loop(name) {
                issues.push(warning(format!(
                    "knot '{}' is on a divert loop with no choices; the story never ends there",
                    name
                )));
            }
        }

        let reachable = self.reachable_from(&self.entry);
        for name in self.sorted_knot_names() {
            if !reachable.contains(name) {
                issues.push(warning(format!(
                    "knot '{}' is not reachable from '{}'",
                    name, self.entry
                )));
            }
        }

        issues
    }

    /// Follow diverts through line-less, choice-less knots; true if the
    /// chain comes back around.
    fn empty_divert_loop(&self, start: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = start;
        loop {
            let Some(knot) = self.knots.get(current) else {
                return false;
            };
            if !knot.lines.is_empty() || !knot.choices.is_empty() {
                return false;
            }
            if !seen.insert(current) {
                return true;
            }
            match &knot.divert {
                Some(next) => current = next.as_str(),
                None => return false,
            }
        }
    }

    /// Follow diverts out of choice-less knots; true if the chain leads
    /// back to `start`.
    fn endless_divert_loop(&self, start: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = start;
        loop {
            let Some(knot) = self.knots.get(current) else {
                return false;
            };
            if !knot.choices.is_empty() || !seen.insert(current) {
                return false;
            }
            match &knot.divert {
                Some(next) if next == start => return true,
                Some(next) => current = next.as_str(),
                None => return false,
            }
        }
    }

    fn reachable_from<'a>(&'a self, entry: &'a str) -> FxHashSet<&'a str> {
        let mut reachable = FxHashSet::default();
        let mut queue = VecDeque::from([entry]);
        while let Some(name) = queue.pop_front() {
            let Some(knot) = self.knots.get(name) else {
                continue;
            };
            if !reachable.insert(name) {
                continue;
            }
            let targets = knot
                .divert
                .iter()
                .chain(knot.choices.iter().filter_map(|c| c.divert.as_ref()));
            for target in targets {
                queue.push_back(target.as_str());
            }
        }
        reachable
    }
}

/// Runtime over a validated [`Script`].
#[derive(Debug, Clone)]
pub struct ScriptedStory {
    script: Script,
    knot: String,
    cursor: usize,
    tags: Vec<String>,
    ended: bool,
}

impl ScriptedStory {
    /// Build a story, rejecting scripts with lint errors.
    pub fn new(script: Script) -> Result<Self, ScriptError> {
        let errors: Vec<String> = script
            .lint()
            .into_iter()
            .filter(|issue| issue.severity == Severity::Error)
            .map(|issue| issue.message)
            .collect();
        if !errors.is_empty() {
            return Err(ScriptError::Invalid(errors));
        }

        let knot = script.entry.clone();
        let mut story = Self {
            script,
            knot,
            cursor: 0,
            tags: Vec::new(),
            ended: false,
        };
        story.settle();
        Ok(story)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, ScriptError> {
        Self::new(Script::load_from_ron(path)?)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ScriptError> {
        Self::new(Script::parse_ron(input)?)
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Name of the knot currently playing.
    pub fn current_knot(&self) -> &str {
        &self.knot
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    fn current(&self) -> Option<&Knot> {
        self.script.knots.get(&self.knot)
    }

    fn goto(&mut self, knot: &str) {
        self.knot = knot.to_string();
        self.cursor = 0;
        self.ended = false;
        self.settle();
    }

    /// Take diverts out of exhausted knots that have no choices.
    fn settle(&mut self) {
        let mut hops = 0;
        loop {
            let Some(knot) = self.current() else {
                self.ended = true;
                return;
            };
            if self.cursor < knot.lines.len() || !knot.choices.is_empty() {
                return;
            }
            let Some(next) = knot.divert.clone() else {
                return;
            };
            hops += 1;
            if hops > self.script.knots.len() {
                warn!(knot = %self.knot, "divert loop without content; ending story");
                self.ended = true;
                return;
            }
            self.knot = next;
            self.cursor = 0;
        }
    }
}

impl NarrativeSource for ScriptedStory {
    fn can_continue(&self) -> bool {
        !self.ended
            && self
                .current()
                .is_some_and(|knot| self.cursor < knot.lines.len())
    }

    fn continue_story(&mut self) -> Result<String, SourceError> {
        if !self.can_continue() {
            return Err(SourceError::CannotContinue);
        }
        let line = self
            .current()
            .and_then(|knot| knot.lines.get(self.cursor))
            .cloned()
            .ok_or(SourceError::CannotContinue)?;
        self.cursor += 1;
        self.tags = line.tags;
        self.settle();
        Ok(format!("{}\n", line.text))
    }

    fn current_tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn current_choices(&self) -> Vec<Choice> {
        if self.ended || self.can_continue() {
            return Vec::new();
        }
        self.current()
            .map(|knot| {
                knot.choices
                    .iter()
                    .enumerate()
                    .map(|(i, c)| Choice::new(i, c.text.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn choose_choice_index(&mut self, index: usize) -> Result<(), SourceError> {
        let available = self.current_choices().len();
        if index >= available {
            return Err(SourceError::ChoiceOutOfRange { index, available });
        }
        let divert = self
            .current()
            .and_then(|knot| knot.choices.get(index))
            .and_then(|choice| choice.divert.clone());
        self.tags.clear();
        match divert {
            Some(target) => self.goto(&target),
            None => self.ended = true,
        }
        Ok(())
    }

    fn choose_path_string(&mut self, path: &str) -> Result<(), SourceError> {
        if !self.script.knots.contains_key(path) {
            return Err(SourceError::UnknownPath(path.to_string()));
        }
        self.tags.clear();
        self.goto(path);
        Ok(())
    }
}
