//! WASM bindings for narrative-stage — drives a scripted story from a
//! browser animation loop.

use wasm_bindgen::prelude::*;

use narrative_stage::core::config::StageConfig;
use narrative_stage::core::scripted::ScriptedStory;
use narrative_stage::core::sequencer::{LinePhase, TurnSequencer, TurnState};
use narrative_stage::schema::input::{Frame, InputEvent, Toggles};

// ---------------------------------------------------------------------------
// Embedded demo story — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const WITCH_NIGHT_STORY: &str = include_str!("../../story_data/witch_night/story.ron");
    pub const WITCH_NIGHT_STAGE: &str = include_str!("../../story_data/witch_night/stage.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct ChoiceInfo {
    index: usize,
    text: String,
}

#[derive(serde::Serialize)]
struct BacklogInfo {
    speaker: String,
    line: String,
}

#[derive(serde::Serialize)]
struct ViewInfo {
    /// "revealing", "awaiting_advance", "awaiting_choice" or "ended".
    state: &'static str,
    speaker: String,
    text: String,
    visible_text: String,
    typing: bool,
    advance_visible: bool,
    choices: Vec<ChoiceInfo>,
    backlog_open: bool,
    backlog_scroll: f32,
    /// Only filled while the backlog panel is open.
    backlog: Vec<BacklogInfo>,
    lines_presented: u64,
}

fn state_label(state: TurnState) -> &'static str {
    match state {
        TurnState::Draining(LinePhase::Pull) | TurnState::Draining(LinePhase::Revealing) => "revealing",
        TurnState::Draining(LinePhase::AwaitingAdvance) => "awaiting_advance",
        TurnState::AwaitingChoice => "awaiting_choice",
        TurnState::Ended => "ended",
    }
}

// ---------------------------------------------------------------------------
// WebStage — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct WebStage {
    stage: TurnSequencer<ScriptedStory>,
}

#[wasm_bindgen]
impl WebStage {
    /// Create a stage from a RON script and a RON stage config.
    #[wasm_bindgen(constructor)]
    pub fn new(script_ron: &str, config_ron: &str) -> Result<WebStage, JsError> {
        let story = ScriptedStory::parse_ron(script_ron)
            .map_err(|e| JsError::new(&format!("Script parse error: {e}")))?;
        let config = StageConfig::parse_ron(config_ron)
            .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?;

        let stage = TurnSequencer::builder()
            .story(story)
            .config(config)
            .build()
            .map_err(|e| JsError::new(&format!("Stage build error: {e}")))?;

        Ok(WebStage { stage })
    }

    /// Create a stage playing the bundled demo story.
    pub fn demo() -> Result<WebStage, JsError> {
        WebStage::new(data::WITCH_NIGHT_STORY, data::WITCH_NIGHT_STAGE)
    }

    /// Advance button: finishes the typing line, or moves past a finished one.
    pub fn advance(&mut self) {
        self.stage.push_event(InputEvent::Advance);
    }

    /// Pick the choice with the given index.
    pub fn select(&mut self, index: usize) {
        self.stage.push_event(InputEvent::SelectChoice(index));
    }

    pub fn toggle_backlog(&mut self) {
        self.stage.push_event(InputEvent::ToggleBacklog);
    }

    /// Report the backlog scroll position (1.0 top, 0.0 bottom).
    pub fn scroll_backlog(&mut self, position: f32) {
        self.stage.push_event(InputEvent::BacklogScrolled(position));
    }

    /// Run one frame and return the view as JSON.
    pub fn tick(&mut self, delta: f32, auto: bool, skip: bool) -> Result<String, JsError> {
        let state = self
            .stage
            .step(Frame::new(delta, Toggles { auto, skip }))
            .map_err(|e| JsError::new(&format!("Stage error: {e}")))?;
        self.view_json(state)
    }

    pub fn is_ended(&self) -> bool {
        self.stage.is_ended()
    }

    /// Whole backlog as plain text, one "speaker: line" per row.
    pub fn backlog_text(&self) -> String {
        self.stage.presenter().backlog().render()
    }
}

// Private helpers
impl WebStage {
    fn view_json(&self, state: TurnState) -> Result<String, JsError> {
        let view = self.stage.view();
        let backlog = if view.backlog_open {
            self.stage
                .presenter()
                .backlog()
                .entries()
                .map(|e| BacklogInfo {
                    speaker: e.speaker.clone(),
                    line: e.line.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let info = ViewInfo {
            state: state_label(state),
            speaker: view.speaker.to_string(),
            text: view.text.to_string(),
            visible_text: view.visible_text.to_string(),
            typing: view.typing,
            advance_visible: view.advance_visible,
            choices: view
                .choices
                .iter()
                .map(|c| ChoiceInfo {
                    index: c.index,
                    text: c.text.clone(),
                })
                .collect(),
            backlog_open: view.backlog_open,
            backlog_scroll: view.backlog_scroll,
            backlog,
            lines_presented: self.stage.lines_presented(),
        };
        serde_json::to_string(&info).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }
}
