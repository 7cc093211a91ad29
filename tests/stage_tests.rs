//! Turn-sequencer integration tests against a recording narrative source.

use narrative_stage::core::config::PresenterConfig;
use narrative_stage::core::presenter::Presenter;
use narrative_stage::core::sequencer::{LinePhase, StageError, TurnSequencer, TurnState};
use narrative_stage::core::source::{NarrativeSource, SourceError};
use narrative_stage::schema::choice::Choice;
use narrative_stage::schema::input::{Frame, InputEvent, Toggles};
use std::collections::VecDeque;

/// Serves a fixed queue of lines, then a fixed set of choices, and records
/// every call the stage makes.
#[derive(Default)]
struct RecordingSource {
    lines: VecDeque<(String, Vec<String>)>,
    tags: Vec<String>,
    choices: Vec<Choice>,
    chosen: Option<usize>,
    /// Number of upcoming `choose_choice_index` calls to fail.
    rejections: usize,
    calls: Vec<String>,
}

impl RecordingSource {
    fn new(lines: &[&str], choices: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| (l.to_string(), Vec::new())).collect(),
            choices: choices
                .iter()
                .enumerate()
                .map(|(i, t)| Choice::new(i, *t))
                .collect(),
            ..Default::default()
        }
    }
}

impl NarrativeSource for RecordingSource {
    fn can_continue(&self) -> bool {
        !self.lines.is_empty()
    }

    fn continue_story(&mut self) -> Result<String, SourceError> {
        let (text, tags) = self.lines.pop_front().ok_or(SourceError::CannotContinue)?;
        self.calls.push(format!("continue:{}", text));
        self.tags = tags;
        Ok(format!("{}\n", text))
    }

    fn current_tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn current_choices(&self) -> Vec<Choice> {
        if self.chosen.is_some() {
            Vec::new()
        } else {
            self.choices.clone()
        }
    }

    fn choose_choice_index(&mut self, index: usize) -> Result<(), SourceError> {
        self.calls.push(format!("choose:{}", index));
        if self.rejections > 0 {
            self.rejections -= 1;
            return Err(SourceError::Runtime("transient".to_string()));
        }
        self.chosen = Some(index);
        Ok(())
    }

    fn choose_path_string(&mut self, path: &str) -> Result<(), SourceError> {
        self.calls.push(format!("jump:{}", path));
        Ok(())
    }
}

const DT: f32 = 0.125;

fn stage(source: RecordingSource, config: PresenterConfig) -> TurnSequencer<RecordingSource> {
    TurnSequencer::builder()
        .story(source)
        .presenter(Presenter::new(config))
        .build()
        .unwrap()
}

fn step_until(seq: &mut TurnSequencer<RecordingSource>, toggles: Toggles, target: TurnState) -> u32 {
    let mut frames = 0;
    while seq.state() != target {
        seq.step(Frame::new(DT, toggles)).unwrap();
        frames += 1;
        assert!(frames < 1_000, "never reached {:?}", target);
    }
    frames
}

#[test]
fn lines_then_choices_then_end() {
    let source = RecordingSource::new(&["L1", "L2"], &["C0", "C1"]);
    let mut seq = stage(
        source,
        PresenterConfig {
            seconds_per_char: DT,
            ..PresenterConfig::default()
        },
    );

    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(seq.view().text, "L1");
    assert!(seq.view().typing);

    step_until(
        &mut seq,
        Toggles::manual(),
        TurnState::Draining(LinePhase::AwaitingAdvance),
    );
    assert_eq!(seq.presenter().backlog().render(), "L1\n");

    // Waiting does not move on by itself in manual mode.
    for _ in 0..50 {
        seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    }
    assert_eq!(seq.current_line().unwrap().text, "L1");

    seq.push_event(InputEvent::Advance);
    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(seq.view().text, "L2");

    step_until(
        &mut seq,
        Toggles::manual(),
        TurnState::Draining(LinePhase::AwaitingAdvance),
    );
    seq.push_event(InputEvent::Advance);
    let state = seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(state, TurnState::AwaitingChoice);

    let view = seq.view();
    assert_eq!(view.choices.len(), 2);
    assert_eq!(view.choices[0].text, "C0");
    assert_eq!(view.choices[1].index, 1);
    assert!(!view.advance_visible);

    seq.push_event(InputEvent::SelectChoice(1));
    let state = seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(state, TurnState::Ended);

    let source = seq.story().unwrap();
    assert_eq!(source.calls, vec!["continue:L1", "continue:L2", "choose:1"]);
    assert_eq!(seq.presenter().backlog().render(), "L1\nL2\nPlayer: C1\n");
    assert_eq!(seq.lines_presented(), 2);

    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(seq.presenter().backlog().len(), 3);
    assert_eq!(seq.story().unwrap().calls.len(), 3);
}

#[test]
fn skip_reveal_then_advance() {
    let source = RecordingSource::new(&["A fairly long line of dialogue.", "Next."], &[]);
    let mut seq = stage(
        source,
        PresenterConfig {
            seconds_per_char: 0.5,
            ..PresenterConfig::default()
        },
    );

    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert!(seq.presenter().is_typing());
    assert!(seq.view().visible_text.len() < seq.view().text.len());

    // First press finishes the reveal, it does not advance.
    seq.push_event(InputEvent::Advance);
    let state = seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(state, TurnState::Draining(LinePhase::AwaitingAdvance));
    assert_eq!(seq.view().visible_text, "A fairly long line of dialogue.");
    assert!(!seq.presenter().is_typing());
    assert!(!seq.presenter().skip_requested());
    assert!(!seq.presenter().advance_requested());

    seq.push_event(InputEvent::Advance);
    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(seq.current_line().unwrap().text, "Next.");
}

#[test]
fn auto_mode_waits_base_plus_per_char() {
    // Ten characters: 0.8 + 0.02 * 10 = 1.0 seconds.
    let source = RecordingSource::new(&["0123456789", "after"], &[]);
    let mut seq = stage(
        source,
        PresenterConfig {
            seconds_per_char: 0.001,
            auto_base_wait: 0.8,
            auto_per_char_wait: 0.02,
            ..PresenterConfig::default()
        },
    );

    let mut waited = 0.0;
    loop {
        let presented = seq.lines_presented();
        let state = seq.step(Frame::new(DT, Toggles::auto())).unwrap();
        let advanced = seq.lines_presented() > presented;
        if state == TurnState::Draining(LinePhase::AwaitingAdvance) || advanced {
            waited += DT;
        }
        if advanced {
            break;
        }
        assert!(waited < 10.0, "auto mode never advanced");
    }

    assert!(waited >= 1.0, "advanced after only {} s", waited);
    assert!(waited < 1.0 + DT + 1e-4, "waited too long: {} s", waited);
    assert_eq!(seq.current_line().unwrap().text, "after");
}

#[test]
fn toggling_auto_off_restarts_the_wait() {
    let source = RecordingSource::new(&["0123456789", "after"], &[]);
    let mut seq = stage(
        source,
        PresenterConfig {
            seconds_per_char: 0.001,
            auto_base_wait: 1.0,
            auto_per_char_wait: 0.0,
            ..PresenterConfig::default()
        },
    );
    step_until(
        &mut seq,
        Toggles::auto(),
        TurnState::Draining(LinePhase::AwaitingAdvance),
    );

    // 0.875 s of auto (including the frame that entered the wait), then one
    // manual frame resets the timer.
    for _ in 0..6 {
        seq.step(Frame::new(DT, Toggles::auto())).unwrap();
    }
    seq.step(Frame::new(DT, Toggles::manual())).unwrap();

    for _ in 0..7 {
        seq.step(Frame::new(DT, Toggles::auto())).unwrap();
        assert_eq!(seq.current_line().unwrap().text, "0123456789");
    }
    seq.step(Frame::new(DT, Toggles::auto())).unwrap();
    assert_eq!(seq.current_line().unwrap().text, "after");
}

#[test]
fn skip_mode_presents_full_text_in_the_same_step() {
    let source = RecordingSource::new(&["Everything at once."], &["Yes"]);
    let mut seq = stage(source, PresenterConfig::default());

    let state = seq.step(Frame::new(0.0, Toggles::skip())).unwrap();
    assert_eq!(state, TurnState::AwaitingChoice);
    assert_eq!(seq.view().visible_text, "Everything at once.");
    assert_eq!(seq.presenter().backlog().len(), 1);
}

#[test]
fn empty_choice_list_ends_story() {
    let source = RecordingSource::new(&[], &[]);
    let mut seq = stage(source, PresenterConfig::default());
    let state = seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(state, TurnState::Ended);
    assert!(seq.view().advance_visible);
    assert!(seq.view().choices.is_empty());
}

#[test]
fn stray_selection_before_choices_is_ignored() {
    let source = RecordingSource::new(&["Hold on."], &["Okay"]);
    let mut seq = stage(source, PresenterConfig::default());

    seq.push_event(InputEvent::SelectChoice(0));
    seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert!(seq.story().unwrap().chosen.is_none());
    assert!(seq.presenter().backlog().is_empty());
}

#[test]
fn rejected_choice_keeps_the_menu_open() {
    let mut source = RecordingSource::new(&["Which way?"], &["A", "B"]);
    source.rejections = 1;
    let mut seq = stage(source, PresenterConfig::default());
    assert_eq!(seq.step(Frame::new(DT, Toggles::skip())).unwrap(), TurnState::AwaitingChoice);
    assert_eq!(seq.current_choices().len(), 2);

    seq.push_event(InputEvent::SelectChoice(1));
    let result = seq.step(Frame::new(DT, Toggles::manual()));
    assert!(matches!(result, Err(StageError::Story(_))));

    assert_eq!(seq.state(), TurnState::AwaitingChoice);
    assert_eq!(seq.view().choices.len(), 2);
    assert!(!seq.view().advance_visible);
    assert_eq!(seq.presenter().backlog().render(), "Which way?\n");

    seq.push_event(InputEvent::SelectChoice(1));
    let state = seq.step(Frame::new(DT, Toggles::manual())).unwrap();
    assert_eq!(state, TurnState::Ended);
    assert!(seq.current_choices().is_empty());
    assert_eq!(seq.story().unwrap().calls, vec!["continue:Which way?", "choose:1", "choose:1"]);
    assert_eq!(seq.presenter().backlog().render(), "Which way?\nPlayer: B\n");
}

#[test]
fn skip_mode_yields_after_line_budget() {
    let lines: Vec<String> = (0..10).map(|i| format!("line {}", i)).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let source = RecordingSource::new(&line_refs, &[]);
    let mut seq = stage(
        source,
        PresenterConfig {
            max_lines_per_step: 4,
            ..PresenterConfig::default()
        },
    );

    let state = seq.step(Frame::new(DT, Toggles::skip())).unwrap();
    assert_eq!(state, TurnState::Draining(LinePhase::Pull));
    assert_eq!(seq.lines_presented(), 4);

    assert_eq!(seq.step(Frame::new(DT, Toggles::skip())).unwrap(), TurnState::Draining(LinePhase::Pull));
    assert_eq!(seq.lines_presented(), 8);

    assert_eq!(seq.step(Frame::new(DT, Toggles::skip())).unwrap(), TurnState::Ended);
    assert_eq!(seq.lines_presented(), 10);
    assert_eq!(seq.presenter().backlog().len(), 10);
}
