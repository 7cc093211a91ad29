//! Narrative Stage — visual-novel presentation on top of a narrative interpreter.
//!
//! Plays dialogue with a typewriter reveal, presents player choices, runs
//! auto/skip modes and keeps a bounded backlog. Story evaluation itself is
//! delegated to whatever implements [`core::source::NarrativeSource`].
//!
//! Everything is driven by the host, one [`schema::input::Frame`] at a time:
//!
//! ```
//! use narrative_stage::core::config::StageConfig;
//! use narrative_stage::core::scripted::ScriptedStory;
//! use narrative_stage::core::sequencer::{TurnSequencer, TurnState};
//! use narrative_stage::schema::input::{Frame, InputEvent, Toggles};
//!
//! let story = ScriptedStory::parse_ron(r#"(
//!     knots: {
//!         "start": (
//!             lines: [(text: "Hello.", tags: ["speaker: Mira"])],
//!             choices: [(text: "Wave back")],
//!         ),
//!     },
//! )"#).unwrap();
//!
//! let mut stage = TurnSequencer::builder()
//!     .story(story)
//!     .config(StageConfig::default())
//!     .build()
//!     .unwrap();
//!
//! let state = stage.step(Frame::new(1.0 / 60.0, Toggles::skip())).unwrap();
//! assert_eq!(state, TurnState::AwaitingChoice);
//! assert_eq!(stage.view().speaker, "Mira");
//!
//! stage.push_event(InputEvent::SelectChoice(0));
//! let state = stage.step(Frame::new(1.0 / 60.0, Toggles::manual())).unwrap();
//! assert_eq!(state, TurnState::Ended);
//! ```

pub mod core;
pub mod schema;
