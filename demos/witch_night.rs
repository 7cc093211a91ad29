/// Witch Night example — plays the bundled story headlessly in auto mode.
///
/// Frames are simulated at 60 fps. Each line is printed once its reveal
/// finishes, and choices are picked from a fixed route.
///
/// Run with: cargo run --example witch_night

use narrative_stage::core::scripted::ScriptedStory;
use narrative_stage::core::sequencer::{LinePhase, TurnSequencer, TurnState};
use narrative_stage::schema::input::{Frame, InputEvent, Toggles};
use std::path::Path;

const DT: f32 = 1.0 / 60.0;

fn main() {
    let story = ScriptedStory::load_from_ron(Path::new("story_data/witch_night/story.ron"))
        .expect("Failed to load witch night story");

    let mut stage = TurnSequencer::builder()
        .story(story)
        .config_path("story_data/witch_night/stage.ron")
        .build()
        .expect("Failed to build stage");

    // Follow the candlelight, then step through.
    let mut route = vec![1usize, 0].into_iter();
    let mut clock = 0.0f32;
    let mut printed = 0u64;

    loop {
        let state = stage
            .step(Frame::new(DT, Toggles::auto()))
            .expect("Stage step failed");
        clock += DT;

        if state == TurnState::Draining(LinePhase::AwaitingAdvance) && printed == stage.lines_presented() {
            let view = stage.view();
            if view.speaker.is_empty() {
                println!("[{:6.2}s] {}", clock, view.text);
            } else {
                println!("[{:6.2}s] {}: {}", clock, view.speaker, view.text);
            }
            printed += 1;
        }

        match state {
            TurnState::AwaitingChoice => {
                let view = stage.view();
                for choice in view.choices {
                    println!("          {}) {}", choice.index + 1, choice.text);
                }
                let pick = route.next().unwrap_or(0);
                println!("          -> {}", pick + 1);
                stage.push_event(InputEvent::SelectChoice(pick));
            }
            TurnState::Ended => break,
            _ => {}
        }
    }

    println!("\n=== Backlog ===");
    print!("{}", stage.presenter().backlog().render());
    println!("\n{} lines in {:.1}s of simulated time", stage.lines_presented(), clock);
}
