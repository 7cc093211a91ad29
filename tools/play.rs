/// Play — terminal player for scripted stories.
///
/// Usage: play [--story <path>] [--config <path>] [--auto] [--skip] [--fps <n>]
///
/// Commands (type, then Enter):
///   <Enter>  — advance (or finish the line being typed)
///   <n>      — pick choice n
///   a        — toggle auto mode
///   s        — toggle skip mode
///   b        — toggle the backlog
///   q        — quit
use clap::Parser;
use narrative_stage::core::scripted::ScriptedStory;
use narrative_stage::core::sequencer::{LinePhase, TurnSequencer, TurnState};
use narrative_stage::core::source::NarrativeSource;
use narrative_stage::schema::input::{Frame, InputEvent, Toggles};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "play", about = "Play a scripted story in the terminal")]
struct Args {
    #[arg(long, default_value = "story_data/witch_night/story.ron")]
    story: PathBuf,
    #[arg(long, default_value = "story_data/witch_night/stage.ron")]
    config: PathBuf,
    /// Start with auto mode on.
    #[arg(long)]
    auto: bool,
    /// Start with skip mode on.
    #[arg(long)]
    skip: bool,
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Start at this knot instead of the configured one.
    #[arg(long)]
    knot: Option<String>,
}

enum Command {
    Event(InputEvent),
    ToggleAuto,
    ToggleSkip,
    Quit,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let story = match ScriptedStory::load_from_ron(&args.story) {
        Ok(story) => story,
        Err(e) => {
            eprintln!("ERROR: Failed to load story '{}': {}", args.story.display(), e);
            std::process::exit(1);
        }
    };

    let mut builder = TurnSequencer::builder().story(story).config_path(&args.config);
    if let Some(ref knot) = args.knot {
        builder = builder.start_knot(knot);
    }
    let mut stage = match builder.build() {
        Ok(stage) => stage,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let mut toggles = Toggles {
        auto: args.auto,
        skip: args.skip,
    };
    println!("Enter = advance, a = auto, s = skip, b = backlog, q = quit\n");

    let commands = spawn_stdin_reader();
    let frame_time = Duration::from_secs_f32(1.0 / args.fps.max(1) as f32);
    let mut printer = LinePrinter::default();
    let mut last = Instant::now();
    let mut choices_shown = false;

    loop {
        while let Ok(command) = commands.try_recv() {
            match command {
                Command::Event(InputEvent::ToggleBacklog) => {
                    stage.push_event(InputEvent::ToggleBacklog);
                    if !stage.presenter().backlog_open() {
                        println!("\n=== Backlog ===");
                        print!("{}", stage.presenter().backlog().render());
                        println!("===============");
                    }
                }
                Command::Event(event) => stage.push_event(event),
                Command::ToggleAuto => {
                    toggles.auto = !toggles.auto;
                    println!("\n[auto {}]", on_off(toggles.auto));
                }
                Command::ToggleSkip => {
                    toggles.skip = !toggles.skip;
                    println!("\n[skip {}]", on_off(toggles.skip));
                }
                Command::Quit => return,
            }
        }

        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        let state = match stage.step(Frame::new(delta, toggles)) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("\nERROR: {}", e);
                std::process::exit(1);
            }
        };

        match state {
            TurnState::Draining(LinePhase::Revealing) | TurnState::Draining(LinePhase::AwaitingAdvance) => {
                choices_shown = false;
                printer.show(&stage, stage.lines_presented());
            }
            TurnState::AwaitingChoice => {
                printer.finish(&stage);
                if !choices_shown {
                    choices_shown = true;
                    println!();
                    for choice in stage.view().choices {
                        println!("  {}) {}", choice.index + 1, choice.text);
                    }
                    print!("> ");
                    io::stdout().flush().ok();
                }
            }
            TurnState::Ended => {
                printer.finish(&stage);
                println!("\n\n[The End: {} lines]", stage.lines_presented());
                return;
            }
            TurnState::Draining(LinePhase::Pull) => {}
        }

        thread::sleep(frame_time);
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Prints the line being revealed, a few characters per frame.
#[derive(Default)]
struct LinePrinter {
    /// Index of the line on screen, counted in lines presented.
    line: Option<u64>,
    printed: usize,
}

impl LinePrinter {
    fn show<S: NarrativeSource>(&mut self, stage: &TurnSequencer<S>, index: u64) {
        let view = stage.view();

        if self.line != Some(index) {
            if let Some(previous) = self.line {
                let skipped = index.saturating_sub(previous + 1);
                if skipped > 0 {
                    print!("\n  ... {} line(s) skipped", skipped);
                }
            }
            self.line = Some(index);
            self.printed = 0;
            if view.speaker.is_empty() {
                println!();
            } else {
                print!("\n{}: ", view.speaker);
            }
        }

        let visible = view.visible_text;
        if visible.len() > self.printed {
            print!("{}", &visible[self.printed..]);
            self.printed = visible.len();
            io::stdout().flush().ok();
        }
    }

    /// Show the rest of the last presented line, once the sequencer has
    /// moved past it.
    fn finish<S: NarrativeSource>(&mut self, stage: &TurnSequencer<S>) {
        if let Some(index) = stage.lines_presented().checked_sub(1) {
            self.show(stage, index);
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim().to_lowercase().as_str() {
                "" => Command::Event(InputEvent::Advance),
                "a" => Command::ToggleAuto,
                "s" => Command::ToggleSkip,
                "b" => Command::Event(InputEvent::ToggleBacklog),
                "q" | "quit" | "exit" => Command::Quit,
                other => match other.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Event(InputEvent::SelectChoice(n - 1)),
                    _ => {
                        println!("Unknown command: {}", other);
                        continue;
                    }
                },
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });
    rx
}
