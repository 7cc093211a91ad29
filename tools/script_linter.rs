/// Script Linter — checks scripted stories for broken diverts and dead knots.
///
/// Usage: script_linter <path> [--strict]
///
/// `<path>` may be a single `.ron` script or a directory searched recursively.
use clap::Parser;
use narrative_stage::core::scripted::{Script, Severity};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "script_linter", about = "Lint scripted story files")]
struct Args {
    /// Script file or directory of scripts.
    path: PathBuf,
    /// Treat warnings as errors.
    #[arg(long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();

    let mut files = Vec::new();
    if args.path.is_file() {
        files.push(args.path.clone());
    } else if args.path.is_dir() {
        collect_scripts(&args.path, &mut files);
        files.sort();
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args.path.display());
        process::exit(1);
    }

    println!("Found {} script file(s)", files.len());
    println!("\n=== Script Lint Report ===\n");

    let mut errors = 0usize;
    let mut warnings = 0usize;

    for file in &files {
        let script = match Script::load_from_ron(file) {
            Ok(script) => script,
            Err(e) => {
                println!("{}:\n  ERROR: failed to load: {}", file.display(), e);
                errors += 1;
                continue;
            }
        };

        let issues = script.lint();
        if issues.is_empty() {
            println!("{}: ok ({} knots)", file.display(), script.knots.len());
            continue;
        }

        println!("{}:", file.display());
        for issue in &issues {
            println!("  {}", issue);
            match issue.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
            }
        }
    }

    println!("\nSummary: {} errors, {} warnings", errors, warnings);

    if errors > 0 || (args.strict && warnings > 0) {
        process::exit(1);
    }
}

fn collect_scripts(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_scripts(&path, files);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron")
                && looks_like_script(&path)
            {
                files.push(path);
            }
        }
    }
}

/// Stage configs live next to scripts; only files with a `knots` table count.
fn looks_like_script(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .map(|contents| contents.contains("knots"))
        .unwrap_or(false)
}
