//! Backlog — bounded scrollback of everything shown to the player.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One recorded line of the backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogEntry {
    pub speaker: String,
    pub line: String,
}

/// Append-only log with FIFO eviction once `max_entries` is exceeded.
///
/// A `max_entries` of 0 disables eviction.
#[derive(Debug, Clone)]
pub struct Backlog {
    entries: VecDeque<BacklogEntry>,
    max_entries: usize,
}

impl Backlog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Record a line. Blank lines are dropped. Returns whether anything
    /// was recorded.
    pub fn append(&mut self, speaker: &str, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }

        self.entries.push_back(BacklogEntry {
            speaker: speaker.to_string(),
            line: line.to_string(),
        });

        if self.max_entries > 0 {
            while self.entries.len() > self.max_entries {
                self.entries.pop_front();
            }
        }
        true
    }

    /// The whole log as text, one `speaker: line` (or bare `line`) per row.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(4096);
        for entry in &self.entries {
            if !entry.speaker.is_empty() {
                out.push_str(&entry.speaker);
                out.push_str(": ");
            }
            out.push_str(&entry.line);
            out.push('\n');
        }
        out
    }

    pub fn entries(&self) -> impl Iterator<Item = &BacklogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

/// Whether the backlog panel should jump to the bottom.
///
/// `position` is the viewport's normalized vertical position: 1.0 at the
/// top, 0.0 at the bottom.
pub fn should_auto_scroll(position: f32, threshold: f32, force_to_bottom: bool) -> bool {
    force_to_bottom || position <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(backlog: &Backlog) -> Vec<String> {
        backlog.entries().map(|e| e.line.clone()).collect()
    }

    #[test]
    fn append_and_render() {
        let mut backlog = Backlog::new(10);
        backlog.append("Amy", "Hello.");
        backlog.append("", "The wind howls.");
        assert_eq!(backlog.render(), "Amy: Hello.\nThe wind howls.\n");
    }

    #[test]
    fn blank_lines_are_ignored() {
        let mut backlog = Backlog::new(10);
        assert!(!backlog.append("Amy", ""));
        assert!(!backlog.append("Amy", "   \t\n"));
        assert!(backlog.is_empty());
        assert_eq!(backlog.render(), "");
    }

    #[test]
    fn evicts_oldest_first() {
        let mut backlog = Backlog::new(3);
        assert_eq!(backlog.max_entries(), 3);
        for i in 0..7 {
            backlog.append("", &format!("line {}", i));
            assert!(backlog.len() <= 3);
        }
        assert_eq!(lines(&backlog), vec!["line 4", "line 5", "line 6"]);
    }

    #[test]
    fn surviving_entries_are_most_recent_in_order() {
        for max in 1..6 {
            let mut backlog = Backlog::new(max);
            let mut all = Vec::new();
            for i in 0..13 {
                let text = if i % 4 == 3 {
                    " ".to_string()
                } else {
                    format!("entry {}", i)
                };
                if backlog.append("s", &text) {
                    all.push(text);
                }
                assert!(backlog.len() <= max);
            }
            let expected: Vec<String> = all[all.len().saturating_sub(max)..].to_vec();
            assert_eq!(lines(&backlog), expected, "max_entries = {}", max);
        }
    }

    #[test]
    fn zero_bound_keeps_everything() {
        let mut backlog = Backlog::new(0);
        for i in 0..500 {
            backlog.append("", &i.to_string());
        }
        assert_eq!(backlog.len(), 500);
    }

    #[test]
    fn auto_scroll_policy() {
        assert!(should_auto_scroll(0.0, 0.02, false));
        assert!(should_auto_scroll(0.02, 0.02, false));
        assert!(!should_auto_scroll(0.5, 0.02, false));
        assert!(should_auto_scroll(1.0, 0.02, true));
    }
}
