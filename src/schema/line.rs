//! Line records produced by a single continuation of the narrative source.

use serde::{Deserialize, Serialize};

/// One unit of dialogue output.
///
/// An empty `speaker` means the line carries no speaker tag; the presenter
/// keeps whatever speaker was displayed before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub speaker: String,
    pub text: String,
    pub tags: Vec<String>,
}

impl Line {
    /// Build a line from raw continuation output and the tags attached to it.
    ///
    /// Trailing `\n` / `\r` characters are stripped from the text and the
    /// speaker is resolved from the tags with [`extract_speaker`].
    pub fn from_raw(raw: &str, tags: Vec<String>) -> Self {
        let text = raw.trim_end_matches(['\n', '\r']).to_string();
        let speaker = extract_speaker(&tags);
        Self {
            speaker,
            text,
            tags,
        }
    }

    /// Returns true if the line has a non-blank speaker.
    pub fn has_speaker(&self) -> bool {
        !self.speaker.trim().is_empty()
    }

    /// Line length in characters, as used for auto-advance timing.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

const SPEAKER_KEYWORD: &str = "speaker";

/// Find the speaker name in a line's tags.
///
/// Accepted forms, case-insensitive on the keyword, with an optional leading `#`:
/// - `speaker: Amy` → everything after the first colon, trimmed
/// - `speaker Amy`  → the first whitespace-separated word after the keyword
///
/// The first tag that yields a non-empty name wins. Returns an empty string
/// when no tag names a speaker.
pub fn extract_speaker(tags: &[String]) -> String {
    tags.iter()
        .find_map(|tag| speaker_from_tag(tag))
        .unwrap_or_default()
}

fn speaker_from_tag(tag: &str) -> Option<String> {
    let mut t = tag.trim();
    if let Some(rest) = t.strip_prefix('#') {
        t = rest.trim();
    }

    let head = t.get(..SPEAKER_KEYWORD.len())?;
    if !head.eq_ignore_ascii_case(SPEAKER_KEYWORD) {
        return None;
    }

    let name = match t.find(':') {
        Some(colon) => t[colon + 1..].trim(),
        None => t.split_whitespace().nth(1).unwrap_or(""),
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
