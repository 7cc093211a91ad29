//! Text measurement — how many characters a rendered line actually shows.
//!
//! The reveal counts laid-out characters, which is not the same as the raw
//! string length once rich-text markup is involved.

/// Counts the visible characters of a string and maps a visible count back
/// to a printable prefix.
pub trait TextMeasure {
    /// Number of characters the layout engine would display.
    fn visible_len(&self, text: &str) -> usize;

    /// The prefix of `text` that shows exactly `visible` characters.
    fn visible_slice<'a>(&self, text: &'a str, visible: usize) -> &'a str;
}

/// Plain text: every Unicode scalar value is one visible character.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl TextMeasure for PlainText {
    fn visible_len(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn visible_slice<'a>(&self, text: &'a str, visible: usize) -> &'a str {
        match text.char_indices().nth(visible) {
            Some((i, _)) => &text[..i],
            None => text,
        }
    }
}

/// Rich text with `<tag>` markup, e.g. `<b>`, `<color=#f00>`, `</i>`.
///
/// Markup is zero-width. A `<` with no closing `>` is shown literally.
#[derive(Debug, Clone, Copy, Default)]
pub struct RichText;

impl RichText {
    /// Walk the text, calling `visit` with the byte offset just past each
    /// visible character. Stops early when `visit` returns false.
    fn walk(text: &str, mut visit: impl FnMut(usize) -> bool) {
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '<' {
                if let Some(close) = text[i..].find('>') {
                    let end = i + close + 1;
                    while chars.peek().is_some_and(|&(j, _)| j < end) {
                        chars.next();
                    }
                    continue;
                }
            }
            if !visit(i + c.len_utf8()) {
                return;
            }
        }
    }
}

impl TextMeasure for RichText {
    fn visible_len(&self, text: &str) -> usize {
        let mut count = 0;
        Self::walk(text, |_| {
            count += 1;
            true
        });
        count
    }

    fn visible_slice<'a>(&self, text: &'a str, visible: usize) -> &'a str {
        if visible == 0 {
            return "";
        }
        let mut seen = 0;
        let mut end = text.len();
        Self::walk(text, |offset| {
            seen += 1;
            if seen == visible {
                end = offset;
                return false;
            }
            true
        });
        &text[..end]
    }
}

/// Pick the measure matching a presenter's `rich_text` setting.
pub fn measure_for(rich_text: bool) -> Box<dyn TextMeasure> {
    if rich_text {
        Box::new(RichText)
    } else {
        Box::new(PlainText)
    }
}
