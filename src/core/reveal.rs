//! Typewriter reveal — shows a line one character at a time.

/// Result of driving a reveal for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStatus {
    /// More characters remain; call `tick` again next frame.
    Pending,
    /// The full text is visible.
    Complete,
}

/// Frame-driven character reveal for a single line.
///
/// Once complete (by running out of characters, by skip mode, or by a skip
/// request) the whole text is visible and both `typing` and the pending
/// skip request are cleared.
#[derive(Debug, Clone, Default)]
pub struct Reveal {
    text: String,
    total: usize,
    visible: usize,
    delay: f32,
    timer: f32,
    typing: bool,
    skip_requested: bool,
}

impl Reveal {
    /// Start revealing `text`, which lays out as `total` visible characters.
    ///
    /// With `skip_mode` on the text is shown in full right away.
    pub fn begin(&mut self, text: &str, total: usize, delay: f32, skip_mode: bool) -> RevealStatus {
        self.text = text.to_string();
        self.total = total;
        self.delay = delay;
        self.timer = 0.0;

        if skip_mode {
            self.finish();
            return RevealStatus::Complete;
        }

        self.visible = 0;
        self.typing = true;
        self.skip_requested = false;
        RevealStatus::Pending
    }

    /// Advance by `delta` seconds. Skip mode and a pending skip request are
    /// checked before any time is accumulated.
    pub fn tick(&mut self, delta: f32, skip_mode: bool) -> RevealStatus {
        if !self.typing {
            return RevealStatus::Complete;
        }

        if self.visible >= self.total || skip_mode || self.skip_requested {
            self.finish();
            return RevealStatus::Complete;
        }

        self.timer += delta.max(0.0);
        while self.timer >= self.delay && self.visible < self.total {
            self.timer -= self.delay;
            self.visible += 1;
        }
        RevealStatus::Pending
    }

    /// Ask the running reveal to jump to the end on its next tick.
    /// Returns false if nothing is being revealed.
    pub fn request_skip(&mut self) -> bool {
        if self.typing {
            self.skip_requested = true;
        }
        self.typing
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn skip_requested(&self) -> bool {
        self.skip_requested
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters currently visible.
    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.total
    }

    fn finish(&mut self) {
        self.visible = self.total;
        self.typing = false;
        self.skip_requested = false;
    }
}
