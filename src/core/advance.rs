use crate::schema::input::Toggles;

/// Why an advance wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Still waiting; check again next frame.
    Waiting,
    /// Skip mode was on.
    Skipped,
    /// The player pressed advance.
    Manual,
    /// Auto mode ran out the timer.
    Auto,
}

impl AdvanceOutcome {
    pub fn is_done(self) -> bool {
        self != AdvanceOutcome::Waiting
    }
}

/// Waits after a fully revealed line for a manual advance or, in auto mode,
/// for `auto_wait` seconds of uninterrupted auto time.
#[derive(Debug, Clone)]
pub struct AdvanceWait {
    auto_wait: f32,
    auto_timer: f32,
}

impl AdvanceWait {
    pub fn new(auto_wait: f32) -> Self {
        Self {
            auto_wait,
            auto_timer: 0.0,
        }
    }

    pub fn auto_wait(&self) -> f32 {
        self.auto_wait
    }

    pub fn auto_elapsed(&self) -> f32 {
        self.auto_timer
    }

    /// Check the wait for one frame. A pending manual advance is consumed
    /// (cleared) when it ends the wait.
    pub fn tick(&mut self, delta: f32, toggles: Toggles, advance_requested: &mut bool) -> AdvanceOutcome {
        if toggles.skip {
            *advance_requested = false;
            return AdvanceOutcome::Skipped;
        }

        if *advance_requested {
            *advance_requested = false;
            return AdvanceOutcome::Manual;
        }

        if toggles.auto {
            self.auto_timer += delta.max(0.0);
            if self.auto_timer >= self.auto_wait {
                return AdvanceOutcome::Auto;
            }
        } else {
            self.auto_timer = 0.0;
        }

        AdvanceOutcome::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_mode_returns_immediately() {
        let mut wait = AdvanceWait::new(1.0);
        let mut requested = true;
        assert_eq!(wait.tick(0.0, Toggles::skip(), &mut requested), AdvanceOutcome::Skipped);
        assert!(!requested);
    }

    #[test]
    fn manual_advance_is_consumed() {
        let mut wait = AdvanceWait::new(1.0);
        let mut requested = false;
        assert_eq!(wait.tick(0.1, Toggles::manual(), &mut requested), AdvanceOutcome::Waiting);
        requested = true;
        assert_eq!(wait.tick(0.1, Toggles::manual(), &mut requested), AdvanceOutcome::Manual);
        assert!(!requested);
    }

    #[test]
    fn auto_waits_full_period() {
        let mut wait = AdvanceWait::new(1.0);
        assert_eq!(wait.auto_wait(), 1.0);
        let mut requested = false;
        let mut elapsed = 0.0;
        loop {
            let outcome = wait.tick(0.125, Toggles::auto(), &mut requested);
            elapsed += 0.125;
            if outcome.is_done() {
                assert_eq!(outcome, AdvanceOutcome::Auto);
                break;
            }
        }
        assert!(elapsed >= 1.0);
    }

    #[test]
    fn turning_auto_off_resets_timer() {
        let mut wait = AdvanceWait::new(1.0);
        let mut requested = false;
        for _ in 0..6 {
            wait.tick(0.125, Toggles::auto(), &mut requested);
        }
        assert_eq!(wait.auto_elapsed(), 0.75);

        wait.tick(0.125, Toggles::manual(), &mut requested);
        assert_eq!(wait.auto_elapsed(), 0.0);

        for _ in 0..7 {
            assert_eq!(wait.tick(0.125, Toggles::auto(), &mut requested), AdvanceOutcome::Waiting);
        }
        assert_eq!(wait.tick(0.125, Toggles::auto(), &mut requested), AdvanceOutcome::Auto);
    }

    #[test]
    fn manual_mode_never_auto_advances() {
        let mut wait = AdvanceWait::new(0.05);
        let mut requested = false;
        for _ in 0..100 {
            assert_eq!(wait.tick(1.0, Toggles::manual(), &mut requested), AdvanceOutcome::Waiting);
        }
    }
}
