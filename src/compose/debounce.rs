use std::time::{Duration, Instant};

/// Quiet period used to coalesce rapid parameter edits.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(100);

/// Trailing-edge debouncer driven by caller-supplied timestamps.
///
/// Every [`schedule`](Self::schedule) pushes the deadline out to `now + quiet`; the action is
/// due once a [`fire`](Self::fire) call observes a timestamp at or past that deadline.
#[derive(Clone, Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_QUIET)
    }
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Consume the pending action if it is due.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/debounce.rs"]
mod tests;
