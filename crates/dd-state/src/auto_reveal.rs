//! # Auto-Reveal Task
//!
//! Auto-reveal is a logical timer owned by the lifecycle. The lifecycle
//! holds at most one [`AutoRevealTask`]; the task's presence is the
//! `auto_reveal_active` flag. Each task carries a token issued from a
//! monotonically increasing counter, so a driver that captured the token of a
//! cancelled task can never fire reveals on behalf of a newer one.
//!
//! Time is passed in by the caller (`Instant`), which keeps the state
//! machine synchronous and testable without a clock.

use std::time::{Duration, Instant};

/// A scheduled sequence of reveals spaced by a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRevealTask {
    token: u64,
    next_due: Instant,
    delay: Duration,
}

impl AutoRevealTask {
    /// Task whose first reveal is due at `first_due`.
    pub fn new(token: u64, first_due: Instant, delay: Duration) -> Self {
        Self {
            token,
            next_due: first_due,
            delay,
        }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due <= now
    }

    /// Schedule the following reveal one delay after the current deadline.
    pub fn advance(&mut self) {
        self.next_due += self.delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlines_step_by_delay() {
        let t0 = Instant::now();
        let mut task = AutoRevealTask::new(1, t0, Duration::from_millis(800));
        assert!(task.is_due(t0));
        task.advance();
        assert!(!task.is_due(t0 + Duration::from_millis(799)));
        assert!(task.is_due(t0 + Duration::from_millis(800)));
        assert_eq!(task.next_due(), t0 + Duration::from_millis(800));
        assert_eq!(task.token(), 1);
    }
}
