//! Single-shot reply deadline.
//!
//! The module pipeline keeps exactly one expectation in flight, so one
//! deadline is enough: arming a new window overwrites the previous one,
//! and any valid inbound frame cancels it. On expiry the driver
//! synthesizes an error event with the reserved timed-out code and feeds
//! it through the normal dispatch path.

use tokio::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(crate) struct TimeoutSupervisor {
    deadline: Option<Instant>,
}

impl TimeoutSupervisor {
    pub(crate) fn new() -> Self {
        TimeoutSupervisor { deadline: None }
    }

    /// Start (or restart) the countdown.
    pub(crate) fn arm(&mut self, window: Duration) {
        self.deadline = Some(Instant::now() + window);
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline = None;
    }

    #[cfg(test)]
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once per expiry; the deadline is consumed.
    pub(crate) fn expired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_window() {
        let mut timer = TimeoutSupervisor::new();
        timer.arm(Duration::from_millis(200));
        assert!(!timer.expired());

        tokio::time::advance(Duration::from_millis(199)).await;
        assert!(!timer.expired());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(timer.expired());
        assert!(!timer.expired(), "deadline is single-shot");
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_overwrites_the_pending_deadline() {
        let mut timer = TimeoutSupervisor::new();
        timer.arm(Duration::from_millis(200));
        tokio::time::advance(Duration::from_millis(150)).await;
        timer.arm(Duration::from_millis(200));
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!timer.expired(), "old deadline must not fire");
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(timer.expired());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_the_deadline() {
        let mut timer = TimeoutSupervisor::new();
        timer.arm(Duration::from_millis(200));
        timer.cancel();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!timer.expired());
        assert!(timer.deadline().is_none());
    }
}
