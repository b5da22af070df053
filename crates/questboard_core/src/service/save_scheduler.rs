//! Debounced save handle.
//!
//! # Responsibility
//! - Track when the next persistence write is due.
//!
//! # Invariants
//! - At most one save is pending; scheduling again replaces the deadline.
//! - The handle never writes by itself; its owner polls it.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SaveScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)schedules the save `delay` after `now`, discarding any earlier deadline.
    pub fn schedule_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Clears and returns `true` when the pending save is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::SaveScheduler;
    use std::time::{Duration, Instant};

    #[test]
    fn rescheduling_pushes_the_deadline_back() {
        let start = Instant::now();
        let mut scheduler = SaveScheduler::new(Duration::from_millis(300));

        scheduler.schedule_at(start);
        scheduler.schedule_at(start + Duration::from_millis(200));

        assert!(!scheduler.is_due(start + Duration::from_millis(350)));
        assert!(scheduler.is_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn take_due_fires_once() {
        let start = Instant::now();
        let mut scheduler = SaveScheduler::new(Duration::from_millis(300));
        scheduler.schedule_at(start);

        assert!(!scheduler.take_due(start + Duration::from_millis(299)));
        assert!(scheduler.take_due(start + Duration::from_millis(300)));
        assert!(!scheduler.is_pending());
        assert!(!scheduler.take_due(start + Duration::from_secs(10)));
    }

    #[test]
    fn cancel_discards_pending_save() {
        let start = Instant::now();
        let mut scheduler = SaveScheduler::new(Duration::ZERO);
        scheduler.schedule_at(start);
        scheduler.cancel();
        assert!(!scheduler.is_due(start + Duration::from_secs(1)));
        assert!(!scheduler.is_pending());
    }
}
