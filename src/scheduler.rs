use std::collections::VecDeque;

use instant::Duration;

/// Continuations waiting for the frame clock to reach their due time.
///
/// Entries are kept sorted by due time; entries with equal due times come
/// out in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: VecDeque<(Duration, T)>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn schedule(&mut self, due: Duration, item: T) {
        let at = self.pending.partition_point(|(d, _)| *d <= due);
        self.pending.insert(at, (due, item));
    }

    /// Removes and returns everything due at or before `now`.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let ready = self.pending.partition_point(|(d, _)| *d <= now);
        self.pending.drain(..ready).map(|(_, item)| item).collect()
    }

    pub fn peek_due(&self) -> Option<Duration> {
        self.pending.front().map(|(d, _)| *d)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
