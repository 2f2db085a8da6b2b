//! Pending timer set for gesture disambiguation.
//!
//! Timers are plain deadlines, not host callbacks. The owning state machine
//! replaces the whole set on every transition, so a timer armed for a
//! superseded session can never fire.

use std::time::Duration;

/// Deadlines keyed by timer kind. At most one deadline per kind.
#[derive(Debug, Clone)]
pub struct PendingTimers<K> {
    entries: Vec<(K, Duration)>,
}

impl<K> Default for PendingTimers<K> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: Copy + Eq> PendingTimers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a timer.
    pub fn arm(&mut self, kind: K, deadline: Duration) {
        self.cancel(kind);
        self.entries.push((kind, deadline));
    }

    /// Cancel a timer. Returns whether it was armed.
    pub fn cancel(&mut self, kind: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != kind);
        before != self.entries.len()
    }

    /// Drop every timer and arm exactly `timers`.
    pub fn replace(&mut self, timers: &[(K, Duration)]) {
        self.entries.clear();
        self.entries.extend_from_slice(timers);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_armed(&self, kind: K) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    pub fn deadline(&self, kind: K) -> Option<Duration> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, d)| *d)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Earliest deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|(_, d)| *d).min()
    }

    /// Remove and return the earliest timer whose deadline is at or before `now`.
    pub fn pop_expired(&mut self, now: Duration) -> Option<(K, Duration)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .min_by_key(|(_, (_, deadline))| *deadline)
            .map(|(i, _)| i)?;
        Some(self.entries.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_arm_replaces_same_kind() {
        let mut timers = PendingTimers::new();
        timers.arm(Kind::A, ms(10));
        timers.arm(Kind::A, ms(20));
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.deadline(Kind::A), Some(ms(20)));
    }

    #[test]
    fn test_pop_expired_in_deadline_order() {
        let mut timers = PendingTimers::new();
        timers.arm(Kind::B, ms(30));
        timers.arm(Kind::A, ms(10));
        assert_eq!(timers.pop_expired(ms(5)), None);
        assert_eq!(timers.pop_expired(ms(40)), Some((Kind::A, ms(10))));
        assert_eq!(timers.pop_expired(ms(40)), Some((Kind::B, ms(30))));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_replace_clears_everything() {
        let mut timers = PendingTimers::new();
        timers.arm(Kind::A, ms(10));
        timers.arm(Kind::B, ms(10));
        timers.replace(&[(Kind::B, ms(99))]);
        assert!(!timers.is_armed(Kind::A));
        assert_eq!(timers.next_deadline(), Some(ms(99)));
    }
}
