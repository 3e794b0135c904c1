//! Interval and timeout registry with explicit cancellation.
//!
//! Stands in for the page's `setInterval` / `setTimeout`: sections schedule
//! through a registry they own, the host polls it with the current time,
//! and unmount clears everything so no timer outlives its section.

use std::time::Duration;

use web_time::Instant;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    due: Instant,
    period: Option<Duration>,
}

/// Set of pending timers.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every `period`, starting one period after `now`.
    pub fn set_interval(&mut self, period: Duration, now: Instant) -> TimerId {
        self.push(now + period, Some(period))
    }

    /// Fire once, `delay` after `now`.
    pub fn set_timeout(&mut self, delay: Duration, now: Instant) -> TimerId {
        self.push(now + delay, None)
    }

    fn push(&mut self, due: Instant, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer { id, due, period });
        id
    }

    /// Restart an interval's period from `now`. Returns whether it exists.
    pub fn reset(&mut self, id: TimerId, now: Instant) -> bool {
        match self.timers.iter_mut().find(|t| t.id == id) {
            Some(timer) => {
                timer.due = now + timer.period.unwrap_or_default();
                true
            }
            None => false,
        }
    }

    /// Cancel a timer. Returns whether it was pending.
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    /// Cancel everything.
    pub fn clear_all(&mut self) {
        self.timers.clear();
    }

    /// Number of pending timers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Whether `id` is pending.
    #[must_use]
    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Timers due at `now`, earliest first. Timeouts are removed; intervals
    /// are rescheduled and fire at most once per poll.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired: Vec<(Instant, TimerId)> = Vec::new();
        self.timers.retain_mut(|timer| {
            if timer.due > now {
                return true;
            }
            fired.push((timer.due, timer.id));
            match timer.period {
                Some(period) => {
                    let mut next = timer.due + period;
                    if next <= now {
                        next = now + period;
                    }
                    timer.due = next;
                    true
                }
                None => false,
            }
        });
        fired.sort();
        fired.into_iter().map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn interval_repeats() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let id = timers.set_interval(ms(8000), t0);
        assert!(timers.poll(t0 + ms(7999)).is_empty());
        assert_eq!(timers.poll(t0 + ms(8000)), vec![id]);
        assert!(timers.poll(t0 + ms(8001)).is_empty());
        assert_eq!(timers.poll(t0 + ms(16000)), vec![id]);
        assert_eq!(timers.active_count(), 1);
    }

    #[test]
    fn overdue_interval_fires_once() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let id = timers.set_interval(ms(100), t0);
        assert_eq!(timers.poll(t0 + ms(1000)), vec![id]);
        assert!(timers.poll(t0 + ms(1050)).is_empty());
        assert_eq!(timers.poll(t0 + ms(1100)), vec![id]);
    }

    #[test]
    fn timeout_fires_once_and_is_removed() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let id = timers.set_timeout(ms(50), t0);
        assert_eq!(timers.poll(t0 + ms(60)), vec![id]);
        assert_eq!(timers.active_count(), 0);
        assert!(!timers.clear(id));
    }

    #[test]
    fn reset_and_clear() {
        let t0 = Instant::now();
        let mut timers = TimerRegistry::new();
        let a = timers.set_interval(ms(100), t0);
        let b = timers.set_timeout(ms(150), t0);
        assert!(timers.reset(a, t0 + ms(90)));
        assert_eq!(timers.poll(t0 + ms(150)), vec![b]);
        assert_eq!(timers.poll(t0 + ms(190)), vec![a]);
        timers.clear_all();
        assert_eq!(timers.active_count(), 0);
        assert!(timers.poll(t0 + ms(10_000)).is_empty());
    }
}
