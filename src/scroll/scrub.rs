use web_time::Instant;

use crate::animation::Ease;

/// Smoothed scrub progress: every new target restarts a `power3.out`
/// catch-up lasting `lag` seconds from wherever the value currently is.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scrub {
    lag: f32,
    value: f32,
    catchup: Option<Catchup>,
}

#[derive(Debug, Clone, Copy)]
struct Catchup {
    from: f32,
    to: f32,
    started: Instant,
}

const CATCHUP_EASE: Ease = Ease::PowerOut(3);

impl Scrub {
    pub(crate) fn new(lag: f32) -> Self {
        Self {
            lag,
            value: 0.0,
            catchup: None,
        }
    }

    pub(crate) fn value(&self) -> f32 {
        self.value
    }

    /// Chase a new target.
    pub(crate) fn retarget(&mut self, target: f32, now: Instant) {
        if self.lag <= 0.0 {
            self.value = target;
            self.catchup = None;
            return;
        }
        self.catchup = Some(Catchup {
            from: self.value,
            to: target,
            started: now,
        });
    }

    /// Advance the catch-up to `now`.
    pub(crate) fn tick(&mut self, now: Instant) {
        let Some(c) = self.catchup else {
            return;
        };
        let t = now.saturating_duration_since(c.started).as_secs_f32() / self.lag;
        self.value = c.from + (c.to - c.from) * CATCHUP_EASE.evaluate(t);
        if t >= 1.0 {
            self.value = c.to;
            self.catchup = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn catches_up_within_lag() {
        let t0 = Instant::now();
        let mut scrub = Scrub::new(1.0);
        scrub.retarget(1.0, t0);
        scrub.tick(t0 + Duration::from_millis(500));
        let halfway = scrub.value();
        assert!(halfway > 0.5 && halfway < 1.0);
        scrub.tick(t0 + Duration::from_secs(1));
        assert_eq!(scrub.value(), 1.0);
        assert!(scrub.catchup.is_none());
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let t0 = Instant::now();
        let mut scrub = Scrub::new(1.0);
        scrub.retarget(1.0, t0);
        scrub.tick(t0 + Duration::from_millis(500));
        let mid = scrub.value();
        scrub.retarget(0.0, t0 + Duration::from_millis(500));
        scrub.tick(t0 + Duration::from_millis(500));
        assert_eq!(scrub.value(), mid);
    }

    #[test]
    fn zero_lag_is_immediate() {
        let mut scrub = Scrub::new(0.0);
        scrub.retarget(0.4, Instant::now());
        assert_eq!(scrub.value(), 0.4);
    }
}
