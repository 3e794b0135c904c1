//! Model rotation state machines.
//!
//! [`RotationScheduler`] drives the hero section: an intro that shows every
//! model at once, a one-way handoff to cycling, and cycling that never
//! starts a switch while another is still animating. [`VariantCycler`] is
//! the simpler dual-model flip used by showcase panels.

use std::time::Duration;

use web_time::Instant;

use crate::timers::{TimerId, TimerRegistry};

/// Part of a switch animation that is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStage {
    /// Current model shrinking out.
    FadingOut,
    /// New model growing in.
    FadingIn,
}

/// Cycling sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Waiting for the next tick or selection.
    Idle,
    /// A switch animation is running.
    Switching {
        /// Index being switched to.
        to: usize,
        /// Stage of the animation.
        stage: SwitchStage,
    },
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Intro sequence running; every model visible.
    Introducing,
    /// One model at a time.
    Cycling(Cycle),
}

/// A switch the section must animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchRequest {
    /// Index currently shown.
    pub from: usize,
    /// Index to show next.
    pub to: usize,
}

/// Intro handoff and mutually exclusive model switching.
///
/// The active index is always in `[0, count)`.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    count: usize,
    index: usize,
    phase: Phase,
}

impl RotationScheduler {
    /// Scheduler over `count` variants (at least one), starting in the
    /// intro when `intro` is set and cycling otherwise.
    #[must_use]
    pub fn new(count: usize, intro: bool) -> Self {
        Self {
            count: count.max(1),
            index: 0,
            phase: if intro {
                Phase::Introducing
            } else {
                Phase::Cycling(Cycle::Idle)
            },
        }
    }

    /// Number of variants.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Active variant.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the intro is still running.
    #[must_use]
    pub fn is_introducing(&self) -> bool {
        self.phase == Phase::Introducing
    }

    /// Whether a switch animation is running.
    #[must_use]
    pub fn is_switching(&self) -> bool {
        matches!(self.phase, Phase::Cycling(Cycle::Switching { .. }))
    }

    /// Hand off from the intro to cycling at index 0. Only the first call
    /// has an effect.
    pub fn finish_intro(&mut self) -> bool {
        if self.phase != Phase::Introducing {
            return false;
        }
        self.index = 0;
        self.phase = Phase::Cycling(Cycle::Idle);
        log::info!("intro finished, cycling {} models", self.count);
        true
    }

    /// Interval tick: switch to the next variant unless the intro is
    /// running, a switch is in progress or there is nothing to switch to.
    pub fn tick(&mut self) -> Option<SwitchRequest> {
        if self.count < 2 {
            return None;
        }
        if self.phase != Phase::Cycling(Cycle::Idle) {
            log::debug!("rotation tick skipped ({:?})", self.phase);
            return None;
        }
        Some(self.begin((self.index + 1) % self.count))
    }

    /// Explicit selection from the variant buttons.
    pub fn select(&mut self, index: usize) -> Option<SwitchRequest> {
        if index >= self.count
            || index == self.index
            || self.phase != Phase::Cycling(Cycle::Idle)
        {
            return None;
        }
        Some(self.begin(index))
    }

    fn begin(&mut self, to: usize) -> SwitchRequest {
        let request = SwitchRequest {
            from: self.index,
            to,
        };
        self.phase = Phase::Cycling(Cycle::Switching {
            to,
            stage: SwitchStage::FadingOut,
        });
        log::info!("switching model {} -> {}", request.from, request.to);
        request
    }

    /// Fade-out finished: swap the visible model. Returns the new index.
    pub fn faded_out(&mut self) -> Option<usize> {
        match self.phase {
            Phase::Cycling(Cycle::Switching {
                to,
                stage: SwitchStage::FadingOut,
            }) => {
                self.index = to;
                self.phase = Phase::Cycling(Cycle::Switching {
                    to,
                    stage: SwitchStage::FadingIn,
                });
                Some(to)
            }
            _ => None,
        }
    }

    /// Fade-in finished: back to idle.
    pub fn faded_in(&mut self) -> bool {
        match self.phase {
            Phase::Cycling(Cycle::Switching {
                stage: SwitchStage::FadingIn,
                ..
            }) => {
                self.phase = Phase::Cycling(Cycle::Idle);
                true
            }
            _ => false,
        }
    }
}

/// Fixed-interval flip between the variants of a multi-model panel.
///
/// Selecting a variant restarts the interval so a manual choice stays on
/// screen for a full period.
#[derive(Debug, Clone)]
pub struct VariantCycler {
    count: usize,
    index: usize,
    interval: Duration,
    timer: Option<TimerId>,
}

impl VariantCycler {
    /// Cycler over `count` variants switching every `interval`.
    #[must_use]
    pub fn new(count: usize, interval: Duration) -> Self {
        Self {
            count: count.max(1),
            index: 0,
            interval,
            timer: None,
        }
    }

    /// Active variant.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of variants.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the interval is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Schedule the interval. Single-variant cyclers never schedule.
    pub fn start(&mut self, timers: &mut TimerRegistry, now: Instant) {
        if self.count < 2 || self.timer.is_some() {
            return;
        }
        self.timer = Some(timers.set_interval(self.interval, now));
    }

    /// Handle a fired timer. Returns the new index if it was ours.
    pub fn on_timer(&mut self, id: TimerId) -> Option<usize> {
        if self.timer != Some(id) {
            return None;
        }
        self.index = (self.index + 1) % self.count;
        Some(self.index)
    }

    /// Show `index` and restart the interval.
    pub fn select(&mut self, index: usize, timers: &mut TimerRegistry, now: Instant) -> bool {
        if index >= self.count {
            return false;
        }
        self.index = index;
        if let Some(timer) = self.timer {
            let _ = timers.reset(timer, now);
        }
        true
    }

    /// Cancel the interval.
    pub fn stop(&mut self, timers: &mut TimerRegistry) {
        if let Some(timer) = self.timer.take() {
            let _ = timers.clear(timer);
        }
    }
}
