use super::easing::Ease;
use super::property::{Property, TargetId, TweenValue, Value};

/// Duration used when a tween does not set one, in seconds.
pub const DEFAULT_DURATION: f32 = 0.5;

/// One step of a timeline: interpolate some properties of some targets.
///
/// Start values are captured lazily, the first time the step renders, so a
/// tween animates from wherever earlier steps left the property. `from_to`
/// tweens fix the start value instead and render it immediately.
#[derive(Debug, Clone)]
pub struct Tween<C = ()> {
    pub(crate) targets: Vec<TargetId>,
    pub(crate) to: Vec<(Property, TweenValue)>,
    pub(crate) from: Vec<(Property, Value)>,
    pub(crate) duration: f32,
    pub(crate) ease: Ease,
    pub(crate) delay: f32,
    pub(crate) stagger: f32,
    pub(crate) repeat: u32,
    pub(crate) yoyo: bool,
    pub(crate) immediate_render: bool,
    pub(crate) on_complete: Option<C>,
}

impl<C> Tween<C> {
    fn new(targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            to: Vec::new(),
            from: Vec::new(),
            duration: DEFAULT_DURATION,
            ease: Ease::DEFAULT,
            delay: 0.0,
            stagger: 0.0,
            repeat: 0,
            yoyo: false,
            immediate_render: false,
            on_complete: None,
        }
    }

    /// Animate from the current values to the ones given with [`Tween::prop`].
    #[must_use]
    pub fn to(targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self::new(targets)
    }

    /// Animate from explicit start values ([`Tween::from`]) to end values.
    /// The start values are applied as soon as the timeline first renders.
    #[must_use]
    pub fn from_to(targets: impl IntoIterator<Item = TargetId>) -> Self {
        let mut tween = Self::new(targets);
        tween.immediate_render = true;
        tween
    }

    /// Zero-duration jump to the given values.
    #[must_use]
    pub fn set(targets: impl IntoIterator<Item = TargetId>) -> Self {
        let mut tween = Self::new(targets);
        tween.duration = 0.0;
        tween
    }

    /// End value of a property.
    #[must_use]
    pub fn prop(mut self, property: Property, value: impl Into<TweenValue>) -> Self {
        self.to.push((property, value.into()));
        self
    }

    /// Explicit start value of a property.
    #[must_use]
    pub fn from(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.from.push((property, value.into()));
        self
    }

    /// Seconds per target per play.
    #[must_use]
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Easing curve.
    #[must_use]
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Extra offset added to the position the tween is placed at.
    #[must_use]
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// Seconds between consecutive targets starting.
    #[must_use]
    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds.max(0.0);
        self
    }

    /// Additional plays of the whole (staggered) tween.
    #[must_use]
    pub fn repeat(mut self, count: u32) -> Self {
        self.repeat = count;
        self
    }

    /// Play every other repeat backwards.
    #[must_use]
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Cue reported once the tween finishes playing forward.
    #[must_use]
    pub fn on_complete(mut self, cue: C) -> Self {
        self.on_complete = Some(cue);
        self
    }

    /// Targets in stagger order.
    #[must_use]
    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    /// Length of one play across all staggered targets.
    #[must_use]
    pub fn cycle_duration(&self) -> f32 {
        let extra = self.targets.len().saturating_sub(1) as f32 * self.stagger;
        extra + self.duration
    }

    /// Length including repeats.
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        self.cycle_duration() * (self.repeat as f32 + 1.0)
    }

    /// Eased progress of target `index` at `local` seconds after the tween
    /// started.
    #[must_use]
    pub fn target_progress(&self, local: f32, index: usize) -> f32 {
        if local < 0.0 {
            return 0.0;
        }
        let cycle = self.cycle_duration();
        if cycle <= 0.0 {
            return 1.0;
        }

        let t = local.min(self.total_duration());
        let mut iteration = (t / cycle).floor() as u32;
        let mut within = t - iteration as f32 * cycle;
        if iteration > self.repeat {
            iteration = self.repeat;
            within = cycle;
        }
        if self.yoyo && iteration % 2 == 1 {
            within = cycle - within;
        }

        let start = index as f32 * self.stagger;
        let raw = if self.duration <= 0.0 {
            if within >= start {
                1.0
            } else {
                0.0
            }
        } else {
            (within - start) / self.duration
        };
        self.ease.evaluate(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dots(n: u32) -> Vec<TargetId> {
        (0..n).map(|i| TargetId::indexed("dot", i)).collect()
    }

    #[test]
    fn staggered_duration_with_repeats() {
        let tween: Tween = Tween::to(dots(3))
            .prop(Property::Opacity, 0.9)
            .duration(0.7)
            .stagger(0.05)
            .repeat(5);
        assert!((tween.cycle_duration() - 0.8).abs() < 1e-6);
        assert!((tween.total_duration() - 4.8).abs() < 1e-5);
    }

    #[test]
    fn stagger_offsets_targets() {
        let tween: Tween = Tween::to(dots(2))
            .prop(Property::Y, 10.0)
            .duration(1.0)
            .stagger(0.5)
            .ease(Ease::Linear);
        assert_eq!(tween.target_progress(0.5, 0), 0.5);
        assert_eq!(tween.target_progress(0.5, 1), 0.0);
        assert_eq!(tween.target_progress(1.5, 1), 1.0);
    }

    #[test]
    fn yoyo_alternates_direction() {
        let tween: Tween = Tween::to(dots(1))
            .prop(Property::Glow, 1.0)
            .duration(1.0)
            .repeat(3)
            .yoyo(true)
            .ease(Ease::Linear);
        assert!((tween.target_progress(0.25, 0) - 0.25).abs() < 1e-6);
        assert!((tween.target_progress(1.25, 0) - 0.75).abs() < 1e-6);
        assert!((tween.target_progress(2.25, 0) - 0.25).abs() < 1e-6);
        // Four plays, the last one backwards.
        assert_eq!(tween.target_progress(4.0, 0), 0.0);
        assert_eq!(tween.target_progress(100.0, 0), 0.0);
    }

    #[test]
    fn set_jumps() {
        let tween: Tween = Tween::set(dots(1)).prop(Property::Opacity, 0.0);
        assert_eq!(tween.total_duration(), 0.0);
        assert_eq!(tween.target_progress(-0.1, 0), 0.0);
        assert_eq!(tween.target_progress(0.0, 0), 1.0);
    }
}
