//! Ordered tween steps interpreted by one driver.
//!
//! A [`Timeline`] is built once (steps placed with a [`Position`]) and then
//! driven either by wall-clock time ([`Timeline::play`] +
//! [`Timeline::advance`]) or by scroll progress ([`Timeline::seek_progress`]).
//! It never owns the values it animates: every render writes into the
//! section's [`PropertyStore`], and [`Timeline::revert`] puts back whatever
//! was there before the timeline first touched it.

use rustc_hash::{FxHashMap, FxHashSet};
use web_time::Instant;

use super::property::{Property, PropertyStore, TargetId, Value};
use super::tween::Tween;
use crate::error::VitrineError;
use crate::scroll::ToggleAction;

/// Where a step starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    /// At the current end of the timeline.
    End,
    /// Relative to the current end (`-0.7` ≙ `"-=0.7"`).
    Offset(f32),
    /// Absolute time in seconds.
    At(f32),
    /// Relative to a label (`Label("intro", 0.5)` ≙ `"intro+=0.5"`).
    Label(String, f32),
}

impl Position {
    /// `Label(name, offset)` shorthand.
    #[must_use]
    pub fn label(name: &str, offset: f32) -> Self {
        Position::Label(name.to_owned(), offset)
    }
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Built, never played.
    Idle,
    /// Advancing with time.
    Playing,
    /// Holding its position.
    Paused,
    /// Reached either end while playing.
    Finished,
    /// Killed or reverted; renders nothing any more.
    Dead,
}

#[derive(Debug, Clone, Copy)]
struct Track {
    target: usize,
    key: (TargetId, Property),
    from: Value,
    to: Value,
}

#[derive(Debug, Clone)]
struct Step<C> {
    start: f32,
    tween: Tween<C>,
    tracks: Option<Vec<Track>>,
    completed: bool,
}

impl<C> Step<C> {
    fn end(&self) -> f32 {
        self.start + self.tween.total_duration()
    }
}

/// A sequence of tweens on one time axis.
///
/// `C` is the cue type returned when tweens (or the whole timeline)
/// complete; sections use it instead of completion closures.
#[derive(Debug, Clone)]
pub struct Timeline<C = ()> {
    steps: Vec<Step<C>>,
    /// Step indices sorted by start time, stable for equal starts.
    order: Vec<usize>,
    labels: FxHashMap<String, f32>,
    delay: f32,
    wait: f32,
    time: f32,
    reversed: bool,
    state: PlayState,
    last_tick: Option<Instant>,
    originals: Vec<((TargetId, Property), Option<Value>)>,
    touched: FxHashSet<(TargetId, Property)>,
    on_complete: Option<C>,
    completed: bool,
}

impl<C> Default for Timeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Timeline<C> {
    /// Empty, idle timeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            order: Vec::new(),
            labels: FxHashMap::default(),
            delay: 0.0,
            wait: 0.0,
            time: 0.0,
            reversed: false,
            state: PlayState::Idle,
            last_tick: None,
            originals: Vec::new(),
            touched: FxHashSet::default(),
            on_complete: None,
            completed: false,
        }
    }

    /// Seconds to wait after the first [`Timeline::play`] before the
    /// playhead moves.
    #[must_use]
    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self.wait = self.delay;
        self
    }

    /// Cue reported when the playhead reaches the end going forward.
    #[must_use]
    pub fn with_on_complete(mut self, cue: C) -> Self {
        self.on_complete = Some(cue);
        self
    }

    /// Place a tween.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::InvalidTimeline`] when the position names an
    /// unknown label.
    pub fn add(&mut self, tween: Tween<C>, position: Position) -> Result<&mut Self, VitrineError> {
        let start = (self.resolve(&position)? + tween.delay).max(0.0);
        let index = self.steps.len();
        self.steps.push(Step {
            start,
            tween,
            tracks: None,
            completed: false,
        });
        let at = self.order.partition_point(|&i| self.steps[i].start <= start);
        self.order.insert(at, index);
        Ok(self)
    }

    /// Name a point on the time axis.
    ///
    /// # Errors
    ///
    /// As [`Timeline::add`].
    pub fn add_label(&mut self, name: &str, position: Position) -> Result<&mut Self, VitrineError> {
        let at = self.resolve(&position)?.max(0.0);
        let _ = self.labels.insert(name.to_owned(), at);
        Ok(self)
    }

    fn resolve(&self, position: &Position) -> Result<f32, VitrineError> {
        match position {
            Position::End => Ok(self.duration()),
            Position::Offset(offset) => Ok(self.duration() + offset),
            Position::At(t) => Ok(*t),
            Position::Label(name, offset) => self
                .labels
                .get(name)
                .map(|at| at + offset)
                .ok_or_else(|| VitrineError::InvalidTimeline(format!("unknown label '{name}'"))),
        }
    }

    /// Time of a label.
    #[must_use]
    pub fn label_time(&self, name: &str) -> Option<f32> {
        self.labels.get(name).copied()
    }

    /// End of the last step, in seconds. Excludes the start delay.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.steps.iter().map(Step::end).fold(0.0, f32::max)
    }

    /// Playhead position in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Playhead position in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let duration = self.duration();
        if duration <= 0.0 {
            return if self.completed { 1.0 } else { 0.0 };
        }
        (self.time / duration).clamp(0.0, 1.0)
    }

    /// Playback state.
    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Whether the timeline still drives values (not killed or reverted).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != PlayState::Dead
    }

    /// Whether the playhead is moving.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    /// Whether playback runs backwards.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start (or resume) forward playback at `now`.
    pub fn play(&mut self, now: Instant) {
        self.set_playing(now, false);
    }

    /// Start (or resume) backward playback at `now`.
    pub fn reverse(&mut self, now: Instant) {
        self.set_playing(now, true);
    }

    fn set_playing(&mut self, now: Instant, reversed: bool) {
        if self.state == PlayState::Dead {
            return;
        }
        if reversed {
            // Reversing never waits out the start delay.
            self.wait = 0.0;
        }
        self.reversed = reversed;
        self.state = PlayState::Playing;
        self.last_tick = Some(now);
    }

    /// Hold the playhead.
    pub fn pause(&mut self) {
        if self.state != PlayState::Dead {
            self.state = PlayState::Paused;
        }
        self.last_tick = None;
    }

    /// Stop driving values. Current values stay as they are.
    pub fn kill(&mut self) {
        self.state = PlayState::Dead;
        self.last_tick = None;
    }

    /// Restore every value the timeline touched to its pre-timeline value
    /// and stop driving values.
    pub fn revert(&mut self, store: &mut PropertyStore) {
        for ((target, property), original) in self.originals.drain(..).rev() {
            match original {
                Some(value) => store.set(target, property, value),
                None => store.remove(target, property),
            }
        }
        self.touched.clear();
        for step in &mut self.steps {
            step.tracks = None;
            step.completed = false;
        }
        self.kill();
    }
}

impl<C: Clone> Timeline<C> {
    /// Move the playhead by the time elapsed since the previous call and
    /// render. Returns completion cues in playback order.
    pub fn advance(&mut self, now: Instant, store: &mut PropertyStore) -> Vec<C> {
        if self.state != PlayState::Playing {
            return Vec::new();
        }
        let Some(last) = self.last_tick.replace(now) else {
            return Vec::new();
        };
        let mut dt = now.saturating_duration_since(last).as_secs_f32();

        if self.wait > 0.0 {
            let waited = dt.min(self.wait);
            self.wait -= waited;
            dt -= waited;
            if self.wait > 0.0 {
                return Vec::new();
            }
        }

        let duration = self.duration();
        let target = if self.reversed {
            self.time - dt
        } else {
            self.time + dt
        };
        self.time = target.clamp(0.0, duration);
        let cues = self.render(store);

        let at_end = if self.reversed {
            self.time <= 0.0
        } else {
            self.time >= duration
        };
        if at_end {
            self.state = PlayState::Finished;
            self.last_tick = None;
        }
        cues
    }

    /// Jump to `time` seconds and render.
    pub fn seek(&mut self, time: f32, store: &mut PropertyStore) -> Vec<C> {
        if self.state == PlayState::Dead {
            return Vec::new();
        }
        self.time = time.clamp(0.0, self.duration());
        self.render(store)
    }

    /// Jump to a fraction of the duration and render.
    pub fn seek_progress(&mut self, progress: f32, store: &mut PropertyStore) -> Vec<C> {
        let time = progress.clamp(0.0, 1.0) * self.duration();
        self.seek(time, store)
    }

    /// Render the current playhead without moving it. Applies the start
    /// values of `from_to` steps that have not begun.
    pub fn prime(&mut self, store: &mut PropertyStore) -> Vec<C> {
        self.seek(self.time, store)
    }

    /// React to a scroll-trigger toggle.
    pub fn toggle(
        &mut self,
        action: ToggleAction,
        now: Instant,
        store: &mut PropertyStore,
    ) -> Vec<C> {
        match action {
            ToggleAction::None => Vec::new(),
            ToggleAction::Play => {
                self.play(now);
                Vec::new()
            }
            ToggleAction::Pause => {
                self.pause();
                Vec::new()
            }
            ToggleAction::Resume => {
                self.set_playing(now, self.reversed);
                Vec::new()
            }
            ToggleAction::Reverse => {
                self.reverse(now);
                Vec::new()
            }
            ToggleAction::Restart => {
                let cues = self.seek(0.0, store);
                self.play(now);
                cues
            }
            ToggleAction::Reset => {
                let cues = self.seek(0.0, store);
                self.pause();
                cues
            }
            ToggleAction::Complete => {
                let cues = self.seek(self.duration(), store);
                self.pause();
                cues
            }
        }
    }

    fn render(&mut self, store: &mut PropertyStore) -> Vec<C> {
        let time = self.time;
        let Self {
            steps,
            order,
            originals,
            touched,
            ..
        } = &mut *self;

        // Steps that have not started show their start values. Walk
        // backwards so the earliest step wins on shared properties.
        for &index in order.iter().rev() {
            let step = &mut steps[index];
            if time >= step.start {
                continue;
            }
            if step.tracks.is_none() && step.tween.immediate_render {
                step.tracks = Some(capture(&step.tween, store, originals, touched));
            }
            if let Some(tracks) = &step.tracks {
                for track in tracks {
                    store.set(track.key.0, track.key.1, track.from);
                }
            }
        }

        for &index in order.iter() {
            let step = &mut steps[index];
            if time < step.start {
                continue;
            }
            if step.tracks.is_none() {
                step.tracks = Some(capture(&step.tween, store, originals, touched));
            }
            let local = time - step.start;
            let Some(tracks) = &step.tracks else {
                continue;
            };
            for track in tracks {
                let p = step.tween.target_progress(local, track.target);
                store.set(track.key.0, track.key.1, track.from.lerp(track.to, p));
            }
        }

        let mut fired: Vec<(f32, usize, C)> = Vec::new();
        for (index, step) in steps.iter_mut().enumerate() {
            let end = step.end();
            if time < end {
                step.completed = false;
            } else if !step.completed {
                step.completed = true;
                if let Some(cue) = &step.tween.on_complete {
                    fired.push((end, index, cue.clone()));
                }
            }
        }
        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let mut cues: Vec<C> = fired.into_iter().map(|(_, _, cue)| cue).collect();

        if time < self.duration() {
            self.completed = false;
        } else if !self.completed {
            self.completed = true;
            if let Some(cue) = &self.on_complete {
                cues.push(cue.clone());
            }
        }
        cues
    }
}

/// Record start and end values of every `(target, property)` a tween
/// drives, remembering pre-timeline values for revert.
fn capture<C>(
    tween: &Tween<C>,
    store: &PropertyStore,
    originals: &mut Vec<((TargetId, Property), Option<Value>)>,
    touched: &mut FxHashSet<(TargetId, Property)>,
) -> Vec<Track> {
    let mut tracks = Vec::with_capacity(tween.targets.len() * tween.to.len());
    for (i, &target) in tween.targets.iter().enumerate() {
        for &(property, to) in &tween.to {
            let key = (target, property);
            if touched.insert(key) {
                originals.push((key, store.explicit(target, property)));
            }
            let from = tween
                .from
                .iter()
                .find(|(p, _)| *p == property)
                .map_or_else(|| store.get(target, property), |&(_, v)| v);
            tracks.push(Track {
                target: i,
                key,
                from,
                to: to.resolve(from),
            });
        }
    }
    tracks
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::{Ease, TweenValue};

    const TITLE: TargetId = TargetId::new("title");
    const CTA: TargetId = TargetId::new("cta");

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    fn fade_in(target: TargetId, duration: f32) -> Tween<&'static str> {
        Tween::from_to([target])
            .from(Property::Opacity, 0.0)
            .prop(Property::Opacity, 1.0)
            .duration(duration)
            .ease(Ease::Linear)
    }

    #[test]
    fn positions_resolve_against_end_and_labels() {
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl.add(fade_in(TITLE, 1.0), Position::End).unwrap();
        let _ = tl.add(fade_in(CTA, 1.0), Position::Offset(-0.5)).unwrap();
        assert!((tl.duration() - 1.5).abs() < 1e-6);

        let _ = tl.add_label("intro", Position::At(3.0)).unwrap();
        let _ = tl.add(fade_in(TITLE, 1.0), Position::label("intro", 0.5)).unwrap();
        assert!((tl.duration() - 4.5).abs() < 1e-6);
        assert!(tl.add(fade_in(TITLE, 1.0), Position::label("outro", 0.0)).is_err());
    }

    #[test]
    fn from_to_renders_start_values_before_playing() {
        let mut store = PropertyStore::new();
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl.add(fade_in(TITLE, 1.0), Position::At(1.0)).unwrap();
        let _ = tl.prime(&mut store);
        assert_eq!(store.scalar(TITLE, Property::Opacity), 0.0);
    }

    #[test]
    fn advance_respects_delay_and_reports_cues() {
        let t0 = Instant::now();
        let mut store = PropertyStore::new();
        let mut tl = Timeline::new().with_delay(0.5).with_on_complete("done");
        let _ = tl
            .add(fade_in(TITLE, 1.0).on_complete("title"), Position::End)
            .unwrap();
        tl.play(t0);

        assert!(tl.advance(t0 + secs(0.25), &mut store).is_empty());
        assert_eq!(tl.time(), 0.0);
        let _ = tl.advance(t0 + secs(1.0), &mut store);
        assert!((store.scalar(TITLE, Property::Opacity) - 0.5).abs() < 1e-3);

        let cues = tl.advance(t0 + secs(2.0), &mut store);
        assert_eq!(cues, vec!["title", "done"]);
        assert_eq!(tl.state(), PlayState::Finished);
        assert!(tl.advance(t0 + secs(3.0), &mut store).is_empty());
    }

    #[test]
    fn lazy_capture_chains_from_previous_step() {
        let mut store = PropertyStore::new();
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl
            .add(
                Tween::to([TITLE]).prop(Property::Y, 100.0).duration(1.0).ease(Ease::Linear),
                Position::End,
            )
            .unwrap();
        let _ = tl
            .add(
                Tween::to([TITLE])
                    .prop(Property::Y, TweenValue::Relative(-50.0))
                    .duration(1.0)
                    .ease(Ease::Linear),
                Position::End,
            )
            .unwrap();
        let _ = tl.seek(1.5, &mut store);
        assert!((store.scalar(TITLE, Property::Y) - 75.0).abs() < 1e-4);
        let _ = tl.seek(2.0, &mut store);
        assert!((store.scalar(TITLE, Property::Y) - 50.0).abs() < 1e-4);

        // Seeking back re-renders the first step over the second's reset.
        let _ = tl.seek(0.5, &mut store);
        assert!((store.scalar(TITLE, Property::Y) - 50.0).abs() < 1e-4);
        let _ = tl.seek(0.0, &mut store);
        assert_eq!(store.scalar(TITLE, Property::Y), 0.0);
    }

    #[test]
    fn seek_progress_is_monotonic_for_scrub() {
        let mut store = PropertyStore::new();
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl
            .add(
                Tween::to([TITLE])
                    .prop(Property::XPercent, -100.0)
                    .duration(1.0)
                    .ease(Ease::Linear),
                Position::End,
            )
            .unwrap();
        let mut last = f32::MAX;
        for i in 0..=10 {
            let _ = tl.seek_progress(i as f32 / 10.0, &mut store);
            let x = store.scalar(TITLE, Property::XPercent);
            assert!(x <= last);
            last = x;
        }
        let _ = tl.seek_progress(0.5, &mut store);
        assert!((store.scalar(TITLE, Property::XPercent) + 50.0).abs() < 1e-4);
    }

    #[test]
    fn revert_restores_pre_timeline_values() {
        let mut store = PropertyStore::new();
        store.set(CTA, Property::Y, 20.0);
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl
            .add(
                Tween::to([TITLE, CTA])
                    .prop(Property::Y, 0.0)
                    .prop(Property::Opacity, 0.5),
                Position::End,
            )
            .unwrap();
        let _ = tl.seek_progress(1.0, &mut store);
        assert_eq!(store.scalar(CTA, Property::Y), 0.0);

        tl.revert(&mut store);
        assert_eq!(store.explicit(CTA, Property::Y), Some(Value::Scalar(20.0)));
        assert_eq!(store.explicit(TITLE, Property::Opacity), None);
        assert!(!tl.is_active());
        assert!(tl.seek_progress(0.0, &mut store).is_empty());
    }

    #[test]
    fn reverse_plays_back_to_start() {
        let t0 = Instant::now();
        let mut store = PropertyStore::new();
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl.add(fade_in(TITLE, 1.0).on_complete("x"), Position::End).unwrap();
        tl.play(t0);
        let _ = tl.advance(t0 + secs(1.0), &mut store);
        tl.reverse(t0 + secs(1.0));
        let _ = tl.advance(t0 + secs(1.5), &mut store);
        assert!((store.scalar(TITLE, Property::Opacity) - 0.5).abs() < 1e-3);
        let _ = tl.advance(t0 + secs(2.5), &mut store);
        assert_eq!(store.scalar(TITLE, Property::Opacity), 0.0);
        assert_eq!(tl.state(), PlayState::Finished);
    }

    #[test]
    fn toggle_actions_drive_playback() {
        let t0 = Instant::now();
        let mut store = PropertyStore::new();
        let mut tl: Timeline<&str> = Timeline::new();
        let _ = tl.add(fade_in(TITLE, 1.0), Position::End).unwrap();
        let _ = tl.toggle(ToggleAction::Complete, t0, &mut store);
        assert_eq!(store.scalar(TITLE, Property::Opacity), 1.0);
        let _ = tl.toggle(ToggleAction::Reset, t0, &mut store);
        assert_eq!(store.scalar(TITLE, Property::Opacity), 0.0);
        assert_eq!(tl.state(), PlayState::Paused);
        let _ = tl.toggle(ToggleAction::Play, t0, &mut store);
        assert!(tl.is_playing());
    }
}
