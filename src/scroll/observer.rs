use web_time::Instant;

use super::scrub::Scrub;
use super::toggle::{ToggleAction, Transition};
use super::trigger::{range_progress, Mode, Rect, ScrollTrigger, Viewport};
use crate::error::VitrineError;

/// Handle to a registered trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BindingId(u64);

/// Something the host or a section must react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEvent {
    /// The (smoothed) progress of a binding changed.
    Progress {
        /// Binding.
        binding: BindingId,
        /// New progress in `[0, 1]`.
        progress: f32,
    },
    /// A range boundary was crossed.
    Toggle {
        /// Binding.
        binding: BindingId,
        /// Which boundary, in which direction.
        transition: Transition,
        /// Configured action for the transition.
        action: ToggleAction,
    },
    /// Scrolling stopped between snap points; the host should animate the
    /// page scroll to `scroll` over `duration` seconds.
    SnapTo {
        /// Binding.
        binding: BindingId,
        /// Snap point in progress units.
        progress: f32,
        /// Target page scroll offset.
        scroll: f32,
        /// Animation length in seconds.
        duration: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Before,
    Inside,
    After,
}

impl Region {
    fn of(progress: f32) -> Self {
        if progress <= 0.0 {
            Region::Before
        } else if progress >= 1.0 {
            Region::After
        } else {
            Region::Inside
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    id: BindingId,
    trigger: ScrollTrigger,
    raw: Option<f32>,
    region: Region,
    scrub: Scrub,
    emitted: Option<f32>,
    last_change: Option<Instant>,
    snapped: bool,
}

impl Binding {
    fn progress(&self) -> f32 {
        match self.trigger.mode {
            Mode::Scrub(_) => self.scrub.value(),
            Mode::Toggle(_) => self.raw.unwrap_or(0.0),
        }
    }
}

/// Explicit registry of scroll-trigger bindings.
///
/// Sections register their triggers on mount and unregister them on
/// unmount; there is no hidden global registration. The host feeds scroll
/// and viewport changes through [`ScrollObserver::update`] and calls
/// [`ScrollObserver::tick`] once per frame to advance scrub smoothing and
/// snapping.
#[derive(Debug, Clone)]
pub struct ScrollObserver {
    bindings: Vec<Binding>,
    next_id: u64,
    scroll: f32,
    viewport: Viewport,
}

impl Default for ScrollObserver {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl ScrollObserver {
    /// Empty observer at scroll offset 0.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            bindings: Vec::new(),
            next_id: 1,
            scroll: 0.0,
            viewport,
        }
    }

    /// Add a trigger.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::InvalidTimeline`] when the range ends before
    /// it starts, or when a container trigger names an unknown (or later)
    /// parent binding.
    pub fn register(&mut self, trigger: ScrollTrigger) -> Result<BindingId, VitrineError> {
        let (start, end) = trigger.range(self.viewport);
        if end < start {
            return Err(VitrineError::InvalidTimeline(format!(
                "scroll range ends at {end} before it starts at {start}"
            )));
        }
        if let Some(container) = trigger.container {
            if !self.bindings.iter().any(|b| b.id == container.parent) {
                return Err(VitrineError::InvalidTimeline(format!(
                    "container animation parent {:?} is not registered",
                    container.parent
                )));
            }
        }
        let lag = match trigger.mode {
            Mode::Scrub(Some(lag)) => lag,
            _ => 0.0,
        };
        let id = BindingId(self.next_id);
        self.next_id += 1;
        self.bindings.push(Binding {
            id,
            trigger,
            raw: None,
            region: Region::Before,
            scrub: Scrub::new(lag),
            emitted: None,
            last_change: None,
            snapped: false,
        });
        log::debug!("scroll binding {id:?} registered ({start}..{end})");
        Ok(id)
    }

    /// Remove a trigger. Returns whether it existed.
    pub fn unregister(&mut self, id: BindingId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != id);
        before != self.bindings.len()
    }

    /// Remove every trigger.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Number of live bindings.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.bindings.len()
    }

    /// Current page scroll offset.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Progress of a binding (smoothed for scrubbed ones).
    #[must_use]
    pub fn progress(&self, id: BindingId) -> Option<f32> {
        self.binding(id).map(Binding::progress)
    }

    /// Start and end offsets of a binding's range.
    #[must_use]
    pub fn range(&self, id: BindingId) -> Option<(f32, f32)> {
        self.binding(id).map(|b| b.trigger.range(self.viewport))
    }

    /// Whether the binding is between its start and end.
    #[must_use]
    pub fn is_active(&self, id: BindingId) -> bool {
        self.binding(id).is_some_and(|b| b.region == Region::Inside)
    }

    /// How far a pinned element must be pushed down to stay fixed on
    /// screen. Zero for unpinned bindings.
    #[must_use]
    pub fn pin_offset(&self, id: BindingId) -> f32 {
        match self.binding(id) {
            Some(b) if b.trigger.pin && b.trigger.container.is_none() => {
                let (start, end) = b.trigger.range(self.viewport);
                (self.scroll - start).clamp(0.0, end - start)
            }
            _ => 0.0,
        }
    }

    /// Move a trigger element (after a layout change).
    pub fn set_element(&mut self, id: BindingId, element: Rect) {
        if let Some(b) = self.bindings.iter_mut().find(|b| b.id == id) {
            b.trigger.element = element;
        }
    }

    /// Feed a new scroll offset and viewport.
    pub fn update(&mut self, scroll: f32, viewport: Viewport, now: Instant) -> Vec<ScrollEvent> {
        self.scroll = scroll;
        self.viewport = viewport;
        self.evaluate(now)
    }

    /// Advance scrub smoothing and snapping.
    pub fn tick(&mut self, now: Instant) -> Vec<ScrollEvent> {
        self.evaluate(now)
    }

    fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    fn evaluate(&mut self, now: Instant) -> Vec<ScrollEvent> {
        let mut events = Vec::new();
        for index in 0..self.bindings.len() {
            let position = match self.bindings[index].trigger.container {
                None => Some(self.scroll),
                Some(container) => self
                    .binding(container.parent)
                    .map(|parent| parent.progress() * container.travel),
            };
            let Some(position) = position else {
                continue;
            };
            let viewport = self.viewport;
            let binding = &mut self.bindings[index];
            let (start, end) = binding.trigger.range(viewport);
            let raw = range_progress(position, start, end);

            if binding.raw != Some(raw) {
                binding.raw = Some(raw);
                binding.last_change = Some(now);
                binding.snapped = false;
                if matches!(binding.trigger.mode, Mode::Scrub(_)) {
                    binding.scrub.retarget(raw, now);
                }
                let region = Region::of(raw);
                if let Mode::Toggle(actions) = binding.trigger.mode {
                    for transition in transitions(binding.region, region) {
                        log::debug!("scroll binding {:?}: {transition}", binding.id);
                        events.push(ScrollEvent::Toggle {
                            binding: binding.id,
                            transition,
                            action: actions.action(transition),
                        });
                    }
                }
                binding.region = region;
            }
            binding.scrub.tick(now);

            let progress = binding.progress();
            if binding.emitted.is_none_or(|last| (last - progress).abs() > 1e-6) {
                binding.emitted = Some(progress);
                events.push(ScrollEvent::Progress {
                    binding: binding.id,
                    progress,
                });
            }

            if let Some(snap) = binding.trigger.snap {
                let idle = binding
                    .last_change
                    .is_some_and(|t| now.saturating_duration_since(t).as_secs_f32() >= snap.delay);
                if idle && !binding.snapped && binding.region == Region::Inside {
                    binding.snapped = true;
                    let target = snap.nearest(raw);
                    if (target - raw).abs() > 1e-4 && binding.trigger.container.is_none() {
                        events.push(ScrollEvent::SnapTo {
                            binding: binding.id,
                            progress: target,
                            scroll: start + target * (end - start),
                            duration: snap.duration_for(target - raw),
                        });
                    }
                }
            }
        }
        events
    }
}

fn transitions(from: Region, to: Region) -> Vec<Transition> {
    use Region::{After, Before, Inside};
    match (from, to) {
        (Before, Inside) => vec![Transition::Enter],
        (Before, After) => vec![Transition::Enter, Transition::Leave],
        (Inside, After) => vec![Transition::Leave],
        (After, Inside) => vec![Transition::EnterBack],
        (After, Before) => vec![Transition::EnterBack, Transition::LeaveBack],
        (Inside, Before) => vec![Transition::LeaveBack],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scroll::{ContainerAnimation, Snap};

    const VIEW: Viewport = Viewport::new(1000.0, 800.0);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn toggles(events: &[ScrollEvent]) -> Vec<(Transition, ToggleAction)> {
        events
            .iter()
            .filter_map(|e| match *e {
                ScrollEvent::Toggle {
                    transition, action, ..
                } => Some((transition, action)),
                _ => None,
            })
            .collect()
    }

    fn scrubbed(rect: Rect, start: &str, end: &str, lag: Option<f32>) -> ScrollTrigger {
        ScrollTrigger::new(rect, start, end, Mode::Scrub(lag)).unwrap()
    }

    const TRACK: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    fn progress_of(events: &[ScrollEvent], id: BindingId) -> Option<f32> {
        events.iter().rev().find_map(|e| match *e {
            ScrollEvent::Progress { binding, progress } if binding == id => Some(progress),
            _ => None,
        })
    }

    #[test]
    fn toggle_fires_enter_leave_and_back() {
        let t0 = Instant::now();
        let mut obs = ScrollObserver::new(VIEW);
        let section = Rect::new(1000.0, 0.0, 1000.0, 800.0);
        let actions = "play none none reverse".parse().unwrap();
        let _ = obs
            .register(
                ScrollTrigger::new(section, "top center", "bottom center", Mode::Toggle(actions))
                    .unwrap(),
            )
            .unwrap();

        assert!(toggles(&obs.update(0.0, VIEW, t0)).is_empty());
        assert_eq!(
            toggles(&obs.update(700.0, VIEW, t0)),
            vec![(Transition::Enter, ToggleAction::Play)]
        );
        assert_eq!(
            toggles(&obs.update(2000.0, VIEW, t0)),
            vec![(Transition::Leave, ToggleAction::None)]
        );
        assert_eq!(
            toggles(&obs.update(0.0, VIEW, t0)),
            vec![
                (Transition::EnterBack, ToggleAction::None),
                (Transition::LeaveBack, ToggleAction::Reverse)
            ]
        );
    }

    #[test]
    fn unsmoothed_scrub_tracks_scroll_linearly() {
        let t0 = Instant::now();
        let mut obs = ScrollObserver::new(VIEW);
        let id = obs.register(scrubbed(TRACK, "top top", "bottom top", None)).unwrap();
        for (scroll, expected) in [(0.0, 0.0), (400.0, 0.5), (800.0, 1.0), (1200.0, 1.0)] {
            let events = obs.update(scroll, VIEW, t0);
            let p = progress_of(&events, id).unwrap_or_else(|| obs.progress(id).unwrap());
            assert!((p - expected).abs() < 1e-6, "{scroll}: {p}");
        }
    }

    #[test]
    fn lagged_scrub_catches_up_on_tick() {
        let t0 = Instant::now();
        let mut obs = ScrollObserver::new(VIEW);
        let id = obs.register(scrubbed(TRACK, "top top", "bottom top", Some(1.0))).unwrap();
        let _ = obs.update(800.0, VIEW, t0);
        assert_eq!(obs.progress(id), Some(0.0));
        let _ = obs.tick(t0 + ms(500));
        let mid = obs.progress(id).unwrap();
        assert!(mid > 0.5 && mid < 1.0);
        let events = obs.tick(t0 + ms(1000));
        assert_eq!(progress_of(&events, id), Some(1.0));
    }

    #[test]
    fn snap_after_idle() {
        let t0 = Instant::now();
        let mut obs = ScrollObserver::new(VIEW);
        let id = obs
            .register(
                scrubbed(TRACK, "top top", "+=2000", None)
                    .with_snap(Snap::points(3))
                    .pinned(),
            )
            .unwrap();
        let _ = obs.update(700.0, VIEW, t0);
        assert!(obs.tick(t0 + ms(10)).iter().all(|e| !matches!(e, ScrollEvent::SnapTo { .. })));
        let events = obs.tick(t0 + ms(40));
        let snap = events.iter().find_map(|e| match *e {
            ScrollEvent::SnapTo { scroll, progress, .. } => Some((scroll, progress)),
            _ => None,
        });
        assert_eq!(snap, Some((1000.0, 0.5)));
        // Only once per resting position.
        assert!(obs.tick(t0 + ms(80)).is_empty());
        assert_eq!(obs.pin_offset(id), 700.0);
    }

    #[test]
    fn container_triggers_follow_parent_progress() {
        let t0 = Instant::now();
        let mut obs = ScrollObserver::new(VIEW);
        let parent = obs.register(scrubbed(TRACK, "top top", "+=1000", None)).unwrap();
        let panel = Rect::new(300.0, 1000.0, 400.0, 60.0);
        let child = obs
            .register(
                scrubbed(panel, "left center", "center center", None)
                    .in_container(ContainerAnimation { parent, travel: 1000.0 }),
            )
            .unwrap();
        let _ = obs.update(500.0, VIEW, t0);
        assert_eq!(obs.progress(child), Some(0.0));
        let _ = obs.update(600.0, VIEW, t0);
        assert!((obs.progress(child).unwrap() - 0.5).abs() < 1e-6);
        let _ = obs.update(1000.0, VIEW, t0);
        assert_eq!(obs.progress(child), Some(1.0));
    }

    #[test]
    fn register_validates_and_unregister_removes() {
        let mut obs = ScrollObserver::new(VIEW);
        let small = Rect::new(0.0, 0.0, 100.0, 100.0);
        let backwards = scrubbed(small, "bottom top", "top top", None);
        assert!(obs.register(backwards).is_err());

        let orphan = scrubbed(Rect::default(), "left center", "center center", None)
            .in_container(ContainerAnimation { parent: BindingId(99), travel: 10.0 });
        assert!(obs.register(orphan).is_err());

        let id = obs.register(scrubbed(small, "top top", "bottom top", None)).unwrap();
        assert_eq!(obs.active_count(), 1);
        assert!(obs.unregister(id));
        assert!(!obs.unregister(id));
        assert_eq!(obs.active_count(), 0);
    }
}
