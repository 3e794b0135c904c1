use std::str::FromStr;

use super::toggle::ToggleActions;
use crate::error::VitrineError;

/// Axis-aligned element box in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Distance from the page top.
    pub top: f32,
    /// Distance from the page (or horizontal track) left.
    pub left: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Box from its four components.
    #[must_use]
    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Browser viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Viewport {
    /// Viewport of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

/// A position along an element or the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// Leading edge (top or left).
    Start,
    /// Middle.
    Center,
    /// Trailing edge (bottom or right).
    End,
    /// Percentage of the extent.
    Percent(f32),
    /// Fixed pixel offset from the leading edge.
    Px(f32),
}

impl Edge {
    /// Offset from the leading edge of something `extent` long.
    #[must_use]
    pub fn offset(self, extent: f32) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => extent / 2.0,
            Edge::End => extent,
            Edge::Percent(p) => extent * p / 100.0,
            Edge::Px(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VitrineError::InvalidTimeline(format!("bad trigger edge '{s}'"));
        match s {
            "top" | "left" => Ok(Edge::Start),
            "center" => Ok(Edge::Center),
            "bottom" | "right" => Ok(Edge::End),
            _ => {
                if let Some(p) = s.strip_suffix('%') {
                    p.parse().map(Edge::Percent).map_err(|_| invalid())
                } else {
                    s.trim_end_matches("px")
                        .parse()
                        .map(Edge::Px)
                        .map_err(|_| invalid())
                }
            }
        }
    }
}

/// "When `element` edge meets `viewport` edge", e.g. `"top center"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPoint {
    /// Edge of the trigger element.
    pub element: Edge,
    /// Edge of the viewport.
    pub viewport: Edge,
}

impl TriggerPoint {
    /// Point from its two edges.
    #[must_use]
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the point is reached, for an element starting
    /// at `position` with `extent` along the scroll axis.
    #[must_use]
    pub fn resolve(&self, position: f32, extent: f32, viewport_extent: f32) -> f32 {
        position + self.element.offset(extent) - self.viewport.offset(viewport_extent)
    }
}

impl FromStr for TriggerPoint {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => {
                Ok(Self::new(element.parse()?, viewport.parse()?))
            }
            (Some(element), None, None) => {
                // A single keyword applies to both, as in "center".
                let edge: Edge = element.parse()?;
                Ok(Self::new(edge, edge))
            }
            _ => Err(VitrineError::InvalidTimeline(format!("bad trigger point '{s}'"))),
        }
    }
}

/// Where a trigger range ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerEnd {
    /// An element/viewport edge pair.
    Point(TriggerPoint),
    /// Pixels past the start (`"+=1200"`).
    Distance(f32),
}

impl FromStr for TriggerEnd {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().strip_prefix("+=") {
            Some(n) => n
                .trim()
                .parse()
                .map(TriggerEnd::Distance)
                .map_err(|_| VitrineError::InvalidTimeline(format!("bad trigger end '{s}'"))),
            None => s.parse().map(TriggerEnd::Point),
        }
    }
}

/// How a binding turns progress into animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Progress drives the animation directly; `Some(lag)` smooths it so
    /// the animation takes `lag` seconds to catch up.
    Scrub(Option<f32>),
    /// Entering and leaving the range play, pause or reverse it.
    Toggle(ToggleActions),
}

/// Snapping of a scrubbed range to evenly spaced progress values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    /// Spacing of snap points in progress units.
    pub increment: f32,
    /// Shortest snap animation, seconds.
    pub min_duration: f32,
    /// Longest snap animation, seconds.
    pub max_duration: f32,
    /// Scroll idle time before snapping, seconds.
    pub delay: f32,
}

impl Snap {
    /// Snap to `count` evenly spaced points (`1 / (count - 1)`).
    #[must_use]
    pub fn points(count: usize) -> Self {
        let increment = if count > 1 {
            1.0 / (count - 1) as f32
        } else {
            1.0
        };
        Self {
            increment,
            min_duration: 0.1,
            max_duration: 0.2,
            delay: 0.03,
        }
    }

    /// Nearest snap point to `progress`.
    #[must_use]
    pub fn nearest(&self, progress: f32) -> f32 {
        if self.increment <= 0.0 {
            return progress;
        }
        ((progress / self.increment).round() * self.increment).clamp(0.0, 1.0)
    }

    /// Snap animation length for a jump of `distance` progress.
    #[must_use]
    pub fn duration_for(&self, distance: f32) -> f32 {
        let half = (self.increment / 2.0).max(f32::EPSILON);
        let t = (distance.abs() / half).min(1.0);
        self.min_duration + (self.max_duration - self.min_duration) * t
    }
}

/// Nests a trigger inside a horizontally translated track.
///
/// The track is moved by a scrubbed parent binding; `travel` is how far (in
/// px) it moves between parent progress 0 and 1. Child positions are read
/// along the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerAnimation {
    /// Binding whose progress moves the track.
    pub parent: super::BindingId,
    /// Track travel in px.
    pub travel: f32,
}

/// A binding between a scroll range and an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTrigger {
    /// Trigger element box.
    pub element: Rect,
    /// Range start.
    pub start: TriggerPoint,
    /// Range end.
    pub end: TriggerEnd,
    /// Scrub or toggle.
    pub mode: Mode,
    /// Optional snapping.
    pub snap: Option<Snap>,
    /// Hold the element in place while the range is active.
    pub pin: bool,
    /// Track the trigger lives in, if horizontally scrolled.
    pub container: Option<ContainerAnimation>,
}

impl ScrollTrigger {
    /// Trigger on `element` with the given range strings.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::InvalidTimeline`] for unparseable ranges.
    pub fn new(element: Rect, start: &str, end: &str, mode: Mode) -> Result<Self, VitrineError> {
        Ok(Self {
            element,
            start: start.parse()?,
            end: end.parse()?,
            mode,
            snap: None,
            pin: false,
            container: None,
        })
    }

    /// Enable snapping.
    #[must_use]
    pub fn with_snap(mut self, snap: Snap) -> Self {
        self.snap = Some(snap);
        self
    }

    /// Pin the element while active.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    /// Place the trigger inside a horizontally scrolled track.
    #[must_use]
    pub fn in_container(mut self, container: ContainerAnimation) -> Self {
        self.container = Some(container);
        self
    }

    /// Start and end scroll offsets for the given viewport.
    #[must_use]
    pub fn range(&self, viewport: Viewport) -> (f32, f32) {
        let (position, extent, view) = if self.container.is_some() {
            (self.element.left, self.element.width, viewport.width)
        } else {
            (self.element.top, self.element.height, viewport.height)
        };
        let start = self.start.resolve(position, extent, view);
        let end = match self.end {
            TriggerEnd::Point(point) => point.resolve(position, extent, view),
            TriggerEnd::Distance(d) => start + d,
        };
        (start, end)
    }
}

/// Progress of `position` through `[start, end]`, clamped to `[0, 1]`.
#[must_use]
pub fn range_progress(position: f32, start: f32, end: f32) -> f32 {
    let length = end - start;
    if length <= 0.0 {
        return if position >= end { 1.0 } else { 0.0 };
    }
    ((position - start) / length).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(1000.0, 800.0);

    #[test]
    fn parses_edges_and_points() {
        let p: TriggerPoint = "top center".parse().unwrap();
        assert_eq!(p, TriggerPoint::new(Edge::Start, Edge::Center));
        let p: TriggerPoint = "80% 20px".parse().unwrap();
        assert_eq!(p, TriggerPoint::new(Edge::Percent(80.0), Edge::Px(20.0)));
        assert!("top middle".parse::<TriggerPoint>().is_err());
        assert_eq!("+=1200".parse::<TriggerEnd>().unwrap(), TriggerEnd::Distance(1200.0));
    }

    #[test]
    fn vertical_range() {
        let hero = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let t = ScrollTrigger::new(hero, "top center", "bottom center", Mode::Scrub(None)).unwrap();
        assert_eq!(t.range(VIEW), (-400.0, 400.0));
        let t = ScrollTrigger::new(hero, "top top", "bottom top", Mode::Scrub(Some(1.0))).unwrap();
        assert_eq!(t.range(VIEW), (0.0, 800.0));
        let t = ScrollTrigger::new(hero, "top top", "+=3000", Mode::Scrub(None)).unwrap();
        assert_eq!(t.range(VIEW), (0.0, 3000.0));
    }

    #[test]
    fn container_range_is_horizontal() {
        let panel_title = Rect::new(300.0, 1000.0, 400.0, 60.0);
        let t = ScrollTrigger::new(panel_title, "left center", "center center", Mode::Scrub(None))
            .unwrap()
            .in_container(ContainerAnimation {
                parent: crate::scroll::BindingId::default(),
                travel: 1000.0,
            });
        assert_eq!(t.range(VIEW), (500.0, 700.0));
    }

    #[test]
    fn progress_clamps() {
        assert_eq!(range_progress(-5.0, 0.0, 100.0), 0.0);
        assert_eq!(range_progress(50.0, 0.0, 100.0), 0.5);
        assert_eq!(range_progress(500.0, 0.0, 100.0), 1.0);
        assert_eq!(range_progress(10.0, 10.0, 10.0), 1.0);
    }

    #[test]
    fn snap_points() {
        let snap = Snap::points(3);
        assert_eq!(snap.increment, 0.5);
        assert_eq!(snap.nearest(0.3), 0.5);
        assert_eq!(snap.nearest(0.2), 0.0);
        assert!((snap.duration_for(0.25) - 0.2).abs() < 1e-6);
        assert!((snap.duration_for(0.0) - 0.1).abs() < 1e-6);
    }
}
