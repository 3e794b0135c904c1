//! Page sections.
//!
//! A section bundles the drivers of one page block: a [`ScrollObserver`]
//! for its scroll bindings, a [`TimerRegistry`] for its intervals, its
//! timelines and one or more [`crate::renderer::SceneRenderer`]s. The
//! [`Page`] mounts sections in order, feeds them a [`FrameInput`] every
//! frame and unmounts them; after [`Section::unmount`] the section's
//! [`SectionDiagnostics`] must read all zeros.
//!
//! [`ScrollObserver`]: crate::scroll::ScrollObserver
//! [`TimerRegistry`]: crate::timers::TimerRegistry

pub mod hero;
mod layout;
mod page;
pub mod showcase;

use glam::Vec2;
use web_time::Instant;

pub use hero::{HeroCue, HeroSection};
pub use layout::{Extent, PageLayout};
pub use page::Page;
pub use showcase::{ShowcaseCue, ShowcaseSection};

use crate::assets::AssetCache;
use crate::error::VitrineError;
use crate::options::SurfaceOptions;
use crate::renderer::HeadlessSurface;
use crate::scroll::{Rect, Viewport};

/// Creates the rendering surface of a canvas when a section mounts.
pub type SurfaceFactory<S> =
    Box<dyn FnMut((u32, u32), &SurfaceOptions) -> Result<S, VitrineError>>;

/// Factory for [`HeadlessSurface`]s.
#[must_use]
pub fn headless_surfaces() -> SurfaceFactory<HeadlessSurface> {
    Box::new(|(width, height), _| Ok(HeadlessSurface::new(width, height)))
}

/// Everything a section sees of the page for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Frame time.
    pub now: Instant,
    /// Page scroll offset in CSS pixels.
    pub scroll: f32,
    /// Viewport size in CSS pixels.
    pub viewport: Viewport,
    /// Device pixel ratio of the display.
    pub device_pixel_ratio: f32,
    /// The section's box in page coordinates.
    pub rect: Rect,
    /// Shared model cache.
    pub assets: &'a AssetCache,
}

impl FrameInput<'_> {
    /// Physical canvas size for a viewport-filling canvas, with the pixel
    /// ratio clamped by `options`.
    #[must_use]
    pub fn canvas_size(&self, options: &SurfaceOptions) -> (u32, u32) {
        let dpr = options.clamp_dpr(self.device_pixel_ratio);
        (
            (self.viewport.width * dpr).round().max(1.0) as u32,
            (self.viewport.height * dpr).round().max(1.0) as u32,
        )
    }
}

/// Pointer input routed to the section under the cursor. Positions are
/// relative to the section's on-screen top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed.
    Down(Vec2),
    /// Cursor moved.
    Move(Vec2),
    /// Button released.
    Up,
    /// Wheel scrolled by this many notches.
    Wheel(f32),
}

/// Something a section asks the page to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageRequest {
    /// Animate the page scroll to `scroll` over `duration` seconds.
    ScrollTo {
        /// Target offset.
        scroll: f32,
        /// Animation length.
        duration: f32,
    },
}

/// Live resources held by a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionDiagnostics {
    /// Pending timers.
    pub timers: usize,
    /// Registered scroll bindings.
    pub bindings: usize,
    /// Timelines still driving values.
    pub timelines: usize,
}

impl SectionDiagnostics {
    /// Whether nothing is left running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// A mountable page block.
pub trait Section {
    /// Stable name used for logs and input routing.
    fn name(&self) -> &'static str;

    /// Vertical space the section needs for `viewport`.
    fn extent(&self, viewport: Viewport) -> Extent;

    /// Create renderers, register scroll bindings and start timelines.
    ///
    /// # Errors
    ///
    /// Returns an error when a surface cannot be created or a binding is
    /// declared inconsistently. A failed mount leaves nothing running.
    fn mount(&mut self, input: &FrameInput<'_>) -> Result<(), VitrineError>;

    /// Whether the section is mounted.
    fn is_mounted(&self) -> bool;

    /// Advance timers, scroll bindings, timelines and renderers.
    fn update(&mut self, input: &FrameInput<'_>) -> Vec<PageRequest>;

    /// Pointer input over the section.
    fn pointer(&mut self, event: PointerEvent);

    /// A variant selector button was pressed. `control` is the selector
    /// group (always 0 for single-selector sections). Returns whether the
    /// selection was accepted.
    fn select(&mut self, control: usize, variant: usize, now: Instant) -> bool;

    /// Cancel every timer, kill or revert every timeline, drop every
    /// scroll binding and renderer.
    fn unmount(&mut self);

    /// Resources currently held.
    fn diagnostics(&self) -> SectionDiagnostics;
}
