//! Pinned horizontal showcase: vertical scroll slides full-width panels
//! sideways, each panel revealing its copy and model as it arrives.

use std::time::Duration;

use glam::Vec2;
use web_time::Instant;

use super::{
    Extent, FrameInput, PageRequest, PointerEvent, Section, SectionDiagnostics,
    SurfaceFactory,
};
use crate::animation::{Ease, Position, Property, PropertyStore, TargetId, Timeline, Tween};
use crate::camera::Camera;
use crate::error::VitrineError;
use crate::options::{PanelOptions, ShowcaseOptions};
use crate::renderer::{LightRig, RenderSurface, SceneRenderer, StageState};
use crate::rotation::VariantCycler;
use crate::scene::SceneComposition;
use crate::scroll::{
    BindingId, ContainerAnimation, Mode, Rect, ScrollEvent, ScrollObserver, ScrollTrigger, Snap,
    Viewport,
};
use crate::timers::TimerRegistry;

/// Fixed section header.
pub const HEADER: TargetId = TargetId::new("showcase-header");
/// Family name of the sliding panels.
pub const PANEL: &str = "panel";
/// Family name of panel headings.
pub const PANEL_TITLE: &str = "panel-title";
/// Family name of panel copy blocks.
pub const PANEL_CONTENT: &str = "panel-content";
/// Family name of panel model canvases.
pub const PANEL_MODEL: &str = "panel-model";

const PLACEHOLDER: &str = "Loading...";

/// Completion cues of showcase timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowcaseCue {
    /// The panels slid all the way to the last one.
    HorizontalComplete,
}

fn panel_target(family: &'static str, index: usize) -> TargetId {
    TargetId::indexed(family, index as u32)
}

/// Panel under the section-relative column `x`, with the track shifted by
/// `shift` px (negative while sliding left).
fn panel_at(x: f32, shift: f32, width: f32, count: usize) -> Option<usize> {
    if width <= 0.0 {
        return None;
    }
    let track_x = x - shift;
    if track_x < 0.0 {
        return None;
    }
    let index = (track_x / width).floor() as usize;
    (index < count).then_some(index)
}

struct Panel<S: RenderSurface> {
    renderer: SceneRenderer<S>,
    cycler: Option<VariantCycler>,
    reveal: Timeline<ShowcaseCue>,
    binding: BindingId,
}

#[derive(Debug, Clone, Copy)]
struct Bindings {
    header: BindingId,
    tail: BindingId,
    horizontal: BindingId,
}

struct Mounted<S: RenderSurface> {
    panels: Vec<Panel<S>>,
    scroll: ScrollObserver,
    timers: TimerRegistry,
    bindings: Bindings,
    header: Timeline<ShowcaseCue>,
    horizontal: Timeline<ShowcaseCue>,
    header_faded: bool,
    rect: Rect,
    viewport: Viewport,
    drag: Option<usize>,
    hover: Vec2,
}

impl<S: RenderSurface> Mounted<S> {
    fn timelines_mut(&mut self) -> impl Iterator<Item = &mut Timeline<ShowcaseCue>> {
        [&mut self.header, &mut self.horizontal]
            .into_iter()
            .chain(self.panels.iter_mut().map(|p| &mut p.reveal))
    }
}

/// The horizontal product showcase.
///
/// While the section is pinned, page scroll over `viewport.width * (n - 1)`
/// px slides the panels left; the scrubbed progress snaps to whole panels
/// when scrolling stops. Panels with several models flip between them on a
/// timer and through their selector buttons.
pub struct ShowcaseSection<S: RenderSurface> {
    options: ShowcaseOptions,
    surfaces: SurfaceFactory<S>,
    store: PropertyStore,
    mounted: Option<Mounted<S>>,
    horizontal_complete: bool,
}

impl<S: RenderSurface> ShowcaseSection<S> {
    /// Unmounted showcase creating panel canvases through `surfaces`.
    #[must_use]
    pub fn new(options: ShowcaseOptions, surfaces: SurfaceFactory<S>) -> Self {
        Self {
            options,
            surfaces,
            store: PropertyStore::new(),
            mounted: None,
            horizontal_complete: false,
        }
    }

    /// Section options.
    #[must_use]
    pub fn options(&self) -> &ShowcaseOptions {
        &self.options
    }

    /// Animated page values (header, panels).
    #[must_use]
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Whether the panels have slid all the way once since mount.
    #[must_use]
    pub fn horizontal_complete(&self) -> bool {
        self.horizontal_complete
    }

    /// Number of panels.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.options.panels.len()
    }

    /// Renderer of panel `index` while mounted.
    #[must_use]
    pub fn renderer(&self, index: usize) -> Option<&SceneRenderer<S>> {
        self.mounted.as_ref()?.panels.get(index).map(|p| &p.renderer)
    }

    /// Mutable renderer of panel `index` while mounted.
    pub fn renderer_mut(&mut self, index: usize) -> Option<&mut SceneRenderer<S>> {
        self.mounted.as_mut()?.panels.get_mut(index).map(|p| &mut p.renderer)
    }

    /// Model shown by panel `index`, if mounted.
    #[must_use]
    pub fn variant(&self, index: usize) -> Option<usize> {
        let panel = self.mounted.as_ref()?.panels.get(index)?;
        Some(panel.cycler.as_ref().map_or(0, VariantCycler::index))
    }

    /// How far the pinned section is pushed down to stay on screen.
    #[must_use]
    pub fn pin_offset(&self) -> f32 {
        self.mounted
            .as_ref()
            .map_or(0.0, |m| m.scroll.pin_offset(m.bindings.horizontal))
    }

    /// Horizontal track shift in px.
    #[must_use]
    pub fn track_shift(&self) -> f32 {
        let width = self.mounted.as_ref().map_or(0.0, |m| m.viewport.width);
        self.store.scalar(panel_target(PANEL, 0), Property::XPercent) / 100.0 * width
    }

    /// Canvas state of panel `index`.
    #[must_use]
    pub fn panel_stage(&self, index: usize) -> StageState {
        let model = panel_target(PANEL_MODEL, index);
        StageState {
            opacity: self.store.scalar(model, Property::Opacity),
            scale: self.store.scalar(model, Property::Scale),
            offset: Vec2::new(self.track_shift(), 0.0),
            rotate_y_deg: 0.0,
        }
    }

    fn travel(&self, viewport: Viewport) -> f32 {
        viewport.width * self.panel_count().saturating_sub(1) as f32
    }

    fn build_panel(
        &mut self,
        index: usize,
        input: &FrameInput<'_>,
        scroll: &mut ScrollObserver,
        parent: BindingId,
        timers: &mut TimerRegistry,
    ) -> Result<Panel<S>, VitrineError> {
        let opts = &self.options;
        let panel: &PanelOptions = &opts.panels[index];
        let (w, h) = input.canvas_size(&opts.surface);
        // canvas fills the right column of the panel
        let size = ((w / 2).max(1), h);
        let surface = (self.surfaces)(size, &opts.surface)?;

        let models: Vec<(&str, f32)> = panel
            .models
            .iter()
            .map(|path| (path.as_str(), opts.model_scale))
            .collect();
        let mut composition = SceneComposition::new(&models);
        let margin = if panel.is_dual() {
            composition.show_only(0);
            opts.dual_fit_margin
        } else {
            opts.fit_margin
        };
        let aspect = size.0 as f32 / size.1 as f32;
        let renderer = SceneRenderer::new(
            surface,
            size,
            Camera::from_options(&opts.camera, aspect),
            LightRig::from_options(&opts.lighting, opts.surface.shadows),
            composition,
        )
        .with_surface_options(&opts.surface)
        .with_orbit(&opts.orbit)
        .with_fit(margin)
        .with_placeholder(PLACEHOLDER);

        let cycler = panel.is_dual().then(|| {
            let mut cycler = VariantCycler::new(
                panel.models.len(),
                Duration::from_millis(opts.dual_switch_interval_ms),
            );
            cycler.start(timers, input.now);
            cycler
        });

        let travel = self.travel(input.viewport);
        let binding = scroll.register(Self::panel_trigger(index, input, travel, parent)?)?;
        Ok(Panel {
            renderer,
            cycler,
            reveal: Self::reveal_timeline(index)?,
            binding,
        })
    }

    fn panel_trigger(
        index: usize,
        input: &FrameInput<'_>,
        travel: f32,
        parent: BindingId,
    ) -> Result<ScrollTrigger, VitrineError> {
        let width = input.viewport.width;
        let element = Rect::new(input.rect.top, index as f32 * width, width, input.rect.height);
        Ok(ScrollTrigger::new(
            element,
            "left center",
            "center center",
            Mode::Toggle("play none none reverse".parse()?),
        )?
        .in_container(ContainerAnimation { parent, travel }))
    }

    fn section_triggers(
        &self,
        scroll: &mut ScrollObserver,
        rect: Rect,
        viewport: Viewport,
    ) -> Result<Bindings, VitrineError> {
        let end = format!("+={}", self.travel(viewport));
        let header = scroll.register(ScrollTrigger::new(
            rect,
            "top top",
            &end,
            Mode::Toggle("play none none reverse".parse()?),
        )?)?;
        let tail = scroll.register(ScrollTrigger::new(rect, "top top", &end, Mode::Scrub(None))?)?;
        let horizontal = scroll.register(
            ScrollTrigger::new(rect, "top top", &end, Mode::Scrub(Some(self.options.scrub_s)))?
                .pinned()
                .with_snap(Snap::points(self.panel_count())),
        )?;
        Ok(Bindings {
            header,
            tail,
            horizontal,
        })
    }

    // =========================================================================
    // Timelines
    // =========================================================================

    fn header_timeline() -> Result<Timeline<ShowcaseCue>, VitrineError> {
        let mut tl = Timeline::new();
        let _ = tl.add(
            Tween::to([HEADER])
                .prop(Property::Opacity, 1.0)
                .prop(Property::Y, 0.0)
                .duration(0.4)
                .ease(Ease::PowerOut(2)),
            Position::End,
        )?;
        Ok(tl)
    }

    fn horizontal_timeline(&self) -> Result<Timeline<ShowcaseCue>, VitrineError> {
        let n = self.panel_count();
        let mut tl = Timeline::new();
        let _ = tl.add(
            Tween::to((0..n).map(|i| panel_target(PANEL, i)))
                .prop(Property::XPercent, -100.0 * n.saturating_sub(1) as f32)
                .ease(Ease::Linear)
                .on_complete(ShowcaseCue::HorizontalComplete),
            Position::End,
        )?;
        Ok(tl)
    }

    fn reveal_timeline(index: usize) -> Result<Timeline<ShowcaseCue>, VitrineError> {
        let mut tl = Timeline::new();
        tl.add(
            Tween::from_to([panel_target(PANEL_TITLE, index)])
                .from(Property::Y, 30.0)
                .from(Property::Opacity, 0.0)
                .from(Property::Scale, 0.97)
                .prop(Property::Y, 0.0)
                .prop(Property::Opacity, 1.0)
                .prop(Property::Scale, 1.0)
                .duration(0.6)
                .ease(Ease::PowerOut(2)),
            Position::At(0.0),
        )?
        .add(
            Tween::from_to([panel_target(PANEL_CONTENT, index)])
                .from(Property::Y, 40.0)
                .from(Property::Opacity, 0.0)
                .prop(Property::Y, 0.0)
                .prop(Property::Opacity, 1.0)
                .duration(0.8)
                .delay(0.1)
                .ease(Ease::PowerOut(2)),
            Position::At(0.0),
        )?
        .add(
            Tween::from_to([panel_target(PANEL_MODEL, index)])
                .from(Property::Scale, 0.95)
                .from(Property::Opacity, 0.0)
                .prop(Property::Scale, 1.0)
                .prop(Property::Opacity, 1.0)
                .duration(1.0)
                .delay(0.2)
                .ease(Ease::PowerOut(2)),
            Position::At(0.0),
        )?;
        Ok(tl)
    }

    // =========================================================================
    // Frame helpers
    // =========================================================================

    /// Re-register every trigger after the section box or viewport changed.
    fn relayout(&mut self, input: &FrameInput<'_>) {
        let travel = self.travel(input.viewport);
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        let mut scroll = ScrollObserver::new(input.viewport);
        let registered = self
            .section_triggers(&mut scroll, input.rect, input.viewport)
            .and_then(|bindings| {
                for (index, panel) in mounted.panels.iter_mut().enumerate() {
                    let trigger = Self::panel_trigger(index, input, travel, bindings.horizontal)?;
                    panel.binding = scroll.register(trigger)?;
                }
                Ok(bindings)
            });
        match registered {
            Ok(bindings) => {
                mounted.bindings = bindings;
                mounted.scroll = scroll;
            }
            Err(e) => log::error!("showcase relayout failed: {e}"),
        }
        if mounted.viewport != input.viewport {
            let (w, h) = input.canvas_size(&self.options.surface);
            for panel in &mut mounted.panels {
                panel.renderer.resize((w / 2).max(1), h);
            }
        }
        mounted.rect = input.rect;
        mounted.viewport = input.viewport;
        self.mounted = Some(mounted);
    }

    /// Fade the header out over the last stretch of the pinned range.
    fn apply_tail_fade(&mut self, progress: f32) {
        let start = self.options.header_fade_start;
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        if progress > start {
            let fade = ((progress - start) / (1.0 - start)).min(1.0);
            self.store.set(HEADER, Property::Opacity, 1.0 - fade);
            self.store.set(HEADER, Property::Y, -20.0 * fade);
            mounted.header_faded = true;
        } else if mounted.header_faded {
            mounted.header_faded = false;
            self.store.set(HEADER, Property::Opacity, 1.0);
            self.store.set(HEADER, Property::Y, 0.0);
        }
    }
}

impl<S: RenderSurface> Section for ShowcaseSection<S> {
    fn name(&self) -> &'static str {
        "showcase"
    }

    fn extent(&self, viewport: Viewport) -> Extent {
        Extent {
            height: viewport.height,
            pin_spacing: self.travel(viewport),
        }
    }

    fn mount(&mut self, input: &FrameInput<'_>) -> Result<(), VitrineError> {
        if self.mounted.is_some() {
            return Ok(());
        }
        self.options.validate()?;
        for panel in &self.options.panels {
            input.assets.preload(&panel.models);
        }

        let mut scroll = ScrollObserver::new(input.viewport);
        let mut timers = TimerRegistry::new();
        let bindings = self.section_triggers(&mut scroll, input.rect, input.viewport)?;
        let mut panels = Vec::with_capacity(self.panel_count());
        for index in 0..self.panel_count() {
            match self.build_panel(index, input, &mut scroll, bindings.horizontal, &mut timers) {
                Ok(panel) => panels.push(panel),
                Err(e) => {
                    timers.clear_all();
                    return Err(e);
                }
            }
        }
        let header = Self::header_timeline()?;
        let horizontal = self.horizontal_timeline()?;

        self.store = PropertyStore::new();
        self.store.set(HEADER, Property::Opacity, 0.0);
        self.store.set(HEADER, Property::Y, -20.0);
        for panel in &mut panels {
            let _ = panel.reveal.prime(&mut self.store);
            let _ = panel.renderer.sync_assets(input.assets);
        }
        self.horizontal_complete = false;
        self.mounted = Some(Mounted {
            panels,
            scroll,
            timers,
            bindings,
            header,
            horizontal,
            header_faded: false,
            rect: input.rect,
            viewport: input.viewport,
            drag: None,
            hover: Vec2::ZERO,
        });
        log::info!(
            "showcase mounted with {} panels over {} px",
            self.panel_count(),
            self.travel(input.viewport)
        );
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    fn update(&mut self, input: &FrameInput<'_>) -> Vec<PageRequest> {
        let now = input.now;
        let relayout = self
            .mounted
            .as_ref()
            .is_some_and(|m| m.rect != input.rect || m.viewport != input.viewport);
        if relayout {
            self.relayout(input);
        }
        let Some(mounted) = self.mounted.as_mut() else {
            return Vec::new();
        };
        for panel in &mut mounted.panels {
            let _ = panel.renderer.sync_assets(input.assets);
        }

        let store = &mut self.store;
        let mut requests = Vec::new();
        let mut cues = Vec::new();
        let mut tail = None;
        let b = mounted.bindings;
        for event in mounted.scroll.update(input.scroll, input.viewport, now) {
            match event {
                ScrollEvent::Progress { binding, progress } if binding == b.horizontal => {
                    cues.extend(mounted.horizontal.seek_progress(progress, store));
                }
                ScrollEvent::Progress { binding, progress } if binding == b.tail => {
                    tail = Some(progress);
                }
                ScrollEvent::Toggle { binding, action, .. } if binding == b.header => {
                    cues.extend(mounted.header.toggle(action, now, store));
                }
                ScrollEvent::Toggle { binding, action, .. } => {
                    if let Some(panel) = mounted.panels.iter_mut().find(|p| p.binding == binding) {
                        cues.extend(panel.reveal.toggle(action, now, store));
                    }
                }
                ScrollEvent::SnapTo { scroll, duration, .. } => {
                    requests.push(PageRequest::ScrollTo { scroll, duration });
                }
                ScrollEvent::Progress { .. } => {}
            }
        }

        for id in mounted.timers.poll(now) {
            for (index, panel) in mounted.panels.iter_mut().enumerate() {
                if let Some(variant) = panel.cycler.as_mut().and_then(|c| c.on_timer(id)) {
                    log::debug!("showcase panel {index} shows variant {variant}");
                    panel.renderer.composition_mut().show_only(variant);
                }
            }
        }

        for tl in mounted.timelines_mut() {
            cues.extend(tl.advance(now, store));
        }
        if let Some(progress) = tail {
            self.apply_tail_fade(progress);
        }
        for cue in cues {
            match cue {
                ShowcaseCue::HorizontalComplete => {
                    if !self.horizontal_complete {
                        log::info!("showcase reached its last panel");
                    }
                    self.horizontal_complete = true;
                }
            }
        }

        let stages: Vec<StageState> = (0..self.panel_count())
            .map(|i| self.panel_stage(i))
            .collect();
        if let Some(mounted) = self.mounted.as_mut() {
            for (panel, stage) in mounted.panels.iter_mut().zip(stages) {
                let _ = panel.renderer.frame(now, stage);
            }
        }
        requests
    }

    fn pointer(&mut self, event: PointerEvent) {
        let shift = self.track_shift();
        let count = self.panel_count();
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let width = mounted.viewport.width;
        let local = |p: Vec2, index: usize| Vec2::new(p.x - shift - index as f32 * width, p.y);
        match event {
            PointerEvent::Down(p) => {
                mounted.hover = p;
                mounted.drag = panel_at(p.x, shift, width, count);
                if let Some(i) = mounted.drag {
                    mounted.panels[i].renderer.pointer_down(local(p, i));
                }
            }
            PointerEvent::Move(p) => {
                mounted.hover = p;
                if let Some(i) = mounted.drag {
                    mounted.panels[i].renderer.pointer_move(local(p, i));
                }
            }
            PointerEvent::Up => {
                if let Some(i) = mounted.drag.take() {
                    mounted.panels[i].renderer.pointer_up();
                }
            }
            PointerEvent::Wheel(steps) => {
                if let Some(i) = panel_at(mounted.hover.x, shift, width, count) {
                    mounted.panels[i].renderer.wheel(steps);
                }
            }
        }
    }

    fn select(&mut self, control: usize, variant: usize, now: Instant) -> bool {
        let Some(mounted) = self.mounted.as_mut() else {
            return false;
        };
        let Some(panel) = mounted.panels.get_mut(control) else {
            return false;
        };
        let Some(cycler) = panel.cycler.as_mut() else {
            return false;
        };
        if !cycler.select(variant, &mut mounted.timers, now) {
            return false;
        }
        panel.renderer.composition_mut().show_only(variant);
        true
    }

    fn unmount(&mut self) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        for panel in &mut mounted.panels {
            if let Some(cycler) = panel.cycler.as_mut() {
                cycler.stop(&mut mounted.timers);
            }
        }
        mounted.timers.clear_all();
        mounted.scroll.clear();
        for tl in mounted.timelines_mut() {
            tl.revert(&mut self.store);
        }
        self.store = PropertyStore::new();
        log::info!("showcase unmounted");
    }

    fn diagnostics(&self) -> SectionDiagnostics {
        let Some(mounted) = self.mounted.as_ref() else {
            return SectionDiagnostics::default();
        };
        let timelines = [&mounted.header, &mounted.horizontal]
            .into_iter()
            .chain(mounted.panels.iter().map(|p| &p.reveal))
            .filter(|tl| tl.is_active())
            .count();
        SectionDiagnostics {
            timers: mounted.timers.active_count(),
            bindings: mounted.scroll.active_count(),
            timelines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{triangle_glb, AssetCache, LoadMode, MemorySource};
    use crate::renderer::HeadlessSurface;
    use crate::section::headless_surfaces;

    const VIEW: Viewport = Viewport::new(1200.0, 800.0);
    const RECT: Rect = Rect::new(800.0, 0.0, 1200.0, 800.0);

    fn cache() -> AssetCache {
        let source = MemorySource::new()
            .with("/glb/opticspectra.glb", triangle_glb("Spectra"))
            .with("/glb/navocular.glb", triangle_glb("Light"))
            .with("/glb/navocular1.glb", triangle_glb("Dongle"));
        AssetCache::new(source, LoadMode::Inline)
    }

    fn input(now: Instant, scroll: f32, assets: &AssetCache) -> FrameInput<'_> {
        FrameInput {
            now,
            scroll,
            viewport: VIEW,
            device_pixel_ratio: 2.0,
            rect: RECT,
            assets,
        }
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    fn mounted(assets: &AssetCache, t0: Instant) -> ShowcaseSection<HeadlessSurface> {
        let mut showcase = ShowcaseSection::new(ShowcaseOptions::default(), headless_surfaces());
        showcase.mount(&input(t0, 0.0, assets)).unwrap();
        showcase
    }

    /// Frames every 100 ms in `(from, to]` at a fixed scroll; returns the
    /// page requests raised.
    fn hold(
        showcase: &mut ShowcaseSection<HeadlessSurface>,
        assets: &AssetCache,
        t0: Instant,
        (from, to): (u64, u64),
        scroll: f32,
    ) -> Vec<PageRequest> {
        let mut requests = Vec::new();
        let mut ms = from;
        while ms < to {
            ms += 100;
            requests.extend(showcase.update(&input(at(t0, ms), scroll, assets)));
        }
        requests
    }

    #[test]
    fn first_panel_reveals_on_mount() {
        let assets = cache();
        let t0 = Instant::now();
        let mut showcase = mounted(&assets, t0);
        assert_eq!(showcase.store().scalar(HEADER, Property::Opacity), 0.0);
        assert_eq!(showcase.store().scalar(panel_target(PANEL_TITLE, 0), Property::Opacity), 0.0);

        let _ = hold(&mut showcase, &assets, t0, (0, 1_500), 0.0);
        let s = showcase.store();
        assert_eq!(s.scalar(panel_target(PANEL_TITLE, 0), Property::Opacity), 1.0);
        assert_eq!(s.scalar(panel_target(PANEL_MODEL, 0), Property::Scale), 1.0);
        assert_eq!(s.scalar(panel_target(PANEL_TITLE, 1), Property::Opacity), 0.0);
        assert_eq!(s.scalar(HEADER, Property::Opacity), 0.0);
        assert!(showcase.renderer(0).unwrap().is_ready());
        let (w, h) = showcase.renderer(1).unwrap().surface().size();
        // lean surface clamps the pixel ratio to 1
        assert_eq!((w, h), (600, 800));
    }

    #[test]
    fn pinned_scroll_slides_panels_and_completes() {
        let assets = cache();
        let t0 = Instant::now();
        let mut showcase = mounted(&assets, t0);

        let _ = hold(&mut showcase, &assets, t0, (0, 1_000), 1_400.0);
        let x = showcase.store().scalar(panel_target(PANEL, 1), Property::XPercent);
        assert!((x + 50.0).abs() < 1e-3, "{x}");
        assert!((showcase.pin_offset() - 600.0).abs() < 1e-3);
        assert_eq!(showcase.store().scalar(HEADER, Property::Opacity), 1.0);
        assert!(!showcase.horizontal_complete());

        let _ = hold(&mut showcase, &assets, t0, (1_000, 3_000), 2_000.0);
        assert!(showcase.horizontal_complete());
        let s = showcase.store();
        assert!((s.scalar(panel_target(PANEL, 0), Property::XPercent) + 100.0).abs() < 1e-3);
        assert_eq!(s.scalar(panel_target(PANEL_TITLE, 1), Property::Opacity), 1.0);
        // header has faded out over the last fifth
        assert!(s.scalar(HEADER, Property::Opacity).abs() < 1e-4);
        assert!((s.scalar(HEADER, Property::Y) + 20.0).abs() < 1e-4);
        assert!((showcase.panel_stage(1).offset.x + 1200.0).abs() < 1e-2);
    }

    #[test]
    fn idle_scroll_snaps_to_nearest_panel() {
        let assets = cache();
        let t0 = Instant::now();
        let mut showcase = mounted(&assets, t0);
        let requests = hold(&mut showcase, &assets, t0, (0, 300), 1_300.0);
        assert_eq!(requests.len(), 1);
        assert!(matches!(
            requests[0],
            PageRequest::ScrollTo { scroll, duration }
                if (scroll - 800.0).abs() < 1e-3 && (0.1..=0.2).contains(&duration)
        ));
    }

    #[test]
    fn dual_panel_cycles_and_selection_restarts_interval() {
        let assets = cache();
        let t0 = Instant::now();
        let mut showcase = mounted(&assets, t0);
        assert_eq!(showcase.variant(1), Some(0));
        assert_eq!(showcase.renderer(1).unwrap().composition().visible_indices(), vec![0]);

        let _ = hold(&mut showcase, &assets, t0, (0, 5_000), 0.0);
        assert_eq!(showcase.variant(1), Some(1));

        assert!(showcase.select(1, 0, at(t0, 5_100)));
        assert_eq!(showcase.renderer(1).unwrap().composition().visible_indices(), vec![0]);
        let _ = hold(&mut showcase, &assets, t0, (5_000, 10_000), 0.0);
        assert_eq!(showcase.variant(1), Some(0));
        let _ = hold(&mut showcase, &assets, t0, (10_000, 10_500), 0.0);
        assert_eq!(showcase.variant(1), Some(1));

        assert!(!showcase.select(0, 1, at(t0, 10_500)));
        assert!(!showcase.select(1, 2, at(t0, 10_500)));
        assert!(!showcase.select(4, 0, at(t0, 10_500)));
    }

    #[test]
    fn unmount_releases_timers_bindings_and_timelines() {
        let assets = cache();
        let t0 = Instant::now();
        let mut showcase = mounted(&assets, t0);
        let _ = hold(&mut showcase, &assets, t0, (0, 500), 1_000.0);
        assert_eq!(
            showcase.diagnostics(),
            SectionDiagnostics {
                timers: 1,
                bindings: 5,
                timelines: 4,
            }
        );
        showcase.unmount();
        assert!(showcase.diagnostics().is_idle());
        assert!(showcase.renderer(0).is_none());
        assert!(showcase.store().is_empty());
    }

    #[test]
    fn resize_rebuilds_triggers() {
        let assets = cache();
        let t0 = Instant::now();
        let mut showcase = mounted(&assets, t0);
        let wide = Viewport::new(1600.0, 800.0);
        let mut frame = input(at(t0, 100), 0.0, &assets);
        frame.viewport = wide;
        frame.rect = Rect::new(800.0, 0.0, 1600.0, 800.0);
        let _ = showcase.update(&frame);
        assert_eq!(showcase.diagnostics().bindings, 5);
        assert_eq!(showcase.extent(wide).pin_spacing, 1600.0);
    }

    #[test]
    fn panel_hit_testing_follows_track() {
        assert_eq!(panel_at(100.0, 0.0, 1200.0, 2), Some(0));
        assert_eq!(panel_at(100.0, -1200.0, 1200.0, 2), Some(1));
        assert_eq!(panel_at(1300.0, -1200.0, 1200.0, 2), None);
        assert_eq!(panel_at(-5.0, 0.0, 1200.0, 2), None);
    }
}
