use glam::Vec2;
use web_time::Instant;

use super::{
    FrameInput, HeroSection, PageLayout, PageRequest, PointerEvent, Section,
    SectionDiagnostics, ShowcaseSection, SurfaceFactory,
};
use crate::animation::Ease;
use crate::assets::AssetCache;
use crate::error::VitrineError;
use crate::options::Options;
use crate::renderer::RenderSurface;
use crate::scroll::Viewport;

/// Page scroll animating toward a snap point.
#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    start: Instant,
    duration: f32,
}

impl ScrollAnimation {
    const EASE: Ease = Ease::PowerOut(3);

    fn sample(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        let t = if self.duration > 0.0 {
            (elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        let scroll = self.from + (self.to - self.from) * Self::EASE.evaluate(t);
        (scroll, t >= 1.0)
    }
}

/// A scrolling page of stacked sections sharing one model cache.
///
/// The page owns the scroll position. User scrolling goes through
/// [`Page::scroll_to`]; sections may ask for animated scrolls (snapping),
/// which the page plays back in [`Page::frame`] until the user scrolls
/// again.
pub struct Page {
    assets: AssetCache,
    viewport: Viewport,
    device_pixel_ratio: f32,
    scroll: f32,
    sections: Vec<Box<dyn Section>>,
    layout: PageLayout,
    animation: Option<ScrollAnimation>,
    capture: Option<usize>,
    pointer: Vec2,
}

impl Page {
    /// Empty page.
    #[must_use]
    pub fn new(assets: AssetCache, viewport: Viewport, device_pixel_ratio: f32) -> Self {
        Self {
            assets,
            viewport,
            device_pixel_ratio,
            scroll: 0.0,
            sections: Vec::new(),
            layout: PageLayout::stack(viewport, &[]),
            animation: None,
            capture: None,
            pointer: Vec2::ZERO,
        }
    }

    /// The hero followed by the horizontal showcase, each drawing through
    /// surfaces made by `surfaces`.
    #[must_use]
    pub fn standard<S, F>(
        options: &Options,
        assets: AssetCache,
        viewport: Viewport,
        device_pixel_ratio: f32,
        mut surfaces: F,
    ) -> Self
    where
        S: RenderSurface + 'static,
        F: FnMut() -> SurfaceFactory<S>,
    {
        Self::new(assets, viewport, device_pixel_ratio)
            .with_section(Box::new(HeroSection::new(options.hero.clone(), surfaces())))
            .with_section(Box::new(ShowcaseSection::new(
                options.showcase.clone(),
                surfaces(),
            )))
    }

    /// Append a section below the existing ones.
    #[must_use]
    pub fn with_section(mut self, section: Box<dyn Section>) -> Self {
        self.sections.push(section);
        self.relayout();
        self
    }

    /// Shared model cache.
    #[must_use]
    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// Current page scroll offset.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Viewport in CSS pixels.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Section boxes.
    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Whether a snap scroll is playing.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Section called `name`.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&dyn Section> {
        self.sections
            .iter()
            .find(|s| s.name() == name)
            .map(Box::as_ref)
    }

    fn relayout(&mut self) {
        let extents: Vec<_> = self
            .sections
            .iter()
            .map(|s| s.extent(self.viewport))
            .collect();
        self.layout = PageLayout::stack(self.viewport, &extents);
        self.scroll = self.scroll.clamp(0.0, self.layout.max_scroll());
    }

    /// Mount every section top to bottom.
    ///
    /// # Errors
    ///
    /// Returns the first section error, or [`VitrineError::Layout`] for a
    /// section with no box; sections mounted before it are unmounted
    /// again.
    pub fn mount_all(&mut self, now: Instant) -> Result<(), VitrineError> {
        for index in 0..self.sections.len() {
            let mounted = self.layout.section_rect(index).and_then(|rect| {
                let input = FrameInput {
                    now,
                    scroll: self.scroll,
                    viewport: self.viewport,
                    device_pixel_ratio: self.device_pixel_ratio,
                    rect,
                    assets: &self.assets,
                };
                self.sections[index].mount(&input)
            });
            if let Err(e) = mounted {
                log::error!("mounting {} failed: {e}", self.sections[index].name());
                self.unmount_all();
                return Err(e);
            }
        }
        log::info!(
            "page mounted: {} sections, {} px tall",
            self.sections.len(),
            self.layout.page_height()
        );
        Ok(())
    }

    /// User scroll. Cancels any snap in progress.
    pub fn scroll_to(&mut self, scroll: f32) {
        self.animation = None;
        self.scroll = scroll.clamp(0.0, self.layout.max_scroll());
    }

    /// New viewport or pixel ratio. Sections pick the change up on the
    /// next frame.
    pub fn resize(&mut self, viewport: Viewport, device_pixel_ratio: f32) {
        self.viewport = viewport;
        self.device_pixel_ratio = device_pixel_ratio;
        self.animation = None;
        self.relayout();
    }

    /// Advance snap scrolling, then every mounted section.
    pub fn frame(&mut self, now: Instant) {
        if let Some(animation) = self.animation {
            let (scroll, done) = animation.sample(now);
            self.scroll = scroll.clamp(0.0, self.layout.max_scroll());
            if done {
                self.animation = None;
            }
        }

        let mut requests = Vec::new();
        for index in 0..self.sections.len() {
            let Some(rect) = self.layout.rect(index) else {
                continue;
            };
            let input = FrameInput {
                now,
                scroll: self.scroll,
                viewport: self.viewport,
                device_pixel_ratio: self.device_pixel_ratio,
                rect,
                assets: &self.assets,
            };
            let section = &mut self.sections[index];
            if section.is_mounted() {
                requests.extend(section.update(&input));
            }
        }

        for request in requests {
            match request {
                PageRequest::ScrollTo { scroll, duration } => {
                    log::debug!("snapping page scroll to {scroll} over {duration}s");
                    self.animation = Some(ScrollAnimation {
                        from: self.scroll,
                        to: scroll.clamp(0.0, self.layout.max_scroll()),
                        start: now,
                        duration,
                    });
                }
            }
        }
    }

    /// Pointer input in viewport coordinates, routed to the section under
    /// the cursor. A press captures its section until release.
    pub fn pointer(&mut self, event: PointerEvent) {
        let routed = match event {
            PointerEvent::Down(p) => {
                self.pointer = p;
                self.capture = self.layout.hit(self.scroll, p.y).map(|(i, _)| i);
                self.capture.map(|i| (i, PointerEvent::Down(self.local(i, p))))
            }
            PointerEvent::Move(p) => {
                self.pointer = p;
                self.capture.map(|i| (i, PointerEvent::Move(self.local(i, p))))
            }
            PointerEvent::Up => self.capture.take().map(|i| (i, PointerEvent::Up)),
            PointerEvent::Wheel(steps) => self
                .layout
                .hit(self.scroll, self.pointer.y)
                .map(|(i, _)| (i, PointerEvent::Wheel(steps))),
        };
        if let Some((index, event)) = routed {
            if let Some(section) = self.sections.get_mut(index) {
                section.pointer(event);
            }
        }
    }

    fn local(&self, index: usize, p: Vec2) -> Vec2 {
        let top = self.layout.rect(index).map_or(0.0, |rect| rect.top);
        let pin = self.layout.hit(self.scroll, p.y).filter(|(i, _)| *i == index);
        // pinned sections do not move with the page
        let y = pin.map_or(p.y + self.scroll - top, |(_, local)| local);
        Vec2::new(p.x, y)
    }

    /// Press variant button `variant` of selector `control` in section
    /// `name`. Returns whether the section accepted it.
    pub fn select(&mut self, name: &str, control: usize, variant: usize, now: Instant) -> bool {
        self.sections
            .iter_mut()
            .find(|s| s.name() == name)
            .is_some_and(|s| s.select(control, variant, now))
    }

    /// Tear every section down, bottom to top.
    pub fn unmount_all(&mut self) {
        for section in self.sections.iter_mut().rev() {
            section.unmount();
        }
        self.animation = None;
        self.capture = None;
    }

    /// Resources held per section.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<(&'static str, SectionDiagnostics)> {
        self.sections
            .iter()
            .map(|s| (s.name(), s.diagnostics()))
            .collect()
    }

    /// Whether no section holds anything.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.sections.iter().all(|s| s.diagnostics().is_idle())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::assets::{triangle_glb, LoadMode, MemorySource};
    use crate::renderer::HeadlessSurface;
    use crate::section::{headless_surfaces, Extent};

    const VIEW: Viewport = Viewport::new(1200.0, 800.0);

    fn page() -> Page {
        let options = Options::default();
        let mut source = MemorySource::new();
        for path in options
            .hero
            .models
            .iter()
            .chain(options.showcase.panels.iter().flat_map(|p| p.models.iter()))
        {
            source.insert(path, triangle_glb(path));
        }
        let assets = AssetCache::new(source, LoadMode::Inline);
        Page::standard(&options, assets, VIEW, 1.0, headless_surfaces)
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn standard_page_stacks_hero_and_pinned_showcase() {
        let page = page();
        assert_eq!(page.layout().rect(1).unwrap().top, 800.0);
        assert_eq!(page.layout().page_height(), 2800.0);
        assert!(page.section("hero").is_some());
        assert!(page.section("showcase").is_some());
        assert!(page.section("footer").is_none());
    }

    #[test]
    fn scroll_is_clamped_to_page() {
        let mut page = page();
        page.scroll_to(-50.0);
        assert_eq!(page.scroll(), 0.0);
        page.scroll_to(10_000.0);
        assert_eq!(page.scroll(), 2000.0);
    }

    #[test]
    fn snap_request_animates_scroll_until_user_scrolls() {
        let t0 = Instant::now();
        let mut page = page();
        page.mount_all(t0).unwrap();
        page.scroll_to(1300.0);
        let mut ms = 0;
        while !page.is_animating() && ms < 1_000 {
            ms += 50;
            page.frame(at(t0, ms));
        }
        assert!(page.is_animating());
        page.frame(at(t0, ms + 500));
        assert!(!page.is_animating());
        assert!((page.scroll() - 800.0).abs() < 1e-3, "{}", page.scroll());

        ms += 500;
        page.scroll_to(1300.0);
        while !page.is_animating() && ms < 3_000 {
            ms += 50;
            page.frame(at(t0, ms));
        }
        page.scroll_to(1500.0);
        assert!(!page.is_animating());
        assert_eq!(page.scroll(), 1500.0);
    }

    #[test]
    fn selection_routes_by_section_name() {
        let t0 = Instant::now();
        let mut page = page();
        page.mount_all(t0).unwrap();
        assert!(page.select("showcase", 1, 1, at(t0, 10)));
        assert!(!page.select("showcase", 0, 1, at(t0, 10)));
        assert!(!page.select("nowhere", 0, 0, at(t0, 10)));
    }

    #[test]
    fn unmount_all_leaves_nothing_running() {
        let t0 = Instant::now();
        let mut page = page();
        page.mount_all(t0).unwrap();
        for ms in (0..3_000).step_by(100) {
            page.frame(at(t0, ms));
        }
        assert!(!page.is_idle());
        page.unmount_all();
        assert!(page.is_idle());
        assert!(page.diagnostics().iter().all(|(_, d)| d.is_idle()));
    }

    #[test]
    fn failed_mount_unmounts_earlier_sections() {
        let t0 = Instant::now();
        let options = Options::default();
        let assets = AssetCache::new(MemorySource::new(), LoadMode::Inline);
        let mut calls = 0;
        let mut page = Page::standard(&options, assets, VIEW, 1.0, || {
            calls += 1;
            if calls == 1 {
                return headless_surfaces();
            }
            let failing: SurfaceFactory<HeadlessSurface> =
                Box::new(|_, _| Err(VitrineError::Io(std::io::Error::other("no adapter"))));
            failing
        });
        assert!(page.mount_all(t0).is_err());
        assert!(page.is_idle());
        assert!(!page.section("hero").unwrap().is_mounted());
    }

    struct Collapsed;

    impl Section for Collapsed {
        fn name(&self) -> &'static str {
            "collapsed"
        }

        fn extent(&self, _: Viewport) -> Extent {
            Extent::fixed(f32::NAN)
        }

        fn mount(&mut self, _: &FrameInput<'_>) -> Result<(), VitrineError> {
            Ok(())
        }

        fn is_mounted(&self) -> bool {
            false
        }

        fn update(&mut self, _: &FrameInput<'_>) -> Vec<PageRequest> {
            Vec::new()
        }

        fn pointer(&mut self, _: PointerEvent) {}

        fn select(&mut self, _: usize, _: usize, _: Instant) -> bool {
            false
        }

        fn unmount(&mut self) {}

        fn diagnostics(&self) -> SectionDiagnostics {
            SectionDiagnostics::default()
        }
    }

    #[test]
    fn section_without_layout_box_fails_mount() {
        let t0 = Instant::now();
        let options = Options::default();
        let assets = AssetCache::new(MemorySource::new(), LoadMode::Inline);
        let mut page = Page::new(assets, VIEW, 1.0)
            .with_section(Box::new(HeroSection::new(
                options.hero.clone(),
                headless_surfaces(),
            )))
            .with_section(Box::new(Collapsed));
        assert_eq!(page.layout().page_height(), 800.0);
        assert!(matches!(page.mount_all(t0), Err(VitrineError::Layout(_))));
        assert!(!page.section("hero").unwrap().is_mounted());
        assert!(page.is_idle());
    }
}
