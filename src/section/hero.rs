//! Hero section: every model introduced at once, then one at a time.

use std::time::Duration;

use glam::{Vec2, Vec4};
use web_time::Instant;

use super::{
    Extent, FrameInput, PageRequest, PointerEvent, Section, SectionDiagnostics,
    SurfaceFactory,
};
use crate::animation::{
    Ease, Position, Property, PropertyStore, TargetId, Timeline, Tween, TweenValue,
};
use crate::camera::Camera;
use crate::error::VitrineError;
use crate::options::HeroOptions;
use crate::particles::ParticleField;
use crate::renderer::{FloatEffect, LightRig, RenderSurface, SceneRenderer, StageState};
use crate::rotation::{RotationScheduler, SwitchRequest};
use crate::scene::SceneComposition;
use crate::scroll::{BindingId, Mode, Rect, ScrollEvent, ScrollObserver, ScrollTrigger, Viewport};
use crate::timers::{TimerId, TimerRegistry};

/// Whole hero block; scroll-faded.
pub const HERO: TargetId = TargetId::new("hero");
/// Gradient backdrop behind the canvas.
pub const BACKDROP: TargetId = TargetId::new("hero-backdrop");
/// Headline.
pub const TITLE: TargetId = TargetId::new("hero-title");
/// Sub-headline.
pub const SUBTITLE: TargetId = TargetId::new("hero-subtitle");
/// Call-to-action buttons.
pub const CTA: TargetId = TargetId::new("hero-cta");
/// Container holding the canvas.
pub const CONTAINER: TargetId = TargetId::new("hero-models");
/// Scroll parallax of the container.
pub const PARALLAX: TargetId = TargetId::new("hero-parallax");
/// Canvas block fading in when scrolled into view.
pub const STAGE: TargetId = TargetId::new("stage");
/// Overlay heading drawn over the canvas.
pub const STAGE_TITLE: TargetId = TargetId::new("stage-title");
/// Overlay copy drawn over the canvas.
pub const STAGE_COPY: TargetId = TargetId::new("stage-copy");
/// Overlay button row drawn over the canvas.
pub const STAGE_CTA: TargetId = TargetId::new("stage-cta");
/// Family name of per-model targets.
pub const MODEL: &str = "hero-model";

const PLACEHOLDER: &str = "Loading amazing experience...";

const BACKDROP_NIGHT: Vec4 = Vec4::new(0.0, 0.0, 0.2, 1.0);
const BACKDROP_PULSE: Vec4 = Vec4::new(0.0, 0.0, 0.4, 1.0);
const BACKDROP_FLASH: Vec4 = Vec4::ONE;

/// Completion cues of hero timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroCue {
    /// Entrance (and intro, if any) finished.
    EntranceDone,
    /// The intro faded the container out; hand off to cycling.
    IntroFinished,
    /// The outgoing model is hidden.
    FadedOut,
    /// The incoming model is fully shown.
    FadedIn,
}

#[derive(Debug, Clone, Copy)]
struct Bindings {
    fade: BindingId,
    parallax: BindingId,
    stage: BindingId,
}

struct Mounted<S: RenderSurface> {
    renderer: SceneRenderer<S>,
    scroll: ScrollObserver,
    timers: TimerRegistry,
    rotation: RotationScheduler,
    interval: Option<TimerId>,
    bindings: Bindings,
    entrance: Timeline<HeroCue>,
    overlay: Timeline<HeroCue>,
    stage_fade: Timeline<HeroCue>,
    fade: Timeline<HeroCue>,
    parallax: Timeline<HeroCue>,
    switch: Option<Timeline<HeroCue>>,
    rect: Rect,
    canvas: (u32, u32),
    mounted_at: Instant,
}

impl<S: RenderSurface> Mounted<S> {
    fn timelines_mut(&mut self) -> impl Iterator<Item = &mut Timeline<HeroCue>> {
        [
            &mut self.entrance,
            &mut self.overlay,
            &mut self.stage_fade,
            &mut self.fade,
            &mut self.parallax,
        ]
        .into_iter()
        .chain(self.switch.as_mut())
    }

    fn start_interval(&mut self, period: Duration, now: Instant) {
        if self.interval.is_none() && self.rotation.count() > 1 {
            self.interval = Some(self.timers.set_interval(period, now));
        }
    }
}

/// The hero block.
///
/// On mount the entrance timeline reveals the copy and the model container.
/// With the intro enabled every model is shown at its own offset while the
/// container spins; when the intro fades out the section hands off to
/// cycling one model at a time on a fixed interval. Selector buttons
/// switch directly, unless a switch or the intro is running.
pub struct HeroSection<S: RenderSurface> {
    options: HeroOptions,
    surfaces: SurfaceFactory<S>,
    particles: ParticleField,
    store: PropertyStore,
    mounted: Option<Mounted<S>>,
}

impl<S: RenderSurface> HeroSection<S> {
    /// Unmounted hero creating its canvas through `surfaces`.
    #[must_use]
    pub fn new(options: HeroOptions, surfaces: SurfaceFactory<S>) -> Self {
        let particles = ParticleField::new(options.particle_count, options.particle_seed);
        Self {
            options,
            surfaces,
            particles,
            store: PropertyStore::new(),
            mounted: None,
        }
    }

    /// Section options.
    #[must_use]
    pub fn options(&self) -> &HeroOptions {
        &self.options
    }

    /// Animated page values (copy, backdrop, particles).
    #[must_use]
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Decorative particles.
    #[must_use]
    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Rotation state while mounted.
    #[must_use]
    pub fn rotation(&self) -> Option<&RotationScheduler> {
        self.mounted.as_ref().map(|m| &m.rotation)
    }

    /// Index of the model shown by the selector, 0 when unmounted.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.rotation().map_or(0, RotationScheduler::index)
    }

    /// Canvas renderer while mounted.
    #[must_use]
    pub fn renderer(&self) -> Option<&SceneRenderer<S>> {
        self.mounted.as_ref().map(|m| &m.renderer)
    }

    /// Mutable canvas renderer while mounted.
    pub fn renderer_mut(&mut self) -> Option<&mut SceneRenderer<S>> {
        self.mounted.as_mut().map(|m| &mut m.renderer)
    }

    /// Container state composited around the canvas.
    #[must_use]
    pub fn stage_state(&self) -> StageState {
        let s = &self.store;
        StageState {
            opacity: s.scalar(HERO, Property::Opacity)
                * s.scalar(CONTAINER, Property::Opacity)
                * s.scalar(STAGE, Property::Opacity),
            scale: s.scalar(CONTAINER, Property::Scale),
            offset: Vec2::new(
                0.0,
                s.scalar(CONTAINER, Property::Y) + s.scalar(PARALLAX, Property::Y),
            ),
            rotate_y_deg: s.scalar(CONTAINER, Property::RotateY),
        }
    }

    /// Idle drift of particle `index` in px at `now`.
    #[must_use]
    pub fn particle_offset(&self, index: usize, now: Instant) -> Option<f32> {
        let mounted = self.mounted.as_ref()?;
        let t = now.saturating_duration_since(mounted.mounted_at).as_secs_f32();
        self.particles.particles().get(index).map(|p| p.offset_at(t))
    }

    fn model_targets(&self) -> Vec<TargetId> {
        (0..self.options.variant_count())
            .map(|i| TargetId::indexed(MODEL, i as u32))
            .collect()
    }

    fn build_renderer(&mut self, input: &FrameInput<'_>) -> Result<SceneRenderer<S>, VitrineError> {
        let opts = &self.options;
        let size = input.canvas_size(&opts.surface);
        let surface = (self.surfaces)(size, &opts.surface)?;
        let models: Vec<(&str, f32)> = opts
            .models
            .iter()
            .zip(&opts.scales)
            .map(|(path, scale)| (path.as_str(), *scale))
            .collect();
        let mut composition = SceneComposition::new(&models);
        if opts.show_intro {
            composition.apply_intro_layout(&opts.intro_positions, &opts.intro_rotations_deg);
        } else {
            composition.show_only(0);
        }
        Ok(SceneRenderer::new(
            surface,
            size,
            Camera::from_options(&opts.camera, input.viewport.aspect()),
            LightRig::from_options(&opts.lighting, opts.surface.shadows),
            composition,
        )
        .with_surface_options(&opts.surface)
        .with_presentation(&opts.presentation)
        .with_float(FloatEffect::new(&opts.float, 0.0))
        .with_placeholder(PLACEHOLDER))
    }

    // =========================================================================
    // Timelines
    // =========================================================================

    fn entrance_timeline(&self) -> Result<Timeline<HeroCue>, VitrineError> {
        let mut tl = Timeline::new()
            .with_delay(self.options.entrance_delay_s)
            .with_on_complete(HeroCue::EntranceDone);
        let reveal = |target, duration, ease| {
            Tween::to([target])
                .prop(Property::Y, 0.0)
                .prop(Property::Opacity, 1.0)
                .duration(duration)
                .ease(ease)
        };
        tl.add(reveal(TITLE, 1.0, Ease::PowerOut(3)), Position::End)?
            .add(reveal(SUBTITLE, 1.0, Ease::PowerOut(3)), Position::Offset(-0.7))?
            .add(
                reveal(CONTAINER, 1.2, Ease::PowerOut(4)).prop(Property::Scale, 1.0),
                Position::Offset(-0.8),
            )?
            .add(reveal(CTA, 0.8, Ease::PowerOut(3)), Position::Offset(-0.6))?;

        if !self.options.show_intro {
            return Ok(tl);
        }
        let intro = |offset| Position::label("intro", offset);
        tl.add_label("intro", Position::End)?
            .add(
                Tween::to([BACKDROP])
                    .prop(Property::Opacity, 0.8)
                    .prop(Property::Tint, BACKDROP_PULSE)
                    .duration(2.0)
                    .ease(Ease::PowerInOut(2)),
                intro(0.0),
            )?
            .add(
                Tween::to([CONTAINER])
                    .prop(Property::RotateY, 360.0)
                    .prop(Property::Scale, 1.2)
                    .duration(6.0)
                    .ease(Ease::PowerInOut(1)),
                intro(0.0),
            )?
            .add(
                Tween::to(self.particles.targets().collect::<Vec<_>>())
                    .prop(Property::Opacity, 0.9)
                    .prop(Property::Scale, 4.0)
                    .duration(0.7)
                    .stagger(0.05)
                    .repeat(5)
                    .yoyo(true)
                    .ease(Ease::PowerInOut(2)),
                intro(0.5),
            )?
            .add(
                Tween::to([TITLE])
                    .prop(Property::Glow, 1.0)
                    .duration(1.0)
                    .repeat(3)
                    .yoyo(true)
                    .ease(Ease::PowerInOut(2)),
                intro(1.0),
            )?
            .add(
                Tween::to(self.model_targets())
                    .prop(Property::Y, TweenValue::Relative(-0.5))
                    .duration(2.0)
                    .stagger(0.3)
                    .repeat(2)
                    .yoyo(true)
                    .ease(Ease::PowerInOut(1)),
                intro(1.5),
            )?
            .add(
                Tween::to([BACKDROP])
                    .prop(Property::Opacity, 1.0)
                    .prop(Property::Tint, BACKDROP_FLASH)
                    .duration(0.2)
                    .ease(Ease::PowerIn(4)),
                intro(5.5),
            )?
            .add(
                Tween::to([BACKDROP])
                    .prop(Property::Opacity, 0.7)
                    .prop(Property::Tint, BACKDROP_NIGHT)
                    .duration(0.5)
                    .ease(Ease::PowerOut(2)),
                intro(5.7),
            )?
            .add(
                Tween::to([CONTAINER])
                    .prop(Property::Opacity, 0.0)
                    .prop(Property::Scale, 0.7)
                    .duration(0.8)
                    .ease(Ease::PowerIn(3))
                    .on_complete(HeroCue::IntroFinished),
                intro(6.0),
            )?
            .add(
                Tween::to([CONTAINER])
                    .prop(Property::Opacity, 1.0)
                    .prop(Property::Scale, 1.0)
                    .duration(1.0)
                    .ease(Ease::ElasticOut {
                        amplitude: 1.0,
                        period: 0.5,
                    }),
                intro(7.0),
            )?;
        Ok(tl)
    }

    fn overlay_timeline() -> Result<Timeline<HeroCue>, VitrineError> {
        let mut tl = Timeline::new();
        for (target, delay) in [(STAGE_TITLE, 0.0), (STAGE_COPY, 0.2), (STAGE_CTA, 0.4)] {
            let _ = tl.add(
                Tween::from_to([target])
                    .from(Property::Opacity, 0.0)
                    .from(Property::Y, 50.0)
                    .prop(Property::Opacity, 1.0)
                    .prop(Property::Y, 0.0)
                    .duration(1.0)
                    .delay(delay)
                    .ease(Ease::PowerOut(3)),
                Position::At(0.0),
            )?;
        }
        Ok(tl)
    }

    fn scrubbed(
        target: TargetId,
        property: Property,
        value: f32,
    ) -> Result<Timeline<HeroCue>, VitrineError> {
        let mut tl = Timeline::new();
        let _ = tl.add(Tween::to([target]).prop(property, value), Position::End)?;
        Ok(tl)
    }

    fn switch_timeline() -> Result<Timeline<HeroCue>, VitrineError> {
        let mut tl = Timeline::new();
        tl.add(
            Tween::to([CONTAINER])
                .prop(Property::Opacity, 0.0)
                .prop(Property::Scale, 0.8)
                .duration(0.5)
                .ease(Ease::PowerOut(2))
                .on_complete(HeroCue::FadedOut),
            Position::End,
        )?
        .add(
            Tween::to([CONTAINER])
                .prop(Property::Opacity, 1.0)
                .prop(Property::Scale, 1.0)
                .duration(0.7)
                .ease(Ease::PowerOut(3))
                .on_complete(HeroCue::FadedIn),
            Position::End,
        )?;
        Ok(tl)
    }

    fn register_bindings(
        scroll: &mut ScrollObserver,
        rect: Rect,
    ) -> Result<Bindings, VitrineError> {
        let smoothed = || ScrollTrigger::new(rect, "top top", "bottom top", Mode::Scrub(Some(1.0)));
        let fade = scroll.register(smoothed()?)?;
        let parallax = scroll.register(smoothed()?)?;
        let stage = scroll.register(ScrollTrigger::new(
            rect,
            "top center",
            "bottom center",
            Mode::Toggle("play none none reverse".parse()?),
        )?)?;
        Ok(Bindings {
            fade,
            parallax,
            stage,
        })
    }

    fn apply_initial_state(&mut self) {
        let s = &mut self.store;
        for target in [TITLE, SUBTITLE, CTA] {
            s.set(target, Property::Y, 100.0);
            s.set(target, Property::Opacity, 0.0);
        }
        s.set(CONTAINER, Property::Scale, 0.5);
        s.set(CONTAINER, Property::Opacity, 0.0);
        s.set(CONTAINER, Property::Y, 50.0);
        s.set(BACKDROP, Property::Tint, BACKDROP_NIGHT);
    }

    // =========================================================================
    // Switching
    // =========================================================================

    fn begin_switch(&mut self, request: SwitchRequest, now: Instant) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        match Self::switch_timeline() {
            Ok(mut tl) => {
                tl.play(now);
                mounted.switch = Some(tl);
                log::debug!("hero switch {} -> {} started", request.from, request.to);
            }
            Err(e) => log::error!("hero switch timeline: {e}"),
        }
    }

    fn handle_cues(&mut self, cues: &[HeroCue], now: Instant) {
        let period = Duration::from_millis(self.options.switch_interval_ms);
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        for cue in cues {
            match cue {
                HeroCue::EntranceDone => log::debug!("hero entrance finished"),
                HeroCue::IntroFinished => {
                    if mounted.rotation.finish_intro() {
                        let composition = mounted.renderer.composition_mut();
                        composition.reset_layout();
                        composition.show_only(0);
                        mounted.start_interval(period, now);
                    }
                }
                HeroCue::FadedOut => {
                    if let Some(index) = mounted.rotation.faded_out() {
                        mounted.renderer.composition_mut().show_only(index);
                    }
                }
                HeroCue::FadedIn => {
                    if mounted.rotation.faded_in() {
                        mounted.switch = None;
                        // the next automatic switch waits a full period
                        if let Some(id) = mounted.interval {
                            let _ = mounted.timers.reset(id, now);
                        }
                    }
                }
            }
        }
    }

    fn sync_model_offsets(&mut self) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        if !mounted.rotation.is_introducing() {
            return;
        }
        let composition = mounted.renderer.composition_mut();
        for i in 0..composition.len() {
            let bob = self.store.scalar(TargetId::indexed(MODEL, i as u32), Property::Y);
            if let Some(placement) = composition.placement_mut(i) {
                placement.offset.y = bob;
            }
        }
    }
}

impl<S: RenderSurface> Section for HeroSection<S> {
    fn name(&self) -> &'static str {
        "hero"
    }

    fn extent(&self, viewport: Viewport) -> Extent {
        Extent::fixed(viewport.height)
    }

    fn mount(&mut self, input: &FrameInput<'_>) -> Result<(), VitrineError> {
        if self.mounted.is_some() {
            return Ok(());
        }
        self.options.validate()?;
        input.assets.preload(&self.options.models);

        let mut renderer = self.build_renderer(input)?;
        let mut scroll = ScrollObserver::new(input.viewport);
        let bindings = Self::register_bindings(&mut scroll, input.rect)?;
        let mut entrance = self.entrance_timeline()?;
        let mut overlay = Self::overlay_timeline()?;
        let mut stage_fade: Timeline<HeroCue> = Timeline::new();
        let _ = stage_fade.add(
            Tween::from_to([STAGE]).from(Property::Opacity, 0.0).prop(Property::Opacity, 1.0),
            Position::End,
        )?;
        let fade = Self::scrubbed(HERO, Property::Opacity, 0.3)?;
        let parallax = Self::scrubbed(PARALLAX, Property::Y, 100.0)?;

        self.store = PropertyStore::new();
        self.apply_initial_state();
        let _ = stage_fade.prime(&mut self.store);
        let _ = overlay.prime(&mut self.store);
        entrance.play(input.now);
        overlay.play(input.now);
        let _ = renderer.sync_assets(input.assets);

        let mut mounted = Mounted {
            renderer,
            scroll,
            timers: TimerRegistry::new(),
            rotation: RotationScheduler::new(self.options.variant_count(), self.options.show_intro),
            interval: None,
            bindings,
            entrance,
            overlay,
            stage_fade,
            fade,
            parallax,
            switch: None,
            rect: input.rect,
            canvas: input.canvas_size(&self.options.surface),
            mounted_at: input.now,
        };
        if !self.options.show_intro {
            let interval = Duration::from_millis(self.options.switch_interval_ms);
            mounted.start_interval(interval, input.now);
        }
        self.mounted = Some(mounted);
        log::info!(
            "hero mounted with {} models (intro: {})",
            self.options.variant_count(),
            self.options.show_intro
        );
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    fn update(&mut self, input: &FrameInput<'_>) -> Vec<PageRequest> {
        let now = input.now;
        let canvas = input.canvas_size(&self.options.surface);
        let Some(mounted) = self.mounted.as_mut() else {
            return Vec::new();
        };

        if mounted.rect != input.rect {
            mounted.rect = input.rect;
            let b = mounted.bindings;
            for id in [b.fade, b.parallax, b.stage] {
                mounted.scroll.set_element(id, input.rect);
            }
        }
        if mounted.canvas != canvas {
            mounted.canvas = canvas;
            mounted.renderer.resize(canvas.0, canvas.1);
        }
        let _ = mounted.renderer.sync_assets(input.assets);

        let store = &mut self.store;
        let mut cues = Vec::new();
        let b = mounted.bindings;
        for event in mounted.scroll.update(input.scroll, input.viewport, now) {
            match event {
                ScrollEvent::Progress { binding, progress } if binding == b.fade => {
                    cues.extend(mounted.fade.seek_progress(progress, store));
                }
                ScrollEvent::Progress { binding, progress } if binding == b.parallax => {
                    cues.extend(mounted.parallax.seek_progress(progress, store));
                }
                ScrollEvent::Toggle { binding, action, .. } if binding == b.stage => {
                    cues.extend(mounted.stage_fade.toggle(action, now, store));
                }
                _ => {}
            }
        }

        let mut requests = Vec::new();
        for id in mounted.timers.poll(now) {
            if Some(id) == mounted.interval {
                if let Some(request) = mounted.rotation.tick() {
                    requests.push(request);
                }
            }
        }

        for tl in mounted.timelines_mut() {
            cues.extend(tl.advance(now, store));
        }

        for request in requests {
            self.begin_switch(request, now);
        }
        self.handle_cues(&cues, now);
        self.sync_model_offsets();

        let stage = self.stage_state();
        if let Some(mounted) = self.mounted.as_mut() {
            let _ = mounted.renderer.frame(now, stage);
        }
        Vec::new()
    }

    fn pointer(&mut self, event: PointerEvent) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        let renderer = &mut mounted.renderer;
        match event {
            PointerEvent::Down(p) => renderer.pointer_down(p),
            PointerEvent::Move(p) => renderer.pointer_move(p),
            PointerEvent::Up => renderer.pointer_up(),
            PointerEvent::Wheel(steps) => renderer.wheel(steps),
        }
    }

    fn select(&mut self, control: usize, variant: usize, now: Instant) -> bool {
        if control != 0 {
            return false;
        }
        let request = self.mounted.as_mut().and_then(|m| m.rotation.select(variant));
        match request {
            Some(request) => {
                self.begin_switch(request, now);
                true
            }
            None => false,
        }
    }

    fn unmount(&mut self) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        mounted.timers.clear_all();
        mounted.scroll.clear();
        for tl in mounted.timelines_mut() {
            tl.revert(&mut self.store);
        }
        self.store = PropertyStore::new();
        log::info!("hero unmounted after {} frames", mounted.renderer.frames_submitted());
    }

    fn diagnostics(&self) -> SectionDiagnostics {
        let Some(mounted) = self.mounted.as_ref() else {
            return SectionDiagnostics::default();
        };
        let timelines = [
            &mounted.entrance,
            &mounted.overlay,
            &mounted.stage_fade,
            &mounted.fade,
            &mounted.parallax,
        ]
        .into_iter()
        .chain(mounted.switch.as_ref())
        .filter(|tl| tl.is_active())
        .count();
        SectionDiagnostics {
            timers: mounted.timers.active_count(),
            bindings: mounted.scroll.active_count(),
            timelines,
        }
    }
}
