//! Per-section scene rendering.
//!
//! A [`SceneRenderer`] owns one [`RenderSurface`], the section camera and
//! its controls, the light rig and the section's [`SceneComposition`]. Each
//! frame it turns the composition into a [`FrameDescription`] and hands it
//! to the surface. With [`FrameLoop::Demand`] it only submits when
//! something visible changed.
//!
//! Surface context loss is logged and frames are skipped until the surface
//! reports a restore; nothing is retried.

mod float;
mod lighting;
mod surface;

#[cfg(feature = "gpu")]
pub mod gpu;

use glam::{Mat4, Vec2};
use rustc_hash::FxHashSet;
use web_time::Instant;

pub use float::FloatEffect;
pub use lighting::{LightRig, PointLight};
pub use surface::{
    DrawItem, FrameDescription, FrameRecord, HeadlessSurface, RenderSurface,
    StageState, SurfaceEvent,
};

use crate::assets::{AssetCache, AssetStatus};
use crate::camera::{Camera, OrbitControls, PresentationControls};
use crate::options::{FrameLoop, OrbitOptions, PresentationOptions, SurfaceOptions};
use crate::scene::{display_copy, SceneComposition};

/// Longest frame step fed to controls; longer gaps (tab switches) are
/// clamped so springs and damping do not jump.
const MAX_FRAME_DT: f32 = 0.1;

/// Pointer-driven camera or model-group controls.
#[derive(Debug, Clone)]
pub enum Controls {
    /// Static view.
    None,
    /// Camera orbits the target.
    Orbit(OrbitControls),
    /// Model group tilts under drags.
    Presentation(PresentationControls),
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    origin: Vec2,
    last: Vec2,
}

/// Renderer for one section's canvas.
pub struct SceneRenderer<S: RenderSurface> {
    surface: S,
    camera: Camera,
    controls: Controls,
    float: Option<FloatEffect>,
    lights: LightRig,
    composition: SceneComposition,
    frame_loop: FrameLoop,
    clear_alpha: f32,
    placeholder: String,
    fit_margin: Option<f32>,
    size: (u32, u32),
    drag: Option<Drag>,
    dirty: bool,
    context_lost: bool,
    mounted_at: Option<Instant>,
    last_frame: Option<Instant>,
    last_stage: Option<StageState>,
    frame_index: u64,
    reported_failures: FxHashSet<String>,
}

impl<S: RenderSurface> SceneRenderer<S> {
    /// Renderer drawing `composition` on `surface` of `size` physical
    /// pixels.
    pub fn new(
        surface: S,
        size: (u32, u32),
        camera: Camera,
        lights: LightRig,
        composition: SceneComposition,
    ) -> Self {
        let mut renderer = Self {
            surface,
            camera,
            controls: Controls::None,
            float: None,
            lights,
            composition,
            frame_loop: FrameLoop::Always,
            clear_alpha: 0.0,
            placeholder: "Loading...".to_owned(),
            fit_margin: None,
            size,
            drag: None,
            dirty: true,
            context_lost: false,
            mounted_at: None,
            last_frame: None,
            last_stage: None,
            frame_index: 0,
            reported_failures: FxHashSet::default(),
        };
        renderer.resize(size.0, size.1);
        renderer
    }

    /// Apply frame loop and transparency settings.
    #[must_use]
    pub fn with_surface_options(mut self, options: &SurfaceOptions) -> Self {
        self.frame_loop = options.frame_loop;
        self.clear_alpha = if options.alpha { 0.0 } else { 1.0 };
        self
    }

    /// Orbit the camera under pointer drags.
    #[must_use]
    pub fn with_orbit(mut self, options: &OrbitOptions) -> Self {
        self.controls = Controls::Orbit(OrbitControls::new(options, &self.camera));
        self
    }

    /// Tilt the model group under pointer drags.
    #[must_use]
    pub fn with_presentation(mut self, options: &PresentationOptions) -> Self {
        self.controls = Controls::Presentation(PresentationControls::new(options));
        self
    }

    /// Bob the model group.
    #[must_use]
    pub fn with_float(mut self, effect: FloatEffect) -> Self {
        self.float = Some(effect);
        self
    }

    /// Fit the camera to the visible models with `margin` once they load.
    #[must_use]
    pub fn with_fit(mut self, margin: f32) -> Self {
        self.fit_margin = Some(margin);
        self
    }

    /// Text shown while models load.
    #[must_use]
    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    /// Current camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Active controls.
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Section lights.
    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Displayed composition.
    pub fn composition(&self) -> &SceneComposition {
        &self.composition
    }

    /// Mutable composition; the next frame is submitted.
    pub fn composition_mut(&mut self) -> &mut SceneComposition {
        self.dirty = true;
        &mut self.composition
    }

    /// Owned surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable owned surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Whether frames are being skipped after a context loss.
    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    /// Number of frames submitted so far.
    pub fn frames_submitted(&self) -> u64 {
        self.frame_index
    }

    /// Whether every model is displayed.
    pub fn is_ready(&self) -> bool {
        self.composition.is_ready()
    }

    /// Force a submit on the next frame.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Canvas resized to `width`×`height` physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.camera.aspect = width as f32 / height as f32;
        self.surface.resize(width, height);
        self.dirty = true;
    }

    /// Swap placeholders for display copies of every model the cache has
    /// resolved, requesting the ones it has not seen yet. Returns the
    /// number of placements filled.
    pub fn sync_assets(&mut self, cache: &AssetCache) -> usize {
        let pending: Vec<String> = self
            .composition
            .pending_paths()
            .into_iter()
            .map(str::to_owned)
            .collect();
        let mut attached = 0;
        for path in pending {
            match cache.request(&path) {
                AssetStatus::Ready(scene) => {
                    let copy = display_copy(&scene);
                    attached += self.composition.attach(&path, &copy);
                    log::debug!("Attached display copy of {path}");
                }
                AssetStatus::Failed(e) => {
                    if self.reported_failures.insert(path.clone()) {
                        log::warn!("Keeping placeholder for {path}: {e}");
                    }
                }
                AssetStatus::Missing | AssetStatus::Pending => {}
            }
        }
        if attached > 0 {
            self.dirty = true;
            if self.composition.is_ready() {
                self.fit_camera();
            }
        }
        attached
    }

    /// Re-fit the camera to the visible models, if fitting is enabled.
    pub fn fit_camera(&mut self) {
        let (Some(margin), Some(bounds)) =
            (self.fit_margin, self.composition.visible_bounds())
        else {
            return;
        };
        self.camera.fit(&bounds, margin);
        if let Controls::Orbit(orbit) = &mut self.controls {
            orbit.reset_to(&self.camera);
            orbit.apply(&mut self.camera);
        }
        self.dirty = true;
    }

    /// Pointer pressed at `position` (canvas pixels).
    pub fn pointer_down(&mut self, position: Vec2) {
        self.drag = Some(Drag {
            origin: position,
            last: position,
        });
        match &mut self.controls {
            Controls::Orbit(orbit) => orbit.begin_drag(),
            Controls::Presentation(p) => p.begin_drag(),
            Controls::None => {}
        }
    }

    /// Pointer moved to `position`.
    pub fn pointer_move(&mut self, position: Vec2) {
        let Some(drag) = &mut self.drag else { return };
        let delta = position - drag.last;
        let offset = position - drag.origin;
        drag.last = position;
        let size = Vec2::new(self.size.0 as f32, self.size.1 as f32);
        match &mut self.controls {
            Controls::Orbit(orbit) => orbit.drag(delta, size.y),
            Controls::Presentation(p) => p.drag(offset, size),
            Controls::None => {}
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.drag = None;
        match &mut self.controls {
            Controls::Orbit(orbit) => orbit.end_drag(),
            Controls::Presentation(p) => p.end_drag(),
            Controls::None => {}
        }
    }

    /// Wheel scrolled over the canvas.
    pub fn wheel(&mut self, steps: f32) {
        if let Controls::Orbit(orbit) = &mut self.controls {
            orbit.zoom(steps);
            self.dirty = true;
        }
    }

    /// Advance controls to `now` and submit a frame if one is due.
    /// Returns whether a frame was submitted.
    pub fn frame(&mut self, now: Instant, stage: StageState) -> bool {
        for event in self.surface.poll_events() {
            match event {
                SurfaceEvent::ContextLost => {
                    if !self.context_lost {
                        log::warn!("Rendering context lost, skipping frames");
                    }
                    self.context_lost = true;
                }
                SurfaceEvent::ContextRestored => {
                    log::info!("Rendering context restored");
                    self.context_lost = false;
                    self.dirty = true;
                }
            }
        }

        let dt = self
            .last_frame
            .map_or(0.0, |t| now.saturating_duration_since(t).as_secs_f32())
            .min(MAX_FRAME_DT);
        self.last_frame = Some(now);
        let mounted = *self.mounted_at.get_or_insert(now);
        let t = now.saturating_duration_since(mounted).as_secs_f32();

        let moving = match &mut self.controls {
            Controls::Orbit(orbit) => {
                let moving = orbit.is_moving();
                orbit.update(dt, &mut self.camera);
                moving
            }
            Controls::Presentation(p) => {
                p.update(dt);
                !p.is_settled()
            }
            Controls::None => false,
        };

        if self.context_lost {
            return false;
        }
        let animating = moving || self.float.is_some();
        let stage_changed = self.last_stage != Some(stage);
        if self.frame_loop == FrameLoop::Demand
            && !self.dirty
            && !animating
            && !stage_changed
        {
            return false;
        }

        let ready = self.composition.is_ready();
        let draws = if ready {
            let mut group = Mat4::IDENTITY;
            if let Controls::Presentation(p) = &self.controls {
                group = Mat4::from_quat(p.rotation());
            }
            if let Some(effect) = &self.float {
                group *= effect.matrix(t);
            }
            collect_draws(&self.composition, group)
        } else {
            Vec::new()
        };
        let frame = FrameDescription {
            index: self.frame_index + 1,
            view_proj: self.camera.build_matrix(),
            eye: self.camera.eye,
            clear_alpha: self.clear_alpha,
            lights: &self.lights,
            stage,
            placeholder: (!ready).then_some(self.placeholder.as_str()),
            draws,
        };
        match self.surface.submit(&frame) {
            Ok(()) => {
                self.frame_index += 1;
                self.dirty = false;
                self.last_stage = Some(stage);
                true
            }
            Err(e) => {
                log::warn!("Frame submit failed: {e}");
                false
            }
        }
    }
}

fn collect_draws(composition: &SceneComposition, group: Mat4) -> Vec<DrawItem> {
    let mut draws = Vec::new();
    for placement in composition.placements().iter().filter(|p| p.visible) {
        let Some(scene) = &placement.scene else {
            continue;
        };
        scene.traverse(group * placement.matrix(), |node, world| {
            let Some(mesh) = &node.mesh else { return };
            draws.extend(mesh.primitives.iter().map(|primitive| DrawItem {
                geometry: primitive.geometry.clone(),
                world,
                base_color: primitive.material.base_color,
                metallic: primitive.material.metallic,
                roughness: primitive.material.roughness,
                cast_shadow: node.cast_shadow,
                receive_shadow: node.receive_shadow,
            }));
        });
    }
    draws
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::assets::{triangle_glb, LoadMode, MemorySource};
    use crate::options::{CameraOptions, LightingOptions};

    fn cache() -> AssetCache {
        let source = MemorySource::new()
            .with("/glb/a.glb", triangle_glb("Lens"))
            .with("/glb/b.glb", triangle_glb("Body"));
        AssetCache::new(source, LoadMode::Inline)
    }

    fn renderer(models: &[(&str, f32)]) -> SceneRenderer<HeadlessSurface> {
        SceneRenderer::new(
            HeadlessSurface::new(800, 600),
            (800, 600),
            Camera::from_options(&CameraOptions::default(), 1.0),
            LightRig::from_options(&LightingOptions::default(), true),
            SceneComposition::new(models),
        )
    }

    #[test]
    fn placeholder_until_assets_attach() {
        let cache = cache();
        let mut r = renderer(&[("/glb/a.glb", 1.0), ("/glb/missing.glb", 1.0)]);
        let now = Instant::now();
        assert_eq!(r.sync_assets(&cache), 1);
        assert!(r.frame(now, StageState::default()));
        let frame = r.surface().last_frame().unwrap();
        assert_eq!(frame.placeholder.as_deref(), Some("Loading..."));
        assert_eq!(frame.draw_count, 0);
        // the failed asset keeps the placeholder; nothing is retried
        assert_eq!(r.sync_assets(&cache), 0);
        assert_eq!(cache.fetch_count(), 2);
    }

    #[test]
    fn attached_copies_never_touch_the_cache() {
        let cache = cache();
        let mut r = renderer(&[("/glb/a.glb", 1.0), ("/glb/a.glb", 0.5)]);
        assert_eq!(r.sync_assets(&cache), 2);
        assert!(r.is_ready());
        let cached = cache.get("/glb/a.glb").unwrap();
        assert!(cached.nodes().iter().all(|n| !n.cast_shadow));
        let shown = r.composition().placements()[0].scene.as_ref().unwrap();
        assert!(shown.nodes().iter().any(|n| n.cast_shadow));
        assert!(r.frame(Instant::now(), StageState::default()));
        let frame = r.surface().last_frame().unwrap();
        assert!(frame.placeholder.is_none());
        assert_eq!(frame.draw_count, 2);
        assert_eq!(frame.geometry_count, 1);
    }

    #[test]
    fn demand_loop_skips_idle_frames() {
        let cache = cache();
        let mut r = renderer(&[("/glb/a.glb", 1.0)])
            .with_surface_options(&SurfaceOptions::lean());
        r.sync_assets(&cache);
        let start = Instant::now();
        assert!(r.frame(start, StageState::default()));
        assert!(!r.frame(start + Duration::from_millis(16), StageState::default()));

        let faded = StageState {
            opacity: 0.5,
            ..StageState::default()
        };
        assert!(r.frame(start + Duration::from_millis(32), faded));
        assert!(!r.frame(start + Duration::from_millis(48), faded));

        r.invalidate();
        assert!(r.frame(start + Duration::from_millis(64), faded));
        assert_eq!(r.frames_submitted(), 3);
    }

    #[test]
    fn context_loss_skips_until_restored() {
        let cache = cache();
        let mut r = renderer(&[("/glb/a.glb", 1.0)]);
        r.sync_assets(&cache);
        let start = Instant::now();
        r.surface_mut().lose_context();
        assert!(!r.frame(start, StageState::default()));
        assert!(r.is_context_lost());
        assert!(!r.frame(start + Duration::from_millis(16), StageState::default()));
        r.surface_mut().restore_context();
        assert!(r.frame(start + Duration::from_millis(32), StageState::default()));
        assert_eq!(r.surface().frames().len(), 1);
    }

    #[test]
    fn fit_moves_camera_to_model() {
        let cache = cache();
        let mut r = renderer(&[("/glb/b.glb", 3.5)])
            .with_orbit(&OrbitOptions::default())
            .with_fit(1.5);
        r.sync_assets(&cache);
        let bounds = r.composition().visible_bounds().unwrap();
        assert!((r.camera().target - bounds.center()).length() < 1e-4);
    }

    #[test]
    fn presentation_drag_tilts_group() {
        let cache = cache();
        let mut r = renderer(&[("/glb/a.glb", 1.0)])
            .with_presentation(&PresentationOptions::default());
        r.sync_assets(&cache);
        let start = Instant::now();
        r.frame(start, StageState::default());
        r.pointer_down(Vec2::new(400.0, 300.0));
        r.pointer_move(Vec2::new(500.0, 300.0));
        r.frame(start + Duration::from_millis(50), StageState::default());
        assert!(matches!(
            r.controls(),
            Controls::Presentation(p) if p.tilt().y > 0.0
        ));
        r.pointer_up();
    }
}
