//! Rendering surface abstraction and the per-frame draw description.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::lighting::LightRig;
use crate::error::VitrineError;
use crate::scene::Geometry;

/// Notifications a surface raises outside of `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The underlying graphics context went away; submits are pointless
    /// until it is restored.
    ContextLost,
    /// The context is usable again and every resource must be resent.
    ContextRestored,
}

/// Animated container state the host applies when compositing a
/// section's canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageState {
    /// Container opacity.
    pub opacity: f32,
    /// Uniform container scale.
    pub scale: f32,
    /// Container translation in CSS pixels.
    pub offset: Vec2,
    /// Container rotation about the vertical axis, degrees.
    pub rotate_y_deg: f32,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            offset: Vec2::ZERO,
            rotate_y_deg: 0.0,
        }
    }
}

/// One primitive to draw.
#[derive(Debug, Clone)]
pub struct DrawItem {
    /// Shared geometry; surfaces key uploads by its id.
    pub geometry: Arc<Geometry>,
    /// Object-to-world matrix.
    pub world: Mat4,
    /// Linear RGBA base color.
    pub base_color: Vec4,
    /// Metalness factor.
    pub metallic: f32,
    /// Roughness factor.
    pub roughness: f32,
    /// Casts into the key light's shadow map.
    pub cast_shadow: bool,
    /// Receives shadows.
    pub receive_shadow: bool,
}

/// Everything a surface needs to produce one frame.
#[derive(Debug, Clone)]
pub struct FrameDescription<'a> {
    /// Sequential id of the submitted frame.
    pub index: u64,
    /// Camera view-projection matrix.
    pub view_proj: Mat4,
    /// Camera position.
    pub eye: Vec3,
    /// Clear alpha; 0 keeps the page visible behind the canvas.
    pub clear_alpha: f32,
    /// Section lighting.
    pub lights: &'a LightRig,
    /// Container state for the host.
    pub stage: StageState,
    /// Loading indicator text while models are unresolved.
    pub placeholder: Option<&'a str>,
    /// Primitives in draw order.
    pub draws: Vec<DrawItem>,
}

/// A canvas owned by exactly one scene renderer.
pub trait RenderSurface {
    /// Physical size changed.
    fn resize(&mut self, width: u32, height: u32);

    /// Present one frame.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] when the frame could not be produced.
    fn submit(&mut self, frame: &FrameDescription<'_>) -> Result<(), VitrineError>;

    /// Drain pending surface notifications.
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;
}

/// Summary of a submitted frame kept by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Frame id.
    pub index: u64,
    /// Placeholder text, if shown.
    pub placeholder: Option<String>,
    /// Number of draw items.
    pub draw_count: usize,
    /// Distinct geometries referenced.
    pub geometry_count: usize,
    /// Container state.
    pub stage: StageState,
}

/// Surface that records frames instead of drawing them.
///
/// Context loss can be simulated with [`HeadlessSurface::lose_context`] and
/// [`HeadlessSurface::restore_context`].
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    size: (u32, u32),
    frames: Vec<FrameRecord>,
    pending: Vec<SurfaceEvent>,
    keep: usize,
}

impl HeadlessSurface {
    /// Surface of the given size keeping every frame.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            frames: Vec::new(),
            pending: Vec::new(),
            keep: usize::MAX,
        }
    }

    /// Only keep the most recent `keep` frames.
    #[must_use]
    pub fn with_history(mut self, keep: usize) -> Self {
        self.keep = keep.max(1);
        self
    }

    /// Current size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Recorded frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Most recent frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }

    /// Queue a context loss.
    pub fn lose_context(&mut self) {
        self.pending.push(SurfaceEvent::ContextLost);
    }

    /// Queue a context restore.
    pub fn restore_context(&mut self) {
        self.pending.push(SurfaceEvent::ContextRestored);
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn submit(&mut self, frame: &FrameDescription<'_>) -> Result<(), VitrineError> {
        let mut ids: Vec<_> = frame.draws.iter().map(|d| d.geometry.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        if self.frames.len() >= self.keep {
            self.frames.remove(0);
        }
        self.frames.push(FrameRecord {
            index: frame.index,
            placeholder: frame.placeholder.map(str::to_owned),
            draw_count: frame.draws.len(),
            geometry_count: ids.len(),
            stage: frame.stage,
        });
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.pending)
    }
}
