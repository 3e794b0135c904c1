//! wgpu implementation of [`crate::renderer::RenderSurface`].
//!
//! Renders offscreen; the host reads back or composites the color texture.

mod context;
mod pipeline_helpers;
mod surface;
mod texture;

pub use context::{GpuContext, GpuError};
pub use surface::GpuSurface;
pub use texture::{CanvasTargets, RenderTarget};
