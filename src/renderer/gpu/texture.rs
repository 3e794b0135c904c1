//! Offscreen canvas textures.

/// A render-target texture and its default view.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    /// Create a render-target texture with the given dimensions, format and
    /// sample count. Single-sampled targets can be read back.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if sample_count == 1 && !format.is_depth_stencil_format() {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Color, optional multisample and depth attachments of one canvas.
pub struct CanvasTargets {
    /// Resolved color output.
    pub color: RenderTarget,
    /// Multisampled color, when antialiasing.
    pub msaa: Option<RenderTarget>,
    /// Depth buffer matching the sample count.
    pub depth: RenderTarget,
}

impl CanvasTargets {
    /// Allocate attachments for a canvas of `size`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let msaa = (sample_count > 1).then(|| {
            RenderTarget::new(device, "Canvas MSAA", size, format, sample_count)
        });
        Self {
            color: RenderTarget::new(device, "Canvas Color", size, format, 1),
            msaa,
            depth: RenderTarget::new(
                device,
                "Canvas Depth",
                size,
                wgpu::TextureFormat::Depth32Float,
                sample_count,
            ),
        }
    }
}
