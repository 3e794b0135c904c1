use std::fmt;

use crate::options::PowerPreference;

/// Errors raised while setting up or using the GPU surface.
#[derive(Debug)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    AdapterRequest(wgpu::RequestAdapterError),
    /// GPU device request failed (limits or features not met).
    DeviceRequest(wgpu::RequestDeviceError),
    /// The device was lost after creation.
    DeviceLost,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdapterRequest(e) => {
                write!(f, "no compatible GPU adapter found: {e}")
            }
            Self::DeviceRequest(e) => write!(f, "device request failed: {e}"),
            Self::DeviceLost => write!(f, "GPU device lost"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AdapterRequest(e) => Some(e),
            Self::DeviceRequest(e) => Some(e),
            Self::DeviceLost => None,
        }
    }
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(preference: PowerPreference) -> Self {
        match preference {
            PowerPreference::HighPerformance => Self::HighPerformance,
            PowerPreference::LowPower => Self::LowPower,
        }
    }
}

/// Owns the wgpu device and queue of one offscreen canvas.
pub struct GpuContext {
    /// The wgpu logical device.
    pub device: wgpu::Device,
    /// The wgpu command queue.
    pub queue: wgpu::Queue,
    /// Required alignment of dynamic uniform offsets.
    pub uniform_alignment: u64,
}

impl GpuContext {
    /// Request an adapter and device without a presentation surface.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError`] if the adapter or device request fails.
    pub async fn new(power: PowerPreference) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: None,
                power_preference: power.into(),
                ..Default::default()
            })
            .await
            .map_err(GpuError::AdapterRequest)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Canvas Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                ..Default::default()
            })
            .await
            .map_err(GpuError::DeviceRequest)?;

        let uniform_alignment =
            u64::from(device.limits().min_uniform_buffer_offset_alignment);
        log::info!("GPU canvas on {}", adapter.get_info().name);

        Ok(Self {
            device,
            queue,
            uniform_alignment,
        })
    }

    /// Create a new command encoder for recording GPU commands.
    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Canvas Encoder"),
            })
    }

    /// Finish the encoder and submit its command buffer to the GPU queue.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
    }
}
