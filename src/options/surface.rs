use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GPU adapter preference.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    /// Prefer the discrete GPU.
    #[default]
    HighPerformance,
    /// Prefer the integrated GPU.
    LowPower,
}

/// When the renderer submits frames.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FrameLoop {
    /// Submit every frame.
    #[default]
    Always,
    /// Submit only when something visible changed.
    Demand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Surface", inline)]
#[serde(default)]
/// Rendering surface creation parameters.
pub struct SurfaceOptions {
    /// Multisample the color target.
    pub antialias: bool,
    /// Transparent clear color so the page shows through.
    pub alpha: bool,
    /// Adapter preference.
    pub power_preference: PowerPreference,
    /// Allowed device-pixel-ratio range.
    pub dpr_range: [f32; 2],
    /// Submission policy.
    pub frame_loop: FrameLoop,
    /// Render shadow maps.
    pub shadows: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: true,
            power_preference: PowerPreference::HighPerformance,
            dpr_range: [1.0, 2.0],
            frame_loop: FrameLoop::Always,
            shadows: true,
        }
    }
}

impl SurfaceOptions {
    /// The lean surface used by showcase panels.
    #[must_use]
    pub fn lean() -> Self {
        Self {
            antialias: false,
            alpha: true,
            power_preference: PowerPreference::HighPerformance,
            dpr_range: [0.5, 1.0],
            frame_loop: FrameLoop::Demand,
            shadows: false,
        }
    }

    /// Clamp a device pixel ratio into the allowed range.
    #[must_use]
    pub fn clamp_dpr(&self, dpr: f32) -> f32 {
        dpr.clamp(self.dpr_range[0], self.dpr_range[1])
    }
}
