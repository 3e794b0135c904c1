use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{CameraOptions, LightingOptions, OrbitOptions, SurfaceOptions};
use crate::error::VitrineError;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[schemars(inline)]
#[serde(default)]
/// One full-width panel of the horizontal showcase.
pub struct PanelOptions {
    /// Panel heading.
    pub title: String,
    /// Panel sub-heading.
    pub subtitle: String,
    /// One model, or several cycled on a timer.
    pub models: Vec<String>,
}

impl PanelOptions {
    /// Whether this panel cycles between several models.
    #[must_use]
    pub fn is_dual(&self) -> bool {
        self.models.len() > 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Showcase", inline)]
#[serde(default)]
/// Pinned horizontal showcase section.
pub struct ShowcaseOptions {
    /// Panels in scroll order.
    pub panels: Vec<PanelOptions>,
    /// Milliseconds between model switches on multi-model panels.
    #[schemars(title = "Dual Switch Interval", range(min = 1000, max = 60000))]
    pub dual_switch_interval_ms: u64,
    /// Uniform model scale.
    pub model_scale: f32,
    /// Camera fit margin for single-model panels.
    pub fit_margin: f32,
    /// Camera fit margin for multi-model panels.
    pub dual_fit_margin: f32,
    /// Seconds the scrubbed progress takes to catch up with the scroll.
    #[schemars(title = "Scrub Lag", range(min = 0.0, max = 3.0), extend("step" = 0.1))]
    pub scrub_s: f32,
    /// Progress after which the fixed header fades out.
    pub header_fade_start: f32,
    /// Panel camera.
    pub camera: CameraOptions,
    /// Panel lighting.
    pub lighting: LightingOptions,
    /// Panel surface.
    pub surface: SurfaceOptions,
    /// Panel orbit controls.
    pub orbit: OrbitOptions,
}

impl Default for ShowcaseOptions {
    fn default() -> Self {
        Self {
            panels: vec![
                PanelOptions {
                    title: "OpticSpectra".to_owned(),
                    subtitle: "Adaptive FSO Connectivity for Unstoppable Networks"
                        .to_owned(),
                    models: vec!["/glb/opticspectra.glb".to_owned()],
                },
                PanelOptions {
                    title: "NavOcular".to_owned(),
                    subtitle:
                        "Infrared Intelligence for Interference-Free Connectivity"
                            .to_owned(),
                    models: vec![
                        "/glb/navocular.glb".to_owned(),
                        "/glb/navocular1.glb".to_owned(),
                    ],
                },
            ],
            dual_switch_interval_ms: 5000,
            model_scale: 3.5,
            fit_margin: 1.5,
            dual_fit_margin: 1.2,
            scrub_s: 0.6,
            header_fade_start: 0.8,
            camera: CameraOptions::default(),
            lighting: LightingOptions::showcase(),
            surface: SurfaceOptions::lean(),
            orbit: OrbitOptions::default(),
        }
    }
}

impl ShowcaseOptions {
    /// Check the panel list is usable.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::OptionsParse`] when there are fewer than two
    /// panels or a panel has no model.
    pub fn validate(&self) -> Result<(), VitrineError> {
        if self.panels.len() < 2 {
            return Err(VitrineError::OptionsParse(
                "showcase needs at least two panels".to_owned(),
            ));
        }
        if let Some(panel) = self.panels.iter().find(|p| p.models.is_empty()) {
            return Err(VitrineError::OptionsParse(format!(
                "showcase panel '{}' has no model",
                panel.title
            )));
        }
        if !(0.0..1.0).contains(&self.header_fade_start) {
            return Err(VitrineError::OptionsParse(
                "showcase.header_fade_start must be in [0, 1)".to_owned(),
            ));
        }
        Ok(())
    }
}
