use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    CameraOptions, FloatOptions, LightingOptions, PresentationOptions,
    SurfaceOptions,
};
use crate::error::VitrineError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Hero", inline)]
#[serde(default)]
/// Hero section: intro of every model, then timed cycling.
pub struct HeroOptions {
    /// Model paths, one per variant.
    pub models: Vec<String>,
    /// Selector button captions, one per variant.
    pub labels: Vec<String>,
    /// Uniform scale per variant.
    pub scales: Vec<f32>,
    /// Per-variant position while the intro shows every model.
    pub intro_positions: Vec<[f32; 3]>,
    /// Per-variant rotation (degrees) while the intro shows every model.
    pub intro_rotations_deg: Vec<[f32; 3]>,
    /// Milliseconds between automatic model switches.
    #[schemars(title = "Switch Interval", range(min = 1000, max = 60000))]
    pub switch_interval_ms: u64,
    /// Run the all-models introduction before cycling.
    pub show_intro: bool,
    /// Seconds before the entrance timeline starts.
    pub entrance_delay_s: f32,
    /// Decorative particle count.
    pub particle_count: usize,
    /// Seed for particle placement.
    #[schemars(skip)]
    pub particle_seed: u64,
    /// Canvas camera.
    pub camera: CameraOptions,
    /// Canvas lighting.
    pub lighting: LightingOptions,
    /// Canvas surface.
    pub surface: SurfaceOptions,
    /// Drag-to-tilt controls.
    pub presentation: PresentationOptions,
    /// Idle bobbing.
    pub float: FloatOptions,
}

impl Default for HeroOptions {
    fn default() -> Self {
        Self {
            models: vec![
                "/glb/navocular.glb".to_owned(),
                "/glb/navocular1.glb".to_owned(),
                "/glb/opticspectra.glb".to_owned(),
            ],
            labels: vec![
                "NavOcular Light".to_owned(),
                "NavOcular Dongle".to_owned(),
                "OpticSpectra".to_owned(),
            ],
            scales: vec![0.7, 0.65, 0.75],
            intro_positions: vec![
                [-2.5, 0.5, 0.5],
                [0.0, -0.3, -0.5],
                [2.5, 0.2, 0.2],
            ],
            intro_rotations_deg: vec![
                [0.0, -30.0, 0.0],
                [0.0, 0.0, 0.0],
                [0.0, 30.0, 0.0],
            ],
            switch_interval_ms: 8000,
            show_intro: true,
            entrance_delay_s: 0.5,
            particle_count: 30,
            particle_seed: 0x5eed,
            camera: CameraOptions::default(),
            lighting: LightingOptions::default(),
            surface: SurfaceOptions::default(),
            presentation: PresentationOptions::default(),
            float: FloatOptions::default(),
        }
    }
}

impl HeroOptions {
    /// Number of model variants.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.models.len()
    }

    /// Check that every per-variant list has one entry per model.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::OptionsParse`] when there are no models or a
    /// per-variant list has the wrong length.
    pub fn validate(&self) -> Result<(), VitrineError> {
        let n = self.models.len();
        if n == 0 {
            return Err(VitrineError::OptionsParse(
                "hero needs at least one model".to_owned(),
            ));
        }
        let lists = [
            ("labels", self.labels.len()),
            ("scales", self.scales.len()),
            ("intro_positions", self.intro_positions.len()),
            ("intro_rotations_deg", self.intro_rotations_deg.len()),
        ];
        for (name, len) in lists {
            if len != n {
                return Err(VitrineError::OptionsParse(format!(
                    "hero.{name} has {len} entries, expected {n}"
                )));
            }
        }
        Ok(())
    }
}
