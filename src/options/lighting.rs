use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Named image-based lighting environment.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentPreset {
    /// Warm low sun.
    #[default]
    Sunset,
    /// Cool early light.
    Dawn,
    /// Neutral studio.
    Studio,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Contact Shadows", inline)]
#[serde(default)]
/// Soft ground shadow under the model.
pub struct ContactShadowOptions {
    /// Draw the shadow plane.
    pub enabled: bool,
    /// Height of the shadow plane.
    pub y: f32,
    /// Shadow opacity.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub opacity: f32,
    /// Plane extent.
    pub scale: f32,
    /// Blur radius.
    pub blur: f32,
    /// Capture depth.
    pub far: f32,
    /// Shadow map resolution.
    pub resolution: u32,
}

impl Default for ContactShadowOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            y: -1.5,
            opacity: 0.4,
            scale: 10.0,
            blur: 2.0,
            far: 3.0,
            resolution: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Light rig for one section canvas.
pub struct LightingOptions {
    /// Ambient light intensity.
    #[schemars(title = "Ambient", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub ambient: f32,
    /// Key light position.
    pub key_position: [f32; 3],
    /// Key light intensity.
    #[schemars(title = "Key Light", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub key_intensity: f32,
    /// Whether the key light casts shadows.
    pub key_casts_shadow: bool,
    /// Position of the extra light inside the model group.
    pub group_light_position: [f32; 3],
    /// Intensity of the extra group light; zero disables it.
    pub group_light_intensity: f32,
    /// Environment map preset.
    pub environment: EnvironmentPreset,
    /// Ground contact shadow.
    pub contact_shadows: ContactShadowOptions,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient: 0.6,
            key_position: [5.0, 5.0, 5.0],
            key_intensity: 0.8,
            key_casts_shadow: true,
            group_light_position: [1.0, 1.0, 1.0],
            group_light_intensity: 0.5,
            environment: EnvironmentPreset::Sunset,
            contact_shadows: ContactShadowOptions::default(),
        }
    }
}

impl LightingOptions {
    /// The dimmer rig used by showcase panels.
    #[must_use]
    pub fn showcase() -> Self {
        Self {
            ambient: 0.5,
            key_position: [3.0, 3.0, 3.0],
            key_intensity: 0.7,
            key_casts_shadow: false,
            group_light_position: [1.0, 1.0, 1.0],
            group_light_intensity: 0.0,
            environment: EnvironmentPreset::Dawn,
            contact_shadows: ContactShadowOptions {
                enabled: true,
                y: -1.2,
                opacity: 0.15,
                scale: 8.0,
                blur: 1.0,
                far: 2.0,
                resolution: 64,
            },
        }
    }
}
