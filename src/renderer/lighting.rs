use glam::Vec3;

use crate::options::{ContactShadowOptions, EnvironmentPreset, LightingOptions};

/// A positional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World position.
    pub position: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Whether the light renders a shadow map.
    pub casts_shadow: bool,
}

impl PointLight {
    /// Unit direction from the light toward `target`.
    #[must_use]
    pub fn direction_to(&self, target: Vec3) -> Vec3 {
        (target - self.position).normalize_or(Vec3::NEG_Y)
    }
}

/// Lights, environment tint and contact shadow of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    /// Uniform ambient term.
    pub ambient: f32,
    /// Main directional/key light.
    pub key: PointLight,
    /// Light that travels with the model group, `None` when switched off.
    pub group: Option<PointLight>,
    /// Image-based lighting preset.
    pub environment: EnvironmentPreset,
    /// Contact shadow under the models, `None` when disabled.
    pub contact_shadow: Option<ContactShadowOptions>,
}

impl LightRig {
    /// Build the rig for a section.
    #[must_use]
    pub fn from_options(options: &LightingOptions, shadows: bool) -> Self {
        let group = (options.group_light_intensity > 0.0).then(|| PointLight {
            position: Vec3::from(options.group_light_position),
            intensity: options.group_light_intensity,
            casts_shadow: false,
        });
        let contact_shadow = options
            .contact_shadows
            .enabled
            .then(|| options.contact_shadows.clone());
        Self {
            ambient: options.ambient,
            key: PointLight {
                position: Vec3::from(options.key_position),
                intensity: options.key_intensity,
                casts_shadow: shadows && options.key_casts_shadow,
            },
            group,
            environment: options.environment,
            contact_shadow,
        }
    }

    /// Linear RGB tint the environment contributes to ambient light.
    #[must_use]
    pub fn environment_tint(&self) -> Vec3 {
        match self.environment {
            EnvironmentPreset::Sunset => Vec3::new(1.0, 0.78, 0.62),
            EnvironmentPreset::Dawn => Vec3::new(0.95, 0.85, 0.9),
            EnvironmentPreset::Studio => Vec3::ONE,
        }
    }

    /// Whether any light renders shadows.
    #[must_use]
    pub fn has_shadows(&self) -> bool {
        self.key.casts_shadow
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::from_options(&LightingOptions::default(), true)
    }
}
