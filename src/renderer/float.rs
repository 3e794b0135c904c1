use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::options::FloatOptions;

/// Idle bobbing and sway of a model group.
///
/// `t` is seconds since the group was mounted; `phase` offsets groups that
/// share a page so they do not move in lockstep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatEffect {
    speed: f32,
    rotation_intensity: f32,
    float_intensity: f32,
    range: [f32; 2],
    phase: f32,
}

impl FloatEffect {
    /// Effect with the configured intensities.
    #[must_use]
    pub fn new(options: &FloatOptions, phase: f32) -> Self {
        Self {
            speed: options.speed,
            rotation_intensity: options.rotation_intensity,
            float_intensity: options.float_intensity,
            range: options.floating_range,
            phase,
        }
    }

    /// Group rotation (Euler XYZ radians) at `t`.
    #[must_use]
    pub fn rotation(&self, t: f32) -> Vec3 {
        let (sin, cos) = ((self.phase + t) / 4.0 * self.speed).sin_cos();
        Vec3::new(cos / 8.0, sin / 8.0, sin / 20.0) * self.rotation_intensity
    }

    /// Vertical offset at `t`, mapped from `[-0.1, 0.1]` onto the floating
    /// range.
    #[must_use]
    pub fn height(&self, t: f32) -> f32 {
        let y = ((self.phase + t) / 4.0 * self.speed).sin() / 10.0;
        let [lo, hi] = self.range;
        let mapped = lo + (y + 0.1) / 0.2 * (hi - lo);
        mapped * self.float_intensity
    }

    /// Combined transform at `t`.
    #[must_use]
    pub fn matrix(&self, t: f32) -> Mat4 {
        let r = self.rotation(t);
        Mat4::from_rotation_translation(
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            Vec3::Y * self.height(t),
        )
    }
}
