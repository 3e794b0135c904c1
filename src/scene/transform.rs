use glam::{EulerRot, Mat4, Quat, Vec3};

/// Translation, rotation and scale of a node or placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position relative to the parent.
    pub translation: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, rotation or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Transform from a translation only.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Transform from position, XYZ Euler angles in degrees and a uniform
    /// scale, the way section layouts are written.
    #[must_use]
    pub fn from_euler_deg(position: [f32; 3], rotation_deg: [f32; 3], scale: f32) -> Self {
        let [rx, ry, rz] = rotation_deg.map(f32::to_radians);
        Self {
            translation: Vec3::from(position),
            rotation: Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            scale: Vec3::splat(scale),
        }
    }

    /// Transform from a decomposed glTF node transform.
    #[must_use]
    pub fn from_decomposed(
        translation: [f32; 3],
        rotation: [f32; 4],
        scale: [f32; 3],
    ) -> Self {
        Self {
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        }
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }

    /// Uniform scale helper; replaces all three axes.
    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_degrees_turn_about_y() {
        let t = Transform::from_euler_deg([0.0; 3], [0.0, 90.0, 0.0], 1.0);
        let x = t.matrix().transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn matrix_applies_scale_then_translation() {
        let t = Transform::from_translation(Vec3::Y).with_uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-6);
    }
}
