use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning two points.
    #[must_use]
    pub fn new(point1: Vec3, point2: Vec3) -> Self {
        Self {
            min: point1.min(point2),
            max: point1.max(point2),
        }
    }

    /// Smallest box holding every point, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        }))
    }

    /// Box holding both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Radius of the bounding sphere around the centre.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    /// The eight corners.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Axis-aligned box around this box after transformation.
    #[must_use]
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point3(c));
        let mut out = Self::new(corners[0], corners[0]);
        for c in &corners[1..] {
            out.min = out.min.min(*c);
            out.max = out.max.max(*c);
        }
        out
    }

    /// Translation that moves the centre to the origin.
    #[must_use]
    pub fn center_offset(&self) -> Vec3 {
        -self.center()
    }

    /// Camera distance at which the bounding sphere fills the vertical field
    /// of view, padded by `margin`.
    #[must_use]
    pub fn fit_distance(&self, fovy_deg: f32, margin: f32) -> f32 {
        let half = (fovy_deg.to_radians() * 0.5).max(1e-3);
        self.radius() / half.tan() * margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_and_center() {
        let b = Aabb::from_points(&[Vec3::ZERO, Vec3::new(2.0, 4.0, -2.0)]).unwrap();
        assert_eq!(b.center(), Vec3::new(1.0, 2.0, -1.0));
        assert_eq!(b.center_offset(), Vec3::new(-1.0, -2.0, 1.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn transform_grows_rotated_box() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let rotated = b.transform(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        assert!(rotated.max.x > 1.4);
    }

    #[test]
    fn wider_margin_means_farther_camera() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(b.fit_distance(35.0, 1.5) > b.fit_distance(35.0, 1.2));
    }
}
