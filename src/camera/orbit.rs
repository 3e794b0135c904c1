use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::core::Camera;
use crate::options::OrbitOptions;

const POLAR_EPSILON: f32 = 1e-6;

/// Camera orbit around a fixed target, driven by pointer drags and an idle
/// auto-rotation.
///
/// Angles are spherical: `theta` turns about +Y starting at +Z, `phi` is
/// measured down from +Y. Damping keeps a decaying angular velocity after
/// a drag ends, expressed per 60 Hz frame and integrated exactly for any
/// frame time.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    options: OrbitOptions,
    target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    pending: Vec2,
    dragging: bool,
}

impl OrbitControls {
    /// Controls starting from the camera's current placement.
    #[must_use]
    pub fn new(options: &OrbitOptions, camera: &Camera) -> Self {
        let mut controls = Self {
            options: options.clone(),
            target: Vec3::from(options.target),
            radius: options.min_distance,
            theta: 0.0,
            phi: PI / 2.0,
            pending: Vec2::ZERO,
            dragging: false,
        };
        controls.place(camera.eye, Vec3::from(options.target));
        controls
    }

    /// Re-derive the orbit from a camera that was moved elsewhere, e.g. by
    /// fitting it to a model. Pending rotation is dropped.
    pub fn reset_to(&mut self, camera: &Camera) {
        self.place(camera.eye, camera.target);
    }

    fn place(&mut self, eye: Vec3, target: Vec3) {
        self.target = target;
        let offset = eye - target;
        let radius = offset.length().max(f32::EPSILON);
        self.radius = radius.clamp(self.options.min_distance, self.options.max_distance);
        self.theta = offset.x.atan2(offset.z);
        self.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        self.pending = Vec2::ZERO;
    }

    /// Azimuth in radians.
    #[must_use]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Polar angle in radians.
    #[must_use]
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Camera distance.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Pointer went down on the canvas.
    pub fn begin_drag(&mut self) {
        if self.options.enable_rotate {
            self.dragging = true;
        }
    }

    /// Pointer moved by `delta` px while down on a canvas `height` px tall.
    pub fn drag(&mut self, delta: Vec2, height: f32) {
        if !self.dragging || height <= 0.0 {
            return;
        }
        let scale = TAU * self.options.rotate_speed / height;
        self.pending.x -= delta.x * scale;
        self.pending.y -= delta.y * scale;
    }

    /// Pointer released.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Wheel input; positive `steps` zoom out.
    pub fn zoom(&mut self, steps: f32) {
        if !self.options.enable_zoom {
            return;
        }
        let scale = 0.95f32.powf(self.options.zoom_speed * steps.abs());
        self.radius = if steps > 0.0 {
            self.radius / scale
        } else {
            self.radius * scale
        }
        .clamp(self.options.min_distance, self.options.max_distance);
    }

    /// Move the target in the camera plane.
    pub fn pan(&mut self, delta: Vec2, height: f32) {
        if !self.options.enable_pan || height <= 0.0 {
            return;
        }
        let right = Vec3::new(self.theta.cos(), 0.0, -self.theta.sin());
        let per_px = self.radius / height;
        self.target += right * (-delta.x * per_px) + Vec3::Y * (delta.y * per_px);
    }

    /// Whether the camera will move on the next update.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        (self.options.auto_rotate && !self.dragging) || self.pending.length_squared() > 1e-10
    }

    /// Advance by `dt` seconds and place the camera.
    pub fn update(&mut self, dt: f32, camera: &mut Camera) {
        if self.options.auto_rotate && !self.dragging {
            self.pending.x -= TAU / 60.0 * self.options.auto_rotate_speed * dt;
        }

        let applied = if self.options.enable_damping {
            let keep = (1.0 - self.options.damping_factor).powf(dt * 60.0);
            let applied = self.pending * (1.0 - keep);
            self.pending *= keep;
            applied
        } else {
            std::mem::take(&mut self.pending)
        };

        self.theta = (self.theta + applied.x).rem_euclid(TAU);
        self.phi = (self.phi + applied.y).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.apply(camera);
    }

    /// Write the current placement into `camera`.
    pub fn apply(&self, camera: &mut Camera) {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let offset = Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * self.radius;
        camera.target = self.target;
        camera.eye = self.target + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CameraOptions;

    fn setup(options: OrbitOptions) -> (OrbitControls, Camera) {
        let camera = Camera::from_options(&CameraOptions::default(), 1.0);
        (OrbitControls::new(&options, &camera), camera)
    }

    #[test]
    fn starts_from_camera_position() {
        let (orbit, mut camera) = setup(OrbitOptions::default());
        assert!((orbit.radius() - 5.0).abs() < 1e-5);
        assert!((orbit.phi() - PI / 2.0).abs() < 1e-5);
        orbit.apply(&mut camera);
        assert!((camera.eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn distance_is_clamped() {
        let mut camera = Camera::from_options(&CameraOptions::default(), 1.0);
        camera.eye = Vec3::new(0.0, 0.0, 20.0);
        let mut orbit = OrbitControls::new(&OrbitOptions::default(), &camera);
        assert_eq!(orbit.radius(), 7.0);
        let options = OrbitOptions {
            enable_zoom: true,
            ..OrbitOptions::default()
        };
        orbit = OrbitControls::new(&options, &camera);
        for _ in 0..200 {
            orbit.zoom(-1.0);
        }
        assert_eq!(orbit.radius(), 3.0);
    }

    #[test]
    fn auto_rotate_reaches_steady_rate() {
        let options = OrbitOptions {
            enable_damping: false,
            auto_rotate_speed: 1.0,
            ..OrbitOptions::default()
        };
        let (mut orbit, mut camera) = setup(options);
        let before = orbit.theta();
        orbit.update(1.0, &mut camera);
        let turned = (before - orbit.theta()).rem_euclid(TAU);
        assert!((turned - TAU / 60.0).abs() < 1e-4);
    }

    #[test]
    fn damping_spreads_a_drag_over_frames() {
        let options = OrbitOptions {
            auto_rotate: false,
            ..OrbitOptions::default()
        };
        let (mut orbit, mut camera) = setup(options);
        orbit.begin_drag();
        orbit.drag(Vec2::new(-100.0, 0.0), 800.0);
        orbit.end_drag();
        let start = orbit.theta();
        orbit.update(1.0 / 60.0, &mut camera);
        let first = orbit.theta() - start;
        let total = TAU * 0.4 * 100.0 / 800.0;
        assert!((first - total * 0.03).abs() < 1e-4);
        assert!(orbit.is_moving());
        for _ in 0..2000 {
            orbit.update(1.0 / 60.0, &mut camera);
        }
        assert!((orbit.theta() - start - total).abs() < 1e-3);
    }

    #[test]
    fn drag_ignored_when_rotation_disabled() {
        let options = OrbitOptions {
            enable_rotate: false,
            auto_rotate: false,
            ..OrbitOptions::default()
        };
        let (mut orbit, _) = setup(options);
        orbit.begin_drag();
        orbit.drag(Vec2::new(50.0, 50.0), 800.0);
        assert!(!orbit.is_moving());
    }
}
