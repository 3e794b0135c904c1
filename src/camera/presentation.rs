use std::f32::consts::PI;

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::options::PresentationOptions;

const STEP: f32 = 0.001;
const REST_EPSILON: f32 = 1e-4;

/// Damped spring integrated in fixed 1 ms substeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    mass: f32,
    tension: f32,
    friction: f32,
    value: Vec2,
    velocity: Vec2,
    target: Vec2,
}

impl Spring {
    /// Spring at rest on `value`.
    #[must_use]
    pub fn new(mass: f32, tension: f32, friction: f32, value: Vec2) -> Self {
        Self {
            mass: mass.max(f32::EPSILON),
            tension,
            friction,
            value,
            velocity: Vec2::ZERO,
            target: value,
        }
    }

    /// Current position.
    #[must_use]
    pub fn value(&self) -> Vec2 {
        self.value
    }

    /// Position being approached.
    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Start moving toward `target`.
    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Whether the spring sits on its target with no velocity.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.value.distance(self.target) < REST_EPSILON
            && self.velocity.length() < REST_EPSILON
    }

    /// Integrate `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = Vec2::ZERO;
            return;
        }
        let steps = (dt / STEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            let force = -self.tension * (self.value - self.target)
                - self.friction * self.velocity;
            self.velocity += force / self.mass * h;
            self.value += self.velocity * h;
        }
    }
}

/// Drag-to-tilt controls for a product group.
///
/// Dragging tilts the group within the polar/azimuth limits around its rest
/// rotation; on release it springs back to rest when snapping is enabled.
#[derive(Debug, Clone)]
pub struct PresentationControls {
    rest: Vec3,
    polar: [f32; 2],
    azimuth: [f32; 2],
    snap: bool,
    spring: Spring,
    dragging: bool,
}

impl PresentationControls {
    /// Controls resting at the configured rotation.
    #[must_use]
    pub fn new(options: &PresentationOptions) -> Self {
        let rest = Vec3::from(options.rotation_deg.map(f32::to_radians));
        let polar = options.polar_deg.map(f32::to_radians);
        let azimuth = options.azimuth_deg.map(f32::to_radians);
        Self {
            rest,
            polar,
            azimuth,
            snap: options.snap,
            spring: Spring::new(options.mass, options.tension, options.friction, Vec2::ZERO),
            dragging: false,
        }
    }

    /// Pointer went down.
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Pointer moved `offset` px from where the drag started, on a canvas
    /// of `size` px.
    pub fn drag(&mut self, offset: Vec2, size: Vec2) {
        if !self.dragging || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let azimuth = (offset.x / size.x * PI).clamp(self.azimuth[0], self.azimuth[1]);
        let polar = (offset.y / size.y * PI).clamp(self.polar[0], self.polar[1]);
        self.spring.set_target(Vec2::new(polar, azimuth));
    }

    /// Pointer released.
    pub fn end_drag(&mut self) {
        self.dragging = false;
        if self.snap {
            self.spring.set_target(Vec2::ZERO);
        }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the group is at rest.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.dragging && self.spring.is_settled()
    }

    /// Advance the spring by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.spring.update(dt);
    }

    /// Current tilt (polar, azimuth) in radians relative to rest.
    #[must_use]
    pub fn tilt(&self) -> Vec2 {
        self.spring.value()
    }

    /// Group rotation to apply this frame.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let tilt = self.spring.value();
        Quat::from_euler(
            EulerRot::XYZ,
            self.rest.x + tilt.x,
            self.rest.y + tilt.y,
            self.rest.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_converges_without_runaway() {
        let mut spring = Spring::new(2.0, 500.0, 50.0, Vec2::ZERO);
        spring.set_target(Vec2::new(1.0, -0.5));
        let mut peak = 0.0f32;
        for _ in 0..300 {
            spring.update(1.0 / 60.0);
            peak = peak.max(spring.value().x);
        }
        assert!(spring.is_settled());
        assert!(peak < 1.5);
        assert!((spring.value() - Vec2::new(1.0, -0.5)).length() < 1e-3);
    }

    #[test]
    fn drag_clamps_to_limits() {
        let mut controls = PresentationControls::new(&PresentationOptions::default());
        controls.begin_drag();
        controls.drag(Vec2::new(800.0, 0.0), Vec2::new(800.0, 600.0));
        for _ in 0..300 {
            controls.update(1.0 / 60.0);
        }
        let tilt = controls.tilt();
        assert!((tilt.y - 45f32.to_radians()).abs() < 1e-3);
        assert!(tilt.x.abs() < 1e-3);
        assert!(!controls.is_settled());
    }

    #[test]
    fn release_snaps_back_to_rest() {
        let mut controls = PresentationControls::new(&PresentationOptions::default());
        controls.begin_drag();
        controls.drag(Vec2::new(100.0, 100.0), Vec2::new(800.0, 600.0));
        controls.update(0.5);
        controls.end_drag();
        for _ in 0..300 {
            controls.update(1.0 / 60.0);
        }
        assert!(controls.is_settled());
        assert!(controls.rotation().angle_between(Quat::IDENTITY) < 1e-3);
    }

    #[test]
    fn without_snap_tilt_is_kept() {
        let options = PresentationOptions {
            snap: false,
            ..PresentationOptions::default()
        };
        let mut controls = PresentationControls::new(&options);
        controls.begin_drag();
        controls.drag(Vec2::new(0.0, 60.0), Vec2::new(800.0, 600.0));
        controls.end_drag();
        for _ in 0..300 {
            controls.update(1.0 / 60.0);
        }
        assert!((controls.tilt().x - 0.1 * PI).abs() < 1e-3);
    }
}
