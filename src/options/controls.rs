use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Orbit Controls", inline)]
#[serde(default)]
/// Pointer-driven orbit of the camera around a fixed target.
pub struct OrbitOptions {
    /// Allow drag rotation.
    pub enable_rotate: bool,
    /// Allow wheel zoom. Disabled so the product stays framed.
    pub enable_zoom: bool,
    /// Allow panning the target.
    pub enable_pan: bool,
    /// Spin the camera around the target while idle.
    pub auto_rotate: bool,
    /// Auto-rotation speed; 1.0 is one orbit per 60 seconds.
    #[schemars(title = "Auto Rotate Speed", range(min = 0.0, max = 10.0), extend("step" = 0.1))]
    pub auto_rotate_speed: f32,
    /// Keep rotating with decaying velocity after the pointer is released.
    pub enable_damping: bool,
    /// Fraction of angular velocity retained per 60 Hz frame is `1 - factor`.
    #[schemars(title = "Damping", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Closest allowed camera distance.
    pub min_distance: f32,
    /// Farthest allowed camera distance.
    pub max_distance: f32,
    /// Drag rotation sensitivity.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Wheel zoom sensitivity.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub zoom_speed: f32,
    /// Orbit target.
    pub target: [f32; 3],
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: false,
            enable_pan: false,
            auto_rotate: true,
            auto_rotate_speed: 1.2,
            enable_damping: true,
            damping_factor: 0.03,
            min_distance: 3.0,
            max_distance: 7.0,
            rotate_speed: 0.4,
            zoom_speed: 0.4,
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Presentation Controls", inline)]
#[serde(default)]
/// Page-wide drag that tilts the model group within limits.
pub struct PresentationOptions {
    /// Resting rotation in degrees (x, y, z).
    pub rotation_deg: [f32; 3],
    /// Vertical tilt limits in degrees.
    pub polar_deg: [f32; 2],
    /// Horizontal turn limits in degrees.
    pub azimuth_deg: [f32; 2],
    /// Spring back to the resting rotation on release.
    pub snap: bool,
    /// Spring mass.
    pub mass: f32,
    /// Spring tension.
    pub tension: f32,
    /// Spring friction.
    pub friction: f32,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            rotation_deg: [0.0, 0.0, 0.0],
            polar_deg: [-45.0, 45.0],
            azimuth_deg: [-45.0, 45.0],
            snap: true,
            mass: 2.0,
            tension: 500.0,
            friction: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Float", inline)]
#[serde(default)]
/// Idle bobbing of the model group.
pub struct FloatOptions {
    /// Animation speed multiplier.
    pub speed: f32,
    /// Rotation wobble strength.
    pub rotation_intensity: f32,
    /// Vertical bob strength.
    pub float_intensity: f32,
    /// Vertical range the bob is mapped into.
    pub floating_range: [f32; 2],
}

impl Default for FloatOptions {
    fn default() -> Self {
        Self {
            speed: 2.0,
            rotation_intensity: 0.5,
            float_intensity: 0.5,
            floating_range: [0.0, 0.5],
        }
    }
}
