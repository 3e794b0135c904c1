//! Section cameras and the two control schemes that move them.
//!
//! The hero section tilts its product group with [`PresentationControls`];
//! the showcase panels orbit their camera with [`OrbitControls`].

mod core;
mod orbit;
mod presentation;

#[cfg(feature = "gpu")]
pub use self::core::CameraUniform;
pub use self::core::Camera;

pub use orbit::OrbitControls;
pub use presentation::{PresentationControls, Spring};
