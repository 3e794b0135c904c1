//! Tween and timeline animation.
//!
//! Values live in a [`PropertyStore`] keyed by `(TargetId, Property)`.
//! [`Tween`]s describe how some of those values change; a [`Timeline`]
//! places tweens on one time axis and renders them, either from wall-clock
//! time or from a scroll-derived progress fraction.

mod easing;
mod property;
mod timeline;
mod tween;

pub use easing::Ease;
pub use property::{Property, PropertyStore, TargetId, TweenValue, Value};
pub use timeline::{PlayState, Position, Timeline};
pub use tween::{Tween, DEFAULT_DURATION};
