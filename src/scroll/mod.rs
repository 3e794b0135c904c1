//! Scroll-linked animation triggers.
//!
//! A [`ScrollTrigger`] maps a range of page scroll (from "element top meets
//! viewport center" to "element bottom meets viewport center", and so on)
//! onto a progress fraction. The [`ScrollObserver`] holds every registered
//! trigger and turns scroll input into [`ScrollEvent`]s.

mod observer;
mod scrub;
mod toggle;
mod trigger;

pub use observer::{BindingId, ScrollEvent, ScrollObserver};
pub use toggle::{ToggleAction, ToggleActions, Transition};
pub use trigger::{
    range_progress, ContainerAnimation, Edge, Mode, Rect, ScrollTrigger, Snap, TriggerEnd,
    TriggerPoint, Viewport,
};
