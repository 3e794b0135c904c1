// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![warn(unused_qualifications)]
// Cast hygiene
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]

//! Scroll-choreographed 3D product showcase.
//!
//! Vitrine composes pre-built glTF product models into page sections that
//! animate on load and on scroll: a hero section that introduces every model
//! at once and then cycles through them, and a pinned horizontal showcase
//! whose panels reveal themselves as the page scrolls sideways.
//!
//! # Key entry points
//!
//! - [`assets::AssetCache`] - process-wide, path-keyed model cache
//! - [`scene::SceneComposition`] - per-section placements of display copies
//! - [`animation::Timeline`] - ordered tween steps interpreted by one driver
//! - [`scroll::ScrollObserver`] - explicit scroll-trigger registry
//! - [`rotation::RotationScheduler`] - intro handoff and model cycling
//! - [`section::Page`] - mounts sections and fans out page input
//!
//! # Architecture
//!
//! Every driver takes the current time as an argument instead of reading a
//! clock, so a section is a deterministic function of its inputs. Sections
//! own their timers, scroll bindings and timelines; unmounting a section
//! clears all three. The shared asset cache hands out immutable scene
//! graphs, and renderers always display a copy.

pub mod animation;
pub mod assets;
pub mod camera;
pub mod error;
pub mod options;
pub mod particles;
pub mod renderer;
pub mod rotation;
pub mod scene;
pub mod scroll;
pub mod section;
pub mod timers;
pub mod util;

pub use error::VitrineError;
