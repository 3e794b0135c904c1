//! Scene graphs, display copies and per-section compositions.
//!
//! A [`SceneGraph`] is what the asset cache hands out: immutable once
//! cached. Sections never draw it directly; they take a [`display_copy`]
//! (geometry shared, everything mutable copied) and place it inside their
//! own [`SceneComposition`].

mod bounds;
mod composition;
mod display;
mod graph;
mod material;
mod transform;

pub use bounds::Aabb;
pub use composition::{Placement, SceneComposition};
pub use display::{display_copy, TexturePolicy, TEXTURE_POLICY};
pub use graph::{Geometry, GeometryId, Mesh, Node, NodeId, Primitive, SceneGraph};
pub use material::{Filter, Material, SamplerSettings, TextureRef};
pub use transform::Transform;
