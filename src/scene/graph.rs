use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Mat4, Vec3};

use super::bounds::Aabb;
use super::material::Material;
use super::transform::Transform;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an immutable geometry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    /// Raw id value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Triangle geometry of one primitive. Shared read-only between the cached
/// asset and every display copy.
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals (may be empty).
    pub normals: Vec<Vec3>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    bounds: Option<Aabb>,
}

impl Geometry {
    /// Build geometry and compute its local bounds.
    #[must_use]
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::from_points(&positions);
        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// Identity used by renderers to upload each buffer once.
    #[must_use]
    pub fn id(&self) -> GeometryId {
        self.id
    }

    /// Local bounds, `None` when there are no vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Geometry paired with its per-instance material.
#[derive(Debug, Clone)]
pub struct Primitive {
    /// Shared geometry.
    pub geometry: Arc<Geometry>,
    /// Owned material; copies never alias the cached asset's material.
    pub material: Material,
}

/// A named list of primitives attached to a node.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Mesh name from the document.
    pub name: Option<String>,
    /// Primitives drawn for this mesh.
    pub primitives: Vec<Primitive>,
}

/// Index of a node inside its [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in [`SceneGraph::nodes`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of the hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name ("Unnamed" when the document has none).
    pub name: String,
    /// Parent-relative transform.
    pub transform: Transform,
    /// Attached mesh.
    pub mesh: Option<Mesh>,
    /// Whether the mesh casts shadows.
    pub cast_shadow: bool,
    /// Whether the mesh receives shadows.
    pub receive_shadow: bool,
    /// Child nodes.
    pub children: Vec<NodeId>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::IDENTITY,
            mesh: None,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
        }
    }
}

/// Hierarchy of nodes loaded from one model file.
///
/// Cloning shares geometry through [`Arc`] and copies everything that a
/// consumer may tweak (transforms, materials, shadow flags).
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, linking it under `parent` or as a new root.
    pub fn add_node(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(parent_node) => parent_node.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// All nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Root nodes.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// First node with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes carrying a mesh.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }

    /// Visit every node reachable from the roots, depth first, with its
    /// world matrix relative to `root`.
    pub fn traverse<F>(&self, root: Mat4, mut visit: F)
    where
        F: FnMut(&Node, Mat4),
    {
        let mut stack: Vec<(NodeId, Mat4)> =
            self.roots.iter().rev().map(|id| (*id, root)).collect();
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            let world = parent * node.transform.matrix();
            visit(node, world);
            stack.extend(node.children.iter().rev().map(|c| (*c, world)));
        }
    }

    /// Mutate every node in place.
    pub fn for_each_node_mut<F>(&mut self, visit: F)
    where
        F: FnMut(&mut Node),
    {
        self.nodes.iter_mut().for_each(visit);
    }

    /// Bounds of all mesh geometry in the graph's own space.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        self.traverse(Mat4::IDENTITY, |node, world| {
            let Some(mesh) = &node.mesh else { return };
            for primitive in &mesh.primitives {
                if let Some(b) = primitive.geometry.bounds() {
                    let b = b.transform(&world);
                    bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
                }
            }
        });
        bounds
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-level graph: a root with one textured triangle child.
    pub(crate) fn sample_graph() -> SceneGraph {
        use super::super::material::{Filter, SamplerSettings, TextureRef};

        let geometry = Arc::new(Geometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![0, 1, 2],
        ));
        let material = Material {
            name: Some("Body".to_owned()),
            base_color_texture: Some(TextureRef {
                texture_index: 0,
                image_index: 0,
                sampler: SamplerSettings {
                    min_filter: Filter::NearestMipmapLinear,
                    mag_filter: Filter::Nearest,
                    anisotropy: 16,
                },
            }),
            ..Material::default()
        };

        let mut graph = SceneGraph::new();
        let root = graph.add_node(
            Node {
                name: "Root".to_owned(),
                transform: Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
                ..Node::default()
            },
            None,
        );
        let _ = graph.add_node(
            Node {
                name: "Body".to_owned(),
                transform: Transform::from_translation(Vec3::X),
                mesh: Some(Mesh {
                    name: Some("Body".to_owned()),
                    primitives: vec![Primitive { geometry, material }],
                }),
                ..Node::default()
            },
            Some(root),
        );
        graph
    }

    #[test]
    fn traverse_composes_parent_transforms() {
        let graph = sample_graph();
        let mut seen = Vec::new();
        graph.traverse(Mat4::IDENTITY, |node, world| {
            seen.push((node.name.clone(), world.transform_point3(Vec3::ZERO)));
        });
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "Root");
        assert!((seen[1].1 - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn local_bounds_cover_transformed_geometry() {
        let bounds = sample_graph().local_bounds().unwrap();
        assert!((bounds.min - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
        assert!((bounds.max - Vec3::new(2.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn clone_shares_geometry() {
        let graph = sample_graph();
        let copy = graph.clone();
        let original = graph.nodes()[1].mesh.as_ref().unwrap();
        let cloned = copy.nodes()[1].mesh.as_ref().unwrap();
        assert!(Arc::ptr_eq(
            &original.primitives[0].geometry,
            &cloned.primitives[0].geometry
        ));
    }

    #[test]
    fn geometry_ids_are_unique() {
        let a = Geometry::new(vec![Vec3::ZERO], Vec::new(), Vec::new());
        let b = Geometry::new(vec![Vec3::ZERO], Vec::new(), Vec::new());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.triangle_count(), 0);
        assert!(Geometry::new(Vec::new(), Vec::new(), Vec::new()).bounds().is_none());
    }

    #[test]
    fn find_by_name() {
        let graph = sample_graph();
        assert_eq!(graph.find_by_name("Body").map(NodeId::index), Some(1));
        assert_eq!(graph.mesh_count(), 1);
        assert!(graph.find_by_name("Lid").is_none());
    }
}
