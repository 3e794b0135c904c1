use std::sync::Arc;

use glam::{Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::error::AssetError;
use crate::scene::{
    Filter, Geometry, Material, Mesh, Node, NodeId, Primitive, SamplerSettings,
    SceneGraph, TextureRef, Transform,
};

/// Required extensions this importer cannot decode.
const COMPRESSION_EXTENSIONS: &[&str] =
    &["KHR_draco_mesh_compression", "EXT_meshopt_compression"];

/// Parse a glTF (`.gltf` JSON with embedded buffers, or `.glb`) into a
/// [`SceneGraph`].
///
/// The default scene is used, falling back to the first one. Image pixels
/// are never decoded; textures are tracked only for their sampler state.
///
/// # Errors
///
/// [`AssetError::Parse`] for malformed documents,
/// [`AssetError::Unsupported`] for compressed meshes or non-triangle
/// primitives, [`AssetError::EmptyScene`] when there is nothing to show.
pub fn import_scene(path: &str, bytes: &[u8]) -> Result<SceneGraph, AssetError> {
    let gltf = match gltf::Gltf::from_slice(bytes) {
        Ok(gltf) => gltf,
        Err(e) => return Err(classify_parse_error(path, bytes, &e)),
    };
    reject_compression(path, &gltf.document)?;

    let gltf::Gltf { document, blob } = gltf;
    let buffers =
        gltf::import_buffers(&document, None, blob).map_err(|e| AssetError::Parse {
            path: path.to_owned(),
            message: e.to_string(),
        })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::EmptyScene(path.to_owned()))?;

    let mut importer = Importer {
        path,
        buffers: &buffers,
        graph: SceneGraph::new(),
        meshes: FxHashMap::default(),
    };
    for node in scene.nodes() {
        importer.node(&node, None)?;
    }

    let graph = importer.graph;
    if graph.is_empty() {
        return Err(AssetError::EmptyScene(path.to_owned()));
    }
    log::debug!(
        "imported {path}: {} nodes, {} meshes",
        graph.len(),
        graph.mesh_count()
    );
    Ok(graph)
}

/// Validation rejects unknown required extensions; report compressed
/// meshes as unsupported rather than malformed.
fn classify_parse_error(path: &str, bytes: &[u8], error: &gltf::Error) -> AssetError {
    if let Ok(raw) = gltf::Gltf::from_slice_without_validation(bytes) {
        if let Err(unsupported) = reject_compression(path, &raw.document) {
            return unsupported;
        }
    }
    AssetError::Parse {
        path: path.to_owned(),
        message: error.to_string(),
    }
}

fn reject_compression(path: &str, document: &gltf::Document) -> Result<(), AssetError> {
    match document
        .extensions_required()
        .find(|ext| COMPRESSION_EXTENSIONS.contains(ext))
    {
        Some(ext) => Err(AssetError::Unsupported {
            path: path.to_owned(),
            message: format!("required extension {ext}"),
        }),
        None => Ok(()),
    }
}

struct Importer<'a> {
    path: &'a str,
    buffers: &'a [gltf::buffer::Data],
    graph: SceneGraph,
    /// glTF mesh index to already-built mesh, so instanced meshes share
    /// geometry.
    meshes: FxHashMap<usize, Mesh>,
}

impl Importer<'_> {
    fn node(&mut self, node: &gltf::Node<'_>, parent: Option<NodeId>) -> Result<(), AssetError> {
        let (translation, rotation, scale) = node.transform().decomposed();
        let mesh = match node.mesh() {
            Some(mesh) => Some(self.mesh(&mesh)?),
            None => None,
        };
        let id = self.graph.add_node(
            Node {
                name: node.name().unwrap_or("Unnamed").to_owned(),
                transform: Transform::from_decomposed(translation, rotation, scale),
                mesh,
                ..Node::default()
            },
            parent,
        );
        for child in node.children() {
            self.node(&child, Some(id))?;
        }
        Ok(())
    }

    fn mesh(&mut self, mesh: &gltf::Mesh<'_>) -> Result<Mesh, AssetError> {
        if let Some(built) = self.meshes.get(&mesh.index()) {
            return Ok(built.clone());
        }

        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            primitives.push(self.primitive(&primitive)?);
        }
        let built = Mesh {
            name: mesh.name().map(str::to_owned),
            primitives,
        };
        let _ = self.meshes.insert(mesh.index(), built.clone());
        Ok(built)
    }

    fn primitive(&self, primitive: &gltf::Primitive<'_>) -> Result<Primitive, AssetError> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(self.unsupported(format!(
                "primitive mode {:?}",
                primitive.mode()
            )));
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| self.unsupported("primitive without POSITION".to_owned()))?
            .map(Vec3::from)
            .collect();
        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|n| n.map(Vec3::from).collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        Ok(Primitive {
            geometry: Arc::new(Geometry::new(positions, normals, indices)),
            material: material(&primitive.material()),
        })
    }

    fn unsupported(&self, message: String) -> AssetError {
        AssetError::Unsupported {
            path: self.path.to_owned(),
            message,
        }
    }
}

fn material(material: &gltf::Material<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let base_color_texture = pbr.base_color_texture().map(|info| {
        let texture = info.texture();
        let sampler = texture.sampler();
        let defaults = SamplerSettings::default();
        TextureRef {
            texture_index: texture.index(),
            image_index: texture.source().index(),
            sampler: SamplerSettings {
                min_filter: sampler.min_filter().map_or(defaults.min_filter, Filter::from),
                mag_filter: sampler.mag_filter().map_or(defaults.mag_filter, Filter::from),
                anisotropy: defaults.anisotropy,
            },
        }
    });
    Material {
        name: material.name().map(str::to_owned),
        base_color: Vec4::from(pbr.base_color_factor()),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        double_sided: material.double_sided(),
        base_color_texture,
        needs_update: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::glb::{triangle_glb, triangle_glb_with};

    #[test]
    fn imports_hierarchy_and_geometry() {
        let graph = import_scene("/glb/a.glb", &triangle_glb("Lens")).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.roots().len(), 1);
        let lens = graph.node(graph.find_by_name("Lens").unwrap()).unwrap();
        let mesh = lens.mesh.as_ref().unwrap();
        assert_eq!(mesh.primitives[0].geometry.triangle_count(), 1);

        let bounds = graph.local_bounds().unwrap();
        assert!((bounds.max - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn imports_material_and_sampler() {
        let graph = import_scene("/glb/a.glb", &triangle_glb("Lens")).unwrap();
        let material = &graph.nodes()[1].mesh.as_ref().unwrap().primitives[0].material;
        assert_eq!(material.name.as_deref(), Some("Shell"));
        assert_eq!(material.base_color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert!((material.roughness - 0.6).abs() < 1e-6);
        let sampler = material.base_color_texture.unwrap().sampler;
        assert_eq!(sampler.mag_filter, Filter::Nearest);
        assert_eq!(sampler.min_filter, Filter::NearestMipmapNearest);
        assert!(material.needs_update);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = import_scene("/glb/bad.glb", b"not a gltf").unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn draco_is_unsupported() {
        let bytes = triangle_glb_with(
            "Lens",
            r#""extensionsUsed":["KHR_draco_mesh_compression"],"extensionsRequired":["KHR_draco_mesh_compression"],"#,
        );
        let err = import_scene("/glb/draco.glb", &bytes).unwrap_err();
        assert!(matches!(err, AssetError::Unsupported { .. }), "{err}");
    }
}
