use super::graph::SceneGraph;
use super::material::Filter;

/// Fixed texture sampling policy applied to every displayed model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexturePolicy {
    /// Filter forced onto both minification and magnification.
    pub filter: Filter,
    /// Anisotropy ceiling.
    pub max_anisotropy: u16,
}

/// Linear filtering, anisotropy capped at one.
pub const TEXTURE_POLICY: TexturePolicy = TexturePolicy {
    filter: Filter::Linear,
    max_anisotropy: 1,
};

/// Copy a cached scene for display and apply the per-instance tweaks.
///
/// Every mesh node casts and receives shadows, materials are marked clean,
/// and base color samplers follow [`TEXTURE_POLICY`]. The source graph is
/// never touched; geometry stays shared.
#[must_use]
pub fn display_copy(source: &SceneGraph) -> SceneGraph {
    let mut copy = source.clone();
    copy.for_each_node_mut(|node| {
        let Some(mesh) = node.mesh.as_mut() else {
            return;
        };
        node.cast_shadow = true;
        node.receive_shadow = true;
        for primitive in &mut mesh.primitives {
            let material = &mut primitive.material;
            material.needs_update = false;
            if let Some(texture) = material.base_color_texture.as_mut() {
                texture.sampler.min_filter = TEXTURE_POLICY.filter;
                texture.sampler.mag_filter = TEXTURE_POLICY.filter;
                texture.sampler.anisotropy = texture
                    .sampler
                    .anisotropy
                    .min(TEXTURE_POLICY.max_anisotropy);
            }
        }
    });
    log::debug!(
        "display copy: {} nodes, {} meshes",
        copy.len(),
        copy.mesh_count()
    );
    copy
}
