use glam::{Mat4, Vec3};

use super::bounds::Aabb;
use super::graph::SceneGraph;
use super::transform::Transform;

/// One model slot inside a section's composition.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Asset path the slot displays.
    pub path: String,
    /// Display copy, once the asset resolved.
    pub scene: Option<SceneGraph>,
    /// Layout transform (position and rotation; scale comes from
    /// `base_scale`).
    pub transform: Transform,
    /// Configured uniform scale.
    pub base_scale: f32,
    /// Animated offset added on top of the layout position.
    pub offset: Vec3,
    /// Whether the slot is drawn.
    pub visible: bool,
}

impl Placement {
    /// World matrix of the placement relative to the composition root.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        let mut t = self.transform.with_uniform_scale(self.base_scale);
        t.translation += self.offset;
        t.matrix()
    }
}

/// Per-section grouping of model placements.
///
/// Created on mount, mutated by the rotation scheduler and by selection,
/// dropped on unmount.
#[derive(Debug, Clone, Default)]
pub struct SceneComposition {
    placements: Vec<Placement>,
}

impl SceneComposition {
    /// One visible, unresolved placement per `(path, scale)`.
    #[must_use]
    pub fn new<S: AsRef<str>>(models: &[(S, f32)]) -> Self {
        Self {
            placements: models
                .iter()
                .map(|(path, scale)| Placement {
                    path: path.as_ref().to_owned(),
                    scene: None,
                    transform: Transform::IDENTITY,
                    base_scale: *scale,
                    offset: Vec3::ZERO,
                    visible: true,
                })
                .collect(),
        }
    }

    /// All placements in declaration order.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Mutable placement by index.
    pub fn placement_mut(&mut self, index: usize) -> Option<&mut Placement> {
        self.placements.get_mut(index)
    }

    /// Number of placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether there are no placements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Paths whose display copy is still missing, deduplicated.
    #[must_use]
    pub fn pending_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .placements
            .iter()
            .filter(|p| p.scene.is_none())
            .map(|p| p.path.as_str())
            .collect();
        paths.dedup();
        paths
    }

    /// Whether every placement has its display copy.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.placements.iter().all(|p| p.scene.is_some())
    }

    /// Install a display copy into every unresolved placement of `path`.
    /// Returns how many placements were filled.
    pub fn attach(&mut self, path: &str, scene: &SceneGraph) -> usize {
        let mut filled = 0;
        for placement in self
            .placements
            .iter_mut()
            .filter(|p| p.path == path && p.scene.is_none())
        {
            placement.scene = Some(scene.clone());
            filled += 1;
        }
        filled
    }

    /// Show exactly one placement. Out-of-range indices hide everything.
    pub fn show_only(&mut self, index: usize) {
        for (i, placement) in self.placements.iter_mut().enumerate() {
            placement.visible = i == index;
        }
    }

    /// Show every placement.
    pub fn show_all(&mut self) {
        for placement in &mut self.placements {
            placement.visible = true;
        }
    }

    /// Indices of visible placements.
    #[must_use]
    pub fn visible_indices(&self) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Spread placements out with distinct static offsets, one per slot.
    /// Extra placements without a layout entry keep their transform.
    pub fn apply_intro_layout(
        &mut self,
        positions: &[[f32; 3]],
        rotations_deg: &[[f32; 3]],
    ) {
        for (i, placement) in self.placements.iter_mut().enumerate() {
            if let (Some(p), Some(r)) = (positions.get(i), rotations_deg.get(i)) {
                placement.transform = Transform::from_euler_deg(*p, *r, 1.0);
            }
        }
    }

    /// Put every placement back at the origin with no rotation or offset.
    pub fn reset_layout(&mut self) {
        for placement in &mut self.placements {
            placement.transform = Transform::IDENTITY;
            placement.offset = Vec3::ZERO;
        }
    }

    /// Bounds of the visible, resolved placements.
    #[must_use]
    pub fn visible_bounds(&self) -> Option<Aabb> {
        self.placements
            .iter()
            .filter(|p| p.visible)
            .filter_map(|p| {
                let scene = p.scene.as_ref()?;
                Some(scene.local_bounds()?.transform(&p.matrix()))
            })
            .reduce(|a, b| a.union(&b))
    }
}
