//! Model asset loading.
//!
//! [`AssetCache`] maps page-absolute paths (`/glb/navocular.glb`) to parsed
//! [`crate::scene::SceneGraph`]s. Bytes come from an [`AssetSource`]; the
//! glTF document is turned into a scene graph by [`import_scene`].

mod cache;
mod import;
mod source;

pub use cache::{AssetCache, AssetStatus, LoadMode};
pub use import::import_scene;
pub use source::{AssetSource, FsSource, MemorySource};

#[cfg(test)]
#[path = "../../tests/fixtures/glb.rs"]
mod glb;
#[cfg(test)]
pub(crate) use glb::triangle_glb;

use crate::options::AssetOptions;

impl AssetCache {
    /// Cache over the configured static directory.
    #[must_use]
    pub fn from_options(options: &AssetOptions) -> Self {
        let mode = if options.background_loading {
            LoadMode::Background
        } else {
            LoadMode::Inline
        };
        Self::new(FsSource::new(options.root.clone()), mode)
    }
}
