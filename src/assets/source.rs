use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::AssetError;

/// Where asset bytes come from.
///
/// Implementations must be shareable across loader threads.
pub trait AssetSource: Send + Sync {
    /// Read the full contents of the asset at a page-absolute `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] when nothing exists at `path`,
    /// otherwise an I/O or path error.
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Serves files from a static directory on disk.
///
/// `"/glb/a.glb"` resolves to `<root>/glb/a.glb`. Paths that climb out of
/// the root are rejected.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location for a page-absolute path.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidPath`] for empty paths and paths with
    /// parent or prefix components.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(AssetError::InvalidPath(path.to_owned()));
        }
        let escapes = relative.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if escapes {
            return Err(AssetError::InvalidPath(path.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for FsSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let file = self.resolve(path)?;
        log::debug!("reading {path} from {}", file.display());
        std::fs::read(&file).map_err(|e| AssetError::io(path, e))
    }
}

/// In-memory asset table, for embedded assets and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the bytes served at `path`.
    #[must_use]
    pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Add (or replace) the bytes served at `path`.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        let _ = self.files.insert(path.to_owned(), bytes.into());
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_owned()))
    }
}
