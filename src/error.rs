//! Crate-level error types.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "gpu")]
use crate::renderer::gpu::GpuError;

/// Errors produced while fetching or importing a model asset.
///
/// Cheap to clone: every consumer waiting on a failed path receives the same
/// error value.
#[derive(Debug, Clone)]
pub enum AssetError {
    /// No asset exists at the requested path.
    NotFound(String),
    /// The path escapes the asset root or is otherwise malformed.
    InvalidPath(String),
    /// Reading the asset failed.
    Io {
        /// Requested asset path.
        path: String,
        /// Underlying I/O failure.
        source: Arc<std::io::Error>,
    },
    /// The bytes are not a valid glTF document.
    Parse {
        /// Requested asset path.
        path: String,
        /// Parser message.
        message: String,
    },
    /// The document has no scene to display.
    EmptyScene(String),
    /// The document uses a feature the importer does not handle.
    Unsupported {
        /// Requested asset path.
        path: String,
        /// What was not supported.
        message: String,
    },
    /// The background loader thread could not be started.
    LoaderSpawn(Arc<std::io::Error>),
}

impl AssetError {
    /// Wrap an I/O error for the given path, mapping `NotFound` onto
    /// [`AssetError::NotFound`].
    #[must_use]
    pub fn io(path: &str, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_owned())
        } else {
            Self::Io {
                path: path.to_owned(),
                source: Arc::new(error),
            }
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "asset not found: {path}"),
            Self::InvalidPath(path) => write!(f, "invalid asset path: {path}"),
            Self::Io { path, source } => {
                write!(f, "failed to read asset {path}: {source}")
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse glTF {path}: {message}")
            }
            Self::EmptyScene(path) => write!(f, "glTF {path} has no scene"),
            Self::Unsupported { path, message } => {
                write!(f, "unsupported glTF content in {path}: {message}")
            }
            Self::LoaderSpawn(e) => {
                write!(f, "failed to spawn asset loader: {e}")
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::LoaderSpawn(source) => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

/// Errors produced by the vitrine crate.
#[derive(Debug)]
pub enum VitrineError {
    /// Model asset failure.
    Asset(AssetError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// GPU surface initialization failure.
    #[cfg(feature = "gpu")]
    Gpu(GpuError),
    /// A timeline or scroll binding was declared inconsistently.
    InvalidTimeline(String),
    /// A trigger referenced an element missing from the page layout.
    Layout(String),
}

impl fmt::Display for VitrineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(e) => write!(f, "asset error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            #[cfg(feature = "gpu")]
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::InvalidTimeline(msg) => {
                write!(f, "invalid timeline: {msg}")
            }
            Self::Layout(msg) => write!(f, "layout error: {msg}"),
        }
    }
}

impl std::error::Error for VitrineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Asset(e) => Some(e),
            Self::Io(e) => Some(e),
            #[cfg(feature = "gpu")]
            Self::Gpu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AssetError> for VitrineError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<std::io::Error> for VitrineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "gpu")]
impl From<GpuError> for VitrineError {
    fn from(e: GpuError) -> Self {
        Self::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = AssetError::io(
            "/glb/missing.glb",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, AssetError::NotFound(ref p) if p == "/glb/missing.glb"));
    }

    #[test]
    fn asset_error_source_chain() {
        use std::error::Error;
        let err = AssetError::io(
            "/glb/a.glb",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.source().is_some());
        let wrapped = VitrineError::from(err);
        assert!(wrapped.to_string().starts_with("asset error:"));
        assert!(wrapped.source().is_some());
    }
}
