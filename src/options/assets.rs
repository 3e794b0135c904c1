use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Assets", inline)]
#[serde(default)]
/// Where model files are served from.
pub struct AssetOptions {
    /// Static directory page-absolute paths resolve under.
    pub root: PathBuf,
    /// Fetch and parse on background threads.
    pub background_loading: bool,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            background_loading: true,
        }
    }
}
