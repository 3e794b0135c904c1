//! Centralized showcase options with TOML preset support.
//!
//! Every tweakable setting (asset root, per-section camera, lighting,
//! surface, controls and choreography timings) is consolidated here.
//! Options serialize to/from TOML so a page can ship presets.
//!
//! The texture filtering policy applied to displayed models is deliberately
//! absent: it is fixed in [`crate::scene::TEXTURE_POLICY`].

mod assets;
mod camera;
mod controls;
mod hero;
mod lighting;
mod showcase;
mod surface;

use std::path::Path;

pub use assets::AssetOptions;
pub use camera::CameraOptions;
pub use controls::{FloatOptions, OrbitOptions, PresentationOptions};
pub use hero::HeroOptions;
pub use lighting::{ContactShadowOptions, EnvironmentPreset, LightingOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use showcase::{PanelOptions, ShowcaseOptions};
pub use surface::{FrameLoop, PowerPreference, SurfaceOptions};

use crate::error::VitrineError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[hero]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Asset serving.
    pub assets: AssetOptions,
    /// Hero section.
    pub hero: HeroOptions,
    /// Horizontal showcase section.
    pub showcase: ShowcaseOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::OptionsParse`] for malformed TOML or
    /// inconsistent section settings.
    pub fn from_toml(content: &str) -> Result<Self, VitrineError> {
        let options: Self = toml::from_str(content)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::Io`] if the file cannot be read, otherwise as
    /// [`Options::from_toml`].
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let content = std::fs::read_to_string(path).map_err(VitrineError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), VitrineError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VitrineError::Io)?;
        }
        std::fs::write(path, content).map_err(VitrineError::Io)
    }

    /// Serialize to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::OptionsParse`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, VitrineError> {
        toml::to_string_pretty(self)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))
    }

    /// Validate cross-field constraints of every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`VitrineError::OptionsParse`] found.
    pub fn validate(&self) -> Result<(), VitrineError> {
        self.hero.validate()?;
        self.showcase.validate()
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Load a named preset from `dir`, logging the outcome.
    #[must_use]
    pub fn load_preset(name: &str, dir: &Path) -> Option<Self> {
        let path = dir.join(format!("{name}.toml"));
        match Self::load(&path) {
            Ok(options) => {
                log::info!("Loaded options preset '{name}'");
                Some(options)
            }
            Err(e) => {
                log::error!("Failed to load options preset '{name}': {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = opts.to_toml().unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[hero]
switch_interval_ms = 4000
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.hero.switch_interval_ms, 4000);
        // Everything else should be default
        assert_eq!(opts.hero.scales, vec![0.7, 0.65, 0.75]);
        assert_eq!(opts.showcase.dual_switch_interval_ms, 5000);
        assert_eq!(opts.showcase.surface.frame_loop, FrameLoop::Demand);
    }

    #[test]
    fn mismatched_hero_lists_are_rejected() {
        let toml_str = r"
[hero]
scales = [1.0]
";
        let err = Options::from_toml(toml_str).unwrap_err();
        assert!(err.to_string().contains("hero.scales"));
    }

    #[test]
    fn single_panel_showcase_is_rejected() {
        let mut opts = Options::default();
        opts.showcase.panels.truncate(1);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn save_and_load_preset() {
        let dir = std::env::temp_dir()
            .join(format!("vitrine-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.hero.show_intro = false;
        opts.save(&dir.join("calm.toml")).unwrap();

        assert_eq!(Options::list_presets(&dir), vec!["calm".to_owned()]);
        let loaded = Options::load_preset("calm", &dir).unwrap();
        assert!(!loaded.hero.show_intro);
        assert!(Options::load_preset("missing", &dir).is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("assets"));
        assert!(props.contains_key("hero"));
        assert!(props.contains_key("showcase"));

        let hero = &props["hero"]["properties"];
        assert!(hero.get("switch_interval_ms").is_some());
        assert!(hero.get("particle_seed").is_none());
    }
}
