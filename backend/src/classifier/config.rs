use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to resolve manifest directory")]
    ManifestDir,
    #[error("IO error reading manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Default model '{0}' is not defined in the manifest")]
    MissingDefault(String),
    #[error("Model '{key}' declares {channels} input channels, expected 3")]
    BadChannels { key: String, channels: u32 },
}

/// Pixel scaling applied before the forward pass. `Scale` divides by 255,
/// `Mobilenet` maps into [-1, 1] the way the MobileNetV2 preprocessing does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    Scale,
    Mobilenet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputShape {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub label: String,
    pub path: String,
    pub input: InputShape,
    pub normalization: Normalization,
    /// Set when the exported graph emits logits instead of probabilities.
    #[serde(default)]
    pub softmax: bool,
}

/// The fixed classifier menu, read once at startup from `config/models.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: f32,
    pub default: String,
    pub models: BTreeMap<String, ModelSpec>,
}

impl ModelManifest {
    pub fn load() -> Result<Self, ConfigError> {
        let manifest_dir =
            std::env::var("CARGO_MANIFEST_DIR").map_err(|_| ConfigError::ManifestDir)?;
        let base = format!("{}/..", manifest_dir);
        let config_path = std::env::var("MODELS_CONFIG")
            .unwrap_or_else(|_| format!("{}/config/models.yaml", base));
        let config_str = std::fs::read_to_string(config_path)?;
        let mut manifest = Self::parse(&config_str)?;
        manifest.resolve_paths(&base);
        Ok(manifest)
    }

    pub fn parse(config_str: &str) -> Result<Self, ConfigError> {
        let manifest: ModelManifest = serde_yaml::from_str(config_str)?;
        if !manifest.models.contains_key(&manifest.default) {
            return Err(ConfigError::MissingDefault(manifest.default));
        }
        for (key, spec) in &manifest.models {
            if spec.input.channels != 3 {
                return Err(ConfigError::BadChannels {
                    key: key.clone(),
                    channels: spec.input.channels,
                });
            }
        }
        Ok(manifest)
    }

    /// Model files are listed relative to the workspace root.
    fn resolve_paths(&mut self, base: &str) {
        for spec in self.models.values_mut() {
            if Path::new(&spec.path).is_relative() {
                spec.path = format!("{}/{}", base, spec.path);
            }
        }
    }
}
