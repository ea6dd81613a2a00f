use shared::ModelInfo;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::config::ModelManifest;
use super::model::{Classifier, InferenceError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
    #[error("Failed to load model '{key}': {source}")]
    Load { key: String, source: InferenceError },
}

/// The fixed classifier menu plus the weights already loaded into memory.
/// Loaded plans are memoized so repeat requests reuse them.
pub struct ModelRegistry {
    manifest: ModelManifest,
    loaded: RwLock<HashMap<String, Arc<Classifier>>>,
}

impl ModelRegistry {
    pub fn new(manifest: ModelManifest) -> Self {
        Self {
            manifest,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_key(&self) -> &str {
        &self.manifest.default
    }

    /// The default model is loaded eagerly at startup; the rest of the menu
    /// loads on first use.
    pub async fn preload_default(&self) -> Result<Arc<Classifier>, RegistryError> {
        self.get_or_load(self.default_key()).await
    }

    pub async fn get_or_load(&self, key: &str) -> Result<Arc<Classifier>, RegistryError> {
        if let Some(classifier) = self.loaded.read().await.get(key) {
            return Ok(classifier.clone());
        }

        let spec = self
            .manifest
            .models
            .get(key)
            .ok_or_else(|| RegistryError::UnknownModel(key.to_string()))?;
        let classifier = Arc::new(Classifier::load(key, spec).map_err(|source| {
            RegistryError::Load {
                key: key.to_string(),
                source,
            }
        })?);

        // Two requests may race to load the same model; the first insert wins.
        let mut loaded = self.loaded.write().await;
        let entry = loaded
            .entry(key.to_string())
            .or_insert_with(|| classifier.clone());
        Ok(entry.clone())
    }

    pub async fn menu(&self) -> Vec<ModelInfo> {
        let loaded = self.loaded.read().await;
        self.manifest
            .models
            .iter()
            .map(|(key, spec)| ModelInfo {
                key: key.clone(),
                label: spec.label.clone(),
                input_width: spec.input.width,
                input_height: spec.input.height,
                loaded: loaded.contains_key(key),
            })
            .collect()
    }
}
