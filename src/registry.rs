//! Model registry
//!
//! Parses the declarative JSON registry (`config/models.json` by default)
//! describing every model the fleet knows about. The same document drives
//! both halves of the system: provisioning iterates it to materialize
//! artifacts, and the serving layer loads one tokenizer per entry.

use crate::error::{Result, TokenHubError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One declared model's provisioning metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    /// Unique, stable key used everywhere a model is referenced
    pub id: String,
    /// Human-readable display name
    pub name: String,
    /// Upstream HuggingFace repository path
    pub huggingface_model: String,
    /// Directory name under the models base dir holding the artifacts
    pub output_dir: String,
    /// Files proving presence; the first entry alone decides "provisioned"
    #[serde(default = "default_check_files")]
    pub check_files: Vec<String>,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_opset_version")]
    pub opset_version: u32,
}

impl ModelEntry {
    /// The primary check file; its presence alone decides provisioned status
    #[must_use]
    pub fn primary_check_file(&self) -> &str {
        self.check_files
            .first()
            .map_or("model.onnx", String::as_str)
    }

    /// Canonical target directory for this model's artifacts
    #[must_use]
    pub fn target_dir(&self, models_dir: &Path) -> PathBuf {
        models_dir.join(&self.output_dir)
    }
}

/// Registry-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_conversion_script")]
    pub conversion_script: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            conversion_script: default_conversion_script(),
        }
    }
}

/// The parsed registry document: a `models` list plus a `config` object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRegistry {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    #[serde(default)]
    pub config: GlobalConfig,
}

impl ModelRegistry {
    /// Load the registry from a JSON file
    ///
    /// A missing file is not an error: provisioning with nothing declared is
    /// a no-op, so this returns an empty registry and logs a warning. A file
    /// that exists but fails to parse or validate is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Registry file not found: {}, using empty registry",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let registry: Self = serde_json::from_str(&content).map_err(|e| {
            TokenHubError::Registry(format!("Failed to parse {}: {e}", path.display()))
        })?;

        registry.validate()?;

        tracing::info!(
            "Loaded registry from {} ({} model(s))",
            path.display(),
            registry.models.len()
        );

        Ok(registry)
    }

    /// Check the invariants the rest of the system relies on
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.models {
            if !seen.insert(entry.id.as_str()) {
                return Err(TokenHubError::Registry(format!(
                    "Duplicate model id '{}'",
                    entry.id
                )));
            }
            if entry.check_files.is_empty() {
                return Err(TokenHubError::Registry(format!(
                    "Model '{}' has an empty check_files list",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    /// Find a model by identifier
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Find a model by its canonical output directory name
    #[must_use]
    pub fn find_by_output_dir(&self, output_dir: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.output_dir == output_dir)
    }

    /// Find a model by its upstream repository reference
    #[must_use]
    pub fn find_by_source(&self, huggingface_model: &str) -> Option<&ModelEntry> {
        self.models
            .iter()
            .find(|m| m.huggingface_model == huggingface_model)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

// Default value functions
fn default_check_files() -> Vec<String> {
    vec!["model.onnx".to_string()]
}
fn default_task_type() -> String {
    "sequence-classification".to_string()
}
fn default_max_length() -> usize {
    512
}
fn default_opset_version() -> u32 {
    14
}
fn default_conversion_script() -> String {
    "convert_to_onnx.py".to_string()
}
