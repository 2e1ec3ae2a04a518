use crate::error::{Result, TokenHubError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub tokenize: TokenizeConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ModelsConfig {
    /// JSON registry describing the model fleet
    #[serde(default = "default_registry_file")]
    pub registry_file: PathBuf,
    /// Canonical base directory for provisioned artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// Directory a conversion run may write to instead of the canonical target
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,
    /// Directory holding the external conversion scripts
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct TokenizeConfig {
    /// Model served when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_max_length")]
    pub default_max_length: usize,
}

impl Config {
    /// Load config from the given path, or use defaults when `None`
    ///
    /// A path that was explicitly given but does not exist or fails to parse
    /// is a fatal config error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|e| {
            TokenHubError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| TokenHubError::Config(format!("Failed to parse {}: {e}", path.display())))
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_registry_file() -> PathBuf {
    PathBuf::from("config/models.json")
}
fn default_models_dir() -> PathBuf {
    PathBuf::from("/models")
}
fn default_working_dir() -> PathBuf {
    PathBuf::from("models")
}
fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}
fn default_model() -> String {
    "prompt-injection".to_string()
}
fn default_max_length() -> usize {
    512
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            models: ModelsConfig::default(),
            tokenize: TokenizeConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            registry_file: default_registry_file(),
            models_dir: default_models_dir(),
            working_dir: default_working_dir(),
            scripts_dir: default_scripts_dir(),
        }
    }
}

impl Default for TokenizeConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            default_max_length: default_max_length(),
        }
    }
}
