//! Configuration module for tokenhub
//!
//! Loads service config from a TOML file passed with `--config`, falling
//! back to embedded defaults when no file is given. Partial configs are
//! merged with defaults using serde's default attributes.
//!
//! The JSON model registry (`config/models.json`) is a separate document,
//! see [`crate::registry`].

pub mod schema;

pub use schema::Config;
