//! Model provisioning
//!
//! Walks the declared registry, checks which models already have artifacts
//! on disk, and drives the external conversion procedure only for the ones
//! that are missing. Per-model failures are isolated and collected into a
//! run report; a failed entry never stops the rest of the batch.

pub mod convert;
pub mod orchestrator;
pub mod verify;

pub use convert::{Converter, ScriptConverter};
pub use orchestrator::{
    missing_count, ModelOutcome, ProvisionOptions, ProvisionReport, ProvisionStatus, Provisioner,
};
pub use verify::artifacts_present;
