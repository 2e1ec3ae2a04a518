use crate::provision::convert::Converter;
use crate::provision::verify::artifacts_present;
use crate::registry::{ModelEntry, ModelRegistry};
use std::fs;
use std::path::{Path, PathBuf};

/// Terminal state of one registry entry after a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionStatus {
    /// Artifacts were already at the canonical target, nothing done
    AlreadyPresent,
    /// Conversion ran and wrote directly to the canonical target
    Downloaded,
    /// Conversion wrote to the working directory; artifacts were relocated
    Moved,
    /// Conversion failed or the expected artifact never materialized
    Failed(String),
}

/// Per-entry outcome paired with the entry's identity
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub id: String,
    pub name: String,
    pub status: ProvisionStatus,
}

/// Aggregated result of one orchestrator run
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub outcomes: Vec<ModelOutcome>,
    pub started_at: String,
}

impl ProvisionReport {
    /// A run succeeds iff no entry terminated in `Failed`
    #[must_use]
    pub fn success(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|o| matches!(o.status, ProvisionStatus::Failed(_)))
    }

    /// Entries that ended in the given non-failure state
    #[must_use]
    pub fn count(&self, status: &ProvisionStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == *status).count()
    }

    /// Entries that terminated in `Failed`
    #[must_use]
    pub fn failed(&self) -> Vec<&ModelOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ProvisionStatus::Failed(_)))
            .collect()
    }
}

/// Settings for one provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Re-provision every entry regardless of existing artifacts
    pub force: bool,
    /// Canonical base directory for model artifacts
    pub models_dir: PathBuf,
    /// Directory a conversion run may write to instead of the target
    pub working_dir: PathBuf,
}

/// Drives the per-entry provisioning state machine over a registry
pub struct Provisioner<C: Converter> {
    converter: C,
    options: ProvisionOptions,
}

impl<C: Converter> Provisioner<C> {
    #[must_use]
    pub fn new(converter: C, options: ProvisionOptions) -> Self {
        Self { converter, options }
    }

    /// Process every registry entry in declared order
    ///
    /// Entries are independent: one entry's failure is recorded and the run
    /// continues with the next one.
    pub fn run(&self, registry: &ModelRegistry) -> ProvisionReport {
        let started_at = chrono::Utc::now().to_rfc3339();
        let mut outcomes = Vec::with_capacity(registry.models.len());

        for entry in &registry.models {
            let status = self.provision_entry(entry);
            match &status {
                ProvisionStatus::AlreadyPresent => {
                    tracing::info!("{}: already present", entry.name);
                }
                ProvisionStatus::Downloaded => {
                    tracing::info!("{}: downloaded", entry.name);
                }
                ProvisionStatus::Moved => {
                    tracing::info!("{}: downloaded and relocated", entry.name);
                }
                ProvisionStatus::Failed(reason) => {
                    tracing::error!("{}: {reason}", entry.name);
                }
            }

            outcomes.push(ModelOutcome {
                id: entry.id.clone(),
                name: entry.name.clone(),
                status,
            });
        }

        ProvisionReport {
            outcomes,
            started_at,
        }
    }

    fn provision_entry(&self, entry: &ModelEntry) -> ProvisionStatus {
        let target = entry.target_dir(&self.options.models_dir);

        if !self.options.force && artifacts_present(&target, &entry.check_files) {
            return ProvisionStatus::AlreadyPresent;
        }

        if !self.converter.convert(entry) {
            return ProvisionStatus::Failed("conversion failed".to_string());
        }

        if artifacts_present(&target, &entry.check_files) {
            return ProvisionStatus::Downloaded;
        }

        // A conversion run may write under its own working tree instead of
        // the canonical target. Best-effort recovery: copy the files over
        // and verify again.
        let working = self.options.working_dir.join(&entry.output_dir);
        if artifacts_present(&working, &entry.check_files) {
            tracing::info!(
                "Relocating artifacts from {} to {}",
                working.display(),
                target.display()
            );
            if let Err(e) = relocate(&working, &target) {
                return ProvisionStatus::Failed(format!("relocation failed: {e}"));
            }
            if artifacts_present(&target, &entry.check_files) {
                return ProvisionStatus::Moved;
            }
        }

        ProvisionStatus::Failed(format!(
            "'{}' missing after conversion",
            entry.primary_check_file()
        ))
    }
}

/// Copy every regular file from `working` into `target`
fn relocate(working: &Path, target: &Path) -> std::io::Result<()> {
    fs::create_dir_all(target)?;
    for item in fs::read_dir(working)? {
        let item = item?;
        let path = item.path();
        if path.is_file() {
            fs::copy(&path, target.join(item.file_name()))?;
        }
    }
    Ok(())
}

/// Count registry entries whose canonical target lacks the primary check file
///
/// Backs `--check-only`: report what a run would do, download nothing.
#[must_use]
pub fn missing_count(registry: &ModelRegistry, models_dir: &Path) -> usize {
    registry
        .models
        .iter()
        .filter(|entry| !artifacts_present(&entry.target_dir(models_dir), &entry.check_files))
        .count()
}
