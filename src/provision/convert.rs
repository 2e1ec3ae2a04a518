use crate::error::{Result, TokenHubError};
use crate::registry::ModelEntry;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Boundary to the external conversion procedure
///
/// The orchestrator never inspects the procedure's internal steps; it only
/// needs a success/failure signal. Tests substitute a fake implementation
/// instead of spawning real processes.
pub trait Converter {
    /// Run the conversion for one registry entry, returning `true` on success
    ///
    /// Any diagnostic detail belongs to the procedure itself (or to logs);
    /// callers only branch on the boolean.
    fn convert(&self, entry: &ModelEntry) -> bool;
}

/// Converter that launches the registry-named Python script
///
/// The script receives the model identifier as `--config-id` so it can
/// re-resolve the same registry entry on its own.
#[derive(Debug)]
pub struct ScriptConverter {
    interpreter: PathBuf,
    script: PathBuf,
}

impl ScriptConverter {
    /// Create a converter for the given scripts directory and script name
    ///
    /// # Errors
    /// - Returns error if the conversion script does not exist
    /// - Returns error if no Python interpreter is found in PATH
    pub fn new(scripts_dir: &Path, script_name: &str) -> Result<Self> {
        let script = scripts_dir.join(script_name);
        if !script.is_file() {
            return Err(TokenHubError::Config(format!(
                "Conversion script not found: {}",
                script.display()
            )));
        }

        let interpreter = which::which("python3")
            .or_else(|_| which::which("python"))
            .map_err(|_| {
                TokenHubError::Config("No python interpreter found in PATH".to_string())
            })?;

        Ok(Self {
            interpreter,
            script,
        })
    }
}

impl Converter for ScriptConverter {
    fn convert(&self, entry: &ModelEntry) -> bool {
        tracing::info!(
            "Running {} for model '{}'",
            self.script.display(),
            entry.id
        );

        let status = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg("--config-id")
            .arg(&entry.id)
            .status();

        match status {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::warn!(
                    "Conversion for '{}' exited with {}",
                    entry.id,
                    status
                );
                false
            }
            Err(e) => {
                tracing::warn!("Failed to launch conversion for '{}': {e}", entry.id);
                false
            }
        }
    }
}
