use crate::registry::ModelEntry;
use std::path::{Path, PathBuf};

/// Filenames that mark a model directory as a usable local tokenizer source
const TOKENIZER_FILES: &[&str] = &["tokenizer.json", "tokenizer_config.json", "spm.model"];

/// Where a model's tokenizer should be loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Provisioned artifacts in the canonical model directory
    Local(PathBuf),
    /// Upstream HuggingFace repository path
    Remote(String),
}

/// Resolve the load source for one model, local-first
///
/// The local canonical directory wins when it contains at least one
/// recognized tokenizer artifact; otherwise the remote reference is used.
/// This is only the precedence decision: a local source that later fails to
/// load still gets one retry against the remote reference.
#[must_use]
pub fn resolve_source(models_dir: &Path, entry: &ModelEntry) -> LoadSource {
    let dir = entry.target_dir(models_dir);
    if TOKENIZER_FILES.iter().any(|f| dir.join(f).is_file()) {
        LoadSource::Local(dir)
    } else {
        LoadSource::Remote(entry.huggingface_model.clone())
    }
}
