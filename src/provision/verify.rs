use std::path::Path;

/// Check whether a model's artifacts are present in a directory
///
/// Presence is decided by the primary check file (the first entry) alone;
/// the remaining filenames are informational. A missing directory simply
/// yields `false`, there is no error path.
#[must_use]
pub fn artifacts_present(dir: &Path, check_files: &[String]) -> bool {
    match check_files.first() {
        Some(primary) => dir.join(primary).is_file(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_missing_directory_yields_false() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(!artifacts_present(&missing, &files(&["model.onnx"])));
    }

    #[test]
    fn test_primary_file_decides() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model.onnx"), "onnx").unwrap();

        // Secondary files are informational: presence of the primary alone
        // counts, absence of the primary alone fails.
        assert!(artifacts_present(
            dir.path(),
            &files(&["model.onnx", "tokenizer.json"])
        ));
        assert!(!artifacts_present(
            dir.path(),
            &files(&["tokenizer.json", "model.onnx"])
        ));
    }

    #[test]
    fn test_empty_check_files_yields_false() {
        let dir = TempDir::new().unwrap();
        assert!(!artifacts_present(dir.path(), &[]));
    }

    #[test]
    fn test_directory_named_like_primary_does_not_count() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("model.onnx")).unwrap();
        assert!(!artifacts_present(dir.path(), &files(&["model.onnx"])));
    }
}
