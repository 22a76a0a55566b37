//! Artifact writing with the clean-output invariant.
//!
//! Each build run fully overwrites the prior artifact for its target: the
//! destination directory is emptied, then files are written via temp file
//! plus rename so readers never observe partial contents. If any write
//! fails, previously written temp files are removed. Combined with the
//! pipeline's produce-then-write ordering, a failed build leaves no stale
//! or half-written output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Reject output filenames that could escape the output directory.
pub fn validate_output_filename(filename: &str) -> Result<()> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("empty filename".to_string()));
    }
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "filename contains null byte".to_string(),
        ));
    }
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(Error::InvalidOutputPath(format!(
            "filename must not contain path separators: '{filename}'"
        )));
    }
    Ok(())
}

/// Empty the output directory, creating it if missing.
pub fn clean_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        if !out_dir.is_dir() {
            return Err(Error::InvalidOutputPath(format!(
                "output path exists but is not a directory: {}",
                out_dir.display()
            )));
        }
        // Remove all contents but keep the directory itself.
        for entry in fs::read_dir(out_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        fs::create_dir_all(out_dir)?;
    }
    Ok(())
}

/// Write all files atomically: temp files first, then rename. Rolls back
/// temp files if anything fails.
pub fn write_files_atomic(operations: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut temp_files: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                cleanup_temp_files(&temp_files);
                return Err(Error::WriteFailure(format!(
                    "failed to create directory '{}': {e}",
                    parent.display()
                )));
            }
        }

        let temp_path = temp_path_for(target_path);
        if let Err(e) = fs::write(&temp_path, content) {
            cleanup_temp_files(&temp_files);
            return Err(Error::WriteFailure(format!(
                "failed to write temporary file '{}': {e}",
                temp_path.display()
            )));
        }
        temp_files.push((temp_path, target_path.clone()));
    }

    for (temp_path, target_path) in &temp_files {
        if let Err(e) = fs::rename(temp_path, target_path) {
            cleanup_temp_files(&temp_files);
            return Err(Error::WriteFailure(format!(
                "failed to rename '{}' to '{}': {e}",
                temp_path.display(),
                target_path.display()
            )));
        }
    }

    Ok(())
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".tmp");
    target.with_file_name(name)
}

/// Best-effort cleanup; errors are logged, not propagated, since the
/// caller is already failing.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn filename_validation() {
        assert!(validate_output_filename("app.min.js").is_ok());
        assert!(validate_output_filename("main.gs").is_ok());
        assert!(validate_output_filename("").is_err());
        assert!(validate_output_filename("../escape.js").is_err());
        assert!(validate_output_filename("nested/out.js").is_err());
    }

    #[test]
    fn clean_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn clean_removes_stale_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(out.join("nested")).unwrap();
        fs::write(out.join("stale.js"), "old").unwrap();
        fs::write(out.join("nested/deep.js"), "old").unwrap();

        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn clean_refuses_non_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::write(&out, "file").unwrap();
        assert!(matches!(
            clean_output_dir(&out),
            Err(Error::InvalidOutputPath(_))
        ));
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("bundle.js");
        write_files_atomic(&[(target.clone(), b"content".to_vec())]).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
