//! In-place patching of an assembly source file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::rules::patch_source;

/// Errors from reading or rewriting the source file.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// What [`patch_file`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The source file does not exist; nothing to patch.
    SourceMissing(PathBuf),
    /// The file already uses the qualified form.
    AlreadyPatched,
    /// No legacy declarations were found; the file was left untouched.
    NothingToPatch,
    /// Declarations were qualified and the file rewritten.
    Patched {
        qualified: usize,
        /// Set when this call created the backup.
        backup_created: Option<PathBuf>,
    },
}

/// Backup location: the source path with `suffix` appended to its name.
pub fn backup_path(source: &Path, suffix: &str) -> PathBuf {
    let mut name = source
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    source.with_file_name(name)
}

/// Patch `source` in place.
///
/// A missing file is not an error. Before the first modification the
/// original is copied to [`backup_path`]; an existing backup is never
/// overwritten.
pub fn patch_file(source: &Path, backup_suffix: &str) -> PatchResult<PatchOutcome> {
    if !source.exists() {
        tracing::debug!("{} not found, skipping patch", source.display());
        return Ok(PatchOutcome::SourceMissing(source.to_path_buf()));
    }

    let content = fs::read_to_string(source).map_err(|e| PatchError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;

    if super::rules::is_patched(&content) {
        return Ok(PatchOutcome::AlreadyPatched);
    }

    let patched = patch_source(&content);
    if patched.qualified == 0 {
        return Ok(PatchOutcome::NothingToPatch);
    }

    let backup = backup_path(source, backup_suffix);
    let backup_created = if backup.exists() {
        None
    } else {
        fs::copy(source, &backup).map_err(|e| PatchError::Backup {
            path: backup.clone(),
            source: e,
        })?;
        Some(backup)
    };

    fs::write(source, patched.text).map_err(|e| PatchError::Write {
        path: source.to_path_buf(),
        source: e,
    })?;

    tracing::info!(
        "Qualified {} declarations in {}",
        patched.qualified,
        source.display()
    );

    Ok(PatchOutcome::Patched {
        qualified: patched.qualified,
        backup_created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LEGACY: &str = "; video player\nPULLDOWN_SKIPF EQU 1\n  ROWS EQU 9\nINCLUDE \"hw.inc\"\n";

    #[test]
    fn missing_source_is_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("src").join("video.asm");
        let outcome = patch_file(&path, ".bak").unwrap();
        assert_eq!(outcome, PatchOutcome::SourceMissing(path));
    }

    #[test]
    fn patches_and_backs_up_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video.asm");
        fs::write(&path, LEGACY).unwrap();

        let outcome = patch_file(&path, ".bak").unwrap();
        let backup = dir.path().join("video.asm.bak");
        assert_eq!(
            outcome,
            PatchOutcome::Patched {
                qualified: 2,
                backup_created: Some(backup.clone()),
            }
        );
        assert_eq!(fs::read_to_string(&backup).unwrap(), LEGACY);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "; video player\nDEF PULLDOWN_SKIPF EQU 1\n  DEF ROWS EQU 9\nINCLUDE \"hw.inc\"\n"
        );
    }

    #[test]
    fn second_run_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video.asm");
        fs::write(&path, LEGACY).unwrap();

        patch_file(&path, ".bak").unwrap();
        let after_first = fs::read_to_string(&path).unwrap();

        let outcome = patch_file(&path, ".bak").unwrap();
        assert_eq!(outcome, PatchOutcome::AlreadyPatched);
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn existing_backup_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video.asm");
        let backup = dir.path().join("video.asm.bak");
        fs::write(&path, LEGACY).unwrap();
        fs::write(&backup, "pristine").unwrap();

        let outcome = patch_file(&path, ".bak").unwrap();
        assert!(matches!(
            outcome,
            PatchOutcome::Patched {
                backup_created: None,
                ..
            }
        ));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "pristine");
    }

    #[test]
    fn file_without_declarations_is_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("video.asm");
        fs::write(&path, "    ld a, 1\n").unwrap();

        assert_eq!(patch_file(&path, ".bak").unwrap(), PatchOutcome::NothingToPatch);
        assert!(!dir.path().join("video.asm.bak").exists());
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/repo/src/video.asm"), ".bak"),
            PathBuf::from("/repo/src/video.asm.bak")
        );
    }
}
