use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::GenerateError;

/// A template archive extracted into a private temporary directory.
///
/// The temporary directory is removed on drop unless [`move_into`] fails,
/// in which case it is kept for manual recovery.
///
/// [`move_into`]: UnpackedTemplate::move_into
#[derive(Debug)]
pub struct UnpackedTemplate {
    workdir: TempDir,
    root: PathBuf,
}

impl UnpackedTemplate {
    /// The archive's single top-level directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rename the template root to `destination` in one move.
    pub fn move_into(self, destination: &Path) -> Result<PathBuf, GenerateError> {
        let UnpackedTemplate { workdir, root } = self;
        match fs::rename(&root, destination) {
            Ok(()) => {
                tracing::debug!(from = %root.display(), to = %destination.display(), "moved template");
                Ok(destination.to_path_buf())
            }
            Err(source) => {
                let _ = workdir.keep();
                tracing::warn!(path = %root.display(), "keeping unpacked template after failed move");
                Err(GenerateError::MoveFailed {
                    to: destination.to_path_buf(),
                    kept: root,
                    source,
                })
            }
        }
    }
}

/// Extract `archive_path` into a fresh temporary directory under `work_parent`
/// and locate the archive's single top-level directory.
pub fn unpack(archive_path: &Path, work_parent: &Path) -> Result<UnpackedTemplate, GenerateError> {
    let failed = |reason: String| GenerateError::UnpackFailed {
        path: archive_path.to_path_buf(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| failed(format!("cannot open archive: {e}")))?;
    let mut archive = ZipArchive::new(file).map_err(|e| failed(format!("corrupt archive: {e}")))?;
    if archive.len() == 0 {
        return Err(failed("archive is empty".to_string()));
    }

    let workdir = tempfile::Builder::new()
        .prefix(".stencil-")
        .tempdir_in(work_parent)
        .map_err(|e| GenerateError::io("creating temp dir in", work_parent, e))?;

    archive
        .extract(workdir.path())
        .map_err(|e| failed(format!("extraction failed: {e}")))?;

    let root = single_top_level_dir(workdir.path()).map_err(failed)?;
    tracing::debug!(root = %root.display(), "unpacked template");
    Ok(UnpackedTemplate { workdir, root })
}

/// The one directory directly inside `dir`, or why there isn't exactly one.
fn single_top_level_dir(dir: &Path) -> Result<PathBuf, String> {
    let entries = fs::read_dir(dir)
        .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
        .map_err(|e| format!("reading extracted files: {e}"))?;

    match entries.as_slice() {
        [] => Err("archive contains no files".to_string()),
        [only] => {
            let is_dir = only
                .file_type()
                .map_err(|e| format!("reading extracted files: {e}"))?
                .is_dir();
            if is_dir {
                Ok(only.path())
            } else {
                Err(format!(
                    "top-level entry '{}' is not a directory",
                    only.file_name().to_string_lossy()
                ))
            }
        }
        many => Err(format!(
            "expected a single top-level directory, found {} entries",
            many.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_directory_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("template-1.0.0")).unwrap();
        let root = single_top_level_dir(dir.path()).unwrap();
        assert!(root.ends_with("template-1.0.0"));
    }

    #[test]
    fn lone_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "hi").unwrap();
        let err = single_top_level_dir(dir.path()).unwrap_err();
        assert!(err.contains("not a directory"), "{err}");
    }

    #[test]
    fn several_entries_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        let err = single_top_level_dir(dir.path()).unwrap_err();
        assert!(err.contains("found 2 entries"), "{err}");
    }

    #[test]
    fn garbage_archive_is_unpack_failed() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("1.0.0.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();
        let err = unpack(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, GenerateError::UnpackFailed { .. }));
    }
}
