use std::fs;
use std::path::{Path, PathBuf};

use crate::Error;
use crate::registry::Downloader;

/// Directory of downloaded template archives, one `<version>.zip` per version.
#[derive(Debug, Clone)]
pub struct ArchiveCache {
    dir: PathBuf,
}

impl ArchiveCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the archive for `version` lives, whether or not it exists yet.
    pub fn archive_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{version}.zip"))
    }

    /// Return the local archive for `version`, downloading `url` when it is
    /// missing or `force_refresh` is set.
    ///
    /// The cache is keyed by version only; `url` is never consulted for an
    /// existing file.
    pub fn get_archive(
        &self,
        downloader: &dyn Downloader,
        version: &str,
        url: &str,
        force_refresh: bool,
    ) -> Result<PathBuf, Error> {
        let path = self.archive_path(version);
        if !force_refresh && path.is_file() {
            tracing::debug!(path = %path.display(), "using cached archive");
            return Ok(path);
        }

        fs::create_dir_all(&self.dir).map_err(|e| Error::io("creating", &self.dir, e))?;

        // Dropped (and removed) on any error before the rename.
        let mut partial = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".part")
            .tempfile_in(&self.dir)
            .map_err(|e| Error::io("creating temp file in", &self.dir, e))?;

        tracing::info!(version, "downloading template archive");
        let bytes = downloader.download(url, &mut partial)?;

        partial
            .persist(&path)
            .map_err(|e| Error::io("writing", &path, e.error))?;
        tracing::debug!(bytes, path = %path.display(), "stored archive");
        Ok(path)
    }
}
