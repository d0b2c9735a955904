use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::registry::{ReleaseSource, list_releases};
use crate::{Error, ReleaseSet};

/// How long a cached release list is trusted before refetching.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(4 * 60 * 60);

/// On-disk form of the cached release list.
#[derive(Deserialize)]
struct CacheEntry {
    #[serde(flatten)]
    releases: ReleaseSet,
    /// Seconds since the Unix epoch; entries without it fall back to the file mtime.
    #[serde(default)]
    fetched_at: Option<u64>,
}

#[derive(Serialize)]
struct CacheEntryRef<'a> {
    #[serde(flatten)]
    releases: &'a ReleaseSet,
    fetched_at: u64,
}

/// The release list cache, a single JSON file.
#[derive(Debug, Clone)]
pub struct ReleaseCache {
    path: PathBuf,
    max_age: Duration,
}

impl ReleaseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: FRESHNESS_WINDOW,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached releases if fresh, otherwise refetch from `source`.
    pub fn get_releases(
        &self,
        source: &dyn ReleaseSource,
        force_refresh: bool,
    ) -> Result<ReleaseSet, Error> {
        self.get_releases_at(source, force_refresh, SystemTime::now())
    }

    /// Same as [`get_releases`](Self::get_releases) with an explicit current time.
    pub fn get_releases_at(
        &self,
        source: &dyn ReleaseSource,
        force_refresh: bool,
        now: SystemTime,
    ) -> Result<ReleaseSet, Error> {
        if !force_refresh {
            if let Some(releases) = self.load_fresh(now) {
                tracing::debug!(path = %self.path.display(), "using cached release list");
                return Ok(releases);
            }
        }

        tracing::info!("fetching release list");
        let releases = list_releases(source)?;
        self.store(&releases, now)?;
        Ok(releases)
    }

    /// Read the cache file, returning it only when younger than the freshness window.
    pub fn load_fresh(&self, now: SystemTime) -> Option<ReleaseSet> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable release cache: {e}");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring malformed release cache: {e}");
                return None;
            }
        };

        let written = match entry.fetched_at {
            Some(secs) => UNIX_EPOCH + Duration::from_secs(secs),
            None => fs::metadata(&self.path).and_then(|m| m.modified()).ok()?,
        };
        // A timestamp in the future counts as brand new.
        let age = now.duration_since(written).unwrap_or_default();
        if age < self.max_age {
            let releases = entry.releases.revalidated();
            if releases.is_empty() {
                tracing::warn!(path = %self.path.display(), "ignoring release cache without valid versions");
                return None;
            }
            Some(releases)
        } else {
            tracing::debug!(age_secs = age.as_secs(), "release cache is stale");
            None
        }
    }

    /// Overwrite the cache with `releases`, stamped with `now`.
    ///
    /// Written to a sibling temp file and renamed into place.
    pub fn store(&self, releases: &ReleaseSet, now: SystemTime) -> Result<(), Error> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| Error::io("creating", dir, e))?;

        let entry = CacheEntryRef {
            releases,
            fetched_at: now
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io("creating temp file in", dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, &entry).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io("writing", &self.path, e.error))?;
        Ok(())
    }
}
