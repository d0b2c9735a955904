//! Release discovery and caching for stencil templates.
//!
//! Lists the published releases of a template repository, keeps the list
//! in a small on-disk cache with a freshness window, and keeps one zip
//! archive per template version so repeated runs skip the download.

use std::path::PathBuf;

mod archive;
mod cache;
mod github;
mod registry;
mod release_set;

pub use archive::ArchiveCache;
pub use cache::{FRESHNESS_WINDOW, ReleaseCache};
pub use github::GithubClient;
pub use registry::{Downloader, PAGE_SIZE, ReleaseSource, RemoteRelease, list_releases};
pub use release_set::{LATEST, ReleaseSet, ResolvedRelease, parse_tag};

// ============================================================================
// Error type
// ============================================================================

/// Errors that can occur while resolving, caching or downloading releases.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("release registry unavailable ({url}): {reason}")]
    RegistryUnavailable { url: String, reason: String },

    #[error("no published releases with a semantic version tag")]
    NoValidReleases,

    #[error("unknown template version '{requested}' (available: {available})")]
    UnknownVersion { requested: String, available: String },

    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
