use std::collections::BTreeMap;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::registry::RemoteRelease;

/// Version selector that resolves to the newest release.
pub const LATEST: &str = "latest";

/// Published template versions mapped to their archive URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSet {
    /// Release tag -> archive download URL.
    pub versions: BTreeMap<String, String>,
    /// Highest tag by semantic-version ordering, `None` when `versions` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
}

/// A release picked out of a [`ReleaseSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub version: String,
    pub url: String,
}

/// Parse a release tag as a semantic version, accepting a leading `v`.
pub fn parse_tag(tag: &str) -> Option<Version> {
    let bare = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(bare).ok()
}

impl ReleaseSet {
    /// Build a set from raw releases, dropping drafts, prereleases,
    /// releases without an archive, and tags that are not semver.
    pub fn from_releases<I>(releases: I) -> Self
    where
        I: IntoIterator<Item = RemoteRelease>,
    {
        let mut versions = BTreeMap::new();
        for release in releases {
            if release.draft || release.prerelease {
                tracing::debug!(tag = %release.tag_name, "skipping draft or prerelease");
                continue;
            }
            if parse_tag(&release.tag_name).is_none() {
                tracing::debug!(tag = %release.tag_name, "skipping non-semver tag");
                continue;
            }
            let Some(url) = release.zipball_url else {
                tracing::debug!(tag = %release.tag_name, "skipping release without archive");
                continue;
            };
            versions.insert(release.tag_name, url);
        }

        let latest = max_version(versions.keys());
        ReleaseSet { versions, latest }
    }

    /// Drop tags that are not semver and recompute `latest`.
    ///
    /// For sets read back from disk, which may be stale or hand-edited.
    pub fn revalidated(mut self) -> Self {
        self.versions.retain(|tag, _| {
            let valid = parse_tag(tag).is_some();
            if !valid {
                tracing::warn!(%tag, "dropping non-semver tag from cached releases");
            }
            valid
        });
        self.latest = max_version(self.versions.keys());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Resolve a requested version (or [`LATEST`]) to a release in this set.
    ///
    /// An exact tag match wins; otherwise a tag naming the same semantic
    /// version with or without the `v` prefix is accepted.
    pub fn resolve(&self, requested: &str) -> Result<ResolvedRelease, Error> {
        let wanted = if requested == LATEST {
            self.latest
                .as_deref()
                .ok_or_else(|| self.unknown_version(requested))?
        } else {
            requested
        };

        if let Some((tag, url)) = self.versions.get_key_value(wanted) {
            return Ok(ResolvedRelease {
                version: tag.clone(),
                url: url.clone(),
            });
        }

        let parsed = parse_tag(wanted).ok_or_else(|| self.unknown_version(requested))?;
        self.versions
            .iter()
            .find(|(tag, _)| parse_tag(tag).as_ref() == Some(&parsed))
            .map(|(tag, url)| ResolvedRelease {
                version: tag.clone(),
                url: url.clone(),
            })
            .ok_or_else(|| self.unknown_version(requested))
    }

    fn unknown_version(&self, requested: &str) -> Error {
        let available = if self.versions.is_empty() {
            "none".to_string()
        } else {
            self.versions
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        Error::UnknownVersion {
            requested: requested.to_string(),
            available,
        }
    }
}

fn max_version<'a>(tags: impl Iterator<Item = &'a String>) -> Option<String> {
    tags.filter_map(|tag| parse_tag(tag).map(|version| (version, tag)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, tag)| tag.clone())
}
