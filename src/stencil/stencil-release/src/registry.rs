use std::io::Write;

use serde::Deserialize;

use crate::{Error, ReleaseSet};

/// Number of releases requested per page; a shorter page ends the listing.
pub const PAGE_SIZE: usize = 100;

/// One entry of the remote release listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRelease {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    /// Absent for drafts, which have no published archive.
    #[serde(default)]
    pub zipball_url: Option<String>,
}

/// A paged listing of published releases.
pub trait ReleaseSource {
    /// Fetch one page (1-based) of at most `per_page` releases.
    fn fetch_page(&self, page: u32, per_page: usize) -> Result<Vec<RemoteRelease>, Error>;
}

/// Transfers the bytes behind a URL.
pub trait Downloader {
    /// Stream the body of `url` into `dest`, returning the number of bytes written.
    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64, Error>;
}

/// Walk every page of `source` and collect the valid releases.
///
/// Fails with [`Error::NoValidReleases`] when nothing survives filtering.
pub fn list_releases(source: &dyn ReleaseSource) -> Result<ReleaseSet, Error> {
    let mut releases = Vec::new();
    let mut page = 1;
    loop {
        let batch = source.fetch_page(page, PAGE_SIZE)?;
        let last_page = batch.len() < PAGE_SIZE;
        tracing::debug!(page, count = batch.len(), "fetched release page");
        releases.extend(batch);
        if last_page {
            break;
        }
        page += 1;
    }

    let set = ReleaseSet::from_releases(releases);
    if set.is_empty() {
        return Err(Error::NoValidReleases);
    }
    tracing::info!(
        count = set.versions.len(),
        latest = set.latest.as_deref().unwrap_or_default(),
        "listed template releases"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Serves a fixed number of releases split into pages.
    struct PagedSource {
        total: usize,
        requested: RefCell<Vec<u32>>,
    }

    impl ReleaseSource for PagedSource {
        fn fetch_page(&self, page: u32, per_page: usize) -> Result<Vec<RemoteRelease>, Error> {
            self.requested.borrow_mut().push(page);
            let start = (page as usize - 1) * per_page;
            let end = self.total.min(start + per_page);
            Ok((start..end)
                .map(|i| RemoteRelease {
                    tag_name: format!("0.{i}.0"),
                    draft: false,
                    prerelease: false,
                    zipball_url: Some(format!("https://example.test/{i}.zip")),
                })
                .collect())
        }
    }

    fn paged(total: usize) -> PagedSource {
        PagedSource {
            total,
            requested: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn stops_after_short_page() {
        let source = paged(250);
        let set = list_releases(&source).unwrap();
        assert_eq!(*source.requested.borrow(), vec![1, 2, 3]);
        assert_eq!(set.versions.len(), 250);
        assert_eq!(set.latest.as_deref(), Some("0.249.0"));
    }

    #[test]
    fn exact_multiple_fetches_trailing_empty_page() {
        let source = paged(200);
        list_releases(&source).unwrap();
        assert_eq!(*source.requested.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_listing_is_no_valid_releases() {
        let err = list_releases(&paged(0)).unwrap_err();
        assert!(matches!(err, Error::NoValidReleases));
    }

    #[test]
    fn registry_errors_propagate() {
        struct Down;
        impl ReleaseSource for Down {
            fn fetch_page(&self, _: u32, _: usize) -> Result<Vec<RemoteRelease>, Error> {
                Err(Error::RegistryUnavailable {
                    url: "https://example.test".into(),
                    reason: "connection refused".into(),
                })
            }
        }
        let err = list_releases(&Down).unwrap_err();
        assert!(matches!(err, Error::RegistryUnavailable { .. }));
    }

    #[test]
    fn decodes_github_release_json() {
        let body = indoc::indoc! {r#"
            [
              {"tag_name": "1.2.0", "draft": false, "prerelease": false,
               "zipball_url": "https://api.github.com/repos/o/r/zipball/1.2.0",
               "name": "Release 1.2.0"},
              {"tag_name": "2.0.0-beta.1", "draft": true, "prerelease": true, "zipball_url": null}
            ]
        "#};
        let releases: Vec<RemoteRelease> = serde_json::from_str(body).unwrap();
        assert_eq!(releases.len(), 2);
        assert!(releases[1].draft);
        assert_eq!(releases[1].zipball_url, None);
    }
}
