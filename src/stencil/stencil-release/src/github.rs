use std::io::Write;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};

use crate::registry::{Downloader, ReleaseSource, RemoteRelease};
use crate::Error;

const USER_AGENT: &str = concat!("stencil/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Whole-request limit for API calls; archive downloads have none.
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the GitHub releases API of one repository.
pub struct GithubClient {
    client: Client,
    api_timeout: Duration,
    api_url: String,
    repo: String,
    token: Option<String>,
}

impl GithubClient {
    /// `repo` is `owner/name`; `api_url` is the API root, e.g. `https://api.github.com`.
    pub fn new(
        api_url: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(Error::HttpClient)?;
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            api_timeout: API_TIMEOUT,
            api_url,
            repo: repo.into(),
            token,
        })
    }

    /// Override the limit on a whole releases API call.
    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn releases_url(&self, page: u32, per_page: usize) -> String {
        format!(
            "{}/repos/{}/releases?per_page={per_page}&page={page}",
            self.api_url, self.repo
        )
    }
}

impl ReleaseSource for GithubClient {
    fn fetch_page(&self, page: u32, per_page: usize) -> Result<Vec<RemoteRelease>, Error> {
        let url = self.releases_url(page, per_page);
        let unavailable = |reason: String| Error::RegistryUnavailable {
            url: url.clone(),
            reason,
        };

        tracing::debug!(%url, "requesting release page");
        let response = self
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(self.api_timeout)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("status {status}")));
        }

        response
            .json::<Vec<RemoteRelease>>()
            .map_err(|e| unavailable(format!("invalid response body: {e}")))
    }
}

impl Downloader for GithubClient {
    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64, Error> {
        let failed = |reason: String| Error::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        tracing::debug!(%url, "downloading archive");
        let mut response = self.get(url).send().map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("status {status}")));
        }

        response.copy_to(dest).map_err(|e| failed(e.to_string()))
    }
}
