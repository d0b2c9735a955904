use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use std::path::PathBuf;

use crate::Cli;

/// Template repository used when none is configured.
pub const DEFAULT_REPO: &str = "stencil-rs/starter-template";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const RELEASES_FILE: &str = "releases.json";
const RELEASES_DIR: &str = "releases";

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the tool's cached state.
    pub home: PathBuf,
    /// Template repository as `owner/name`.
    pub repo: String,
    pub api_url: String,
    pub token: Option<String>,
}

impl Settings {
    /// Settings for `home` with the default repository and API.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            repo: DEFAULT_REPO.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let home = match &cli.home {
            Some(home) => home.clone(),
            None => default_home()?,
        };
        Ok(Self {
            home,
            repo: cli.repo.clone(),
            api_url: cli.api_url.clone(),
            token: cli.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    /// `<home>/releases.json`
    pub fn releases_file(&self) -> PathBuf {
        self.home.join(RELEASES_FILE)
    }

    /// `<home>/releases/`, one zip per version.
    pub fn archives_dir(&self) -> PathBuf {
        self.home.join(RELEASES_DIR)
    }
}

/// The platform config directory joined with `stencil`.
pub fn default_home() -> Result<PathBuf> {
    let strategy =
        etcetera::choose_base_strategy().context("Failed to locate the user's home directory")?;
    Ok(strategy.config_dir().join("stencil"))
}

/// Validate an `owner/name` repository argument.
pub fn parse_repo(value: &str) -> Result<String, String> {
    let value = value.trim();
    match value.split_once('/') {
        Some((owner, name))
            if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok(value.to_string())
        }
        _ => Err(format!("expected OWNER/NAME, got '{value}'")),
    }
}
