use std::fs;
use std::path::{Path, PathBuf};

use stencil_release::{ArchiveCache, Downloader, ReleaseCache, ReleaseSource};

use crate::customize::{Prompter, customize};
use crate::materialize::unpack;
use crate::{Cli, GenerateError, Settings};

/// What to generate and where.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub destination: PathBuf,
    /// Pre-filled project name; the destination's base name when `None`.
    pub name: Option<String>,
    /// A release tag or [`stencil_release::LATEST`].
    pub version: String,
    /// Bypass both caches.
    pub update: bool,
}

impl GenerateRequest {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            name: None,
            version: stencil_release::LATEST.to_string(),
            update: false,
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            destination: cli.destination.clone(),
            name: cli.name.clone(),
            version: cli.template_version.clone(),
            update: cli.update,
        }
    }

    /// The name offered as the default at the name prompt.
    pub fn default_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }
}

/// A successfully generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub path: PathBuf,
    pub version: String,
}

/// Runs one generate pass with the given collaborators.
pub struct Generator<'a> {
    pub settings: &'a Settings,
    pub registry: &'a dyn ReleaseSource,
    pub downloader: &'a dyn Downloader,
    pub prompter: &'a dyn Prompter,
}

impl Generator<'_> {
    /// Check the destination, resolve and fetch the template, customize it,
    /// and move it into place.
    pub fn generate(&self, request: &GenerateRequest) -> Result<Generated, GenerateError> {
        let destination = &request.destination;
        // symlink_metadata so a dangling symlink also counts as taken.
        if fs::symlink_metadata(destination).is_ok() {
            return Err(GenerateError::TargetExists(destination.clone()));
        }

        let releases = ReleaseCache::new(self.settings.releases_file())
            .get_releases(self.registry, request.update)?;
        let release = releases.resolve(&request.version)?;
        tracing::info!(version = %release.version, "resolved template version");

        let archive = ArchiveCache::new(self.settings.archives_dir()).get_archive(
            self.downloader,
            &release.version,
            &release.url,
            request.update,
        )?;

        let work_parent = ensure_parent(destination)?;
        let template = unpack(&archive, &work_parent)?;

        customize(&request.default_name(), template.root(), self.prompter)?;

        let path = template.move_into(destination)?;
        Ok(Generated {
            path,
            version: release.version,
        })
    }
}

/// Create the destination's parent so the unpack dir can live beside it.
fn ensure_parent(destination: &Path) -> Result<PathBuf, GenerateError> {
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| GenerateError::io("creating", &parent, e))?;
    Ok(parent)
}
