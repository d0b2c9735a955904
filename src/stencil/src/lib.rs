//! stencil: create new projects from released template archives.
//!
//! A template is any GitHub repository that publishes semver-tagged
//! releases and carries a `package.json` at its root. `stencil` picks a
//! release (the newest by default), downloads its source archive once per
//! version, unpacks it, asks for the new project's name, author and
//! description, and moves the result into place.
//!
//! # Cached state
//!
//! Everything lives under the stencil home (`$STENCIL_HOME`, or the
//! platform config directory joined with `stencil`):
//!
//! - `releases.json` – the release list, refetched after four hours
//! - `releases/<version>.zip` – one archive per template version
//!
//! # Library use
//!
//! ```rust,no_run
//! use stencil::{GenerateRequest, Generator, Settings, DialoguerPrompter};
//! use stencil::release::GithubClient;
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::new(stencil::default_home()?);
//! let client = GithubClient::new(&settings.api_url, &settings.repo, None)?;
//! let prompter = DialoguerPrompter::default();
//! let generator = Generator {
//!     settings: &settings,
//!     registry: &client,
//!     downloader: &client,
//!     prompter: &prompter,
//! };
//! generator.generate(&GenerateRequest::new("my-app"))?;
//! # Ok(())
//! # }
//! ```

pub use stencil_cli::{
    Answers, Cli, DialoguerPrompter, GenerateError, GenerateRequest, Generated, Generator,
    ProjectManifest, PromptOutcome, Prompter, Settings, default_home,
};

/// Release listing, caching and download.
pub use stencil_release as release;
