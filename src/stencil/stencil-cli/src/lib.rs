//! CLI for stencil: create a new project from a released template.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod customize;
mod generate;
pub mod interrupt;
mod materialize;
mod settings;

pub use customize::{
    Answers, DialoguerPrompter, MANIFEST_FILE, ProjectManifest, PromptOutcome, Prompter,
    customize, validate_required,
};
pub use generate::{GenerateRequest, Generated, Generator};
pub use materialize::{UnpackedTemplate, unpack};
pub use settings::{DEFAULT_API_URL, DEFAULT_REPO, Settings, default_home, parse_repo};

use stencil_release::{GithubClient, LATEST};

#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(version, about = "Create a new project from a released template", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Directory to create the project in (must not exist yet)
    pub destination: PathBuf,

    /// Default project name (defaults to the destination's directory name)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Refresh the cached release list and template archive
    #[arg(long, short = 'u')]
    pub update: bool,

    /// Template version to use, or "latest"
    #[arg(long = "version", short = 'v', default_value = LATEST)]
    pub template_version: String,

    /// Print progress information
    #[arg(long, short = 'V')]
    pub verbose: bool,

    /// Template repository on GitHub, as OWNER/NAME
    #[arg(long, env = "STENCIL_REPO", default_value = DEFAULT_REPO, value_parser = parse_repo)]
    pub repo: String,

    /// Directory holding the release caches
    #[arg(long, env = "STENCIL_HOME")]
    pub home: Option<PathBuf>,

    /// GitHub API root
    #[arg(long, env = "STENCIL_API_URL", default_value = DEFAULT_API_URL, hide = true)]
    pub api_url: String,

    /// Token used to authenticate against the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print the stencil version and exit
    #[arg(long = "tool-version", short = 'X', action = ArgAction::Version)]
    #[allow(dead_code)]
    tool_version: Option<bool>,
}

// ============================================================================
// Error type
// ============================================================================

/// Fatal outcomes of a generate run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("destination {} already exists", .0.display())]
    TargetExists(PathBuf),

    #[error(transparent)]
    Release(#[from] stencil_release::Error),

    #[error("failed to unpack {}: {reason}", path.display())]
    UnpackFailed { path: PathBuf, reason: String },

    #[error("project customization cancelled")]
    CustomizationCancelled,

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("invalid manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error(
        "failed to move project into {}: {source} (generated files kept in {})",
        to.display(),
        kept.display()
    )]
    MoveFailed {
        to: PathBuf,
        kept: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        GenerateError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Main entry point for the CLI.
pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

/// Install the tracing subscriber; `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,stencil=debug,stencil_cli=debug,stencil_release=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests calling main twice) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

/// Run a parsed command line against GitHub and the terminal.
pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(&cli)?;
    let request = GenerateRequest::from_cli(&cli);
    let client = GithubClient::new(&settings.api_url, &settings.repo, settings.token.clone())
        .context("Failed to set up GitHub client")?;

    interrupt::install_handler().context("Failed to install Ctrl-C handler")?;
    let prompter = DialoguerPrompter::default();

    let generator = Generator {
        settings: &settings,
        registry: &client,
        downloader: &client,
        prompter: &prompter,
    };
    let generated = generator.generate(&request)?;

    println!(
        "{} {} from {} {}",
        style("Created").green().bold(),
        generated.path.display(),
        settings.repo,
        style(&generated.version).cyan()
    );
    Ok(())
}
