use std::fs;
use std::io;
use std::path::Path;

use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use serde_json::{Map, Value};

use crate::GenerateError;
use crate::interrupt::PromptScope;

/// The template's package manifest, relative to the template root.
pub const MANIFEST_FILE: &str = "package.json";

/// Fields that describe the template itself rather than the new project.
const TEMPLATE_ONLY_FIELDS: [&str; 3] = ["keywords", "bugs", "repository"];

/// Metadata collected for the new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub name: String,
    pub author: String,
    pub description: String,
}

/// Result of a prompt session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Answered(Answers),
    Cancelled,
}

/// Source of the project metadata answers.
pub trait Prompter {
    /// Ask for name (pre-filled with `default_name`), author and description.
    fn ask(&self, default_name: &str) -> Result<PromptOutcome, GenerateError>;
}

/// Reject answers that are blank after trimming.
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        Err("a value is required")
    } else {
        Ok(())
    }
}

// ============================================================================
// Terminal prompts
// ============================================================================

/// Prompts on the terminal via dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    /// `Ok(None)` when the user interrupted the prompt with Ctrl-C.
    ///
    /// Relies on [`install_handler`](crate::interrupt::install_handler) so the
    /// interrupt reaches the prompt instead of killing the process.
    fn required(&self, prompt: &str, initial: Option<&str>) -> Result<Option<String>, GenerateError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(|value: &String| validate_required(value));
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }

        match input.interact_text() {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(GenerateError::Prompt(e.to_string())),
        }
    }
}

impl DialoguerPrompter {
    fn ask_all(&self, default_name: &str) -> Result<Option<Answers>, GenerateError> {
        let Some(name) = self.required("Project name", Some(default_name))? else {
            return Ok(None);
        };
        let Some(author) = self.required("Author", None)? else {
            return Ok(None);
        };
        let Some(description) = self.required("Description", None)? else {
            return Ok(None);
        };
        Ok(Some(Answers {
            name,
            author,
            description,
        }))
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, default_name: &str) -> Result<PromptOutcome, GenerateError> {
        let scope = PromptScope::enter();
        match self.ask_all(default_name)? {
            Some(answers) => Ok(PromptOutcome::Answered(answers)),
            None => {
                scope.cancel();
                Ok(PromptOutcome::Cancelled)
            }
        }
    }
}

// ============================================================================
// Manifest
// ============================================================================

/// A package manifest kept as an ordered JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    fields: Map<String, Value>,
}

impl ProjectManifest {
    pub fn parse(content: &str) -> Result<Self, String> {
        match serde_json::from_str(content) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(_) => Err("expected a JSON object".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let content = fs::read_to_string(path).map_err(|e| GenerateError::io("reading", path, e))?;
        Self::parse(&content).map_err(|reason| GenerateError::Manifest {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set the project fields in place and drop the template-only ones.
    pub fn apply(&mut self, answers: &Answers) {
        for (key, value) in [
            ("name", &answers.name),
            ("author", &answers.author),
            ("description", &answers.description),
        ] {
            self.fields
                .insert(key.to_string(), Value::String(value.clone()));
        }
        for key in TEMPLATE_ONLY_FIELDS {
            self.fields.shift_remove(key);
        }
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_pretty_string(&self) -> String {
        format!("{:#}\n", Value::Object(self.fields.clone()))
    }

    pub fn save(&self, path: &Path) -> Result<(), GenerateError> {
        fs::write(path, self.to_pretty_string()).map_err(|e| GenerateError::io("writing", path, e))
    }
}

/// Prompt for the project metadata and rewrite the template's manifest.
///
/// The manifest is read before prompting so a broken template fails
/// early, and is only written once every answer is in.
pub fn customize(
    default_name: &str,
    template_root: &Path,
    prompter: &dyn Prompter,
) -> Result<Answers, GenerateError> {
    let manifest_path = template_root.join(MANIFEST_FILE);
    let mut manifest = ProjectManifest::load(&manifest_path)?;

    let answers = match prompter.ask(default_name)? {
        PromptOutcome::Answered(answers) => answers,
        PromptOutcome::Cancelled => return Err(GenerateError::CustomizationCancelled),
    };

    manifest.apply(&answers);
    manifest.save(&manifest_path)?;
    tracing::debug!(path = %manifest_path.display(), "rewrote manifest");
    Ok(answers)
}
