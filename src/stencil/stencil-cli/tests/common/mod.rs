//! Fakes and fixtures shared by the stencil-cli integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use stencil_cli::{Answers, GenerateError, PromptOutcome, Prompter};
use stencil_release::{Downloader, Error, ReleaseSource, RemoteRelease};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // stencil-cli is at src/stencil/stencil-cli, workspace root is three levels up
    manifest_dir
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures")
}

pub fn starter_template() -> PathBuf {
    fixtures_dir().join("starter-template")
}

// ---------------------------------------------------------------------------
// Archives
// ---------------------------------------------------------------------------

/// Zip `src` so every file sits under the `prefix/` top-level directory.
pub fn zip_dir(src: &Path, prefix: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer.add_directory(format!("{prefix}/"), options).unwrap();
    add_tree(&mut writer, src, prefix, options);
    writer.finish().unwrap().into_inner()
}

fn add_tree(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) {
    let mut entries: Vec<_> = fs::read_dir(dir).unwrap().map(|e| e.unwrap()).collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let name = format!("{prefix}/{}", entry.file_name().to_string_lossy());
        if entry.file_type().unwrap().is_dir() {
            writer.add_directory(format!("{name}/"), options).unwrap();
            add_tree(writer, &entry.path(), &name, options);
        } else {
            writer.start_file(name, options).unwrap();
            writer.write_all(&fs::read(entry.path()).unwrap()).unwrap();
        }
    }
}

/// Build a zip from `(path, contents)` pairs; paths ending in `/` are directories.
pub fn zip_entries(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (path, contents) in entries {
        if path.ends_with('/') {
            writer.add_directory(*path, options).unwrap();
        } else {
            writer.start_file(*path, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// A registry with a fixed release list that counts page requests.
pub struct FakeRegistry {
    tags: Vec<String>,
    pub calls: Cell<usize>,
}

impl FakeRegistry {
    pub fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            calls: Cell::new(0),
        }
    }
}

impl ReleaseSource for FakeRegistry {
    fn fetch_page(&self, page: u32, _per_page: usize) -> Result<Vec<RemoteRelease>, Error> {
        self.calls.set(self.calls.get() + 1);
        if page > 1 {
            return Ok(Vec::new());
        }
        Ok(self
            .tags
            .iter()
            .map(|tag| RemoteRelease {
                tag_name: tag.clone(),
                draft: false,
                prerelease: false,
                zipball_url: Some(format!("https://example.test/zipball/{tag}")),
            })
            .collect())
    }
}

/// Serves the same archive for every URL and records what was requested.
pub struct FakeDownloader {
    archive: Vec<u8>,
    pub urls: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn new(archive: Vec<u8>) -> Self {
        Self {
            archive,
            urls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls.borrow().len()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest: &mut dyn Write) -> Result<u64, Error> {
        self.urls.borrow_mut().push(url.to_string());
        dest.write_all(&self.archive).unwrap();
        Ok(self.archive.len() as u64)
    }
}

/// Answers every session with a fixed outcome.
pub struct FakePrompter {
    outcome: PromptOutcome,
    pub defaults: RefCell<Vec<String>>,
    /// Runs while "prompting", to simulate the world changing meanwhile.
    pub during: Option<Box<dyn Fn()>>,
}

impl FakePrompter {
    pub fn answering(name: &str, author: &str, description: &str) -> Self {
        Self {
            outcome: PromptOutcome::Answered(Answers {
                name: name.to_string(),
                author: author.to_string(),
                description: description.to_string(),
            }),
            defaults: RefCell::new(Vec::new()),
            during: None,
        }
    }

    pub fn cancelling() -> Self {
        Self {
            outcome: PromptOutcome::Cancelled,
            defaults: RefCell::new(Vec::new()),
            during: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.defaults.borrow().len()
    }
}

impl Prompter for FakePrompter {
    fn ask(&self, default_name: &str) -> Result<PromptOutcome, GenerateError> {
        self.defaults.borrow_mut().push(default_name.to_string());
        if let Some(during) = &self.during {
            during();
        }
        Ok(self.outcome.clone())
    }
}
