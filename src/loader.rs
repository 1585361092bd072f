//! Raw document loading and vars-file discovery.
//!
//! Mirrors the host tool's loader contract: documents are parsed as plain
//! YAML with no coercion beyond the parser's own, and discovery walks a
//! fixed extension list in a fixed order.

use anyhow::{Context, Result};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when searching for vars files by bare name.
/// The empty entry matches a file or directory named exactly like the
/// entity.
pub const DEFAULT_EXTENSIONS: &[&str] = &["", ".yml", ".yaml", ".json"];

/// Loads YAML documents and discovers vars files on disk.
///
/// Loaded documents are cached per path for the lifetime of the loader, so
/// a file referenced by several entities is read and parsed once per run.
#[derive(Debug, Default)]
pub struct DataLoader {
    content_cache: HashMap<PathBuf, Value>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document from a file, raw: standard YAML parsing, nothing
    /// more. With `cached` set, repeated loads of the same path return the
    /// cached document without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load_from_file(&mut self, path: &Path, cached: bool) -> Result<Value> {
        if cached {
            if let Some(document) = self.content_cache.get(path) {
                return Ok(document.clone());
            }
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vars file: {}", path.display()))?;
        let document: Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse vars file: {}", path.display()))?;

        if cached {
            self.content_cache.insert(path.to_path_buf(), document.clone());
        }

        Ok(document)
    }

    /// Find vars files for `name` under `dir`.
    ///
    /// For each extension, in order, `dir/<name><ext>` is a match when it is
    /// a file. When it is a directory and `allow_dir` is set, the directory
    /// is expanded recursively in sorted order, keeping files whose path
    /// ends in one of the extensions. `extensions` defaults to
    /// [`DEFAULT_EXTENSIONS`].
    ///
    /// A nonexistent `dir` yields an empty result, not an error.
    pub fn find_vars_files(
        &self,
        dir: &Path,
        name: &str,
        extensions: Option<&[&str]>,
        allow_dir: bool,
    ) -> Result<Vec<PathBuf>> {
        let extensions = extensions.unwrap_or(DEFAULT_EXTENSIONS);
        let mut found = Vec::new();

        for extension in extensions {
            let candidate = dir.join(format!("{name}{extension}"));
            if candidate.is_file() {
                found.push(candidate);
            } else if candidate.is_dir() && allow_dir {
                found.extend(self.dir_vars_files(&candidate, extensions)?);
            }
        }

        Ok(found)
    }

    /// List a vars directory recursively, sorted, skipping hidden entries.
    fn dir_vars_files(&self, dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to list vars directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        let mut found = Vec::new();
        for entry in entries {
            let hidden = entry
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true);
            if hidden {
                continue;
            }

            if entry.is_dir() {
                found.extend(self.dir_vars_files(&entry, extensions)?);
            } else {
                let path = entry.to_string_lossy();
                if extensions.iter().any(|extension| path.ends_with(extension)) {
                    found.push(entry);
                }
            }
        }

        Ok(found)
    }
}
