//! The variable-resolution pipeline entry point.
//!
//! A [`VarsProvider`] drives the whole pipeline for a resolution request:
//! it validates and filters the requested entities, discovers their secret
//! vars files (cached), loads each file raw, resolves every scalar leaf
//! through the secret backend, and deep-merges the per-file results into one
//! aggregate mapping in discovery order.
//!
//! Execution is single-threaded and blocking: entity by entity, file by
//! file, leaf by leaf, with each external lookup blocking until the command
//! exits.

use anyhow::Result;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{CommandBackend, SecretBackend};
use crate::error::VarsError;
use crate::inventory::{Entity, IntoEntities};
use crate::loader::DataLoader;
use crate::locator::{self, FoundFilesCache};
use crate::merge::combine_vars;
use crate::walker::resolve_tree;

/// Resolves host and group variables from secret reference files under a
/// base directory.
///
/// Owns the document loader, the found-files cache, and the secret backend.
/// Both caches live exactly as long as the provider; construct one per run
/// to get a fresh scope.
pub struct VarsProvider {
    base_path: PathBuf,
    loader: DataLoader,
    found: FoundFilesCache,
    backend: Box<dyn SecretBackend>,
}

impl VarsProvider {
    /// Create a provider over `base_path` using the default `op` CLI
    /// backend.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_backend(base_path, Box::new(CommandBackend::default()))
    }

    /// Create a provider with a custom secret backend.
    pub fn with_backend(base_path: impl Into<PathBuf>, backend: Box<dyn SecretBackend>) -> Self {
        Self {
            base_path: base_path.into(),
            loader: DataLoader::new(),
            found: FoundFilesCache::new(),
            backend,
        }
    }

    /// Resolve variables for one entity or a sequence of them.
    ///
    /// For each entity, `<base_path>/<subdir>` is resolved to its real path
    /// and searched for `<name>.op.yaml` / `<name>.op.yml` files; every
    /// discovered document is loaded raw, resolved leaf-by-leaf through the
    /// secret backend, and deep-merged into the aggregate in discovery
    /// order. Entities whose name starts with the path separator (chroot
    /// style inventory hostnames) are skipped. Returns an empty mapping when
    /// no entity yielded files.
    ///
    /// # Errors
    ///
    /// [`VarsError::SecretLookup`] when the secret CLI exits non-zero; any
    /// other failure during entity processing surfaces as a single
    /// [`VarsError::Unexpected`] carrying the original message. A failure on
    /// any file or leaf aborts the whole call; no partial result is
    /// returned.
    pub fn get_vars(&mut self, entities: impl IntoEntities) -> Result<Mapping, VarsError> {
        let mut data = Mapping::new();

        for entity in entities.into_entities() {
            // avoid 'chroot' type inventory hostnames /path/to/chroot
            if entity.name().starts_with(std::path::MAIN_SEPARATOR) {
                continue;
            }

            data = self
                .process_entity(&entity, data)
                .map_err(VarsError::normalize)?;
        }

        Ok(data)
    }

    /// Process one entity, folding each of its files into the aggregate.
    fn process_entity(&mut self, entity: &Entity, mut data: Mapping) -> Result<Mapping> {
        let opath = resolve_real_path(&self.base_path.join(entity.subdir()));

        let found_files = if opath.exists() && !opath.is_dir() {
            tracing::warn!(
                "found {} that is not a directory, skipping: {}",
                entity.subdir(),
                opath.display()
            );
            Vec::new()
        } else {
            locator::find_secret_files(&self.loader, &mut self.found, &opath, entity.name())?
        };

        for found in found_files {
            tracing::debug!("processing {}", found.display());
            let document = self.loader.load_from_file(&found, true)?;
            let resolved = resolve_tree(document, self.backend.as_ref())?;
            let mapping = require_mapping(resolved, &found)?;
            data = combine_vars(data, mapping);
        }

        Ok(data)
    }
}

/// Resolve a path to its canonical real form. Canonicalization fails for
/// paths that do not exist; the joined path then serves as the (stable)
/// cache key and the later existence check yields an empty file set.
fn resolve_real_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn require_mapping(document: Value, path: &Path) -> Result<Mapping> {
    match document {
        Value::Mapping(mapping) => Ok(mapping),
        _ => anyhow::bail!(
            "vars file must contain a mapping at the top level: {}",
            path.display()
        ),
    }
}
