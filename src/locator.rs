//! Secret vars-file discovery with a per-run cache.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::loader::DataLoader;

/// The two recognized secret-bearing vars file extensions. Files in
/// `host_vars/` and `group_vars/` with any other name are ignored entirely.
pub const VALID_EXTENSIONS: &[&str] = &[".op.yaml", ".op.yml"];

/// Cache of discovered secret vars files, keyed by entity name and the
/// resolved directory searched. Append-only for its lifetime, which is the
/// lifetime of the owning provider; a fresh provider gets a fresh cache.
#[derive(Debug, Default)]
pub struct FoundFilesCache {
    found: HashMap<(String, PathBuf), Vec<PathBuf>>,
}

impl FoundFilesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, dir: &Path) -> Option<&[PathBuf]> {
        self.found
            .get(&(name.to_string(), dir.to_path_buf()))
            .map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: &str, dir: &Path, files: Vec<PathBuf>) {
        self.found.insert((name.to_string(), dir.to_path_buf()), files);
    }
}

/// Discover the secret vars files for `name` under `dir`, cached per
/// `(name, dir)`.
///
/// A cache hit returns the stored sequence without touching the filesystem.
/// On a miss, two overlapping passes run and their results are concatenated
/// without deduplication: the direct `<name>.op.yaml` / `<name>.op.yml`
/// match first, then the general vars-file search restricted to paths ending
/// in a recognized extension — the second pass is what picks up files inside
/// a directory named after the entity. A path that is missing or not a
/// directory yields an empty, uncached result.
pub fn find_secret_files(
    loader: &DataLoader,
    cache: &mut FoundFilesCache,
    dir: &Path,
    name: &str,
) -> Result<Vec<PathBuf>> {
    tracing::trace!("vars file lookup key: {name}: {}", dir.display());

    if let Some(found) = cache.get(name, dir) {
        return Ok(found.to_vec());
    }

    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    tracing::debug!("processing dir {}", dir.display());
    let mut found = loader.find_vars_files(dir, name, Some(VALID_EXTENSIONS), false)?;
    found.extend(
        loader
            .find_vars_files(dir, name, None, true)?
            .into_iter()
            .filter(|path| has_valid_extension(path)),
    );

    cache.insert(name, dir, found.clone());
    Ok(found)
}

fn has_valid_extension(path: &Path) -> bool {
    let path = path.to_string_lossy();
    VALID_EXTENSIONS
        .iter()
        .any(|extension| path.ends_with(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_direct_match_and_dir_contents_concatenated() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "web1.op.yaml", "a: 1\n");
        write_file(dir.path(), "web1/nested.op.yml", "b: 2\n");
        write_file(dir.path(), "web1/ignored.txt", "not vars\n");

        let loader = DataLoader::new();
        let mut cache = FoundFilesCache::new();
        let found = find_secret_files(&loader, &mut cache, dir.path(), "web1").unwrap();

        assert_eq!(found.len(), 2);
        assert!(found[0].to_string_lossy().ends_with("web1.op.yaml"));
        assert!(found[1].to_string_lossy().ends_with("nested.op.yml"));
    }

    #[test]
    fn test_non_secret_files_ignored_entirely() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "web1.yaml", "plain: vars\n");
        write_file(dir.path(), "web1.yml", "plain: vars\n");
        write_file(dir.path(), "web1.json", "{}\n");

        let loader = DataLoader::new();
        let mut cache = FoundFilesCache::new();
        let found = find_secret_files(&loader, &mut cache, dir.path(), "web1").unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn test_second_call_served_from_cache_without_filesystem() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "web1.op.yaml", "a: 1\n");
        let search_dir = dir.path().to_path_buf();

        let loader = DataLoader::new();
        let mut cache = FoundFilesCache::new();
        let first = find_secret_files(&loader, &mut cache, &search_dir, "web1").unwrap();
        assert_eq!(first.len(), 1);

        // remove the directory: a cache hit must not notice
        drop(dir);
        assert!(!search_dir.exists());

        let second = find_secret_files(&loader, &mut cache, &search_dir, "web1").unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_cache_keys_are_per_name_and_dir() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "web1.op.yaml", "a: 1\n");
        write_file(dir.path(), "web2.op.yaml", "b: 2\n");

        let loader = DataLoader::new();
        let mut cache = FoundFilesCache::new();

        let web1 = find_secret_files(&loader, &mut cache, dir.path(), "web1").unwrap();
        let web2 = find_secret_files(&loader, &mut cache, dir.path(), "web2").unwrap();

        assert_eq!(web1.len(), 1);
        assert_eq!(web2.len(), 1);
        assert_ne!(web1, web2);
    }

    #[test]
    fn test_missing_directory_yields_empty_and_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("host_vars");

        let loader = DataLoader::new();
        let mut cache = FoundFilesCache::new();

        let found = find_secret_files(&loader, &mut cache, &missing, "web1").unwrap();
        assert!(found.is_empty());

        // the directory appearing later is picked up: nothing was cached
        write_file(&missing, "web1.op.yaml", "a: 1\n");
        let found = find_secret_files(&loader, &mut cache, &missing, "web1").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_duplicate_entries_tolerated() {
        // A file that matches both passes would appear twice; the cache
        // stores the sequence as discovered, duplicates included.
        let dir = TempDir::new().unwrap();
        let loader = DataLoader::new();
        let mut cache = FoundFilesCache::new();

        write_file(dir.path(), "web1.op.yaml", "a: 1\n");
        cache.insert(
            "web1",
            dir.path(),
            vec![
                dir.path().join("web1.op.yaml"),
                dir.path().join("web1.op.yaml"),
            ],
        );

        let found = find_secret_files(&loader, &mut cache, dir.path(), "web1").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], found[1]);
    }
}
