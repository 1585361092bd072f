//! Common testing utilities for opvars integration tests.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test context that manages a temporary inventory tree and a fake secret
/// CLI.
pub struct TestContext {
    /// Path to temporary directory
    pub temp_path: PathBuf,
    /// The temporary directory (kept to prevent early deletion)
    _temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a temporary directory.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path().to_path_buf();

        Ok(Self {
            temp_path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a file (and its parent directories) with content.
    pub fn create_file(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let file_path = self.temp_path.join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(file_path)
    }

    /// Create a vars file under `host_vars/` or `group_vars/`.
    #[allow(dead_code)]
    pub fn create_vars_file(
        &self,
        subdir: &str,
        name: &str,
        content: &str,
    ) -> anyhow::Result<PathBuf> {
        self.create_file(&format!("{subdir}/{name}"), content)
    }

    /// Get the path to a file in the temp directory.
    #[allow(dead_code)]
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_path.join(name)
    }

    /// Write an executable fake secret CLI that answers `<cli> read <ref>`
    /// with `resolved(<ref>)` on stdout.
    #[cfg(unix)]
    pub fn create_fake_cli(&self) -> anyhow::Result<PathBuf> {
        self.create_cli_script(
            "fake-op",
            r#"#!/bin/sh
# fake secret CLI for tests
if [ "$1" != "read" ]; then
    echo "unknown subcommand: $1" >&2
    exit 2
fi
printf 'resolved(%s)\n' "$2"
"#,
        )
    }

    /// Write an executable fake secret CLI that fails every lookup with
    /// exit code 1 and a diagnostic on stderr.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn create_failing_cli(&self) -> anyhow::Result<PathBuf> {
        self.create_cli_script(
            "failing-op",
            r#"#!/bin/sh
echo "no item found: $2" >&2
exit 1
"#,
        )
    }

    #[cfg(unix)]
    fn create_cli_script(&self, name: &str, script: &str) -> anyhow::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.create_file(name, script)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}
