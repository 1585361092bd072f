//! External secret-manager lookup.
//!
//! The rest of the pipeline never touches process primitives directly: it
//! talks to a [`SecretBackend`], and tests substitute a double. The
//! production backend shells out to a 1Password-compatible CLI.
//!
//! # External command contract
//!
//! - Invoked as `<program> read <reference>` with no input stream attached
//! - Exit code 0 means success, with the resolved value on standard output
//! - Non-zero exit is a hard failure that aborts the whole resolution
//! - Diagnostic text on standard error is logged, never a failure by itself
//!
//! No timeout is applied: a hung secret CLI hangs the resolution.

use std::process::{Command, Stdio};

use crate::error::VarsError;

/// Interface to the external secret manager.
pub trait SecretBackend {
    /// Resolve one secret reference to its value.
    ///
    /// The reference is opaque to this system; no validation of its shape
    /// is performed.
    fn read(&self, reference: &str) -> Result<String, VarsError>;
}

/// Backend that invokes `<program> read <reference>` as a subprocess.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
}

impl CommandBackend {
    /// Create a backend for the given secret CLI program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The program this backend invokes.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandBackend {
    fn default() -> Self {
        Self::new("op")
    }
}

impl SecretBackend for CommandBackend {
    fn read(&self, reference: &str) -> Result<String, VarsError> {
        tracing::debug!("`{} read` for key {}", self.program, reference);

        let output = Command::new(&self.program)
            .arg("read")
            .arg(reference)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| VarsError::Unexpected {
                message: format!("failed to execute `{}`: {}", self.program, e),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            tracing::warn!("unexpected stderr from `{} read`:\n{}", self.program, stderr);
        }

        if !output.status.success() {
            return Err(VarsError::SecretLookup {
                status: output.status.code().unwrap_or(-1),
                stderr: stderr.into_owned(),
            });
        }

        let mut resolved = String::from_utf8_lossy(&output.stdout).into_owned();
        // exactly one trailing newline, nothing else
        if resolved.ends_with('\n') {
            resolved.pop();
        }

        tracing::debug!("`{} read` successful for key {}", self.program, reference);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write an executable shell script acting as the secret CLI.
    #[cfg(unix)]
    fn fake_cli(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-op");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\n{body}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    #[cfg(unix)]
    fn test_trailing_newline_trimmed() {
        let dir = TempDir::new().unwrap();
        let cli = fake_cli(&dir, "printf 'topsecret\\n'");

        let backend = CommandBackend::new(cli.to_str().unwrap());
        assert_eq!(backend.read("op://vault/item").unwrap(), "topsecret");
    }

    #[test]
    #[cfg(unix)]
    fn test_output_without_newline_unchanged() {
        let dir = TempDir::new().unwrap();
        let cli = fake_cli(&dir, "printf 'topsecret'");

        let backend = CommandBackend::new(cli.to_str().unwrap());
        assert_eq!(backend.read("op://vault/item").unwrap(), "topsecret");
    }

    #[test]
    #[cfg(unix)]
    fn test_only_one_newline_trimmed() {
        let dir = TempDir::new().unwrap();
        let cli = fake_cli(&dir, "printf 'topsecret\\n\\n'");

        let backend = CommandBackend::new(cli.to_str().unwrap());
        assert_eq!(backend.read("op://vault/item").unwrap(), "topsecret\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_nonzero_exit_is_secret_lookup_error() {
        let dir = TempDir::new().unwrap();
        let cli = fake_cli(&dir, "echo 'no item matched' >&2; exit 3");

        let backend = CommandBackend::new(cli.to_str().unwrap());
        match backend.read("op://vault/missing").unwrap_err() {
            VarsError::SecretLookup { status, stderr } => {
                assert_eq!(status, 3);
                assert!(stderr.contains("no item matched"));
            }
            other => panic!("expected SecretLookup, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_stderr_on_success_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let cli = fake_cli(&dir, "echo 'deprecation notice' >&2; printf 'value\\n'");

        let backend = CommandBackend::new(cli.to_str().unwrap());
        assert_eq!(backend.read("op://vault/item").unwrap(), "value");
    }

    #[test]
    fn test_missing_program_is_unexpected_error() {
        let backend = CommandBackend::new("nonexistent-secret-cli-xyz");
        match backend.read("op://vault/item").unwrap_err() {
            VarsError::Unexpected { message } => {
                assert!(message.contains("nonexistent-secret-cli-xyz"));
            }
            other => panic!("expected Unexpected, got {other:?}"),
        }
    }

    #[test]
    fn test_default_program_is_op() {
        assert_eq!(CommandBackend::default().program(), "op");
    }
}
