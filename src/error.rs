//! Error types for the variable-resolution pipeline.
//!
//! Callers see exactly three failure shapes:
//!
//! - [`VarsError::InvalidEntityType`]: an entity spec named something other
//!   than a host or group
//! - [`VarsError::SecretLookup`]: the external secret CLI exited non-zero
//! - [`VarsError::Unexpected`]: anything else that went wrong during
//!   per-entity processing, wrapped once at the provider boundary

use thiserror::Error;

/// Failure raised by the variable-resolution pipeline.
#[derive(Debug, Error)]
pub enum VarsError {
    /// An entity spec referred to neither a host nor a group.
    #[error("supplied entity must be a host or group, got `{kind}` instead")]
    InvalidEntityType {
        /// The kind tag that was actually received.
        kind: String,
    },

    /// The external secret-read command exited with a non-zero status.
    #[error("secret read command exited with non-zero code ({status}): {stderr}")]
    SecretLookup {
        /// Exit status of the command (-1 if terminated by a signal).
        status: i32,
        /// Captured standard-error text.
        stderr: String,
    },

    /// Any other failure during entity processing, normalized at the
    /// provider boundary so callers never see a raw internal error.
    #[error("unexpected error in the vars provider: {message}")]
    Unexpected {
        /// Message of the original error.
        message: String,
    },
}

impl VarsError {
    /// Normalize an error crossing the per-entity processing boundary.
    ///
    /// The designated error shapes pass through unchanged; any other error
    /// is wrapped once into [`VarsError::Unexpected`] carrying the original
    /// message.
    pub(crate) fn normalize(err: anyhow::Error) -> Self {
        match err.downcast::<VarsError>() {
            Ok(designated) => designated,
            Err(other) => VarsError::Unexpected {
                message: format!("{other:#}"),
            },
        }
    }
}
