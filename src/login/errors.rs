//! Error types for the sign-in flow

use crate::state::MessageKey;
use std::fmt;
use thiserror::Error;

/// Local input problems, caught before any remote call
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("empty password")]
    EmptyPassword,
}

impl ValidationError {
    pub fn message_key(self) -> MessageKey {
        match self {
            Self::InvalidEmail => MessageKey::EmailError,
            Self::EmptyPassword => MessageKey::EmptyPasswordError,
        }
    }
}

/// Remote step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authenticate,
    Link,
    RecoveryEmail,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authenticate => "authenticate",
            Self::Link => "link",
            Self::RecoveryEmail => "recovery email",
        };
        f.write_str(name)
    }
}

/// Failure of a background sign-in task
#[derive(Debug, Error)]
pub enum SignInError {
    /// Shown to the user and reported
    #[error("{phase} failed: {source}")]
    Remote {
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },
    /// Reported only; the user already has a working account
    #[error("user id migration failed: {0}")]
    Migration(#[source] anyhow::Error),
    /// The task panicked
    #[error("background task crashed: {0}")]
    Crashed(#[source] anyhow::Error),
}

impl SignInError {
    pub fn remote(phase: Phase) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Remote { phase, source }
    }
}
