//! Capability traits the sign-in screen talks to, enabling mocking in tests

use crate::state::SnackbarMessage;
use anyhow::Result;
use async_trait::async_trait;

/// Account service: authentication, anonymous session linking, recovery
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Whether any session (anonymous or permanent) exists
    fn has_user(&self) -> bool;

    /// Start a fresh anonymous session
    async fn create_anonymous_account(&self) -> Result<()>;

    /// Check the credentials; on success the session is authenticated
    async fn authenticate(&self, email: &str, password: &str) -> Result<()>;

    /// Turn the current anonymous session into a permanent account.
    /// Fails when the email already belongs to another account.
    async fn link_anonymous_account(&self, email: &str, password: &str) -> Result<()>;

    /// Id of the session as it was before linking
    fn anonymous_user_id(&self) -> String;

    /// Id of the current session
    fn user_id(&self) -> String;

    /// Ask the provider to send a password recovery email
    async fn send_recovery_email(&self, email: &str) -> Result<()>;

    /// Drop the current session
    async fn sign_out(&self) -> Result<()>;
}

/// Remote document store keyed by user id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteUserStore: Send + Sync {
    /// Move every record owned by `old_id` to `new_id`
    async fn reassign_ownership(&self, old_id: &str, new_id: &str) -> Result<()>;
}

/// User-visible transient notifications
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn show_message(&self, message: SnackbarMessage);
}

/// Non-fatal error reporting, for observability only
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticsSink: Send + Sync {
    fn log_non_fatal_crash(&self, error: &anyhow::Error);
}
