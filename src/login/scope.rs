//! Screen-bound task scope
//!
//! Every background step of the sign-in screen runs through [`TaskScope::launch`].
//! Failures returned by a task, and panics inside it, are routed to the
//! notification and diagnostics sinks. Dropping the scope cancels whatever is
//! still in flight.

use super::errors::SignInError;
use crate::services::{DiagnosticsSink, NotificationSink};
use crate::state::{MessageKey, SnackbarMessage};
use anyhow::anyhow;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Sends task failures to the right sinks
#[derive(Clone)]
pub struct ErrorRouter {
    notifications: Arc<dyn NotificationSink>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl ErrorRouter {
    pub fn new(
        notifications: Arc<dyn NotificationSink>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            notifications,
            diagnostics,
        }
    }

    pub fn route(&self, error: &SignInError) {
        tracing::warn!("{error}");
        match error {
            SignInError::Remote { source, .. } => {
                self.notifications
                    .show_message(SnackbarMessage::from_error(source));
                self.diagnostics.log_non_fatal_crash(source);
            }
            SignInError::Migration(source) => {
                self.diagnostics.log_non_fatal_crash(source);
            }
            SignInError::Crashed(source) => {
                self.notifications
                    .show_message(MessageKey::GenericError.into());
                self.diagnostics.log_non_fatal_crash(source);
            }
        }
    }
}

/// Spawns and tracks the background tasks of one screen
pub struct TaskScope {
    router: ErrorRouter,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl TaskScope {
    pub fn new(router: ErrorRouter) -> Self {
        Self {
            router,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Run `task` in the background. Returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch<F>(&self, task: F)
    where
        F: Future<Output = Result<(), SignInError>> + Send + 'static,
    {
        let router = self.router.clone();
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            let handle = tokio::spawn(task);
            let abort = handle.abort_handle();
            tokio::select! {
                () = cancel.cancelled() => {
                    abort.abort();
                    tracing::debug!("Sign-in task cancelled with its screen");
                }
                joined = handle => match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => router.route(&err),
                    Err(err) if err.is_panic() => {
                        router.route(&SignInError::Crashed(anyhow!("task panicked: {err}")));
                    }
                    Err(_) => {}
                },
            }
        });
    }

    /// Wait until every launched task has finished
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Cancel every task still running; later launches are cancelled at once
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_idle(&self) -> bool {
        self.tracker.is_empty()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        TaskScope::cancel(self);
    }
}
