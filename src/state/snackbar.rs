//! Snackbar messages and the channel-backed notification sink

use crate::services::NotificationSink;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Fixed user-visible messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    EmailError,
    EmptyPasswordError,
    RecoveryEmailSent,
    GenericError,
}

impl MessageKey {
    pub fn text(&self) -> &'static str {
        match self {
            Self::EmailError => "Please insert a valid email.",
            Self::EmptyPasswordError => "Password cannot be empty.",
            Self::RecoveryEmailSent => "Check your inbox for the recovery email.",
            Self::GenericError => "Something wrong happened. Please try again.",
        }
    }
}

/// A transient notification, either a known message or free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnackbarMessage {
    Resource(MessageKey),
    Text(String),
}

impl SnackbarMessage {
    /// Build the user-facing message for a failed operation.
    /// Blank error messages fall back to the generic error text.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let message = error.to_string();
        if message.trim().is_empty() {
            Self::Resource(MessageKey::GenericError)
        } else {
            Self::Text(message)
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Resource(key) => key.text(),
            Self::Text(text) => text,
        }
    }

    /// Whether this message reports a failure (drives the snackbar color)
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Resource(MessageKey::RecoveryEmailSent))
    }
}

impl From<MessageKey> for SnackbarMessage {
    fn from(key: MessageKey) -> Self {
        Self::Resource(key)
    }
}

/// Notification sink that queues messages for the UI loop to pick up
#[derive(Debug, Clone)]
pub struct SnackbarManager {
    tx: mpsc::UnboundedSender<SnackbarMessage>,
}

impl SnackbarManager {
    /// Create the manager and the receiving end drained by the app
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SnackbarMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for SnackbarManager {
    fn show_message(&self, message: SnackbarMessage) {
        // The receiver only goes away on shutdown
        if self.tx.send(message).is_err() {
            tracing::debug!("Snackbar receiver closed, dropping message");
        }
    }
}

/// The snackbar currently on screen
#[derive(Debug, Clone)]
pub struct ActiveSnackbar {
    pub message: SnackbarMessage,
    shown_at: Instant,
}

impl ActiveSnackbar {
    pub fn new(message: SnackbarMessage) -> Self {
        Self {
            message,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, duration: Duration) -> bool {
        self.shown_at.elapsed() >= duration
    }
}
