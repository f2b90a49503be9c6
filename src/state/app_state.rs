//! Application state definitions

use super::login_state::LoginField;
use super::snackbar::{ActiveSnackbar, SnackbarMessage};
use std::time::Duration;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Account,
}

/// What the account view shows after a successful sign-in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSummary {
    pub user_id: String,
    pub email: String,
    pub record_titles: Vec<String>,
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    pub current_view: View,
    pub active_field: LoginField,
    pub snackbar: Option<ActiveSnackbar>,
    pub account: Option<AccountSummary>,
}

impl AppState {
    /// Replace the visible snackbar; the newest message wins
    pub fn show_snackbar(&mut self, message: SnackbarMessage) {
        self.snackbar = Some(ActiveSnackbar::new(message));
    }

    /// Clear the snackbar once it has been visible for `duration`
    pub fn expire_snackbar(&mut self, duration: Duration) {
        if self
            .snackbar
            .as_ref()
            .is_some_and(|s| s.is_expired(duration))
        {
            self.snackbar = None;
        }
    }
}
