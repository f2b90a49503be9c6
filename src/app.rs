//! Application state and core logic

use crate::config::LoginConfig;
use crate::login::SignInCoordinator;
use crate::services::{
    AuthProvider, DiagnosticsSink, LocalAuthProvider, LocalUserStore, RemoteUserStore,
    TracingDiagnostics,
};
use crate::state::{
    AccountSummary, AppState, LoginField, LoginUiState, SnackbarManager, SnackbarMessage, View,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Records every fresh anonymous session starts with
const STARTER_RECORDS: &[&str] = &["Buy groceries", "Call the dentist", "Water the plants"];

/// Signals sent from background tasks back to the UI loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Sign-in finished; reload the authenticated state
    Restart,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// The sign-in screen, present while the login view is open
    pub login: Option<SignInCoordinator>,
    auth: Arc<LocalAuthProvider>,
    store: Arc<LocalUserStore>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    snackbars: SnackbarManager,
    snackbar_rx: mpsc::UnboundedReceiver<SnackbarMessage>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    config: LoginConfig,
    /// Whether config changes are written to disk
    persist_config: bool,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance backed by the local account service
    pub async fn new() -> Result<Self> {
        let config = LoginConfig::load().unwrap_or_else(|err| {
            tracing::warn!("Ignoring unreadable config: {err:#}");
            LoginConfig::default()
        });
        let latency = config.backend_latency();
        Self::with_services(
            config,
            Arc::new(LocalAuthProvider::new(latency)),
            Arc::new(LocalUserStore::new(latency)),
            true,
        )
        .await
    }

    /// Create an App on top of the given services
    pub async fn with_services(
        config: LoginConfig,
        auth: Arc<LocalAuthProvider>,
        store: Arc<LocalUserStore>,
        persist_config: bool,
    ) -> Result<Self> {
        if !auth.has_user() {
            auth.create_anonymous_account().await?;
            store.seed(&auth.user_id(), STARTER_RECORDS);
        }

        let (snackbars, snackbar_rx) = SnackbarManager::channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut app = Self {
            state: AppState::default(),
            login: None,
            auth,
            store,
            diagnostics: Arc::new(TracingDiagnostics),
            snackbars,
            snackbar_rx,
            events_tx,
            events_rx,
            config,
            persist_config,
            quit: false,
        };
        app.open_login();
        Ok(app)
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Form contents of the login screen, if open
    pub fn login_form(&self) -> Option<&LoginUiState> {
        self.login.as_ref().map(SignInCoordinator::ui_state)
    }

    /// Whether the login screen has a request in flight
    pub fn is_busy(&self) -> bool {
        self.login.as_ref().is_some_and(SignInCoordinator::is_busy)
    }

    /// Drain notifications and background events. Called once per frame.
    pub fn tick(&mut self) {
        while let Ok(message) = self.snackbar_rx.try_recv() {
            self.state.show_snackbar(message);
        }
        self.state.expire_snackbar(self.config.snackbar_duration());

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::Restart => self.restart(),
            }
        }
    }

    /// Handle a key press
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        match self.state.current_view {
            View::Login => self.handle_login_key(key),
            View::Account => self.handle_account_key(key).await?,
        }
        Ok(())
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        let Some(login) = self.login.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.state.active_field = self.state.active_field.toggle();
            }
            KeyCode::Enter => {
                let events = self.events_tx.clone();
                login.submit_sign_in(move || {
                    // Receiver lives as long as the app
                    let _ = events.send(AppEvent::Restart);
                });
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                login.submit_forgot_password();
            }
            KeyCode::Backspace => match self.state.active_field {
                LoginField::Email => {
                    let mut email = login.ui_state().email.clone();
                    email.pop();
                    login.set_email(email);
                }
                LoginField::Password => {
                    let mut password = login.ui_state().password.clone();
                    password.pop();
                    login.set_password(password);
                }
            },
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.state.active_field {
                    LoginField::Email => {
                        let email = format!("{}{c}", login.ui_state().email);
                        login.set_email(email);
                    }
                    LoginField::Password => {
                        let password = format!("{}{c}", login.ui_state().password);
                        login.set_password(password);
                    }
                }
            }
            _ => {}
        }
    }

    async fn handle_account_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('s') => self.sign_out().await?,
            _ => {}
        }
        Ok(())
    }

    /// Open a fresh sign-in screen
    fn open_login(&mut self) {
        let mut login = SignInCoordinator::new(
            Arc::clone(&self.auth) as Arc<dyn AuthProvider>,
            Arc::clone(&self.store) as Arc<dyn RemoteUserStore>,
            Arc::new(self.snackbars.clone()),
            Arc::clone(&self.diagnostics),
        );
        if let Some(email) = &self.config.last_email {
            login.set_email(email.as_str());
        }
        self.login = Some(login);
        self.state.current_view = View::Login;
        self.state.active_field = LoginField::Email;
    }

    /// Reload the authenticated state after a successful sign-in
    fn restart(&mut self) {
        // Dropping the screen cancels anything it still has in flight
        let email = self
            .login
            .take()
            .map(|login| login.ui_state().email.clone())
            .unwrap_or_default();

        let user_id = self.auth.user_id();
        let record_titles = self
            .store
            .records_for(&user_id)
            .into_iter()
            .map(|record| record.title)
            .collect();
        tracing::info!(%user_id, "Reloaded account after sign-in");

        if self.config.remember_email() {
            self.config.last_email = Some(email.clone());
            if self.persist_config {
                if let Err(err) = self.config.save() {
                    tracing::warn!("Failed to save config: {err:#}");
                }
            }
        }

        self.state.account = Some(AccountSummary {
            user_id,
            email,
            record_titles,
        });
        self.state.current_view = View::Account;
    }

    async fn sign_out(&mut self) -> Result<()> {
        self.auth.sign_out().await?;
        self.auth.create_anonymous_account().await?;
        self.state.account = None;
        self.open_login();
        Ok(())
    }

    #[cfg(test)]
    async fn wait_idle(&self) {
        if let Some(login) = &self.login {
            login.wait_idle().await;
        }
    }
}
