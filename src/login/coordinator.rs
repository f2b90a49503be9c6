//! Sign-in screen coordinator
//!
//! Holds the form, validates it on submit, and runs the
//! authenticate → link → migrate sequence in the background.

use super::errors::{Phase, SignInError, ValidationError};
use super::scope::{ErrorRouter, TaskScope};
use crate::services::{AuthProvider, DiagnosticsSink, NotificationSink, RemoteUserStore};
use crate::state::{is_blank, is_valid_email, LoginUiState, MessageKey};
use std::sync::Arc;

pub struct SignInCoordinator {
    ui_state: LoginUiState,
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RemoteUserStore>,
    notifications: Arc<dyn NotificationSink>,
    scope: TaskScope,
}

impl SignInCoordinator {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn RemoteUserStore>,
        notifications: Arc<dyn NotificationSink>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        let router = ErrorRouter::new(Arc::clone(&notifications), diagnostics);
        Self {
            ui_state: LoginUiState::default(),
            auth,
            store,
            notifications,
            scope: TaskScope::new(router),
        }
    }

    pub fn ui_state(&self) -> &LoginUiState {
        &self.ui_state
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.ui_state = self.ui_state.with_email(value);
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.ui_state = self.ui_state.with_password(value);
    }

    /// Validate the form and start signing in.
    ///
    /// Returns immediately. `restart_app` runs once the account is linked and
    /// the user's records have moved to the permanent id.
    pub fn submit_sign_in<F>(&self, restart_app: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(err) = self.validate_sign_in() {
            self.reject(err);
            return;
        }

        let form = self.ui_state.clone();
        let auth = Arc::clone(&self.auth);
        let store = Arc::clone(&self.store);
        self.scope.launch(async move {
            sign_in_sequence(auth.as_ref(), store.as_ref(), &form).await?;
            restart_app();
            Ok::<(), SignInError>(())
        });
    }

    /// Validate the email and ask for a password recovery email
    pub fn submit_forgot_password(&self) {
        if !is_valid_email(&self.ui_state.email) {
            self.reject(ValidationError::InvalidEmail);
            return;
        }

        let email = self.ui_state.email.clone();
        let auth = Arc::clone(&self.auth);
        let notifications = Arc::clone(&self.notifications);
        self.scope.launch(async move {
            auth.send_recovery_email(&email)
                .await
                .map_err(SignInError::remote(Phase::RecoveryEmail))?;
            notifications.show_message(MessageKey::RecoveryEmailSent.into());
            Ok::<(), SignInError>(())
        });
    }

    /// Whether a sign-in or recovery request is still running
    pub fn is_busy(&self) -> bool {
        !self.scope.is_idle()
    }

    /// Wait for every background step started by this screen
    #[allow(dead_code)]
    pub async fn wait_idle(&self) {
        self.scope.wait_idle().await;
    }

    /// Email is checked before password
    fn validate_sign_in(&self) -> Result<(), ValidationError> {
        if !is_valid_email(&self.ui_state.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if is_blank(&self.ui_state.password) {
            return Err(ValidationError::EmptyPassword);
        }
        Ok(())
    }

    fn reject(&self, err: ValidationError) {
        tracing::debug!("Rejected sign-in form: {err}");
        self.notifications.show_message(err.message_key().into());
    }
}

async fn sign_in_sequence(
    auth: &dyn AuthProvider,
    store: &dyn RemoteUserStore,
    form: &LoginUiState,
) -> Result<(), SignInError> {
    tracing::debug!("Authenticating {}", form.email);
    auth.authenticate(&form.email, &form.password)
        .await
        .map_err(SignInError::remote(Phase::Authenticate))?;

    tracing::debug!("Linking anonymous session");
    auth.link_anonymous_account(&form.email, &form.password)
        .await
        .map_err(SignInError::remote(Phase::Link))?;

    let old_user_id = auth.anonymous_user_id();
    let new_user_id = auth.user_id();
    tracing::debug!("Moving records from {old_user_id} to {new_user_id}");
    store
        .reassign_ownership(&old_user_id, &new_user_id)
        .await
        .map_err(SignInError::Migration)?;

    tracing::info!("Signed in as {}", form.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        MockAuthProvider, MockDiagnosticsSink, MockNotificationSink, MockRemoteUserStore,
    };
    use crate::state::SnackbarMessage;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    const EMAIL: &str = "user@example.com";
    const PASSWORD: &str = "secret123";

    struct Fixture {
        auth: MockAuthProvider,
        store: MockRemoteUserStore,
        notifications: MockNotificationSink,
        diagnostics: MockDiagnosticsSink,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                auth: MockAuthProvider::new(),
                store: MockRemoteUserStore::new(),
                notifications: MockNotificationSink::new(),
                diagnostics: MockDiagnosticsSink::new(),
            }
        }

        fn no_remote_calls(mut self) -> Self {
            self.auth.expect_authenticate().never();
            self.auth.expect_link_anonymous_account().never();
            self.auth.expect_send_recovery_email().never();
            self.store.expect_reassign_ownership().never();
            self
        }

        fn expect_message(mut self, message: SnackbarMessage, times: usize) -> Self {
            self.notifications
                .expect_show_message()
                .with(eq(message))
                .times(times)
                .return_const(());
            self
        }

        fn no_messages(mut self) -> Self {
            self.notifications.expect_show_message().never();
            self
        }

        fn expect_reports(mut self, times: usize) -> Self {
            self.diagnostics
                .expect_log_non_fatal_crash()
                .times(times)
                .return_const(());
            self
        }

        fn authenticate_ok(mut self, times: usize) -> Self {
            self.auth
                .expect_authenticate()
                .withf(|email, password| email == EMAIL && password == PASSWORD)
                .times(times)
                .returning(|_, _| Ok(()));
            self
        }

        fn link_ok(mut self, times: usize) -> Self {
            self.auth
                .expect_link_anonymous_account()
                .times(times)
                .returning(|_, _| Ok(()));
            self.auth
                .expect_anonymous_user_id()
                .return_const("anon-1".to_string());
            self.auth.expect_user_id().return_const("perm-1".to_string());
            self
        }

        fn build(self) -> SignInCoordinator {
            let mut coordinator = SignInCoordinator::new(
                Arc::new(self.auth),
                Arc::new(self.store),
                Arc::new(self.notifications),
                Arc::new(self.diagnostics),
            );
            coordinator.set_email(EMAIL);
            coordinator.set_password(PASSWORD);
            coordinator
        }
    }

    fn restart_counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = Arc::clone(&count);
        (count, move || {
            hook.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_new_form_is_empty() {
        let coordinator = SignInCoordinator::new(
            Arc::new(MockAuthProvider::new()),
            Arc::new(MockRemoteUserStore::new()),
            Arc::new(MockNotificationSink::new()),
            Arc::new(MockDiagnosticsSink::new()),
        );
        assert_eq!(coordinator.ui_state(), &LoginUiState::default());
    }

    #[test]
    fn test_set_email_twice_leaves_password() {
        let mut coordinator = Fixture::new().build();
        coordinator.set_email("first@example.com");
        coordinator.set_email("second@example.com");
        assert_eq!(
            coordinator.ui_state(),
            &LoginUiState {
                email: "second@example.com".to_string(),
                password: PASSWORD.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_emails_without_at_never_authenticate() {
        let candidates = ["", "bad-email", "user.example.com", "   ", "user at example.com"];
        let mut coordinator = Fixture::new()
            .no_remote_calls()
            .expect_message(MessageKey::EmailError.into(), candidates.len())
            .build();

        for email in candidates {
            coordinator.set_email(email);
            coordinator.submit_sign_in(|| panic!("restart must not run"));
        }
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_blank_passwords_never_authenticate() {
        let candidates = ["", " ", "\t\n"];
        let mut coordinator = Fixture::new()
            .no_remote_calls()
            .expect_message(MessageKey::EmptyPasswordError.into(), candidates.len())
            .build();

        for password in candidates {
            coordinator.set_password(password);
            coordinator.submit_sign_in(|| panic!("restart must not run"));
        }
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_empty_password_scenario() {
        let mut coordinator = Fixture::new()
            .no_remote_calls()
            .expect_message(MessageKey::EmptyPasswordError.into(), 1)
            .build();
        coordinator.set_email("user@example.com");
        coordinator.set_password("");

        coordinator.submit_sign_in(|| {});
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_bad_email_scenario() {
        let mut coordinator = Fixture::new()
            .no_remote_calls()
            .expect_message(MessageKey::EmailError.into(), 1)
            .build();
        coordinator.set_email("bad-email");
        coordinator.set_password("secret123");

        coordinator.submit_sign_in(|| {});
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_email_checked_before_password() {
        let mut coordinator = Fixture::new()
            .no_remote_calls()
            .expect_message(MessageKey::EmailError.into(), 1)
            .build();
        coordinator.set_email("bad-email");
        coordinator.set_password("");

        coordinator.submit_sign_in(|| {});
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_authenticate_failure_stops_before_link() {
        let mut fixture = Fixture::new()
            .expect_message(SnackbarMessage::Text("wrong password".to_string()), 1)
            .expect_reports(1);
        fixture
            .auth
            .expect_authenticate()
            .times(1)
            .returning(|_, _| Err(anyhow!("wrong password")));
        fixture.auth.expect_link_anonymous_account().never();
        fixture.store.expect_reassign_ownership().never();
        let coordinator = fixture.build();

        let (restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        coordinator.wait_idle().await;

        assert_eq!(restarts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_link_failure_stops_before_migration() {
        let mut fixture = Fixture::new()
            .authenticate_ok(1)
            .expect_message(SnackbarMessage::Text("email already in use".to_string()), 1)
            .expect_reports(1);
        fixture
            .auth
            .expect_link_anonymous_account()
            .times(1)
            .returning(|_, _| Err(anyhow!("email already in use")));
        fixture.store.expect_reassign_ownership().never();
        let coordinator = fixture.build();

        let (restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        coordinator.wait_idle().await;

        assert_eq!(restarts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_migration_failure_is_silent_for_user() {
        let mut fixture = Fixture::new()
            .authenticate_ok(1)
            .link_ok(1)
            .no_messages()
            .expect_reports(1);
        fixture
            .store
            .expect_reassign_ownership()
            .times(1)
            .returning(|_, _| Err(anyhow!("store offline")));
        let coordinator = fixture.build();

        let (restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        coordinator.wait_idle().await;

        assert_eq!(restarts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_sequence_restarts_once() {
        let mut fixture = Fixture::new()
            .authenticate_ok(1)
            .link_ok(1)
            .no_messages()
            .expect_reports(0);
        fixture
            .store
            .expect_reassign_ownership()
            .withf(|old, new| old == "anon-1" && new == "perm-1")
            .times(1)
            .returning(|_, _| Ok(()));
        let coordinator = fixture.build();

        let (restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        coordinator.wait_idle().await;

        assert_eq!(restarts.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_double_submit_runs_two_sequences() {
        let mut fixture = Fixture::new().authenticate_ok(2).link_ok(2).no_messages();
        fixture
            .store
            .expect_reassign_ownership()
            .times(2)
            .returning(|_, _| Ok(()));
        let coordinator = fixture.build();

        let (restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        let (more_restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        coordinator.wait_idle().await;

        assert_eq!(restarts.load(Ordering::SeqCst), 1);
        assert_eq!(more_restarts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forgot_password_success_notifies_once() {
        let mut fixture = Fixture::new()
            .expect_message(MessageKey::RecoveryEmailSent.into(), 1)
            .expect_reports(0);
        fixture
            .auth
            .expect_send_recovery_email()
            .withf(|email| email == EMAIL)
            .times(1)
            .returning(|_| Ok(()));
        let coordinator = fixture.build();

        coordinator.submit_forgot_password();
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_forgot_password_failure_is_surfaced() {
        let mut fixture = Fixture::new()
            .expect_message(SnackbarMessage::Text("no such user".to_string()), 1)
            .expect_reports(1);
        fixture
            .auth
            .expect_send_recovery_email()
            .times(1)
            .returning(|_| Err(anyhow!("no such user")));
        let coordinator = fixture.build();

        coordinator.submit_forgot_password();
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_forgot_password_validates_email() {
        let mut coordinator = Fixture::new()
            .no_remote_calls()
            .expect_message(MessageKey::EmailError.into(), 1)
            .build();
        coordinator.set_email("bad-email");

        coordinator.submit_forgot_password();
        coordinator.wait_idle().await;
    }

    #[tokio::test]
    async fn test_forgot_password_ignores_empty_password() {
        let mut fixture = Fixture::new().expect_message(MessageKey::RecoveryEmailSent.into(), 1);
        fixture
            .auth
            .expect_send_recovery_email()
            .times(1)
            .returning(|_| Ok(()));
        let mut coordinator = fixture.build();
        coordinator.set_password("");

        coordinator.submit_forgot_password();
        coordinator.wait_idle().await;
    }

    /// Account service whose `authenticate` blocks until released
    #[derive(Default)]
    struct GatedAuth {
        entered: Notify,
        release: Notify,
        links: AtomicUsize,
    }

    #[async_trait]
    impl AuthProvider for GatedAuth {
        fn has_user(&self) -> bool {
            true
        }
        async fn create_anonymous_account(&self) -> Result<()> {
            Ok(())
        }
        async fn authenticate(&self, _email: &str, _password: &str) -> Result<()> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
        async fn link_anonymous_account(&self, _email: &str, _password: &str) -> Result<()> {
            self.links.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn anonymous_user_id(&self) -> String {
            "anon".to_string()
        }
        fn user_id(&self) -> String {
            "perm".to_string()
        }
        async fn send_recovery_email(&self, _email: &str) -> Result<()> {
            Ok(())
        }
        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_teardown_cancels_pending_sequence() {
        let auth = Arc::new(GatedAuth::default());
        let mut store = MockRemoteUserStore::new();
        store.expect_reassign_ownership().never();
        let mut notifications = MockNotificationSink::new();
        notifications.expect_show_message().never();
        let mut coordinator = SignInCoordinator::new(
            Arc::clone(&auth) as Arc<dyn AuthProvider>,
            Arc::new(store),
            Arc::new(notifications),
            Arc::new(MockDiagnosticsSink::new()),
        );
        coordinator.set_email(EMAIL);
        coordinator.set_password(PASSWORD);

        let (restarts, restart) = restart_counter();
        coordinator.submit_sign_in(restart);
        auth.entered.notified().await;

        drop(coordinator);
        tokio::time::sleep(Duration::from_millis(20)).await;
        auth.release.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(auth.links.load(Ordering::SeqCst), 0);
        assert_eq!(restarts.load(Ordering::SeqCst), 0);
    }
}
