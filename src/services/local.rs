//! In-memory account service and record store
//!
//! These back the binary when no remote backend is configured. State lives
//! behind a `std::sync::Mutex` that is never held across an `.await`.

use super::traits::{AuthProvider, RemoteUserStore};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failures reported by the local account service
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("The password is invalid or the user does not have a password.")]
    InvalidCredentials,
    #[error("The email address is already in use by another account.")]
    EmailAlreadyInUse,
    #[error("There is no anonymous session to link.")]
    NoAnonymousSession,
    #[error("There is no user record corresponding to {0}.")]
    UnknownEmail(String),
}

/// Failures reported by the local record store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("User id must not be empty")]
    EmptyUserId,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    is_anonymous: bool,
    /// Id held before the session was linked
    anonymous_id: String,
}

#[derive(Debug, Default)]
struct AccountState {
    session: Option<Session>,
    accounts: HashMap<String, Account>,
    outbox: Vec<String>,
}

/// In-memory account service
#[derive(Debug, Default)]
pub struct LocalAuthProvider {
    state: Mutex<AccountState>,
    latency: Duration,
}

impl LocalAuthProvider {
    pub fn new(latency: Duration) -> Self {
        Self {
            state: Mutex::default(),
            latency,
        }
    }

    /// Register a permanent account up front (not tied to any session)
    #[allow(dead_code)]
    pub fn register(&self, email: &str, password: &str) {
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
            },
        );
    }

    /// Whether the current session is still anonymous
    #[allow(dead_code)]
    pub fn is_anonymous(&self) -> bool {
        self.lock().session.as_ref().is_some_and(|s| s.is_anonymous)
    }

    /// Recovery emails sent so far
    #[allow(dead_code)]
    pub fn outbox(&self) -> Vec<String> {
        self.lock().outbox.clone()
    }

    fn lock(&self) -> MutexGuard<'_, AccountState> {
        // A poisoned lock only means another task panicked mid-update
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn has_user(&self) -> bool {
        self.lock().session.is_some()
    }

    async fn create_anonymous_account(&self) -> Result<()> {
        self.simulate_latency().await;
        let user_id = Uuid::new_v4().to_string();
        tracing::info!(%user_id, "Created anonymous session");
        self.lock().session = Some(Session {
            user_id: user_id.clone(),
            is_anonymous: true,
            anonymous_id: user_id,
        });
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<()> {
        self.simulate_latency().await;
        let state = self.lock();
        match state.accounts.get(email) {
            Some(account) if account.password != password => {
                Err(AccountError::InvalidCredentials.into())
            }
            _ => Ok(()),
        }
    }

    async fn link_anonymous_account(&self, email: &str, password: &str) -> Result<()> {
        self.simulate_latency().await;
        let mut state = self.lock();
        if state.accounts.contains_key(email) {
            return Err(AccountError::EmailAlreadyInUse.into());
        }
        let user_id = Uuid::new_v4().to_string();
        let session = state
            .session
            .as_mut()
            .filter(|s| s.is_anonymous)
            .ok_or(AccountError::NoAnonymousSession)?;
        session.anonymous_id = session.user_id.clone();
        session.user_id = user_id.clone();
        session.is_anonymous = false;
        tracing::info!(%user_id, "Linked anonymous session to {email}");
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
            },
        );
        Ok(())
    }

    fn anonymous_user_id(&self) -> String {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.anonymous_id.clone())
            .unwrap_or_default()
    }

    fn user_id(&self) -> String {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.user_id.clone())
            .unwrap_or_default()
    }

    async fn send_recovery_email(&self, email: &str) -> Result<()> {
        self.simulate_latency().await;
        let mut state = self.lock();
        if !state.accounts.contains_key(email) {
            return Err(AccountError::UnknownEmail(email.to_string()).into());
        }
        tracing::info!("Queued recovery email for {email}");
        state.outbox.push(email.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.lock().session = None;
        Ok(())
    }
}

/// A record owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
}

/// In-memory record store keyed by owner id
#[derive(Debug, Default)]
pub struct LocalUserStore {
    records: Mutex<Vec<OwnedRecord>>,
    latency: Duration,
}

impl LocalUserStore {
    pub fn new(latency: Duration) -> Self {
        Self {
            records: Mutex::default(),
            latency,
        }
    }

    /// Add records owned by `owner_id`
    pub fn seed(&self, owner_id: &str, titles: &[&str]) {
        let mut records = self.lock();
        records.extend(titles.iter().map(|title| OwnedRecord {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title: (*title).to_string(),
        }));
    }

    pub fn records_for(&self, owner_id: &str) -> Vec<OwnedRecord> {
        self.lock()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OwnedRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RemoteUserStore for LocalUserStore {
    async fn reassign_ownership(&self, old_id: &str, new_id: &str) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if old_id.is_empty() || new_id.is_empty() {
            return Err(anyhow!(StoreError::EmptyUserId));
        }
        let mut records = self.lock();
        let mut moved = 0usize;
        for record in records.iter_mut().filter(|r| r.owner_id == old_id) {
            record.owner_id = new_id.to_string();
            moved += 1;
        }
        tracing::debug!(moved, "Reassigned records from {old_id} to {new_id}");
        Ok(())
    }
}
