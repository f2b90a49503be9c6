//! Configuration handling for the TUI

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default snackbar visibility
const DEFAULT_SNACKBAR_MS: u64 = 4000;

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginConfig {
    /// Email pre-filled on the sign-in screen
    pub last_email: Option<String>,
    /// Remember the email after a successful sign-in
    pub remember_email: Option<bool>,
    /// How long a snackbar stays visible
    pub snackbar_duration_ms: Option<u64>,
    /// Simulated latency of the local account backend
    pub backend_latency_ms: Option<u64>,
}

impl LoginConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "makeitso", "signin-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: LoginConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn remember_email(&self) -> bool {
        self.remember_email.unwrap_or(true)
    }

    pub fn snackbar_duration(&self) -> Duration {
        Duration::from_millis(self.snackbar_duration_ms.unwrap_or(DEFAULT_SNACKBAR_MS))
    }

    pub fn backend_latency(&self) -> Duration {
        Duration::from_millis(self.backend_latency_ms.unwrap_or(0))
    }
}
