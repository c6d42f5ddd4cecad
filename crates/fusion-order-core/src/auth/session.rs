use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::CredentialStore;
use crate::models::Role;

/// Session file name in the config directory
const SESSION_FILE: &str = "session.json";

/// The signed-in session: the bearer token plus who it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: None,
            role: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, username: Option<String>, role: Option<Role>) -> Self {
        self.username = username;
        self.role = role;
        self
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.created_at
    }

    /// Age for display, e.g. "12m" or "3h"
    pub fn age_display(&self) -> String {
        let minutes = self.age().num_minutes().max(0);
        if minutes < 60 {
            format!("{}m", minutes)
        } else if minutes < 1440 {
            format!("{}h", minutes / 60)
        } else {
            format!("{}d", minutes / 1440)
        }
    }
}

/// Token persisted as JSON on disk. Token expiry is the server's business;
/// the file only goes away on logout or a 401.
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load(&self) -> Result<Option<SessionData>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|data| data.token))
    }

    fn set(&self, token: &str) -> Result<()> {
        self.set_session(&SessionData::new(token))
    }

    fn session(&self) -> Result<Option<SessionData>> {
        self.load()
    }

    fn set_session(&self, session: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(self.session_path(), contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}
