//! Session persistence.
//!
//! A session is the token pair plus the signed-in user, spread over three
//! storage keys so each can be replaced independently during a refresh.
//! Tokens are never logged or displayed in full.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::types::AuthResponse;
use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Storage, USER_KEY};

/// The signed-in user as persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: u64,
    pub email: String,
}

impl StoredUser {
    /// Display name used in the header: the local part of the email.
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Snapshot of the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<StoredUser>,
}

/// Reads and writes session keys in a [`Storage`].
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Returns the current session, if an access token is stored.
    pub fn load(&self) -> Option<Session> {
        let access_token = self.access_token()?;
        Some(Session {
            access_token,
            refresh_token: self.refresh_token(),
            user: self.current_user(),
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage
            .get(ACCESS_TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage
            .get(REFRESH_TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// The stored user; an unparseable record is treated as absent.
    pub fn current_user(&self) -> Option<StoredUser> {
        let raw = self.storage.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed stored user");
                None
            }
        }
    }

    /// Persists a login/register response (tokens and user).
    ///
    /// # Errors
    /// Returns an error if storage writes fail.
    pub fn save(&self, auth: &AuthResponse) -> Result<StoredUser> {
        self.storage.set(ACCESS_TOKEN_KEY, &auth.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &auth.refresh_token)?;

        let user = StoredUser {
            id: auth.user_id,
            email: auth.email.clone(),
        };
        let json = serde_json::to_string(&user).context("Failed to serialize user")?;
        self.storage.set(USER_KEY, &json)?;

        tracing::info!(user_id = user.id, "session stored");
        Ok(user)
    }

    /// Replaces the token pair after a refresh, keeping the stored user.
    ///
    /// # Errors
    /// Returns an error if storage writes fail.
    pub fn update_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token)?;
        Ok(())
    }

    /// Removes every session key.
    ///
    /// # Errors
    /// Returns an error if storage writes fail.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        tracing::info!("session cleared");
        Ok(())
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 || !token.is_char_boundary(8) {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}
