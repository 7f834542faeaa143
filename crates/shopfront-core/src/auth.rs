//! Authentication flow.
//!
//! [`AuthPhase`] is the view-facing state machine; [`AuthManager`] performs
//! the side effects of its transitions (persisting or clearing the session,
//! refreshing the cart count, syncing the local cart).

use std::sync::{Arc, LazyLock};

use anyhow::{Result, bail};
use regex::Regex;

use crate::api::{ApiClient, SessionStatus};
use crate::cart::{CartManager, SyncReport};
use crate::session::StoredUser;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Loose email shape check: `local@domain.tld` without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    LoggedOut { error: Option<String> },
    Authenticating,
    LoggedIn { user: StoredUser },
    Refreshing { user: StoredUser },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Submit,
    Succeeded(StoredUser),
    Failed(String),
    TokenRejected,
    Refreshed,
    RefreshFailed,
    LoggedOut,
}

impl Default for AuthPhase {
    fn default() -> Self {
        AuthPhase::LoggedOut { error: None }
    }
}

impl AuthPhase {
    /// Applies an event. Events that do not apply to the current phase
    /// leave it unchanged.
    #[must_use]
    pub fn apply(self, event: AuthEvent) -> AuthPhase {
        match (self, event) {
            (_, AuthEvent::LoggedOut) => AuthPhase::LoggedOut { error: None },
            (AuthPhase::LoggedOut { .. }, AuthEvent::Submit) => AuthPhase::Authenticating,
            (AuthPhase::Authenticating, AuthEvent::Succeeded(user)) => AuthPhase::LoggedIn { user },
            (AuthPhase::Authenticating, AuthEvent::Failed(error)) => AuthPhase::LoggedOut {
                error: Some(error),
            },
            (AuthPhase::LoggedIn { user }, AuthEvent::TokenRejected) => {
                AuthPhase::Refreshing { user }
            }
            (AuthPhase::Refreshing { user }, AuthEvent::Refreshed) => AuthPhase::LoggedIn { user },
            (AuthPhase::Refreshing { .. }, AuthEvent::RefreshFailed) => {
                AuthPhase::LoggedOut { error: None }
            }
            (phase, _) => phase,
        }
    }

    pub fn user(&self) -> Option<&StoredUser> {
        match self {
            AuthPhase::LoggedIn { user } | AuthPhase::Refreshing { user } => Some(user),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user().is_some()
    }

    /// The event that moves a phase to match a client session status.
    pub fn event_for(status: &SessionStatus) -> Option<AuthEvent> {
        match status {
            SessionStatus::Refreshing => Some(AuthEvent::TokenRejected),
            SessionStatus::LoggedIn { .. } => Some(AuthEvent::Refreshed),
            SessionStatus::LoggedOut { forced: true } => Some(AuthEvent::RefreshFailed),
            SessionStatus::LoggedOut { forced: false } => Some(AuthEvent::LoggedOut),
        }
    }
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: StoredUser,
    pub cart_count: u32,
    pub sync: SyncReport,
    /// Set when the best-effort cart sync failed; the login still stands.
    pub sync_error: Option<String>,
}

pub struct AuthManager {
    api: Arc<ApiClient>,
    cart: Arc<CartManager>,
}

impl AuthManager {
    pub fn new(api: Arc<ApiClient>, cart: Arc<CartManager>) -> Self {
        Self { api, cart }
    }

    /// Current phase derived from the persisted session.
    pub fn phase(&self) -> AuthPhase {
        match (self.api.is_authenticated(), self.api.current_user()) {
            (true, Some(user)) => AuthPhase::LoggedIn { user },
            _ => AuthPhase::default(),
        }
    }

    /// # Errors
    /// Returns an error for malformed input or a rejected login.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        validate(email, password)?;
        let user = self.api.login(email.trim(), password).await?;
        Ok(self.after_login(user).await)
    }

    /// # Errors
    /// Returns an error for malformed input or a rejected registration.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<LoginOutcome> {
        validate(email, password)?;
        if full_name.trim().is_empty() {
            bail!("Please enter your full name");
        }
        let user = self
            .api
            .register(email.trim(), password, full_name.trim())
            .await?;
        Ok(self.after_login(user).await)
    }

    async fn after_login(&self, user: StoredUser) -> LoginOutcome {
        let mut cart_count = self.cart.update_cart_count().await;

        let (sync, sync_error) = match self.cart.sync_cart_on_login().await {
            Ok(report) => (report, None),
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!(error = %message, "cart sync failed");
                (SyncReport::default(), Some(message))
            }
        };
        if sync.synced > 0 {
            cart_count = self.cart.update_cart_count().await;
        }

        LoginOutcome {
            user,
            cart_count,
            sync,
            sync_error,
        }
    }

    /// Clears the session and returns the (now local) cart count.
    ///
    /// # Errors
    /// Returns an error if storage cannot be updated.
    pub async fn logout(&self) -> Result<u32> {
        self.api.logout()?;
        Ok(self.cart.update_cart_count().await)
    }
}

fn validate(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        bail!("Please fill in all fields");
    }
    if !is_valid_email(email.trim()) {
        bail!("Please enter a valid email address");
    }
    Ok(())
}
