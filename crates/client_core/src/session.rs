//! Login gate over the persisted sign-in flag.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::{SessionStore, LOGGED_IN_KEY, USERNAME_KEY};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{FieldViolation, LoginError};

const USERNAME_MIN: usize = 5;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 20;

pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            password: "123456".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub credentials: Credentials,
    /// Simulated round trip before credentials are checked.
    pub login_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            login_delay: DEFAULT_LOGIN_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub username: String,
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    fn begin(username: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            username: username.into(),
            started_at: Utc::now(),
        }
    }
}

/// Applies the sign-in form rules, reporting every broken rule at once.
pub fn validate_login_form(username: &str, password: &str) -> Result<(), LoginError> {
    let mut violations = Vec::new();

    if username.is_empty() {
        violations.push(FieldViolation::new("username", "username is required"));
    } else {
        let len = username.chars().count();
        if len < USERNAME_MIN {
            violations.push(FieldViolation::new(
                "username",
                format!("username must be at least {USERNAME_MIN} characters"),
            ));
        }
        if len > USERNAME_MAX {
            violations.push(FieldViolation::new(
                "username",
                format!("username must be at most {USERNAME_MAX} characters"),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            violations.push(FieldViolation::new(
                "username",
                "username may only contain letters, digits and underscores",
            ));
        }
    }

    if password.is_empty() {
        violations.push(FieldViolation::new("password", "password is required"));
    } else {
        let len = password.chars().count();
        if len < PASSWORD_MIN {
            violations.push(FieldViolation::new(
                "password",
                format!("password must be at least {PASSWORD_MIN} characters"),
            ));
        }
        if len > PASSWORD_MAX {
            violations.push(FieldViolation::new(
                "password",
                format!("password must be at most {PASSWORD_MAX} characters"),
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(LoginError::Validation(violations))
    }
}

#[derive(Clone)]
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionGate {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<SessionContext, LoginError> {
        validate_login_form(username, password)?;

        if !self.config.login_delay.is_zero() {
            tokio::time::sleep(self.config.login_delay).await;
        }

        let expected = &self.config.credentials;
        if username != expected.username || password != expected.password {
            warn!(username, "login rejected");
            return Err(LoginError::InvalidCredentials);
        }

        self.store.set(LOGGED_IN_KEY, "true").await?;
        self.store.set(USERNAME_KEY, username).await?;

        let session = SessionContext::begin(username);
        info!(username, session_id = %session.session_id, "signed in");
        Ok(session)
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.get(LOGGED_IN_KEY).await?.as_deref() == Some("true"))
    }

    /// Picks up a sign-in persisted by an earlier run.
    pub async fn restore(&self) -> Result<Option<SessionContext>> {
        if !self.is_authenticated().await? {
            return Ok(None);
        }
        let username = self.store.get(USERNAME_KEY).await?.unwrap_or_default();
        let session = SessionContext::begin(username);
        info!(username = %session.username, session_id = %session.session_id, "session restored");
        Ok(Some(session))
    }

    pub async fn logout(&self, session: &SessionContext) -> Result<()> {
        self.store.remove(LOGGED_IN_KEY).await?;
        self.store.remove(USERNAME_KEY).await?;
        info!(username = %session.username, session_id = %session.session_id, "signed out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
