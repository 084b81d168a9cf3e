//! Local account state.
//!
//! Logging in only records a flag and the entered credentials on this device.
//! Nothing is verified against anything; the flag gates the friends list.
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{CnError, KeyValueStore, Result};

/// Storage key of the `"true"`/`"false"` login flag.
pub const LOGIN_STATE_KEY: &str = "IS_LOGGED_IN";

/// Storage key of the stored credentials.
pub const USER_CREDENTIALS_KEY: &str = "USER_CREDENTIALS";

/// Credentials entered on the login screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Trims and checks login input: both fields required, e-mail must
    /// contain `@`.
    pub fn new(email: &str, password: &str) -> Result<Self> {
        let email = email.trim();
        let password = password.trim();

        if email.is_empty() || password.is_empty() {
            return Err(CnError::InvalidCredentials {
                message: "e-mail and password are required".to_string(),
            });
        }
        if !email.contains('@') {
            return Err(CnError::InvalidCredentials {
                message: format!("{} is not a valid e-mail address", email),
            });
        }

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// Reads and writes the login flag and credentials.
pub struct AccountStore<S> {
    store: S,
}

impl<S: KeyValueStore> AccountStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Whether the device is marked as logged in. Anything but a stored
    /// `"true"`, including a failed read, counts as logged out.
    pub async fn is_logged_in(&self) -> bool {
        match self.store.get(LOGIN_STATE_KEY).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!("Failed to read login state: {}", e);
                false
            }
        }
    }

    /// The stored credentials, `None` when absent or unreadable.
    pub async fn credentials(&self) -> Option<Credentials> {
        let raw = match self.store.get(USER_CREDENTIALS_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read stored credentials: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!("Ignoring malformed stored credentials: {}", e);
                None
            }
        }
    }

    /// Validates and stores credentials, then marks the device logged in.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials> {
        let credentials = Credentials::new(email, password)?;

        let json = serde_json::to_string(&credentials)?;
        self.store.set(USER_CREDENTIALS_KEY, &json).await?;
        self.store.set(LOGIN_STATE_KEY, "true").await?;

        info!("Logged in as {}", credentials.email);
        Ok(credentials)
    }

    /// Marks the device logged out and forgets the stored credentials.
    pub async fn logout(&self) -> Result<()> {
        self.store.set(LOGIN_STATE_KEY, "false").await?;
        self.store.remove(USER_CREDENTIALS_KEY).await?;

        info!("Logged out");
        Ok(())
    }

    /// Flips the login flag and returns the new state. Turning it off also
    /// forgets the credentials; turning it on keeps whatever is stored.
    pub async fn toggle(&self) -> Result<bool> {
        if self.is_logged_in().await {
            self.logout().await?;
            Ok(false)
        } else {
            self.store.set(LOGIN_STATE_KEY, "true").await?;
            debug!("Login flag set without new credentials");
            Ok(true)
        }
    }
}
