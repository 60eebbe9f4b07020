//! Account slots: current user and the credential list
//!
//! Thin credential storage for a single-device app; passwords are kept
//! as-is and hardening is out of scope.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::store::StoreError;
use crate::{USERS_FILE, USER_FILE};

/// A signed-in user as the rest of the app sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

/// A stored account record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Credential {
    name: String,
    email: String,
    password: String,
}

/// Errors from account operations
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Account already exists with this email")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store for the current-user record and the credential list
#[derive(Debug, Clone)]
pub struct UserStore {
    dir: PathBuf,
}

impl UserStore {
    /// Open or create a user store rooted at the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(?dir, "Opened user store");
        Ok(Self { dir })
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }

    fn credentials_path(&self) -> PathBuf {
        self.dir.join(USERS_FILE)
    }

    fn load_credentials(&self) -> Result<Vec<Credential>, StoreError> {
        let path = self.credentials_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_credentials(&self, credentials: &[Credential]) -> Result<(), StoreError> {
        let content = serde_json::to_string(credentials)?;
        fs::write(self.credentials_path(), content)?;
        Ok(())
    }

    /// The currently signed-in user, if any
    pub fn current(&self) -> Result<Option<User>, StoreError> {
        let path = self.current_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set_current(&self, user: &User) -> Result<(), StoreError> {
        let content = serde_json::to_string(user)?;
        fs::write(self.current_path(), content)?;
        info!(email = %user.email, "Signed in");
        Ok(())
    }

    /// Sign out by clearing the current-user slot
    pub fn log_out(&self) -> Result<(), StoreError> {
        let path = self.current_path();
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Signed out");
        }
        Ok(())
    }

    /// Create an account and sign in. Rejects an email that already has
    /// an account.
    pub fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let mut credentials = self.load_credentials()?;
        if credentials.iter().any(|c| c.email == email) {
            return Err(AuthError::DuplicateEmail);
        }
        credentials.push(Credential {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        self.write_credentials(&credentials)?;

        let user = User {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.set_current(&user)?;
        Ok(user)
    }

    /// Sign in with an email and password
    pub fn log_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = self.load_credentials()?;
        let found = credentials
            .iter()
            .find(|c| c.email == email && c.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let user = User {
            name: found.name.clone(),
            email: found.email.clone(),
        };
        self.set_current(&user)?;
        Ok(user)
    }

    /// All known accounts, without passwords
    pub fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .load_credentials()?
            .into_iter()
            .map(|c| User {
                name: c.name,
                email: c.email,
            })
            .collect())
    }
}
