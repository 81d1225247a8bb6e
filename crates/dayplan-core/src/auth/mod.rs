//! Demo authentication flow
//!
//! Plaintext credential compare against a flat stored list, with the
//! validation messages surfaced inline exactly as the user sees them. The
//! session is a single stored email with no expiry or signature; anything
//! with storage access can forge it. All of that is the documented scope of
//! this app, not an oversight.

pub mod user;

pub use user::{User, UserStore};

use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::info;

use crate::Result;
use crate::store::KvStore;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Validation failures, in the exact wording shown inline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please fill in all fields.")]
    EmptyFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 6 characters.")]
    ShortPassword,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Email is already registered.")]
    DuplicateEmail,
    #[error("Invalid email or password.")]
    BadCredentials,
}

/// Signup, login, and session handling over the user store
pub struct AuthService {
    users: UserStore,
}

impl AuthService {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self {
            users: UserStore::new(store),
        }
    }

    /// Whether a string looks like an email address
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_RE.is_match(email)
    }

    /// Register a new user and mark the session active.
    ///
    /// Checks run in a fixed order; the first failure wins.
    pub fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<User> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(AuthError::EmptyFields.into());
        }
        if !Self::is_valid_email(&email) {
            return Err(AuthError::InvalidEmail.into());
        }
        if password.len() < 6 {
            return Err(AuthError::ShortPassword.into());
        }
        if password != confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        if self.users.find(&email)?.is_some() {
            return Err(AuthError::DuplicateEmail.into());
        }

        let user = User {
            name: name.to_string(),
            email: email.clone(),
            password: password.to_string(),
        };
        self.users.push(user.clone())?;
        self.users.set_logged_in(&email)?;
        info!("Registered user {}", email);
        Ok(user)
    }

    /// Authenticate an existing user and mark the session active
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();

        if !Self::is_valid_email(&email) {
            return Err(AuthError::InvalidEmail.into());
        }

        let user = match self.users.find(&email)? {
            Some(user) if user.password == password => user,
            _ => return Err(AuthError::BadCredentials.into()),
        };

        self.users.set_logged_in(&email)?;
        info!("User {} logged in", email);
        Ok(user)
    }

    /// End the active session
    pub fn logout(&self) -> Result<()> {
        self.users.clear_logged_in()
    }

    /// Email of the active session, if any
    pub fn current_user(&self) -> Result<Option<String>> {
        self.users.logged_in()
    }

    /// Display name for an email: the registered name when known, otherwise
    /// the email itself
    pub fn display_name(&self, email: &str) -> Result<String> {
        Ok(self
            .users
            .find(email)?
            .map(|u| u.name)
            .unwrap_or_else(|| email.to_string()))
    }
}
