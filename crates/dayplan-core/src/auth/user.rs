//! User records
//!
//! Users live as one JSON array blob under the `users` key, passwords in
//! plaintext — demo-grade on purpose, per the scope of this app. The active
//! session is the single email string under `loggedInUser`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Result;
use crate::store::kv::{KEY_LOGGED_IN_USER, KEY_USERS, KvStore};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Flat user list plus the session marker
pub struct UserStore {
    store: Arc<KvStore>,
}

impl UserStore {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    /// All registered users; a corrupted blob yields an empty list
    pub fn all(&self) -> Result<Vec<User>> {
        self.store.get_json(KEY_USERS)
    }

    /// Find a user by (already lowercased) email
    pub fn find(&self, email: &str) -> Result<Option<User>> {
        Ok(self.all()?.into_iter().find(|u| u.email == email))
    }

    /// Append a user to the list
    pub fn push(&self, user: User) -> Result<()> {
        let mut users = self.all()?;
        users.push(user);
        self.store.set_json(KEY_USERS, &users)
    }

    /// Mark the session active for the given email
    pub fn set_logged_in(&self, email: &str) -> Result<()> {
        self.store.set(KEY_LOGGED_IN_USER, email)
    }

    /// Email of the active session, if any
    pub fn logged_in(&self) -> Result<Option<String>> {
        self.store.get(KEY_LOGGED_IN_USER)
    }

    /// Clear the session marker
    pub fn clear_logged_in(&self) -> Result<()> {
        self.store.remove(KEY_LOGGED_IN_USER)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::new(Arc::new(KvStore::in_memory().unwrap()))
    }

    #[test]
    fn test_push_and_find() {
        let users = store();
        users
            .push(User {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .unwrap();

        assert!(users.find("ada@example.com").unwrap().is_some());
        assert!(users.find("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_session_marker_round_trip() {
        let users = store();
        assert_eq!(users.logged_in().unwrap(), None);

        users.set_logged_in("ada@example.com").unwrap();
        assert_eq!(
            users.logged_in().unwrap(),
            Some("ada@example.com".to_string())
        );

        users.clear_logged_in().unwrap();
        assert_eq!(users.logged_in().unwrap(), None);
    }
}
