//! Who is using the queue.
//!
//! The queue asks an [`AuthProvider`] for the current user on every render
//! and every action; nothing is cached. [`Session`] is the shared, swappable
//! holder of that user, filled in by [`FirebaseAuth`] or by demo mode.

mod credentials;
pub mod error;
mod firebase;

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::info;

pub use credentials::{delete_password, get_password, store_password};
pub use error::{AuthError, Result};
pub use firebase::FirebaseAuth;

/// A signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Stable user id.
    pub uid: String,
    /// Sign-in email.
    pub email: String,
    /// Display name, if the account has one.
    pub display_name: Option<String>,
    /// Short-lived bearer token for the store.
    pub id_token: String,
    /// Long-lived token used to mint new ID tokens.
    pub refresh_token: String,
}

impl User {
    /// A local user with no remote credentials.
    pub fn local(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uid: format!("local:{}", name),
            email: String::new(),
            display_name: Some(name),
            id_token: String::new(),
            refresh_token: String::new(),
        }
    }

    /// Name to show in the header.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Source of the currently signed-in user.
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, or `None`.
    fn current_user(&self) -> Option<User>;
}

/// Shared holder of the signed-in user.
///
/// Clones share state, so the store client, the app and the sign-in flow
/// all see the same user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Arc<RwLock<Option<User>>>,
}

impl Session {
    /// A session with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session with `user` already signed in.
    pub fn signed_in(user: User) -> Self {
        let session = Self::new();
        session.set_user(user);
        session
    }

    /// Replace the signed-in user.
    pub fn set_user(&self, user: User) {
        info!(uid = %user.uid, "User signed in");
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    /// Sign the current user out.
    pub fn sign_out(&self) {
        let previous = self.user.write().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(user) = previous {
            info!(uid = %user.uid, "User signed out");
        }
    }
}

impl AuthProvider for Session {
    fn current_user(&self) -> Option<User> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
