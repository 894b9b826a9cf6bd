use tokio::sync::watch;
use tracing::info;

use edustream_core::model::User;

use crate::error::AuthError;

/// Session state as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// The provider has not answered yet.
    #[default]
    Loading,
    SignedOut,
    SignedIn(User),
}

impl AuthState {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            AuthState::Loading | AuthState::SignedOut => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }
}

/// Local mirror of the auth provider's session.
///
/// Pages read the current user from here and subscribe for session changes.
/// Nothing below the page layer reads it implicitly: the player and the
/// services take the user as an argument.
#[derive(Debug)]
pub struct AuthSession {
    state: watch::Sender<AuthState>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self { state }
    }

    /// Current-user lookup.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// # Errors
    ///
    /// Returns `AuthError::SignedOut` when nobody is signed in.
    pub fn require_user(&self) -> Result<User, AuthError> {
        self.current_user().ok_or(AuthError::SignedOut)
    }

    /// Session-change notification. The receiver sees the latest state first.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn sign_in(&self, user: User) {
        info!(user_id = %user.id(), "signed in");
        self.state.send_replace(AuthState::SignedIn(user));
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.current_user() {
            info!(user_id = %user.id(), "signed out");
        }
        self.state.send_replace(AuthState::SignedOut);
    }

    /// Profile update from the settings screen.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignedOut` without a session, or `AuthError::User`
    /// if the name fails validation.
    pub fn update_display_name(&self, name: Option<String>) -> Result<User, AuthError> {
        let mut user = self.require_user()?;
        user.set_display_name(name)?;
        self.state.send_replace(AuthState::SignedIn(user.clone()));
        Ok(user)
    }
}
