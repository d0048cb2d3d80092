//! Auth session state and its persistence.
//!
//! [`AuthSession`] owns the auth state channel. The API client reads the
//! access token from it on every request and writes refreshed tokens back;
//! the auth store drives every other transition. Changes to the user or the
//! tokens are persisted as a single JSON snapshot.

use std::sync::Arc;

use pocketshop_core::{AuthTokens, User};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};

use crate::storage::{self, KeyValueStore, StorageError};

/// Coarse session status derived from [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticating,
    Authenticated,
    Error,
}

/// Progress of one password-reset step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepState {
    pub is_loading: bool,
    pub error: Option<String>,
    /// The step completed successfully.
    pub done: bool,
}

impl StepState {
    pub(crate) fn start(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.done = false;
    }

    pub(crate) fn succeed(&mut self) {
        self.is_loading = false;
        self.done = true;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }
}

/// The three-step password reset flow.
///
/// Each step has its own loading and error slots so one screen's failure
/// does not clobber another's.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordReset {
    /// Phone the verification code was sent to.
    pub phone: Option<String>,
    pub code_request: StepState,
    pub verification: StepState,
    pub reset: StepState,
    pub(crate) verified_token: Option<String>,
}

impl PasswordReset {
    /// Whether a code has been verified and a new password may be set.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified_token.is_some()
    }
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset")
            .field("phone", &self.phone)
            .field("code_request", &self.code_request)
            .field("verification", &self.verification)
            .field("reset", &self.reset)
            .field("verified", &self.is_verified())
            .finish()
    }
}

/// Observable auth state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub password_reset: PasswordReset,
}

impl AuthState {
    /// A user and tokens are both held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.tokens.is_some()
    }

    #[must_use]
    pub const fn status(&self) -> AuthStatus {
        if self.is_loading {
            AuthStatus::Authenticating
        } else if self.is_authenticated() {
            AuthStatus::Authenticated
        } else if self.error.is_some() {
            AuthStatus::Error
        } else {
            AuthStatus::Anonymous
        }
    }
}

/// The persisted subset of [`AuthState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedAuth {
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
}

impl PersistedAuth {
    fn from_state(state: &AuthState) -> Self {
        Self {
            user: state.user.clone(),
            tokens: state.tokens.clone(),
            is_authenticated: state.is_authenticated(),
        }
    }

    /// Keep user and tokens only when both are present.
    fn normalized(self) -> (Option<User>, Option<AuthTokens>) {
        match (self.user, self.tokens) {
            (Some(user), Some(tokens)) => (Some(user), Some(tokens)),
            _ => (None, None),
        }
    }
}

/// Shared auth session: state channel plus persistence.
pub struct AuthSession {
    state: watch::Sender<AuthState>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
    /// Serializes snapshot writes so the last mutation is the last write.
    persist_lock: Mutex<()>,
}

impl AuthSession {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            state,
            storage,
            key: key.into(),
            persist_lock: Mutex::new(()),
        }
    }

    /// Restore the persisted snapshot.
    ///
    /// Returns `true` when a complete session was restored. A snapshot that
    /// fails to decode is discarded.
    ///
    /// # Errors
    ///
    /// Returns the backend error if storage cannot be read.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub async fn hydrate(&self) -> Result<bool, StorageError> {
        let persisted = match storage::load_json::<PersistedAuth>(&*self.storage, &self.key).await {
            Ok(persisted) => persisted.unwrap_or_default(),
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(error = %e, "Discarding corrupt auth snapshot");
                self.storage.remove(&self.key).await?;
                PersistedAuth::default()
            }
            Err(e) => return Err(e),
        };

        if persisted.is_authenticated != (persisted.user.is_some() && persisted.tokens.is_some()) {
            tracing::debug!("Normalizing inconsistent auth snapshot");
        }

        let (user, tokens) = persisted.normalized();
        let restored = user.is_some();
        self.state.send_modify(|state| {
            state.user = user;
            state.tokens = tokens;
        });

        if restored {
            tracing::info!("Restored persisted session");
        }
        Ok(restored)
    }

    /// Current state, cloned.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn tokens(&self) -> Option<AuthTokens> {
        self.state.borrow().tokens.clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .tokens
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }

    /// Apply a change to transient state (loading flags, errors).
    pub fn update(&self, f: impl FnOnce(&mut AuthState)) {
        self.state.send_modify(f);
    }

    /// Apply a change to user or tokens and persist the result.
    pub async fn commit(&self, f: impl FnOnce(&mut AuthState)) {
        self.state.send_modify(f);
        self.persist().await;
    }

    /// Store a refreshed access token.
    ///
    /// Ignored when the session was cleared or replaced while the refresh
    /// was in flight. Returns whether the token was stored.
    pub async fn store_refreshed_access_token(
        &self,
        refresh_token: &str,
        access_token: String,
    ) -> bool {
        let stored = self.state.send_if_modified(|state| match state.tokens.as_mut() {
            Some(tokens) if tokens.refresh_token == refresh_token => {
                *tokens = tokens.with_access_token(access_token);
                true
            }
            _ => false,
        });
        if stored {
            self.persist().await;
        }
        stored
    }

    /// Drop user, tokens and any in-progress flow, then persist.
    pub async fn clear(&self) {
        self.commit(|state| *state = AuthState::default()).await;
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        // Read under the lock so the newest state is what gets written
        let snapshot = PersistedAuth::from_state(&self.state.borrow());
        if let Err(e) = storage::save_json(&*self.storage, &self.key, &snapshot).await {
            tracing::warn!(error = %e, key = %self.key, "Failed to persist auth session");
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("key", &self.key)
            .field("status", &self.state.borrow().status())
            .finish_non_exhaustive()
    }
}
