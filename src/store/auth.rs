// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state: current user, bearer token, and login flow.
//!
//! The token is the only durable piece of the session. The user profile is
//! never persisted; it is re-fetched with [`AuthStore::fetch_own_profile`].
//! A rejected profile fetch means the stored token is no longer valid, so
//! the session is dropped without surfacing an error.

use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::services::ForumClient;
use crate::storage::TokenStorage;
use crate::store::{Reducer, StoreCore};
use tokio::sync::watch;

const PROFILE_SLOT: &str = "profile";

/// Session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Coarse session state for views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
    Error,
}

impl Session {
    /// Session hydrated from a durable token, if any.
    pub fn from_token(token: Option<String>) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// Authenticated exactly when a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Authenticating
        } else if self.error.is_some() {
            SessionStatus::Error
        } else if self.is_authenticated() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }
}

/// Session transitions.
#[derive(Debug, Clone)]
pub enum AuthAction {
    RegisterPending,
    RegisterFulfilled(User),
    RegisterRejected(String),
    LoginPending,
    LoginFulfilled(String),
    LoginRejected(String),
    ProfilePending,
    ProfileFulfilled(User),
    /// Token rejected by the API: drop the session silently.
    ProfileRejected,
    Logout,
    ClearError,
}

impl Reducer for Session {
    type Action = AuthAction;

    fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::RegisterPending | AuthAction::LoginPending => {
                self.loading = true;
                self.error = None;
            }
            AuthAction::RegisterFulfilled(user) => {
                self.loading = false;
                self.user = Some(user);
            }
            AuthAction::RegisterRejected(message) | AuthAction::LoginRejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            AuthAction::LoginFulfilled(token) => {
                self.loading = false;
                self.token = Some(token);
            }
            AuthAction::ProfilePending => {
                self.loading = true;
            }
            AuthAction::ProfileFulfilled(user) => {
                self.loading = false;
                self.user = Some(user);
            }
            AuthAction::ProfileRejected => {
                self.loading = false;
                self.token = None;
            }
            AuthAction::Logout => {
                self.user = None;
                self.token = None;
            }
            AuthAction::ClearError => {
                self.error = None;
            }
        }
    }
}

/// Auth state store.
pub struct AuthStore {
    api: ForumClient,
    core: StoreCore<Session>,
}

impl AuthStore {
    /// Create the store, hydrating the session from durable storage.
    pub fn new(api: ForumClient) -> Self {
        let token = api.tokens().load();
        if token.is_some() {
            tracing::debug!("Restored session token from storage");
        }
        Self {
            api,
            core: StoreCore::new(Session::from_token(token)),
        }
    }

    /// Current session snapshot.
    pub fn state(&self) -> Session {
        self.core.snapshot()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.core.subscribe()
    }

    fn storage(&self) -> &TokenStorage {
        self.api.tokens()
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, new_user: &NewUser) -> Result<User, AppError> {
        self.core.dispatch(AuthAction::RegisterPending);

        match self.api.register(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Registered new user");
                self.core.dispatch(AuthAction::RegisterFulfilled(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.core.dispatch(AuthAction::RegisterRejected(e.message()));
                Err(e)
            }
        }
    }

    /// Log in and persist the token. The profile is fetched separately.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        self.core.dispatch(AuthAction::LoginPending);

        let token = match self.api.login(email, password).await {
            Ok(token) => token,
            Err(e) => {
                self.core.dispatch(AuthAction::LoginRejected(e.message()));
                return Err(e);
            }
        };

        // Storage and state change together under the state lock. A profile
        // fetch for the previous token must not invalidate the new one.
        let save_error = self.core.update(|session| {
            if let Err(e) = self.storage().save(&token) {
                session.reduce(AuthAction::LoginRejected(e.message()));
                return Some(e);
            }
            self.core.requests().cancel(PROFILE_SLOT);
            session.reduce(AuthAction::LoginFulfilled(token.clone()));
            None
        });
        if let Some(e) = save_error {
            tracing::warn!(error = %e, "Failed to persist session token");
            return Err(e);
        }

        tracing::info!("Logged in");
        Ok(token)
    }

    /// Fetch the profile for the stored token.
    ///
    /// On rejection the token is discarded (state and durable storage) and
    /// no error is recorded in the session; the error is still returned to
    /// the caller.
    pub async fn fetch_own_profile(&self) -> Result<User, AppError> {
        if !self.state().is_authenticated() {
            return Err(AppError::Unauthorized);
        }

        let request = self.core.requests().begin(PROFILE_SLOT);
        self.core.dispatch(AuthAction::ProfilePending);

        match self.api.get_own_profile().await {
            Ok(user) => {
                self.core
                    .dispatch_if_current(request, AuthAction::ProfileFulfilled(user.clone()));
                Ok(user)
            }
            Err(e) => {
                // Cleared under the state lock, like the save in `login`.
                let invalidated = self.core.update_if_current(request, |session| {
                    session.reduce(AuthAction::ProfileRejected);
                    if let Err(clear_err) = self.storage().clear() {
                        tracing::warn!(error = %clear_err, "Failed to clear stored token");
                    }
                });
                if invalidated {
                    tracing::info!(error = %e, "Profile fetch rejected, session invalidated");
                }
                Err(e)
            }
        }
    }

    /// Drop the session locally. No network call.
    ///
    /// State is always cleared; an error is returned only if durable
    /// storage could not be cleared.
    pub fn logout(&self) -> Result<(), AppError> {
        if self.core.requests().cancel(PROFILE_SLOT) {
            // The pending profile fetch will be dropped, so end the pending state here.
            self.core.update(|session| session.loading = false);
        }
        self.core.dispatch(AuthAction::Logout);
        tracing::info!("Logged out");
        self.storage().clear()
    }

    /// Clear the last error, e.g. when leaving a failed form.
    pub fn clear_error(&self) {
        self.core.dispatch(AuthAction::ClearError);
    }
}
