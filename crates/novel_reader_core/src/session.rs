//! crates/novel_reader_core/src/session.rs
//!
//! The client-visible authentication state machine.
//!
//! `Unknown` (checking storage) moves to `Authenticated` or `Anonymous` once
//! `restore` has run, and afterwards the session cycles between those two for
//! the life of the process. Entering `Authenticated` persists the token pair and
//! the user profile; entering `Anonymous` clears them.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{Role, SessionTokens, User};
use crate::ports::{KeyValueStorage, PortError, PortResult, SessionVerifier};
use crate::storage::{self, AUTH_TOKEN, REFRESH_TOKEN, USER};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unknown,
    Anonymous,
    Authenticated(AuthenticatedSession),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Rules for restoring a stored session.
#[derive(Debug, Clone, Default)]
pub struct SessionPolicy {
    /// Tokens starting with this prefix belong to pre-provisioned demo sessions and are
    /// trusted without a round trip to the verify endpoint.
    pub trusted_token_prefix: Option<String>,
}

impl SessionPolicy {
    fn is_trusted(&self, token: &str) -> bool {
        self.trusted_token_prefix
            .as_deref()
            .is_some_and(|prefix| !prefix.is_empty() && token.starts_with(prefix))
    }
}

/// Owns the session token pair and publishes the session state to subscribers.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    policy: SessionPolicy,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, policy: SessionPolicy) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            storage,
            policy,
            state,
        }
    }

    /// Resolves the initial `Unknown` state from durable storage.
    pub async fn restore(&self, verifier: &dyn SessionVerifier) -> SessionState {
        let Some(token) = self.access_token() else {
            info!("No stored session found.");
            self.enter_anonymous();
            return self.current();
        };

        if self.policy.is_trusted(&token) {
            if let Some(user) = storage::read_json::<User>(self.storage.as_ref(), USER) {
                info!("Restored trusted session for '{}' without verification.", user.username);
                self.publish_authenticated(user, token);
                return self.current();
            }
        }

        match verifier.verify(&token).await {
            Ok(user) => {
                if let Err(e) = storage::write_json(self.storage.as_ref(), USER, &user) {
                    warn!("Failed to persist verified user profile: {}", e);
                }
                // Verification may itself have rotated the token pair.
                let access_token = self.access_token().unwrap_or(token);
                info!("Restored session for '{}'.", user.username);
                self.publish_authenticated(user, access_token);
            }
            // Offline start: the stored pair may still be valid, so keep it.
            Err(PortError::Network(e)) => {
                warn!("Session verification unreachable, keeping stored tokens: {}", e);
                match storage::read_json::<User>(self.storage.as_ref(), USER) {
                    Some(user) => {
                        info!("Restored unverified session for '{}'.", user.username);
                        self.publish_authenticated(user, token);
                    }
                    None => {
                        self.state.send_replace(SessionState::Anonymous);
                    }
                }
            }
            Err(e) => {
                warn!("Stored session could not be verified: {}", e);
                self.enter_anonymous();
            }
        }

        self.current()
    }

    /// `Anonymous -> Authenticated` after a successful login or signup.
    pub fn sign_in(&self, tokens: SessionTokens, user: User) -> PortResult<()> {
        self.storage.set(AUTH_TOKEN, &tokens.access_token)?;
        match tokens.refresh_token.as_deref() {
            Some(refresh) => self.storage.set(REFRESH_TOKEN, refresh)?,
            None => self.storage.remove(REFRESH_TOKEN)?,
        }
        storage::write_json(self.storage.as_ref(), USER, &user)?;

        info!("Signed in as '{}'.", user.username);
        self.state.send_replace(SessionState::Authenticated(AuthenticatedSession {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }));
        Ok(())
    }

    /// Persists a refreshed token pair. A missing refresh token keeps the stored one.
    pub fn rotate_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> PortResult<()> {
        self.storage.set(AUTH_TOKEN, access_token)?;
        if let Some(refresh) = refresh_token {
            self.storage.set(REFRESH_TOKEN, refresh)?;
        }

        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(session) => {
                session.access_token = access_token.to_string();
                if let Some(refresh) = refresh_token {
                    session.refresh_token = Some(refresh.to_string());
                }
                true
            }
            _ => false,
        });
        Ok(())
    }

    /// `Authenticated -> Anonymous` on logout or an irrecoverable refresh failure.
    pub fn sign_out(&self) {
        if self.current().is_authenticated() {
            info!("Signing out.");
        }
        self.enter_anonymous();
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_key(AUTH_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN)
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Admins hold every role; any signed-in user holds `Reader`.
    pub fn has_role(&self, role: Role) -> bool {
        match self.state.borrow().user() {
            Some(user) => user.role == Role::Admin || role == Role::Reader,
            None => false,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn publish_authenticated(&self, user: User, access_token: String) {
        let refresh_token = self.refresh_token();
        self.state.send_replace(SessionState::Authenticated(AuthenticatedSession {
            user,
            access_token,
            refresh_token,
        }));
    }

    fn enter_anonymous(&self) {
        for key in [AUTH_TOKEN, REFRESH_TOKEN, USER] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to clear '{}' from storage: {}", key, e);
            }
        }
        self.state.send_replace(SessionState::Anonymous);
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Failed to read '{}' from storage: {}", key, e);
                None
            }
        }
    }
}
