//! Explicit session context.
//!
//! Holds the signed-in operator's credentials for the lifetime between login
//! and logout. Clones share the same session, so one context can be handed to
//! every API client and controller.

use std::sync::{Arc, RwLock};

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Bearer token sent with every API request
    pub token: String,
    pub user_name: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_name: None,
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, replacing any previous one
    pub fn login(&self, session: Session) {
        info!(
            "Session started for {}",
            session.user_name.as_deref().unwrap_or("unnamed operator")
        );
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(session);
    }

    /// End the session; later requests go out unauthenticated
    pub fn logout(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.take().is_some() {
            info!("Session ended");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}
