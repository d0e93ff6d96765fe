//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-login session context.

use crate::config::Config;
use chrono::{DateTime, Utc};
use kalakriti_core::{
    localization::SOURCE_LANGUAGE, ContentGenerator, ConversationContext, ImageGateway, Localizer,
    RecordStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
    pub generator: ContentGenerator,
    pub localizer: Localizer,
    pub images: ImageGateway,
    pub sessions: Arc<SessionRegistry>,
}

//=========================================================================================
// SessionContext (Specific to One Login)
//=========================================================================================

/// Everything the marketplace remembers about one logged-in artisan between requests.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub username: String,
    pub language: String,
    pub conversation: ConversationContext,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(username: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            language: SOURCE_LANGUAGE.to_string(),
            conversation: ConversationContext::new(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Live sessions keyed by the opaque id carried in the `session` cookie.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionContext>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `username` and returns its id.
    pub async fn create(&self, username: &str, ttl: chrono::Duration) -> String {
        let session_id = Uuid::new_v4().to_string();
        let context = SessionContext::new(username, Utc::now() + ttl);

        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, ctx| !ctx.is_expired(now));
        sessions.insert(session_id.clone(), context);
        session_id
    }

    /// A snapshot of the session, or `None` if it is unknown or expired.
    pub async fn get(&self, session_id: &str) -> Option<SessionContext> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(ctx) if !ctx.is_expired(now) => return Some(ctx.clone()),
                None => return None,
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(session_id);
        None
    }

    /// Applies `f` to a live session. Returns `None` if the session is gone.
    pub async fn update<T, F>(&self, session_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut SessionContext) -> T,
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(ctx) if !ctx.is_expired(now) => Some(f(ctx)),
            _ => None,
        }
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }
}
