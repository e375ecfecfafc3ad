//! Application state shared across all components

use crate::api::RemoteAuthority;
use crate::cache::EntityCache;
use crate::error::{AppError, ErrorResponse};
use crate::filter::FilterState;
use crate::prefs::PrefStore;
use crate::sync::mutation::MutationPipeline;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Error,
}

/// Message pushed to the single user-visible channel
#[derive(Debug, Clone, serde::Serialize)]
pub struct UiMessage {
    pub level: MessageLevel,
    /// Machine-readable code, set for errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub text: String,
}

/// Shared state: the Entity Cache, the Remote Authority handle, persisted
/// preferences, the current signal filter and the message channel.
pub struct AppState {
    pub cache: EntityCache,
    pub authority: Arc<dyn RemoteAuthority>,
    pub prefs: Arc<PrefStore>,
    pub filter: RwLock<FilterState>,
    pub mutations: MutationPipeline,
    messages: broadcast::Sender<UiMessage>,
}

impl AppState {
    /// The preference store is shared with the transport so privileged
    /// calls always see the current credential.
    pub fn new(authority: Arc<dyn RemoteAuthority>, prefs: Arc<PrefStore>) -> Self {
        let (messages, _) = broadcast::channel(64);
        Self {
            cache: EntityCache::new(),
            authority,
            prefs,
            filter: RwLock::new(FilterState::new()),
            mutations: MutationPipeline::new(),
            messages,
        }
    }

    #[cfg(test)]
    pub fn for_tests(authority: Arc<dyn RemoteAuthority>) -> (Arc<Self>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = Arc::new(PrefStore::open(dir.path()).expect("prefs"));
        (Arc::new(Self::new(authority, prefs)), dir)
    }

    /// Subscribe to the user-visible message channel.
    pub fn subscribe_messages(&self) -> broadcast::Receiver<UiMessage> {
        self.messages.subscribe()
    }

    pub fn notify_info(&self, text: impl Into<String>) {
        let _ = self.messages.send(UiMessage {
            level: MessageLevel::Info,
            code: None,
            text: text.into(),
        });
    }

    pub fn notify_error(&self, err: &AppError) {
        let response = ErrorResponse::from(err);
        tracing::warn!("{} ({})", response.message, response.code);
        let _ = self.messages.send(UiMessage {
            level: MessageLevel::Error,
            code: Some(response.code),
            text: response.message,
        });
    }
}
