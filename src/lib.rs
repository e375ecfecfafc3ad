//! signal-console
//!
//! Client-side state synchronization for a remote market-signal engine.
//! The engine owns all durable data; this crate keeps a responsive local
//! replica of it: an Entity Cache holding the last synced copy of every
//! entity kind, a Sync Scheduler pulling on fixed cadences and on events,
//! a Mutation Pipeline applying operator writes optimistically with
//! rollback, and a Derived-Value Engine recomputing remote-derived
//! thresholds on their governing transitions.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod prefs;
pub mod services;
pub mod state;
pub mod sync;

use crate::api::HttpAuthority;
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::prefs::PrefStore;
use crate::state::AppState;
use crate::sync::SyncScheduler;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("signal_console=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// A running console: the shared state plus the scheduler driving its pulls
pub struct Console {
    pub state: Arc<AppState>,
    pub scheduler: SyncScheduler,
}

impl Console {
    /// Open local preferences, connect the HTTP transport, hydrate every
    /// entity kind once, and start the standard pull cadences.
    pub async fn start(config: ConsoleConfig) -> Result<Self> {
        let prefs = Arc::new(PrefStore::open(&config.data_dir)?);
        let authority = Arc::new(HttpAuthority::new(&config.base_url, prefs.clone())?);
        let state = Arc::new(AppState::new(authority, prefs));
        state
            .cache
            .set_alarms_enabled(state.prefs.alarms_enabled());

        let scheduler = SyncScheduler::new(state.clone());
        scheduler.bootstrap().await;
        scheduler.schedule_defaults(&config);

        tracing::info!("Console connected to {}", config.base_url);
        Ok(Self { state, scheduler })
    }

    /// Stop every recurring pull. In-flight pulls are dropped with their
    /// tasks and never land in the cache.
    pub fn shutdown(&self) {
        self.scheduler.cancel_all();
    }
}
