//! Engine-level actions relayed to the Remote Authority

use crate::error::Result;
use crate::state::AppState;
use crate::sync::{EntityKind, SyncScheduler};

pub struct BotService;

impl BotService {
    /// Ask the engine to send a test message through its notification channel.
    pub async fn send_test_notification(state: &AppState) -> Result<String> {
        let message = state
            .authority
            .send_test_notification()
            .await
            .map_err(|err| {
                state.notify_error(&err);
                err
            })?;
        state.notify_info(message.clone());
        Ok(message)
    }

    /// Kick off an immediate analysis cycle, then reconcile the feed.
    pub async fn analyze_now(state: &AppState, scheduler: &SyncScheduler) -> Result<String> {
        let message = state.authority.analyze_now().await.map_err(|err| {
            state.notify_error(&err);
            err
        })?;
        state.notify_info(message.clone());
        scheduler.reconcile(EntityKind::Signals).await;
        scheduler.reconcile(EntityKind::SignalStats).await;
        Ok(message)
    }

    /// Restart the remote engine and re-pull everything it re-derives on boot.
    pub async fn restart(state: &AppState, scheduler: &SyncScheduler) -> Result<String> {
        let message = state.authority.restart_engine().await.map_err(|err| {
            state.notify_error(&err);
            err
        })?;
        state.notify_info(message.clone());
        scheduler.reconcile(EntityKind::Config).await;
        scheduler.reconcile(EntityKind::CoinSettings).await;
        scheduler.reconcile(EntityKind::FetchIntervals).await;
        Ok(message)
    }
}
