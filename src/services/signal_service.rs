//! Signal feed operations

use crate::api::types::{ClearScope, ExportKind, ImportSummary, SignalExport, TrackResult};
use crate::error::Result;
use crate::filter::FilterState;
use crate::models::SignalStatus;
use crate::state::AppState;
use crate::sync::{EntityKind, SyncScheduler};

pub struct SignalService;

impl SignalService {
    /// Replace the filter and push the new scope to the server immediately;
    /// the feed is never narrowed locally.
    pub async fn set_filter(
        state: &AppState,
        scheduler: &SyncScheduler,
        filter: FilterState,
    ) -> Result<()> {
        *state.filter.write() = filter;
        scheduler.trigger(EntityKind::Signals).await
    }

    /// Ask the engine to re-check open signals now, then reconcile the feed
    /// and the counters.
    pub async fn track_now(state: &AppState, scheduler: &SyncScheduler) -> Result<TrackResult> {
        let result = state.authority.track_signals().await.map_err(|err| {
            state.notify_error(&err);
            err
        })?;
        state.notify_info(format!(
            "Tracking complete: {} checked, {} updated",
            result.checked, result.updated
        ));
        scheduler.reconcile(EntityKind::Signals).await;
        scheduler.reconcile(EntityKind::SignalStats).await;
        Ok(result)
    }

    /// Optimistically drop one signal from the feed.
    pub async fn delete(state: &AppState, scheduler: &SyncScheduler, id: &str) -> Result<()> {
        let outcome = state
            .mutations
            .run(
                "signals",
                || state.cache.signals(),
                || {
                    let mut signals = state.cache.signals();
                    signals.retain(|s| s.id != id);
                    state.cache.replace_signals(signals);
                },
                |previous| state.cache.replace_signals(previous),
                || async { state.authority.delete_signal(id).await },
            )
            .await;

        match outcome {
            Ok(()) => {
                scheduler.reconcile(EntityKind::SignalStats).await;
                Ok(())
            }
            Err(err) => {
                state.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Bulk deletion; the feed and counters reconcile afterwards.
    pub async fn clear(
        state: &AppState,
        scheduler: &SyncScheduler,
        scope: ClearScope,
    ) -> Result<u64> {
        let deleted = state.authority.clear_signals(&scope).await.map_err(|err| {
            state.notify_error(&err);
            err
        })?;
        state.notify_info(format!("Removed {} signals", deleted));
        scheduler.reconcile(EntityKind::Signals).await;
        scheduler.reconcile(EntityKind::SignalStats).await;
        Ok(deleted)
    }

    /// Drop every stop-loss-hit and expired signal.
    pub async fn clear_failed(state: &AppState, scheduler: &SyncScheduler) -> Result<u64> {
        Self::clear(
            state,
            scheduler,
            ClearScope::Statuses(vec![SignalStatus::HitSl, SignalStatus::Expired]),
        )
        .await
    }

    /// Fetch the export document and render it for saving to disk.
    pub async fn export(state: &AppState, kind: ExportKind) -> Result<String> {
        let doc = state.authority.export_signals(kind).await?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Validate an import payload, then push it; malformed documents never
    /// reach the server.
    pub async fn import(
        state: &AppState,
        scheduler: &SyncScheduler,
        raw: &str,
    ) -> Result<ImportSummary> {
        let doc = SignalExport::parse(raw)?;
        let summary = state.authority.import_signals(&doc).await.map_err(|err| {
            state.notify_error(&err);
            err
        })?;
        state.notify_info(format!(
            "Imported {} signals ({} skipped)",
            summary.imported, summary.skipped
        ));
        scheduler.reconcile(EntityKind::Signals).await;
        scheduler.reconcile(EntityKind::SignalStats).await;
        Ok(summary)
    }
}
