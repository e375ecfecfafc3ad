//! Sync Scheduler
//!
//! Owns one recurring pull per entity kind plus event-triggered refreshes.
//! Every pull fully overwrites its entity kind in the cache; a failed pull
//! is logged and leaves the last good value, and the timer keeps ticking.
//! Timers are scoped-acquisition resources: each scheduled task is held as
//! a handle that aborts on drop, and `cancel_all` releases every one.

use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::models::CoinStatus;
use crate::state::AppState;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default window for the dashboard outcome chart, in days.
const CHART_DAYS: u32 = 7;

/// Entity kinds the scheduler can pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Config,
    CoinSettings,
    FetchIntervals,
    Alarms,
    ManualPrices,
    Signals,
    SignalStats,
    Indicators,
    Chart,
}

/// Handle to one recurring pull; dropping it releases the timer.
struct ScheduleHandle {
    inner: JoinHandle<()>,
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.inner.abort();
    }
}

pub struct SyncScheduler {
    state: Arc<AppState>,
    tasks: Mutex<Vec<ScheduleHandle>>,
}

impl SyncScheduler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Register a recurring pull for `kind`. The first pull happens
    /// immediately, then on every tick.
    pub fn schedule(&self, kind: EntityKind, every: Duration) {
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = Self::refresh(&state, kind).await {
                    // Transient failure: keep the last good value, retry next tick.
                    tracing::warn!("Pull for {:?} failed: {}", kind, err);
                }
            }
        });
        self.tasks.lock().push(ScheduleHandle { inner: handle });
    }

    /// Register the recurring remote tracking sweep: ask the engine to
    /// re-check signal statuses, then reconcile the feed and the counters.
    pub fn schedule_tracking(&self, every: Duration) {
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match state.authority.track_signals().await {
                    Ok(result) => {
                        tracing::debug!(
                            "Tracking sweep: {} checked, {} updated",
                            result.checked,
                            result.updated
                        );
                        for kind in [EntityKind::Signals, EntityKind::SignalStats] {
                            if let Err(err) = Self::refresh(&state, kind).await {
                                tracing::warn!("Post-tracking pull for {:?} failed: {}", kind, err);
                            }
                        }
                    }
                    Err(err) => tracing::warn!("Tracking sweep failed: {}", err),
                }
            }
        });
        self.tasks.lock().push(ScheduleHandle { inner: handle });
    }

    /// Register the standard cadences for a running console.
    pub fn schedule_defaults(&self, config: &ConsoleConfig) {
        self.schedule(EntityKind::Signals, config.signals_interval);
        self.schedule(EntityKind::CoinSettings, config.coin_settings_interval);
        self.schedule(EntityKind::Alarms, config.alarms_interval);
        self.schedule(EntityKind::SignalStats, config.stats_interval);
        self.schedule(EntityKind::Chart, config.stats_interval);
        self.schedule_tracking(config.tracking_interval);
    }

    /// One immediate pull outside the schedule.
    pub async fn trigger(&self, kind: EntityKind) -> Result<()> {
        Self::refresh(&self.state, kind).await
    }

    /// Post-commit reconciliation pull. The operation that requested it has
    /// already succeeded, so a failed pull is logged and left to the next
    /// tick instead of failing the committed operation.
    pub async fn reconcile(&self, kind: EntityKind) {
        if let Err(err) = Self::refresh(&self.state, kind).await {
            tracing::warn!("Reconcile pull for {:?} failed: {}", kind, err);
        }
    }

    /// Pull every entity kind once; used at startup.
    pub async fn bootstrap(&self) {
        for kind in [
            EntityKind::Config,
            EntityKind::CoinSettings,
            EntityKind::FetchIntervals,
            EntityKind::Alarms,
            EntityKind::ManualPrices,
            EntityKind::Signals,
            EntityKind::SignalStats,
            EntityKind::Indicators,
            EntityKind::Chart,
        ] {
            if let Err(err) = Self::refresh(&self.state, kind).await {
                tracing::warn!("Startup pull for {:?} failed: {}", kind, err);
            }
        }
    }

    /// Release every timer. Required on teardown; an already in-flight pull
    /// is dropped with its task and never lands in the cache.
    pub fn cancel_all(&self) {
        self.tasks.lock().clear();
    }

    async fn refresh(state: &Arc<AppState>, kind: EntityKind) -> Result<()> {
        match kind {
            EntityKind::Config => {
                let config = state.authority.get_config().await?;
                state.cache.replace_config(config);
            }
            EntityKind::CoinSettings => {
                let settings = state.authority.get_coin_settings().await?;
                state.cache.replace_coin_settings(settings);
            }
            EntityKind::FetchIntervals => {
                let intervals = state.authority.get_fetch_intervals().await?;
                state.cache.replace_fetch_intervals(intervals);
            }
            EntityKind::Alarms => {
                let feed = state.authority.get_alarms().await?;
                state.cache.set_alarms_enabled(feed.alarms_enabled);
                state.cache.replace_alarms(feed.alarms);
            }
            EntityKind::ManualPrices => {
                let prices = state.authority.get_manual_prices().await?;
                state.cache.replace_manual_prices(prices);
            }
            EntityKind::Signals => {
                // Scope is always pushed to the server; the descriptor comes
                // from the current filter state.
                let query = state.filter.read().descriptor();
                let signals = state.authority.get_signals(&query).await?;
                state.cache.replace_signals(signals);
            }
            EntityKind::SignalStats => {
                let stats = state.authority.get_signal_statistics().await?;
                state.cache.replace_signal_stats(stats);
            }
            EntityKind::Indicators => {
                // Snapshots are fetched only for active coins.
                let active: Vec<String> = state
                    .cache
                    .coin_settings()
                    .into_iter()
                    .filter(|cs| cs.status == CoinStatus::Active)
                    .map(|cs| cs.coin)
                    .collect();
                for coin in active {
                    match state.authority.get_indicators(&coin).await {
                        Ok(snapshot) => state.cache.replace_indicator(&coin, snapshot),
                        Err(err) => {
                            tracing::warn!("Indicator pull for {} failed: {}", coin, err)
                        }
                    }
                }
            }
            EntityKind::Chart => {
                let chart = state.authority.get_chart_data(CHART_DAYS).await?;
                state.cache.replace_chart(chart);
            }
        }
        Ok(())
    }
}
