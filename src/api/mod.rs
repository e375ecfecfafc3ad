//! Remote Authority boundary
//!
//! The bot's control API is the single source of truth for configuration,
//! per-coin settings and the signal feed. Everything the console does
//! against it goes through the [`RemoteAuthority`] trait so the sync engine
//! can be exercised against a test double.

pub mod http;
pub mod types;

#[cfg(test)]
pub mod testing;

use crate::error::Result;
use crate::filter::SignalQuery;
use crate::models::{
    BotConfig, ChartData, CoinSetting, FetchIntervals, IndicatorSnapshot, ManualPrices, Signal,
    SignalStatistics,
};
use async_trait::async_trait;
use types::*;

pub use http::HttpAuthority;

/// Client-side view of the bot's HTTP/JSON control API
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    // Config
    async fn get_config(&self) -> Result<BotConfig>;
    async fn update_config(&self, update: &ConfigUpdate) -> Result<()>;

    // Per-coin settings
    async fn get_coin_settings(&self) -> Result<Vec<CoinSetting>>;
    async fn update_coin_settings(&self, settings: &[CoinSetting]) -> Result<()>;
    async fn update_coin(&self, setting: &CoinSetting) -> Result<()>;

    // Fetch intervals
    async fn get_fetch_intervals(&self) -> Result<FetchIntervals>;
    async fn update_fetch_intervals(&self, intervals: &FetchIntervals) -> Result<()>;

    // Derived threshold
    async fn calculate_threshold(
        &self,
        coin: &str,
        timeframe: crate::models::Timeframe,
    ) -> Result<ThresholdPreview>;

    // Signals
    async fn get_signals(&self, query: &SignalQuery) -> Result<Vec<Signal>>;
    async fn get_signal_statistics(&self) -> Result<SignalStatistics>;
    async fn get_chart_data(&self, days: u32) -> Result<ChartData>;
    async fn track_signals(&self) -> Result<TrackResult>;
    async fn delete_signal(&self, id: &str) -> Result<()>;
    async fn clear_signals(&self, scope: &ClearScope) -> Result<u64>;
    async fn export_signals(&self, kind: ExportKind) -> Result<SignalExport>;
    async fn import_signals(&self, doc: &SignalExport) -> Result<ImportSummary>;

    // Alarms
    async fn get_alarms(&self) -> Result<AlarmFeed>;
    async fn toggle_alarms(&self, enabled: bool) -> Result<()>;

    // Manual price overrides
    async fn get_manual_prices(&self) -> Result<ManualPrices>;
    async fn set_manual_price(&self, coin: &str, price: f64) -> Result<()>;
    async fn delete_manual_price(&self, coin: &str) -> Result<()>;

    // Indicators
    async fn get_indicators(&self, coin: &str) -> Result<IndicatorSnapshot>;

    // Feature flags
    async fn toggle_feature_flag(&self, flag: &str, enabled: bool) -> Result<()>;

    // Actions
    async fn send_test_notification(&self) -> Result<String>;
    async fn analyze_now(&self) -> Result<String>;
    async fn restart_engine(&self) -> Result<String>;
    async fn historical_import(
        &self,
        request: &HistoricalImportRequest,
    ) -> Result<HistoricalImportResults>;
}
