//! Entity Cache
//!
//! One authoritative-as-of-last-sync copy per entity kind. Pulls from the
//! Sync Scheduler land through the `replace_*` methods (full overwrite, no
//! merge); optimistic edits land through the `patch_*` methods, which merge
//! into the existing item and are silently a no-op when the key is absent.
//! The cache itself never issues remote calls.

use crate::models::{
    Alarm, BotConfig, ChartData, CoinSetting, CoinStatus, FetchIntervals, IndicatorSnapshot,
    ManualPrices, Signal, SignalStatistics,
};
use dashmap::DashMap;
use parking_lot::RwLock;

/// In-memory store shared by every component of the console
#[derive(Default)]
pub struct EntityCache {
    config: RwLock<Option<BotConfig>>,
    coin_settings: RwLock<Vec<CoinSetting>>,
    fetch_intervals: RwLock<FetchIntervals>,
    alarms: RwLock<Vec<Alarm>>,
    manual_prices: RwLock<ManualPrices>,
    signals: RwLock<Vec<Signal>>,
    signal_stats: RwLock<Option<SignalStatistics>>,
    chart: RwLock<Option<ChartData>>,
    /// Snapshots exist only for coins whose status is active.
    indicators: DashMap<String, IndicatorSnapshot>,
    /// Master switch for candle interval analysis.
    global_candle_analysis: RwLock<bool>,
    alarms_enabled: RwLock<bool>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Config
    // ------------------------------------------------------------------

    pub fn config(&self) -> Option<BotConfig> {
        self.config.read().clone()
    }

    pub fn replace_config(&self, config: BotConfig) {
        *self.config.write() = Some(config);
    }

    /// Restore the pre-mutation snapshot, including "never loaded".
    pub fn restore_config(&self, previous: Option<BotConfig>) {
        *self.config.write() = previous;
    }

    // ------------------------------------------------------------------
    // Coin settings (keyed by symbol, insertion order preserved)
    // ------------------------------------------------------------------

    pub fn coin_settings(&self) -> Vec<CoinSetting> {
        self.coin_settings.read().clone()
    }

    pub fn coin(&self, symbol: &str) -> Option<CoinSetting> {
        self.coin_settings
            .read()
            .iter()
            .find(|cs| cs.coin == symbol)
            .cloned()
    }

    /// Full overwrite from a pull. Purges indicator snapshots for coins that
    /// are no longer present or no longer active.
    pub fn replace_coin_settings(&self, settings: Vec<CoinSetting>) {
        self.indicators.retain(|symbol, _| {
            settings
                .iter()
                .any(|cs| cs.coin == *symbol && cs.status == CoinStatus::Active)
        });
        *self.coin_settings.write() = settings;
    }

    /// Merge an edit into one coin's setting. Returns false (and changes
    /// nothing) when the symbol is not cached.
    pub fn patch_coin(&self, symbol: &str, patch: impl FnOnce(&mut CoinSetting)) -> bool {
        let mut settings = self.coin_settings.write();
        let Some(setting) = settings.iter_mut().find(|cs| cs.coin == symbol) else {
            return false;
        };
        patch(setting);
        if setting.status == CoinStatus::Passive {
            self.indicators.remove(symbol);
        }
        true
    }

    /// Replace one coin's setting wholesale (used for rollback).
    pub fn restore_coin(&self, previous: CoinSetting) -> bool {
        let symbol = previous.coin.clone();
        self.patch_coin(&symbol, |cs| *cs = previous)
    }

    pub fn insert_coin(&self, setting: CoinSetting) {
        let mut settings = self.coin_settings.write();
        if !settings.iter().any(|cs| cs.coin == setting.coin) {
            settings.push(setting);
        }
    }

    /// Immediate local removal; deletion only affects the pending in-memory
    /// list until a bulk save, so it is not optimistic and never rolled back.
    pub fn remove_coin(&self, symbol: &str) {
        self.indicators.remove(symbol);
        self.coin_settings.write().retain(|cs| cs.coin != symbol);
    }

    // ------------------------------------------------------------------
    // Fetch intervals
    // ------------------------------------------------------------------

    pub fn fetch_intervals(&self) -> FetchIntervals {
        self.fetch_intervals.read().clone()
    }

    pub fn replace_fetch_intervals(&self, intervals: FetchIntervals) {
        *self.fetch_intervals.write() = intervals;
    }

    // ------------------------------------------------------------------
    // Signals and statistics
    // ------------------------------------------------------------------

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.read().clone()
    }

    pub fn replace_signals(&self, signals: Vec<Signal>) {
        *self.signals.write() = signals;
    }

    pub fn signal_stats(&self) -> Option<SignalStatistics> {
        self.signal_stats.read().clone()
    }

    pub fn replace_signal_stats(&self, stats: SignalStatistics) {
        *self.signal_stats.write() = Some(stats);
    }

    // ------------------------------------------------------------------
    // Alarms
    // ------------------------------------------------------------------

    pub fn alarms(&self) -> Vec<Alarm> {
        self.alarms.read().clone()
    }

    pub fn replace_alarms(&self, alarms: Vec<Alarm>) {
        *self.alarms.write() = alarms;
    }

    pub fn alarms_enabled(&self) -> bool {
        *self.alarms_enabled.read()
    }

    pub fn set_alarms_enabled(&self, enabled: bool) {
        *self.alarms_enabled.write() = enabled;
    }

    // ------------------------------------------------------------------
    // Manual prices
    // ------------------------------------------------------------------

    pub fn manual_prices(&self) -> ManualPrices {
        self.manual_prices.read().clone()
    }

    pub fn replace_manual_prices(&self, prices: ManualPrices) {
        *self.manual_prices.write() = prices;
    }

    pub fn manual_price(&self, symbol: &str) -> Option<f64> {
        self.manual_prices.read().get(symbol).copied()
    }

    pub fn set_manual_price(&self, symbol: &str, price: f64) {
        self.manual_prices.write().insert(symbol.to_string(), price);
    }

    pub fn remove_manual_price(&self, symbol: &str) {
        self.manual_prices.write().remove(symbol);
    }

    /// Put one symbol's pre-mutation entry back without touching the rest
    /// of the map; concurrent edits to other symbols survive the rollback.
    pub fn restore_manual_price(&self, symbol: &str, previous: Option<f64>) {
        let mut prices = self.manual_prices.write();
        match previous {
            Some(price) => {
                prices.insert(symbol.to_string(), price);
            }
            None => {
                prices.remove(symbol);
            }
        }
    }

    // ------------------------------------------------------------------
    // Indicators (active coins only)
    // ------------------------------------------------------------------

    pub fn indicator(&self, symbol: &str) -> Option<IndicatorSnapshot> {
        self.indicators.get(symbol).map(|r| r.clone())
    }

    pub fn replace_indicator(&self, symbol: &str, snapshot: IndicatorSnapshot) {
        self.indicators.insert(symbol.to_string(), snapshot);
    }

    // ------------------------------------------------------------------
    // Chart data
    // ------------------------------------------------------------------

    pub fn chart(&self) -> Option<ChartData> {
        self.chart.read().clone()
    }

    pub fn replace_chart(&self, chart: ChartData) {
        *self.chart.write() = Some(chart);
    }

    // ------------------------------------------------------------------
    // Global feature flag
    // ------------------------------------------------------------------

    pub fn global_candle_analysis(&self) -> bool {
        *self.global_candle_analysis.read()
    }

    pub fn set_global_candle_analysis(&self, enabled: bool) {
        *self.global_candle_analysis.write() = enabled;
    }

    /// Effective per-coin flag: global master switch OR the per-coin override.
    pub fn effective_candle_analysis(&self, symbol: &str) -> bool {
        self.global_candle_analysis()
            || self
                .coin(symbol)
                .map(|cs| cs.candle_analysis_enabled)
                .unwrap_or(false)
    }
}


#[cfg(test)]
impl IndicatorSnapshot {
    fn default_for_test() -> Self {
        IndicatorSnapshot {
            rsi: Some(50.0),
            macd_signal: None,
            ema_9: None,
            ema_21: None,
            ema_50: None,
            ema_200: None,
            ema_cross: None,
            volatility: Some(2.0),
            signal_strength: None,
        }
    }
}
