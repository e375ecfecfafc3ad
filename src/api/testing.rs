//! Test double for the Remote Authority
//!
//! Records every call and can be told to fail reads, fail writes, or reject
//! the credential.

use crate::api::types::*;
use crate::api::RemoteAuthority;
use crate::error::{AppError, Result};
use crate::filter::SignalQuery;
use crate::models::*;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct MockAuthority {
    pub calls: Mutex<Vec<String>>,
    /// When set, every write returns a validation error.
    pub fail_writes: AtomicBool,
    /// When set, every read returns a transport-style error.
    pub fail_reads: AtomicBool,
    /// When set, every privileged call returns an authorization error.
    pub reject_credential: AtomicBool,
    /// Manual-price writes for this symbol stay in flight briefly, then
    /// fail; writes for other symbols are unaffected.
    pub failing_price_symbol: Mutex<Option<String>>,
    pub config: Mutex<BotConfig>,
    pub coin_settings: Mutex<Vec<CoinSetting>>,
    pub signals: Mutex<Vec<Signal>>,
    pub threshold: Mutex<f64>,
    pub threshold_calls: AtomicUsize,
    pub import_calls: AtomicUsize,
}

impl MockAuthority {
    pub fn new() -> Self {
        let mock = Self::default();
        *mock.config.lock() = sample_config();
        *mock.threshold.lock() = 3.2;
        mock
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn read_gate(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection refused".into()));
        }
        Ok(())
    }

    async fn write_gate(&self) -> Result<()> {
        if self.reject_credential.load(Ordering::SeqCst) {
            return Err(AppError::Auth("invalid admin token".into()));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Validation("write rejected".into()));
        }
        Ok(())
    }
}

pub fn sample_config() -> BotConfig {
    BotConfig {
        threshold: 4.0,
        threshold_mode: ThresholdMode::Manual,
        use_coin_specific_settings: true,
        selected_coins: vec!["BTC".into(), "ETH".into()],
        timeframe: Timeframe::H24,
        max_concurrent_coins: 20,
        cmc_api_key: Some(MASKED_SECRET.into()),
        telegram_token: Some(MASKED_SECRET.into()),
        telegram_chat_id: Some("1234".into()),
    }
}

pub fn sample_setting(coin: &str, mode: ThresholdMode) -> CoinSetting {
    CoinSetting {
        coin: coin.to_string(),
        timeframe: Timeframe::H24,
        threshold: 4.0,
        threshold_mode: mode,
        status: CoinStatus::Active,
        fetch_interval_minutes: 2,
        adaptive_timeframe_enabled: false,
        candle_analysis_enabled: false,
        last_fetch: None,
    }
}

pub fn sample_signal(id: &str, coin: &str, status: SignalStatus) -> Signal {
    Signal {
        id: id.to_string(),
        coin: coin.to_string(),
        direction: Direction::Long,
        probability: 80.0,
        status,
        entry_price: 100.0,
        take_profit: 110.0,
        stop_loss: 95.0,
        profit_loss_percent: None,
        timeframe: Timeframe::H24,
        created_at: Utc::now(),
        indicators: None,
    }
}

#[async_trait]
impl RemoteAuthority for MockAuthority {
    async fn get_config(&self) -> Result<BotConfig> {
        self.record("get_config");
        self.read_gate()?;
        Ok(self.config.lock().clone())
    }

    async fn update_config(&self, update: &ConfigUpdate) -> Result<()> {
        self.record(format!(
            "update_config(api_key={:?})",
            update.cmc_api_key.as_deref()
        ));
        self.write_gate().await
    }

    async fn get_coin_settings(&self) -> Result<Vec<CoinSetting>> {
        self.record("get_coin_settings");
        self.read_gate()?;
        Ok(self.coin_settings.lock().clone())
    }

    async fn update_coin_settings(&self, settings: &[CoinSetting]) -> Result<()> {
        self.record(format!("update_coin_settings(n={})", settings.len()));
        self.write_gate().await
    }

    async fn update_coin(&self, setting: &CoinSetting) -> Result<()> {
        self.record(format!("update_coin({})", setting.coin));
        self.write_gate().await
    }

    async fn get_fetch_intervals(&self) -> Result<FetchIntervals> {
        self.record("get_fetch_intervals");
        Ok(BTreeMap::from([
            (Timeframe::M15, 1),
            (Timeframe::H1, 2),
            (Timeframe::H24, 15),
        ]))
    }

    async fn update_fetch_intervals(&self, _intervals: &FetchIntervals) -> Result<()> {
        self.record("update_fetch_intervals");
        self.write_gate().await
    }

    async fn calculate_threshold(
        &self,
        coin: &str,
        timeframe: Timeframe,
    ) -> Result<ThresholdPreview> {
        self.record(format!("calculate_threshold({},{})", coin, timeframe));
        self.threshold_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ThresholdPreview {
            coin: coin.to_string(),
            timeframe,
            volatility: Some(2.4),
            threshold: *self.threshold.lock(),
        })
    }

    async fn get_signals(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        self.record(format!(
            "get_signals(status={:?},coins={:?},limit={:?})",
            query.status.map(|s| s.as_str()),
            query.coins,
            query.limit
        ));
        self.read_gate()?;
        Ok(self.signals.lock().clone())
    }

    async fn get_signal_statistics(&self) -> Result<SignalStatistics> {
        self.record("get_signal_statistics");
        self.read_gate()?;
        Ok(SignalStatistics {
            total: 10,
            active: 4,
            hit_tp: 4,
            hit_sl: 2,
            expired: 0,
            win_rate: 66.7,
            avg_profit_loss: 1.3,
        })
    }

    async fn get_chart_data(&self, days: u32) -> Result<ChartData> {
        self.record(format!("get_chart_data({})", days));
        Ok(ChartData {
            days,
            points: Vec::new(),
        })
    }

    async fn track_signals(&self) -> Result<TrackResult> {
        self.record("track_signals");
        self.write_gate().await?;
        Ok(TrackResult::default())
    }

    async fn delete_signal(&self, id: &str) -> Result<()> {
        self.record(format!("delete_signal({})", id));
        self.write_gate().await
    }

    async fn clear_signals(&self, scope: &ClearScope) -> Result<u64> {
        self.record(format!("clear_signals({:?})", scope));
        self.write_gate().await?;
        Ok(3)
    }

    async fn export_signals(&self, kind: ExportKind) -> Result<SignalExport> {
        self.record(format!("export_signals({})", kind.as_str()));
        let signals = self.signals.lock().clone();
        Ok(SignalExport {
            count: signals.len() as u64,
            signals,
        })
    }

    async fn import_signals(&self, doc: &SignalExport) -> Result<ImportSummary> {
        self.record(format!("import_signals(count={})", doc.count));
        self.import_calls.fetch_add(1, Ordering::SeqCst);
        self.write_gate().await?;
        Ok(ImportSummary {
            imported: doc.count,
            skipped: 0,
        })
    }

    async fn get_alarms(&self) -> Result<AlarmFeed> {
        self.record("get_alarms");
        Ok(AlarmFeed {
            alarms: Vec::new(),
            alarms_enabled: true,
        })
    }

    async fn toggle_alarms(&self, enabled: bool) -> Result<()> {
        self.record(format!("toggle_alarms({})", enabled));
        self.write_gate().await
    }

    async fn get_manual_prices(&self) -> Result<ManualPrices> {
        self.record("get_manual_prices");
        Ok(BTreeMap::new())
    }

    async fn set_manual_price(&self, coin: &str, price: f64) -> Result<()> {
        self.record(format!("set_manual_price({},{})", coin, price));
        let failing = self.failing_price_symbol.lock().clone();
        if failing.as_deref() == Some(coin) {
            tokio::time::sleep(Duration::from_millis(50)).await;
            return Err(AppError::Validation("write rejected".into()));
        }
        self.write_gate().await
    }

    async fn delete_manual_price(&self, coin: &str) -> Result<()> {
        self.record(format!("delete_manual_price({})", coin));
        self.write_gate().await
    }

    async fn get_indicators(&self, coin: &str) -> Result<IndicatorSnapshot> {
        self.record(format!("get_indicators({})", coin));
        Ok(IndicatorSnapshot {
            rsi: Some(55.0),
            macd_signal: Some("bullish".into()),
            ema_9: None,
            ema_21: None,
            ema_50: None,
            ema_200: None,
            ema_cross: None,
            volatility: Some(2.1),
            signal_strength: None,
        })
    }

    async fn toggle_feature_flag(&self, flag: &str, enabled: bool) -> Result<()> {
        self.record(format!("toggle_feature_flag({},{})", flag, enabled));
        self.write_gate().await
    }

    async fn send_test_notification(&self) -> Result<String> {
        self.record("send_test_notification");
        self.write_gate().await?;
        Ok("Test message sent".into())
    }

    async fn analyze_now(&self) -> Result<String> {
        self.record("analyze_now");
        self.write_gate().await?;
        Ok("Analysis started".into())
    }

    async fn restart_engine(&self) -> Result<String> {
        self.record("restart_engine");
        self.write_gate().await?;
        Ok("Restarting".into())
    }

    async fn historical_import(
        &self,
        request: &HistoricalImportRequest,
    ) -> Result<HistoricalImportResults> {
        self.record(format!(
            "historical_import(coins={:?},days={})",
            request.coins, request.days
        ));
        self.write_gate().await?;
        Ok(request
            .coins
            .iter()
            .map(|coin| {
                (
                    coin.clone(),
                    CoinImportResult {
                        status: "success".into(),
                        imported: 100,
                        error: None,
                    },
                )
            })
            .collect())
    }
}
