//! Domain entities mirrored from the remote bot API
//!
//! These are the shapes the Entity Cache holds. Wire-level request/response
//! wrappers live in `api::types`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel the server returns in place of a stored secret.
///
/// Must never be round-tripped back as a literal value; `ConfigUpdate`
/// strips it before any write.
pub const MASKED_SECRET: &str = "*****";

/// Analysis timeframe supported by the remote engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "30d")]
    D30,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::H12 => "12h",
            Timeframe::H24 => "24h",
            Timeframe::D7 => "7d",
            Timeframe::D30 => "30d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a threshold is maintained: set by the operator, or derived remotely
/// from volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Manual,
    Dynamic,
}

/// Singleton bot configuration held by the Remote Authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_threshold_mode")]
    pub threshold_mode: ThresholdMode,
    #[serde(default)]
    pub use_coin_specific_settings: bool,
    #[serde(default)]
    pub selected_coins: Vec<String>,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_coins: u32,
    /// May arrive as [`MASKED_SECRET`] when the server holds a value.
    #[serde(default)]
    pub cmc_api_key: Option<String>,
    #[serde(default)]
    pub telegram_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
}

impl Default for BotConfig {
    /// Matches the field-level wire defaults, so an empty server document
    /// and a fresh local config agree.
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            threshold_mode: default_threshold_mode(),
            use_coin_specific_settings: false,
            selected_coins: Vec::new(),
            timeframe: default_timeframe(),
            max_concurrent_coins: default_max_concurrent(),
            cmc_api_key: None,
            telegram_token: None,
            telegram_chat_id: None,
        }
    }
}

fn default_threshold() -> f64 {
    4.0
}

fn default_threshold_mode() -> ThresholdMode {
    ThresholdMode::Dynamic
}

fn default_timeframe() -> Timeframe {
    Timeframe::H24
}

fn default_max_concurrent() -> u32 {
    20
}

/// Whether a secret field currently holds the server-side mask.
pub fn is_masked(value: &Option<String>) -> bool {
    value.as_deref() == Some(MASKED_SECRET)
}

/// Tracking state of a per-coin setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinStatus {
    Active,
    Passive,
}

/// Per-coin analysis settings
///
/// The wire format carries both `status` and the legacy `active` boolean;
/// locally only the tagged status exists and `is_active()` is the derived
/// legacy accessor. Serialization keeps both fields in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CoinSettingWire", into = "CoinSettingWire")]
pub struct CoinSetting {
    pub coin: String,
    pub timeframe: Timeframe,
    pub threshold: f64,
    pub threshold_mode: ThresholdMode,
    pub status: CoinStatus,
    pub fetch_interval_minutes: u32,
    pub adaptive_timeframe_enabled: bool,
    pub candle_analysis_enabled: bool,
    /// Display-only; maintained by the remote fetch loop.
    pub last_fetch: Option<DateTime<Utc>>,
}

impl CoinSetting {
    /// Legacy-compatibility accessor for the old `active` boolean.
    pub fn is_active(&self) -> bool {
        self.status == CoinStatus::Active
    }
}

/// Wire shape for [`CoinSetting`] carrying the redundant legacy field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinSettingWire {
    pub coin: String,
    pub timeframe: Timeframe,
    pub threshold: f64,
    pub threshold_mode: ThresholdMode,
    #[serde(default)]
    pub status: Option<CoinStatus>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_minutes: u32,
    #[serde(default)]
    pub adaptive_timeframe_enabled: bool,
    #[serde(default)]
    pub candle_analysis_enabled: bool,
    #[serde(default)]
    pub last_fetch: Option<DateTime<Utc>>,
}

fn default_fetch_interval() -> u32 {
    2
}

impl From<CoinSettingWire> for CoinSetting {
    fn from(wire: CoinSettingWire) -> Self {
        // Prefer the tagged status; fall back to the legacy boolean.
        let status = wire.status.unwrap_or({
            if wire.active.unwrap_or(true) {
                CoinStatus::Active
            } else {
                CoinStatus::Passive
            }
        });
        CoinSetting {
            coin: wire.coin,
            timeframe: wire.timeframe,
            threshold: wire.threshold,
            threshold_mode: wire.threshold_mode,
            status,
            fetch_interval_minutes: wire.fetch_interval_minutes,
            adaptive_timeframe_enabled: wire.adaptive_timeframe_enabled,
            candle_analysis_enabled: wire.candle_analysis_enabled,
            last_fetch: wire.last_fetch,
        }
    }
}

impl From<CoinSetting> for CoinSettingWire {
    fn from(setting: CoinSetting) -> Self {
        let active = setting.is_active();
        CoinSettingWire {
            coin: setting.coin,
            timeframe: setting.timeframe,
            threshold: setting.threshold,
            threshold_mode: setting.threshold_mode,
            status: Some(setting.status),
            active: Some(active),
            fetch_interval_minutes: setting.fetch_interval_minutes,
            adaptive_timeframe_enabled: setting.adaptive_timeframe_enabled,
            candle_analysis_enabled: setting.candle_analysis_enabled,
            last_fetch: setting.last_fetch,
        }
    }
}

/// Per-timeframe pull cadence, in minutes
pub type FetchIntervals = BTreeMap<Timeframe, u32>;

/// Trade direction of a generated signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

/// Lifecycle status of a signal, owned by the remote engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Active,
    HitTp,
    HitSl,
    Expired,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Active => "active",
            SignalStatus::HitTp => "hit_tp",
            SignalStatus::HitSl => "hit_sl",
            SignalStatus::Expired => "expired",
        }
    }
}

/// Strength summary attached to a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStrength {
    pub score: f64,
    pub level: String,
    pub direction: String,
}

/// Indicator readings captured at signal creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalIndicators {
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<String>,
    #[serde(default)]
    pub ema_signal: Option<String>,
    #[serde(default)]
    pub ema_cross: Option<String>,
    #[serde(default)]
    pub signal_strength: Option<SignalStrength>,
}

/// Trading recommendation produced by the remote engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub coin: String,
    pub direction: Direction,
    pub probability: f64,
    pub status: SignalStatus,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    #[serde(default)]
    pub profit_loss_percent: Option<f64>,
    pub timeframe: Timeframe,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub indicators: Option<SignalIndicators>,
}

/// Aggregate counters derived server-side from the signal collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStatistics {
    pub total: u64,
    pub active: u64,
    pub hit_tp: u64,
    pub hit_sl: u64,
    #[serde(default)]
    pub expired: u64,
    pub win_rate: f64,
    #[serde(default)]
    pub avg_profit_loss: f64,
}

/// Price alarm kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmKind {
    Tp,
    Sl,
    Entry,
}

/// Pending price alarm, read-only from the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: String,
    pub coin: String,
    pub alarm_type: AlarmKind,
    pub target_price: f64,
    pub direction: Direction,
    #[serde(default)]
    pub pending: bool,
}

/// Symbol -> price overrides that outrank every external price source
pub type ManualPrices = BTreeMap<String, f64>;

/// Latest technical reading for one active coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<String>,
    #[serde(default)]
    pub ema_9: Option<f64>,
    #[serde(default)]
    pub ema_21: Option<f64>,
    #[serde(default)]
    pub ema_50: Option<f64>,
    #[serde(default)]
    pub ema_200: Option<f64>,
    #[serde(default)]
    pub ema_cross: Option<String>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub signal_strength: Option<SignalStrength>,
}

/// One day of signal outcomes for the dashboard chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub total: u64,
    pub hit_tp: u64,
    pub hit_sl: u64,
}

/// Signal outcome series fetched for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub days: u32,
    pub points: Vec<ChartPoint>,
}
