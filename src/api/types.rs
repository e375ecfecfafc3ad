//! Request and response types for the Remote Authority API

use crate::error::{AppError, Result};
use crate::models::{
    is_masked, Alarm, BotConfig, CoinSetting, Signal, SignalStatus, ThresholdMode, Timeframe,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partial config write; absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_mode: Option<ThresholdMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_coin_specific_settings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_coins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_coins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmc_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
}

impl ConfigUpdate {
    /// Build a full-save payload from an edited config. Secret fields still
    /// holding the server-side mask are dropped so the sentinel is never
    /// written back as a literal value.
    pub fn from_draft(draft: &BotConfig) -> Self {
        Self {
            threshold: Some(draft.threshold),
            threshold_mode: Some(draft.threshold_mode),
            use_coin_specific_settings: Some(draft.use_coin_specific_settings),
            selected_coins: Some(draft.selected_coins.clone()),
            timeframe: Some(draft.timeframe),
            max_concurrent_coins: Some(draft.max_concurrent_coins),
            cmc_api_key: filter_masked(&draft.cmc_api_key),
            telegram_token: filter_masked(&draft.telegram_token),
            telegram_chat_id: draft.telegram_chat_id.clone(),
        }
    }
}

fn filter_masked(value: &Option<String>) -> Option<String> {
    if is_masked(value) {
        None
    } else {
        value.clone()
    }
}

/// Result of a `calculate-threshold` read
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThresholdPreview {
    pub coin: String,
    pub timeframe: Timeframe,
    #[serde(default)]
    pub volatility: Option<f64>,
    pub threshold: f64,
}

/// Counters returned by the remote signal-tracking sweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackResult {
    #[serde(default)]
    pub checked: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub hit_tp: u64,
    #[serde(default)]
    pub hit_sl: u64,
    #[serde(default)]
    pub expired: u64,
}

/// Bulk export/import document for signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalExport {
    pub count: u64,
    pub signals: Vec<Signal>,
}

impl SignalExport {
    /// Parse and validate an import payload before any remote call.
    pub fn parse(raw: &str) -> Result<Self> {
        let doc: SignalExport = serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid import file: {}", e)))?;
        if doc.count as usize != doc.signals.len() {
            return Err(AppError::Validation(format!(
                "Import file count mismatch: header says {}, found {}",
                doc.count,
                doc.signals.len()
            )));
        }
        Ok(doc)
    }
}

/// Outcome of a bulk signal import
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSummary {
    pub imported: u64,
    #[serde(default)]
    pub skipped: u64,
}

/// Which signals an export should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    All,
    Active,
    Closed,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::All => "all",
            ExportKind::Active => "active",
            ExportKind::Closed => "closed",
        }
    }
}

/// Scope of a bulk signal deletion
#[derive(Debug, Clone, PartialEq)]
pub enum ClearScope {
    All,
    Statuses(Vec<SignalStatus>),
    Coin(String),
}

/// Alarm collection plus the global enabled switch
#[derive(Debug, Clone, Deserialize)]
pub struct AlarmFeed {
    #[serde(default)]
    pub alarms: Vec<Alarm>,
    #[serde(default)]
    pub alarms_enabled: bool,
}

/// Bulk historical-data backfill request
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalImportRequest {
    pub coins: Vec<String>,
    pub days: u32,
    pub interval: Timeframe,
}

/// Per-symbol outcome of a historical backfill
#[derive(Debug, Clone, Deserialize)]
pub struct CoinImportResult {
    pub status: String,
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl CoinImportResult {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

/// Per-coin settings bulk write body
#[derive(Debug, Clone, Serialize)]
pub struct CoinSettingsUpdate {
    pub coin_settings: Vec<CoinSetting>,
}

/// Historical backfill results keyed by symbol
pub type HistoricalImportResults = BTreeMap<String, CoinImportResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MASKED_SECRET;

    #[test]
    fn masked_secrets_are_stripped_from_the_payload() {
        let draft = BotConfig {
            threshold: 5.0,
            threshold_mode: ThresholdMode::Manual,
            use_coin_specific_settings: true,
            selected_coins: vec!["BTC".into()],
            timeframe: Timeframe::H24,
            max_concurrent_coins: 10,
            cmc_api_key: Some(MASKED_SECRET.into()),
            telegram_token: Some("fresh-token".into()),
            telegram_chat_id: Some("42".into()),
        };

        let update = ConfigUpdate::from_draft(&draft);
        assert_eq!(update.cmc_api_key, None);
        assert_eq!(update.telegram_token.as_deref(), Some("fresh-token"));

        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("cmc_api_key").is_none());
    }

    #[test]
    fn import_parse_rejects_malformed_payloads() {
        assert!(SignalExport::parse("not json at all").is_err());
        assert!(SignalExport::parse(r#"{"count": 2, "signals": []}"#).is_err());
        assert!(SignalExport::parse(r#"{"count": 0, "signals": []}"#).is_ok());
    }
}
