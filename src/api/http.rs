//! HTTP adapter for the Remote Authority
//!
//! Thin reqwest client over the bot's control API. Privileged calls carry
//! the opaque admin credential in the `x-admin-token` header; structured
//! errors come back as `{"detail": "..."}` with a machine status code
//! (403 meaning invalid credential).

use crate::api::types::*;
use crate::api::RemoteAuthority;
use crate::error::{AppError, Result};
use crate::filter::SignalQuery;
use crate::models::{
    BotConfig, ChartData, CoinSetting, FetchIntervals, IndicatorSnapshot, ManualPrices, Signal,
    SignalStatistics, Timeframe,
};
use crate::prefs::PrefStore;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

const ADMIN_HEADER: &str = "x-admin-token";

/// Remote Authority client over HTTP/JSON
pub struct HttpAuthority {
    client: Client,
    base: String,
    prefs: Arc<PrefStore>,
}

impl HttpAuthority {
    pub fn new(base_url: &str, prefs: Arc<PrefStore>) -> Result<Self> {
        // Validate the base URL up front so every later call can just format.
        Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        Ok(Self {
            client: Client::new(),
            base: base_url.trim_end_matches('/').to_string(),
            prefs,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// Attach the stored admin credential, when present.
    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.prefs.admin_token() {
            Some(token) => builder.header(ADMIN_HEADER, token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorDetail>()
            .await
            .map(|e| e.detail)
            .unwrap_or_else(|_| status.to_string());

        Err(match status {
            StatusCode::FORBIDDEN => AppError::Auth(detail),
            StatusCode::NOT_FOUND => AppError::NotFound(detail),
            s if s.is_client_error() => AppError::Validation(detail),
            _ => AppError::Internal(detail),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.endpoint(path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Deserialize)]
struct CoinSettingsEnvelope {
    coin_settings: Vec<CoinSetting>,
}

#[derive(Deserialize)]
struct FetchIntervalsEnvelope {
    fetch_intervals: FetchIntervals,
}

#[derive(Deserialize)]
struct SignalsEnvelope {
    signals: Vec<Signal>,
}

#[derive(Deserialize)]
struct ManualPricesEnvelope {
    manual_prices: ManualPrices,
}

#[derive(Deserialize)]
struct IndicatorsEnvelope {
    indicators: IndicatorSnapshot,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    #[serde(alias = "detail")]
    message: String,
}

#[derive(Deserialize)]
struct ClearEnvelope {
    #[serde(default)]
    deleted_count: u64,
}

#[derive(Deserialize)]
struct HistoricalEnvelope {
    results: HistoricalImportResults,
}

#[async_trait]
impl RemoteAuthority for HttpAuthority {
    async fn get_config(&self) -> Result<BotConfig> {
        self.get_json("config").await
    }

    async fn update_config(&self, update: &ConfigUpdate) -> Result<()> {
        let response = self
            .authed(self.client.post(self.endpoint("config")))
            .json(update)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_coin_settings(&self) -> Result<Vec<CoinSetting>> {
        let envelope: CoinSettingsEnvelope = self.get_json("coin-settings").await?;
        Ok(envelope.coin_settings)
    }

    async fn update_coin_settings(&self, settings: &[CoinSetting]) -> Result<()> {
        let body = CoinSettingsUpdate {
            coin_settings: settings.to_vec(),
        };
        let response = self
            .authed(self.client.post(self.endpoint("coin-settings")))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_coin(&self, setting: &CoinSetting) -> Result<()> {
        let response = self
            .authed(self.client.post(self.endpoint("update-coin")))
            .json(setting)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_fetch_intervals(&self) -> Result<FetchIntervals> {
        let envelope: FetchIntervalsEnvelope = self.get_json("fetch-intervals").await?;
        Ok(envelope.fetch_intervals)
    }

    async fn update_fetch_intervals(&self, intervals: &FetchIntervals) -> Result<()> {
        let body = serde_json::json!({ "intervals": intervals });
        let response = self
            .authed(self.client.post(self.endpoint("fetch-intervals")))
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn calculate_threshold(
        &self,
        coin: &str,
        timeframe: Timeframe,
    ) -> Result<ThresholdPreview> {
        let response = self
            .client
            .get(self.endpoint("calculate-threshold"))
            .query(&[("coin", coin), ("timeframe", timeframe.as_str())])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_signals(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        let response = self
            .client
            .get(self.endpoint("signals"))
            .query(&query.params())
            .send()
            .await?;
        let envelope: SignalsEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.signals)
    }

    async fn get_signal_statistics(&self) -> Result<SignalStatistics> {
        self.get_json("signals/statistics").await
    }

    async fn get_chart_data(&self, days: u32) -> Result<ChartData> {
        let response = self
            .client
            .get(self.endpoint("signals/chart"))
            .query(&[("days", days)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn track_signals(&self) -> Result<TrackResult> {
        let response = self
            .authed(self.client.post(self.endpoint("signals/track")))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_signal(&self, id: &str) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.endpoint(&format!("signals/{}", id))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn clear_signals(&self, scope: &ClearScope) -> Result<u64> {
        let response = match scope {
            ClearScope::All => {
                self.authed(self.client.post(self.endpoint("signals/clear_all")))
                    .send()
                    .await?
            }
            ClearScope::Statuses(statuses) => {
                let joined = statuses
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                self.authed(self.client.delete(self.endpoint("signals/bulk")))
                    .query(&[("status", joined)])
                    .send()
                    .await?
            }
            ClearScope::Coin(coin) => {
                self.authed(self.client.post(self.endpoint("signals/clear_by_coin")))
                    .json(&serde_json::json!({ "coin": coin }))
                    .send()
                    .await?
            }
        };
        let envelope: ClearEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.deleted_count)
    }

    async fn export_signals(&self, kind: ExportKind) -> Result<SignalExport> {
        let response = self
            .client
            .get(self.endpoint("signals/export"))
            .query(&[("type", kind.as_str())])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn import_signals(&self, doc: &SignalExport) -> Result<ImportSummary> {
        let response = self
            .authed(self.client.post(self.endpoint("signals/import")))
            .json(doc)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_alarms(&self) -> Result<AlarmFeed> {
        self.get_json("alarms").await
    }

    async fn toggle_alarms(&self, enabled: bool) -> Result<()> {
        let response = self
            .authed(self.client.post(self.endpoint("alarms/toggle")))
            .json(&serde_json::json!({ "enabled": enabled }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_manual_prices(&self) -> Result<ManualPrices> {
        let envelope: ManualPricesEnvelope = self.get_json("manual-prices").await?;
        Ok(envelope.manual_prices)
    }

    async fn set_manual_price(&self, coin: &str, price: f64) -> Result<()> {
        let response = self
            .authed(self.client.post(self.endpoint("manual-price")))
            .query(&[("coin", coin.to_string()), ("price", price.to_string())])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_manual_price(&self, coin: &str) -> Result<()> {
        let response = self
            .authed(
                self.client
                    .delete(self.endpoint(&format!("manual-price/{}", coin))),
            )
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_indicators(&self, coin: &str) -> Result<IndicatorSnapshot> {
        let envelope: IndicatorsEnvelope =
            self.get_json(&format!("indicators/{}", coin)).await?;
        Ok(envelope.indicators)
    }

    async fn toggle_feature_flag(&self, flag: &str, enabled: bool) -> Result<()> {
        let response = self
            .authed(self.client.post(self.endpoint("feature-flags/toggle")))
            .json(&serde_json::json!({ "flag": flag, "enabled": enabled }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn send_test_notification(&self) -> Result<String> {
        let response = self
            .authed(self.client.post(self.endpoint("test_telegram")))
            .send()
            .await?;
        let envelope: MessageEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.message)
    }

    async fn analyze_now(&self) -> Result<String> {
        let response = self
            .authed(self.client.post(self.endpoint("analyze_now")))
            .send()
            .await?;
        let envelope: MessageEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.message)
    }

    async fn restart_engine(&self) -> Result<String> {
        let response = self
            .authed(self.client.post(self.endpoint("restart")))
            .send()
            .await?;
        let envelope: MessageEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.message)
    }

    async fn historical_import(
        &self,
        request: &HistoricalImportRequest,
    ) -> Result<HistoricalImportResults> {
        let response = self
            .authed(self.client.post(self.endpoint("historical/import")))
            .json(request)
            .send()
            .await?;
        let envelope: HistoricalEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.results)
    }
}
