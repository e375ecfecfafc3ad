//! Historical candle backfill

use crate::api::types::{HistoricalImportRequest, HistoricalImportResults};
use crate::error::{AppError, Result};
use crate::models::{CoinStatus, Timeframe};
use crate::state::AppState;

pub struct HistoryService;

impl HistoryService {
    /// Backfill candles for every active coin in one request. The server
    /// reports a per-symbol outcome rather than failing the whole batch.
    pub async fn import(
        state: &AppState,
        days: u32,
        interval: Timeframe,
    ) -> Result<HistoricalImportResults> {
        if days == 0 {
            return Err(AppError::Validation(
                "Backfill window must be at least one day".into(),
            ));
        }
        let coins: Vec<String> = state
            .cache
            .coin_settings()
            .into_iter()
            .filter(|cs| cs.status == CoinStatus::Active)
            .map(|cs| cs.coin)
            .collect();
        if coins.is_empty() {
            return Err(AppError::Validation(
                "No active coins to backfill".into(),
            ));
        }

        let request = HistoricalImportRequest {
            coins,
            days,
            interval,
        };
        let results = state
            .authority
            .historical_import(&request)
            .await
            .map_err(|err| {
                state.notify_error(&err);
                err
            })?;

        let succeeded = results.values().filter(|r| r.succeeded()).count();
        let imported: u64 = results.values().map(|r| r.imported).sum();
        state.notify_info(format!(
            "Backfill finished: {} candles across {}/{} coins",
            imported,
            succeeded,
            results.len()
        ));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{sample_setting, MockAuthority};
    use crate::models::ThresholdMode;
    use std::sync::Arc;

    #[tokio::test]
    async fn no_active_coins_fails_before_the_remote_call() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());

        let mut passive = sample_setting("BTC", ThresholdMode::Manual);
        passive.status = CoinStatus::Passive;
        state.cache.replace_coin_settings(vec![passive]);

        let err = HistoryService::import(&state, 30, Timeframe::H1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn only_active_coins_are_requested() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());

        let mut passive = sample_setting("ETH", ThresholdMode::Manual);
        passive.status = CoinStatus::Passive;
        state
            .cache
            .replace_coin_settings(vec![sample_setting("BTC", ThresholdMode::Manual), passive]);

        let results = HistoryService::import(&state, 30, Timeframe::H1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.contains_key("BTC"));
        assert!(mock
            .calls()
            .iter()
            .any(|c| c.contains("coins=[\"BTC\"]") && c.contains("days=30")));
    }
}
