//! Per-coin settings operations
//!
//! Edits to coin settings are staged in the Entity Cache and pushed by one
//! of the save calls; additions are staged too, while removals take effect
//! locally at once. A failed save keeps the staged edits so the operator
//! can retry.

use crate::error::{AppError, Result};
use crate::models::{CoinSetting, CoinStatus, ThresholdMode, Timeframe};
use crate::state::AppState;
use crate::sync::{EntityKind, SyncScheduler, ThresholdEngine};

/// One staged edit to a cached coin setting
#[derive(Debug, Clone, PartialEq)]
pub enum CoinEdit {
    Threshold(f64),
    ThresholdMode(ThresholdMode),
    Timeframe(Timeframe),
    Status(CoinStatus),
    FetchIntervalMinutes(u32),
    AdaptiveTimeframe(bool),
}

pub struct CoinService;

impl CoinService {
    /// Stage one edit locally. Crossing a governing transition (mode switched
    /// to dynamic, timeframe changed while dynamic) recomputes the threshold
    /// from the Remote Authority immediately.
    pub async fn edit(state: &AppState, coin: &str, edit: CoinEdit) -> Result<()> {
        let before = state
            .cache
            .coin(coin)
            .ok_or_else(|| AppError::NotFound(format!("Unknown coin {}", coin)))?;

        let mut after = before.clone();
        match edit {
            CoinEdit::Threshold(value) => {
                if before.threshold_mode == ThresholdMode::Dynamic {
                    return Err(AppError::Validation(
                        "Threshold is computed automatically while the mode is dynamic".into(),
                    ));
                }
                if !value.is_finite() || value <= 0.0 {
                    return Err(AppError::Validation(
                        "Threshold must be a positive number".into(),
                    ));
                }
                after.threshold = value;
            }
            CoinEdit::ThresholdMode(mode) => after.threshold_mode = mode,
            CoinEdit::Timeframe(timeframe) => after.timeframe = timeframe,
            CoinEdit::Status(status) => after.status = status,
            CoinEdit::FetchIntervalMinutes(minutes) => {
                if minutes == 0 {
                    return Err(AppError::Validation(
                        "Fetch interval must be at least one minute".into(),
                    ));
                }
                after.fetch_interval_minutes = minutes;
            }
            CoinEdit::AdaptiveTimeframe(enabled) => after.adaptive_timeframe_enabled = enabled,
        }

        let staged = after.clone();
        state.cache.patch_coin(coin, |cs| *cs = staged);

        if let Some(timeframe) = ThresholdEngine::needs_recompute(&before, &after) {
            ThresholdEngine::recompute(state, coin, timeframe).await?;
        }
        Ok(())
    }

    /// Push every staged setting in one bulk write.
    pub async fn save_all(state: &AppState, scheduler: &SyncScheduler) -> Result<()> {
        let settings = state.cache.coin_settings();
        match state.authority.update_coin_settings(&settings).await {
            Ok(()) => {
                state.notify_info(format!("Saved settings for {} coins", settings.len()));
                scheduler.reconcile(EntityKind::CoinSettings).await;
                scheduler.reconcile(EntityKind::Indicators).await;
                Ok(())
            }
            Err(err) => {
                // Staged edits stay in place for a retry.
                state.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Push one coin's staged setting.
    pub async fn save_single(state: &AppState, scheduler: &SyncScheduler, coin: &str) -> Result<()> {
        let setting = state
            .cache
            .coin(coin)
            .ok_or_else(|| AppError::NotFound(format!("Unknown coin {}", coin)))?;
        match state.authority.update_coin(&setting).await {
            Ok(()) => {
                state.notify_info(format!("Saved settings for {}", coin));
                scheduler.reconcile(EntityKind::CoinSettings).await;
                Ok(())
            }
            Err(err) => {
                state.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Stage a new coin, seeded from the global config when one is cached.
    /// A dynamic seed asks the Remote Authority for its starting threshold.
    pub async fn add(state: &AppState, symbol: &str) -> Result<CoinSetting> {
        let coin = symbol.trim().to_uppercase();
        if coin.is_empty() {
            return Err(AppError::Validation("Coin symbol is required".into()));
        }
        if state.cache.coin(&coin).is_some() {
            return Err(AppError::Validation(format!("{} is already tracked", coin)));
        }

        let config = state.cache.config();
        let timeframe = config
            .as_ref()
            .map(|c| c.timeframe)
            .unwrap_or(Timeframe::H24);
        let threshold_mode = config
            .as_ref()
            .map(|c| c.threshold_mode)
            .unwrap_or(ThresholdMode::Dynamic);
        let mut threshold = config.as_ref().map(|c| c.threshold).unwrap_or(4.0);

        if threshold_mode == ThresholdMode::Dynamic {
            match state.authority.calculate_threshold(&coin, timeframe).await {
                Ok(preview) => threshold = preview.threshold,
                // The seed value stands in until the next recompute.
                Err(err) => tracing::warn!("Threshold preview for {} failed: {}", coin, err),
            }
        }

        let setting = CoinSetting {
            coin: coin.clone(),
            timeframe,
            threshold,
            threshold_mode,
            status: CoinStatus::Active,
            fetch_interval_minutes: 2,
            adaptive_timeframe_enabled: false,
            candle_analysis_enabled: false,
            last_fetch: None,
        };
        state.cache.insert_coin(setting.clone());
        Ok(setting)
    }

    /// Remove a coin locally at once. Like other staged edits, the removal
    /// reaches the server on the next bulk save and is never rolled back.
    pub fn remove(state: &AppState, symbol: &str) {
        state.cache.remove_coin(symbol);
        state.notify_info(format!("{} removed", symbol));
    }

    /// Stage the same status for every tracked coin.
    pub fn set_all_statuses(state: &AppState, status: CoinStatus) {
        for setting in state.cache.coin_settings() {
            state.cache.patch_coin(&setting.coin, |cs| cs.status = status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{sample_setting, MockAuthority};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[tokio::test]
    async fn manual_threshold_edits_never_trigger_a_recompute() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        state
            .cache
            .replace_coin_settings(vec![sample_setting("BTC", ThresholdMode::Manual)]);

        CoinService::edit(&state, "BTC", CoinEdit::Threshold(6.5))
            .await
            .unwrap();

        assert_eq!(state.cache.coin("BTC").unwrap().threshold, 6.5);
        assert_eq!(mock.threshold_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn threshold_edits_are_rejected_while_dynamic() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock);
        state
            .cache
            .replace_coin_settings(vec![sample_setting("BTC", ThresholdMode::Dynamic)]);

        let err = CoinService::edit(&state, "BTC", CoinEdit::Threshold(6.5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(state.cache.coin("BTC").unwrap().threshold, 4.0);
    }

    #[tokio::test]
    async fn switching_to_dynamic_recomputes_from_the_authority() {
        let mock = Arc::new(MockAuthority::new());
        *mock.threshold.lock() = 2.7;
        let (state, _dir) = AppState::for_tests(mock.clone());
        state
            .cache
            .replace_coin_settings(vec![sample_setting("BTC", ThresholdMode::Manual)]);

        CoinService::edit(
            &state,
            "BTC",
            CoinEdit::ThresholdMode(ThresholdMode::Dynamic),
        )
        .await
        .unwrap();

        assert_eq!(mock.threshold_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.cache.coin("BTC").unwrap().threshold, 2.7);
    }

    #[tokio::test]
    async fn adding_a_duplicate_coin_is_rejected() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock);
        state
            .cache
            .replace_coin_settings(vec![sample_setting("BTC", ThresholdMode::Manual)]);

        assert!(matches!(
            CoinService::add(&state, "btc").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn adding_a_dynamic_coin_seeds_the_previewed_threshold() {
        let mock = Arc::new(MockAuthority::new());
        *mock.threshold.lock() = 3.3;
        let (state, _dir) = AppState::for_tests(mock.clone());

        let mut config = crate::api::testing::sample_config();
        config.threshold_mode = ThresholdMode::Dynamic;
        state.cache.replace_config(config);

        let setting = CoinService::add(&state, " sol ").await.unwrap();
        assert_eq!(setting.coin, "SOL");
        assert_eq!(setting.threshold, 3.3);
        assert!(state.cache.coin("SOL").is_some());
    }

    #[tokio::test]
    async fn failed_bulk_save_keeps_the_staged_edits() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        let scheduler = SyncScheduler::new(state.clone());
        state
            .cache
            .replace_coin_settings(vec![sample_setting("BTC", ThresholdMode::Manual)]);

        CoinService::edit(&state, "BTC", CoinEdit::Threshold(7.0))
            .await
            .unwrap();
        mock.fail_writes.store(true, Ordering::SeqCst);
        assert!(CoinService::save_all(&state, &scheduler).await.is_err());

        assert_eq!(state.cache.coin("BTC").unwrap().threshold, 7.0);
    }
}
