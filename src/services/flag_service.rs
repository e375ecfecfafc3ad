//! Candle interval analysis flag operations
//!
//! The flag has two layers: a global master switch and a per-coin override.
//! A coin is effectively enabled when either layer is on, and toggling one
//! layer never touches the other, so the effective value cannot flicker
//! through disabled while a toggle is in flight.

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Wire name of the candle interval analysis switch
pub const CANDLE_ANALYSIS_FLAG: &str = "enable_candle_interval_analysis";

pub struct FlagService;

impl FlagService {
    /// Optimistically toggle the global master switch.
    pub async fn set_global(state: &AppState, enabled: bool) -> Result<()> {
        let outcome = state
            .mutations
            .run(
                "feature-flag:global",
                || state.cache.global_candle_analysis(),
                || state.cache.set_global_candle_analysis(enabled),
                |previous| state.cache.set_global_candle_analysis(previous),
                || async {
                    state
                        .authority
                        .toggle_feature_flag(CANDLE_ANALYSIS_FLAG, enabled)
                        .await
                },
            )
            .await;

        if let Err(err) = &outcome {
            state.notify_error(err);
        }
        outcome
    }

    /// Optimistically toggle one coin's override; pushed immediately rather
    /// than staged.
    pub async fn set_coin(state: &AppState, coin: &str, enabled: bool) -> Result<()> {
        let outcome = state
            .mutations
            .run(
                &format!("coin:{}", coin),
                || state.cache.coin(coin),
                || {
                    state
                        .cache
                        .patch_coin(coin, |cs| cs.candle_analysis_enabled = enabled);
                },
                |previous| {
                    if let Some(previous) = previous {
                        state.cache.restore_coin(previous);
                    }
                },
                || async {
                    match state.cache.coin(coin) {
                        Some(setting) => state.authority.update_coin(&setting).await,
                        None => Err(AppError::NotFound(format!("Unknown coin {}", coin))),
                    }
                },
            )
            .await;

        if let Err(err) = &outcome {
            state.notify_error(err);
        }
        outcome
    }

    /// Effective per-coin value: global master switch OR the coin override.
    pub fn effective(state: &AppState, coin: &str) -> bool {
        state.cache.effective_candle_analysis(coin)
    }
}
