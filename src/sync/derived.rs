//! Derived-Value Engine
//!
//! A dynamic threshold depends on both local settings and remote market
//! data, so it is never computed locally: the engine asks the Remote
//! Authority for the volatility-derived value and patches it into the
//! cached coin setting. It runs only on the two governing transitions
//! (mode switched to dynamic, timeframe changed while already dynamic),
//! never on ordinary edits, so it cannot overwrite a value the operator is
//! typing.

use crate::error::Result;
use crate::models::{CoinSetting, ThresholdMode, Timeframe};
use crate::state::AppState;

pub struct ThresholdEngine;

impl ThresholdEngine {
    /// Idempotent read-only remote call; the result lands via a cache patch
    /// on that coin's threshold only.
    pub async fn recompute(state: &AppState, coin: &str, timeframe: Timeframe) -> Result<f64> {
        let preview = state.authority.calculate_threshold(coin, timeframe).await?;
        state
            .cache
            .patch_coin(coin, |cs| cs.threshold = preview.threshold);
        tracing::debug!(
            "Dynamic threshold for {} @ {} -> {}",
            coin,
            timeframe,
            preview.threshold
        );
        Ok(preview.threshold)
    }

    /// Returns the timeframe to recompute for when an edit crosses one of
    /// the governing transitions, `None` otherwise.
    pub fn needs_recompute(before: &CoinSetting, after: &CoinSetting) -> Option<Timeframe> {
        let now_dynamic = after.threshold_mode == ThresholdMode::Dynamic;
        let switched = before.threshold_mode != ThresholdMode::Dynamic && now_dynamic;
        let retimed = now_dynamic
            && before.threshold_mode == ThresholdMode::Dynamic
            && before.timeframe != after.timeframe;
        (switched || retimed).then_some(after.timeframe)
    }
}
