//! Manual price override operations
//!
//! Overrides mutate per symbol: the lock key, the captured snapshot, and
//! the rollback all cover exactly one entry, so a failed write for one
//! symbol cannot clobber a concurrent edit to another.

use crate::error::{AppError, Result};
use crate::state::AppState;

pub struct PriceService;

impl PriceService {
    /// Optimistically set a manual price override for one symbol.
    pub async fn set(state: &AppState, coin: &str, price: f64) -> Result<()> {
        let symbol = coin.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(AppError::Validation("Coin symbol is required".into()));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::Validation(
                "Price must be a positive number".into(),
            ));
        }

        let outcome = state
            .mutations
            .run(
                &format!("manual-price:{}", symbol),
                || state.cache.manual_price(&symbol),
                || state.cache.set_manual_price(&symbol, price),
                |previous| state.cache.restore_manual_price(&symbol, previous),
                || async { state.authority.set_manual_price(&symbol, price).await },
            )
            .await;

        if let Err(err) = &outcome {
            state.notify_error(err);
        }
        outcome
    }

    /// Optimistically drop a manual price override.
    pub async fn remove(state: &AppState, coin: &str) -> Result<()> {
        let symbol = coin.trim().to_uppercase();
        let outcome = state
            .mutations
            .run(
                &format!("manual-price:{}", symbol),
                || state.cache.manual_price(&symbol),
                || state.cache.remove_manual_price(&symbol),
                |previous| state.cache.restore_manual_price(&symbol, previous),
                || async { state.authority.delete_manual_price(&symbol).await },
            )
            .await;

        if let Err(err) = &outcome {
            state.notify_error(err);
        }
        outcome
    }
}
