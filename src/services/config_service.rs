//! Bot configuration operations

use crate::api::types::ConfigUpdate;
use crate::error::{AppError, Result};
use crate::models::{BotConfig, FetchIntervals};
use crate::state::AppState;
use crate::sync::{EntityKind, SyncScheduler};

pub struct ConfigService;

impl ConfigService {
    /// Optimistic full save of the bot configuration. Secret fields still
    /// holding the server-side mask are dropped from the payload; a rejected
    /// credential rolls the edit back and drops the stored token.
    pub async fn save(
        state: &AppState,
        scheduler: &SyncScheduler,
        draft: BotConfig,
    ) -> Result<()> {
        let update = ConfigUpdate::from_draft(&draft);
        let outcome = state
            .mutations
            .run(
                "config",
                || state.cache.config(),
                || state.cache.replace_config(draft.clone()),
                |previous| state.cache.restore_config(previous),
                || async { state.authority.update_config(&update).await },
            )
            .await;

        match outcome {
            Ok(()) => {
                state.notify_info("Configuration saved");
                // Re-pull so masked secrets and server-filled defaults land;
                // the save already committed, so a failed pull never turns
                // this into an error.
                scheduler.reconcile(EntityKind::Config).await;
                Ok(())
            }
            Err(err) => {
                if matches!(err, AppError::Auth(_)) {
                    state.prefs.clear_admin_token()?;
                }
                state.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Validate and save the per-timeframe pull cadence.
    pub async fn save_intervals(
        state: &AppState,
        scheduler: &SyncScheduler,
        intervals: FetchIntervals,
    ) -> Result<()> {
        if intervals.values().any(|minutes| *minutes == 0) {
            return Err(AppError::Validation(
                "Fetch intervals must be at least one minute".into(),
            ));
        }

        let outcome = state
            .mutations
            .run(
                "fetch-intervals",
                || state.cache.fetch_intervals(),
                || state.cache.replace_fetch_intervals(intervals.clone()),
                |previous| state.cache.replace_fetch_intervals(previous),
                || async { state.authority.update_fetch_intervals(&intervals).await },
            )
            .await;

        match outcome {
            Ok(()) => {
                state.notify_info("Fetch intervals saved");
                scheduler.reconcile(EntityKind::FetchIntervals).await;
                Ok(())
            }
            Err(err) => {
                state.notify_error(&err);
                Err(err)
            }
        }
    }

    /// Store the admin credential for privileged calls.
    pub fn store_credential(state: &AppState, token: String) -> Result<()> {
        if token.trim().is_empty() {
            return Err(AppError::Validation("Admin token cannot be empty".into()));
        }
        state.prefs.set_admin_token(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{sample_config, MockAuthority};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[tokio::test]
    async fn rejected_credential_rolls_back_and_clears_the_token() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        let scheduler = SyncScheduler::new(state.clone());

        state.prefs.set_admin_token(Some("stale".into())).unwrap();
        let server_copy = sample_config();
        state.cache.replace_config(server_copy.clone());

        mock.reject_credential.store(true, Ordering::SeqCst);
        let mut draft = server_copy.clone();
        draft.threshold = 9.9;
        let err = ConfigService::save(&state, &scheduler, draft)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(state.cache.config().unwrap(), server_copy);
        assert!(state.prefs.admin_token().is_none());
    }

    #[tokio::test]
    async fn masked_secrets_never_reach_the_server() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        let scheduler = SyncScheduler::new(state.clone());

        let draft = sample_config();
        state.cache.replace_config(draft.clone());
        ConfigService::save(&state, &scheduler, draft).await.unwrap();

        assert!(mock
            .calls()
            .contains(&"update_config(api_key=None)".to_string()));
    }

    #[tokio::test]
    async fn validation_failure_keeps_the_previous_config() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        let scheduler = SyncScheduler::new(state.clone());

        let server_copy = sample_config();
        state.cache.replace_config(server_copy.clone());
        state.prefs.set_admin_token(Some("good".into())).unwrap();

        mock.fail_writes.store(true, Ordering::SeqCst);
        let mut draft = server_copy.clone();
        draft.max_concurrent_coins = 99;
        let err = ConfigService::save(&state, &scheduler, draft)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(state.cache.config().unwrap(), server_copy);
        // Only an authorization failure drops the credential.
        assert_eq!(state.prefs.admin_token().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn committed_save_survives_a_failed_reconcile_pull() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        let scheduler = SyncScheduler::new(state.clone());

        state.cache.replace_config(sample_config());
        let mut draft = sample_config();
        draft.threshold = 6.0;

        // The write lands; only the follow-up pull fails.
        mock.fail_reads.store(true, Ordering::SeqCst);
        ConfigService::save(&state, &scheduler, draft.clone())
            .await
            .unwrap();

        assert_eq!(state.cache.config().unwrap(), draft);
    }

    #[tokio::test]
    async fn zero_minute_intervals_are_rejected_locally() {
        let mock = Arc::new(MockAuthority::new());
        let (state, _dir) = AppState::for_tests(mock.clone());
        let scheduler = SyncScheduler::new(state.clone());

        let intervals = std::collections::BTreeMap::from([(crate::models::Timeframe::H1, 0)]);
        let err = ConfigService::save_intervals(&state, &scheduler, intervals)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(mock.calls().is_empty());
    }
}
