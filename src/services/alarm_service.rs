//! Alarm feed operations

use crate::error::Result;
use crate::state::AppState;

pub struct AlarmService;

impl AlarmService {
    /// Optimistically flip the global alarm switch. The accepted choice also
    /// persists locally so it survives a restart.
    pub async fn toggle(state: &AppState, enabled: bool) -> Result<()> {
        let outcome = state
            .mutations
            .run(
                "alarms-enabled",
                || state.cache.alarms_enabled(),
                || state.cache.set_alarms_enabled(enabled),
                |previous| state.cache.set_alarms_enabled(previous),
                || async { state.authority.toggle_alarms(enabled).await },
            )
            .await;

        match outcome {
            Ok(()) => state.prefs.set_alarms_enabled(enabled),
            Err(err) => {
                state.notify_error(&err);
                Err(err)
            }
        }
    }
}
