//! Process configuration
//!
//! Read once at startup from the environment. Poll cadences mirror the
//! defaults the control panel always used: short cadences for the signal
//! feed and per-coin settings, one minute for the dashboard counters.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the console
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the Remote Authority, e.g. `http://localhost:8001/api`
    pub base_url: String,
    /// Directory for persisted local preferences
    pub data_dir: PathBuf,
    /// Cadence for the signal feed pull
    pub signals_interval: Duration,
    /// Cadence for the per-coin settings pull
    pub coin_settings_interval: Duration,
    /// Cadence for the alarms pull
    pub alarms_interval: Duration,
    /// Cadence for the dashboard statistics pull
    pub stats_interval: Duration,
    /// Cadence for the remote signal-tracking sweep
    pub tracking_interval: Duration,
}

impl ConsoleConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("SIGNAL_CONSOLE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8001/api".to_string()),
            data_dir: env::var("SIGNAL_CONSOLE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".signal-console")),
            signals_interval: env_duration_secs("SIGNAL_CONSOLE_SIGNALS_INTERVAL", 600),
            coin_settings_interval: env_duration_secs("SIGNAL_CONSOLE_COINS_INTERVAL", 600),
            alarms_interval: env_duration_secs("SIGNAL_CONSOLE_ALARMS_INTERVAL", 600),
            stats_interval: env_duration_secs("SIGNAL_CONSOLE_STATS_INTERVAL", 60),
            tracking_interval: env_duration_secs("SIGNAL_CONSOLE_TRACKING_INTERVAL", 300),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_duration_secs(var: &str, default_secs: u64) -> Duration {
    let secs = env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ConsoleConfig::from_env();
        assert!(cfg.base_url.starts_with("http"));
        assert_eq!(cfg.stats_interval, Duration::from_secs(60));
        assert_eq!(cfg.tracking_interval, Duration::from_secs(300));
    }
}
