//! Operator-facing operations
//!
//! Each service groups the operations of one console surface. Services
//! validate locally, route optimistic writes through the Mutation Pipeline,
//! and ask the Sync Scheduler for event-triggered reconciliation pulls.

pub mod alarm_service;
pub mod bot_service;
pub mod coin_service;
pub mod config_service;
pub mod flag_service;
pub mod history_service;
pub mod price_service;
pub mod signal_service;

pub use alarm_service::AlarmService;
pub use bot_service::BotService;
pub use coin_service::{CoinEdit, CoinService};
pub use config_service::ConfigService;
pub use flag_service::{FlagService, CANDLE_ANALYSIS_FLAG};
pub use history_service::HistoryService;
pub use price_service::PriceService;
pub use signal_service::SignalService;
