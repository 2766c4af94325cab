use std::time::Duration;

use crate::TradingMode;

/// All configuration loaded from environment variables at startup.
/// Every variable is optional; the defaults match the deployment the
/// dashboard frontend was built against.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deriv streaming endpoint, without the `app_id` query parameter.
    pub deriv_endpoint: String,
    pub deriv_app_id: String,

    /// Instrument the auto-trader buys contracts on.
    pub trade_symbol: String,

    /// Upper bound on one trade attempt, connect through settlement.
    pub trade_timeout: Duration,

    pub trading_mode: TradingMode,

    // Dashboard API
    pub api_port: u16,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on an unrecognized trading mode.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let trading_mode = match optional_env("TRADING_MODE")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            None | Some("live") => TradingMode::Live,
            Some("sim") => TradingMode::Sim,
            Some(other) => panic!(
                "ERROR: TRADING_MODE must be 'live' or 'sim', got: '{other}'"
            ),
        };

        Config {
            deriv_endpoint: optional_env("DERIV_ENDPOINT")
                .unwrap_or_else(|| "wss://ws.binaryws.com/websockets/v3".to_string()),
            deriv_app_id: optional_env("DERIV_APP_ID")
                .unwrap_or_else(|| "1089".to_string()),
            trade_symbol: optional_env("TRADE_SYMBOL")
                .unwrap_or_else(|| "R_50".to_string()),
            trade_timeout: Duration::from_secs(
                optional_env("TRADE_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(120),
            ),
            trading_mode,
            api_port: optional_env("API_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
