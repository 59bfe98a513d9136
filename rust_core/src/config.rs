//! Runtime configuration for the analytics layer.
//!
//! Only window sizes and list truncation are configurable. Betting thresholds
//! (spread buckets, edge cut-offs, the ELO conversion) are fixed constants in
//! the `betting` modules.

/// Default number of most recent games used by the trend analyzer
pub const DEFAULT_TREND_WINDOW: usize = 10;
/// Default number of most recent head-to-head meetings in the recent record
pub const DEFAULT_H2H_RECENT_WINDOW: usize = 5;
/// Default truncation for "top" lists (upsets, movers, volatile teams)
pub const DEFAULT_TOP_N: usize = 5;

/// Analytics configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Games considered by the trend analyzer when the caller does not say
    pub trend_window: usize,
    /// Meetings in the head-to-head "recent" record
    pub head_to_head_recent_window: usize,
    /// Length of ranked lists in reports
    pub top_n: usize,
    /// Default log level for `telemetry::init_logging`
    pub log_level: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AnalyticsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            trend_window: std::env::var("CFB_TREND_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_TREND_WINDOW),
            head_to_head_recent_window: std::env::var("CFB_H2H_RECENT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_H2H_RECENT_WINDOW),
            top_n: std::env::var("CFB_TOP_N")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_TOP_N),
            log_level: std::env::var("CFB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Load `.env` (if present) and then read the environment.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    /// Built-in defaults, ignoring the environment.
    pub fn defaults() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            head_to_head_recent_window: DEFAULT_H2H_RECENT_WINDOW,
            top_n: DEFAULT_TOP_N,
            log_level: "info".to_string(),
        }
    }
}
