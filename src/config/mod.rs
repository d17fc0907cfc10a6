use std::path::PathBuf;
use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::{load_config, resolve_config, CONFIG_ENV_VAR};
pub use validator::validate_config;

pub const AGG_TRADES_ENDPOINT: &str = "https://api.binance.com/api/v3/aggTrades";

/// Largest page the aggTrades endpoint will serve.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// 6000 total request weight per minute / 4 weight per aggTrades call.
pub const DEFAULT_MAX_REQUESTS_PER_WINDOW: u32 = 1499;

/// Slightly longer than a minute to absorb clock and response jitter.
pub const DEFAULT_BUDGET_WINDOW: Duration = Duration::from_secs(61);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

pub const DEFAULT_SYMBOLS: &[&str] = &["ETHUSDC", "ETHUSDT", "ETHBTC"];

/// Everything a harvest run needs: where to fetch from, what to fetch, how fast, and where to write.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    pub endpoint: String,
    pub symbols: Vec<String>,
    pub page_size: u32,
    pub max_requests_per_window: u32,
    pub budget_window: Duration,
    pub request_timeout: Duration,
    pub retry_backoff: Duration,
    /// First sequence id requested for every symbol.
    pub start_id: i64,
    pub output_root: PathBuf,
    pub max_concurrent_symbols: usize,
}

impl HarvestConfig {
    pub fn builtin() -> Self {
        let symbols: Vec<String> = DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect();
        let max_concurrent_symbols = symbols.len();

        Self {
            endpoint: AGG_TRADES_ENDPOINT.to_string(),
            symbols,
            page_size: MAX_PAGE_SIZE,
            max_requests_per_window: DEFAULT_MAX_REQUESTS_PER_WINDOW,
            budget_window: DEFAULT_BUDGET_WINDOW,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            start_id: 0,
            output_root: PathBuf::from("."),
            max_concurrent_symbols,
        }
    }
}

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
