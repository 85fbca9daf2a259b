use crate::error::{AppError, Result};

pub const GIVEAWAY_API_URL: &str = "https://www.gamerpower.com/api/giveaways";
pub const PRODUCTS_URL: &str = "https://data-dawm.github.io/datum/reseller/products.json";

/// Giveaways shown per page; "load more" grows the visible window by the same step.
pub const PAGE_SIZE: usize = 8;

/// Reseller products returned by `/products`.
pub const PRODUCTS_LIMIT: usize = 6;

/// Product titles longer than this are cut and suffixed with "...".
pub const PRODUCT_TITLE_MAX: usize = 20;

/// End dates further out than this are treated as "no deadline" (upstream placeholder values).
pub const MAX_REASONABLE_YEARS: i32 = 2;

/// Keep at most this many rejected-record samples in `FetchStats`.
pub const REJECTION_SAMPLE_MAX: usize = 10;

/// Document store collection names.
pub mod collections {
    pub const VOTES: &str = "votes";
    pub const SAVED_GIVEAWAYS: &str = "savedGiveaways";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
}

#[derive(Debug, Clone)]
pub struct Config {
    pub giveaway_api_url: String,
    pub products_url: String,
    /// Fallback proxy tried once when the direct giveaway fetch fails (CORS_PROXY_URL).
    /// Example: "https://corsproxy.io/"
    pub cors_proxy_url: Option<String>,
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Seconds between background giveaway refreshes (REFRESH_INTERVAL_SECS)
    pub refresh_interval_secs: u64,
    /// Per-request timeout for upstream HTTP calls (HTTP_TIMEOUT_SECS)
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            giveaway_api_url: std::env::var("GIVEAWAY_API_URL")
                .unwrap_or_else(|_| GIVEAWAY_API_URL.to_string()),
            products_url: std::env::var("PRODUCTS_URL")
                .unwrap_or_else(|_| PRODUCTS_URL.to_string()),
            cors_proxy_url: std::env::var("CORS_PROXY_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "giveaways.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            refresh_interval_secs: std::env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse::<u64>()
                .unwrap_or(600)
                .max(1),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30),
        })
    }

    /// Config pointing at the given upstream URLs, used by tests.
    #[cfg(test)]
    pub fn for_urls(giveaway_api_url: &str, products_url: &str) -> Self {
        Self {
            giveaway_api_url: giveaway_api_url.to_string(),
            products_url: products_url.to_string(),
            cors_proxy_url: None,
            log_level: "info".to_string(),
            db_path: ":memory:".to_string(),
            api_port: 0,
            refresh_interval_secs: 600,
            http_timeout_secs: 5,
        }
    }
}
