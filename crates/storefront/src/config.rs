//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use payment::DEFAULT_SUCCESS_RATE;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Storefront configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CART_API_URL`: remote cart service base URL (default: none, runs offline)
/// - `ORDER_API_URL`: order service base URL (default: none, orders kept in memory)
/// - `CART_STORAGE_DIR`: directory for local snapshots (default: `".storefront"`)
/// - `CART_STORAGE_KEY`: key of the cart snapshot (default: `"bharatshaala_cart"`)
/// - `PAYMENT_SUCCESS_RATE`: simulated approval rate (default: `0.9`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `"json"` or `"pretty"` (default: `"pretty"`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cart_api_url: Option<String>,
    pub order_api_url: Option<String>,
    pub storage_dir: PathBuf,
    pub cart_storage_key: String,
    pub payment_success_rate: f64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            cart_api_url: non_empty("CART_API_URL"),
            order_api_url: non_empty("ORDER_API_URL"),
            storage_dir: non_empty("CART_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            cart_storage_key: non_empty("CART_STORAGE_KEY").unwrap_or(defaults.cart_storage_key),
            payment_success_rate: non_empty("PAYMENT_SUCCESS_RATE")
                .and_then(|r| r.parse::<f64>().ok())
                .filter(|r| (0.0..=1.0).contains(r))
                .unwrap_or(defaults.payment_success_rate),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: non_empty("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
        }
    }

    /// True when neither remote service is configured.
    pub fn is_offline(&self) -> bool {
        self.cart_api_url.is_none() && self.order_api_url.is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cart_api_url: None,
            order_api_url: None,
            storage_dir: PathBuf::from(".storefront"),
            cart_storage_key: cart::DEFAULT_CART_KEY.to_string(),
            payment_success_rate: DEFAULT_SUCCESS_RATE,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
