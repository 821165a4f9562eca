//! Configuration management for the rate subsystem.
//!
//! All settings come from environment variables with sensible defaults,
//! so the crate works out of the box against the live provider endpoints
//! while tests point individual providers at mock servers.

use crate::error::{ConfigError, ConfigResult};
use std::env;

/// Configuration for the rate subsystem.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the price index API (primary and backup providers,
    /// forex per-currency prices)
    pub index_api_base: String,

    /// Bitpay rates array endpoint
    pub bitpay_rates_url: String,

    /// Bitstamp BCH/USD ticker endpoint
    pub bitstamp_ticker_url: String,

    /// Coinbase buy-price endpoint (provider exists but is not chained)
    pub coinbase_price_url: String,

    /// BTC-e ticker endpoint (provider exists but is not chained)
    pub btce_ticker_url: String,

    /// Payment node JSON-RPC endpoint for fee estimation
    pub node_rpc_url: String,

    /// Outbound HTTP timeout in milliseconds, uniform across providers
    /// (default: 4000)
    pub request_timeout_ms: u64,

    /// Cache TTL for rates, forex tables, and fee estimates in seconds
    /// (default: 3600)
    pub cache_ttl_secs: u64,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional:
    /// - `INDEX_API_BASE`: price index base URL
    /// - `BITPAY_RATES_URL`, `BITSTAMP_TICKER_URL`, `COINBASE_PRICE_URL`,
    ///   `BTCE_TICKER_URL`: per-provider endpoints
    /// - `NODE_RPC_URL`: payment node JSON-RPC endpoint
    /// - `REQUEST_TIMEOUT_MS`: outbound timeout in milliseconds (default: 4000)
    /// - `CACHE_TTL_SECS`: cache TTL in seconds (default: 3600)
    /// - `LOG_LEVEL`: logging level (default: "info")
    pub fn from_env() -> ConfigResult<Self> {
        // Load .env if present; ignore if missing
        let _ = dotenvy::dotenv();

        let config = Config {
            index_api_base: Self::env_url("INDEX_API_BASE", "https://index-api.bitcoin.com")?,
            bitpay_rates_url: Self::env_url(
                "BITPAY_RATES_URL",
                "https://www.bitcoin.com/special/rates.json",
            )?,
            bitstamp_ticker_url: Self::env_url(
                "BITSTAMP_TICKER_URL",
                "https://www.bitstamp.net/api/v2/ticker/bchusd/",
            )?,
            coinbase_price_url: Self::env_url(
                "COINBASE_PRICE_URL",
                "https://coinbase.com/api/v1/prices/buy",
            )?,
            btce_ticker_url: Self::env_url(
                "BTCE_TICKER_URL",
                "https://btc-e.com/api/2/btc_usd/ticker",
            )?,
            node_rpc_url: Self::env_url("NODE_RPC_URL", "http://127.0.0.1:8332")?,
            request_timeout_ms: Self::parse_env_u64("REQUEST_TIMEOUT_MS", 4000)?,
            cache_ttl_secs: Self::parse_env_u64("CACHE_TTL_SECS", 3600)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        if config.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                var: "REQUEST_TIMEOUT_MS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        Ok(config)
    }

    /// Read a URL-valued variable with a default, validating the scheme.
    fn env_url(var_name: &str, default: &str) -> ConfigResult<String> {
        let value = env::var(var_name).unwrap_or_else(|_| default.to_string());
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }
        Ok(value)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_api_base: "https://index-api.bitcoin.com".to_string(),
            bitpay_rates_url: "https://www.bitcoin.com/special/rates.json".to_string(),
            bitstamp_ticker_url: "https://www.bitstamp.net/api/v2/ticker/bchusd/".to_string(),
            coinbase_price_url: "https://coinbase.com/api/v1/prices/buy".to_string(),
            btce_ticker_url: "https://btc-e.com/api/2/btc_usd/ticker".to_string(),
            node_rpc_url: "http://127.0.0.1:8332".to_string(),
            request_timeout_ms: 4000,
            cache_ttl_secs: 3600,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    // Helper to set and unset env vars for testing
    struct EnvGuard {
        vars: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.vars.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.request_timeout_ms, 4000);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert!(config.index_api_base.starts_with("https://"));
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        let result = Config::from_env();
        assert!(result.is_ok(), "Config should load with no vars set");

        let config = result.unwrap();
        assert_eq!(config.index_api_base, "https://index-api.bitcoin.com");
        assert_eq!(config.request_timeout_ms, 4000);
    }

    #[test]
    #[serial]
    fn test_config_from_env_overrides() {
        let mut guard = EnvGuard::new();
        guard.set("INDEX_API_BASE", "http://localhost:9000");
        guard.set("REQUEST_TIMEOUT_MS", "2500");
        guard.set("CACHE_TTL_SECS", "120");

        let config = Config::from_env().unwrap();
        assert_eq!(config.index_api_base, "http://localhost:9000");
        assert_eq!(config.request_timeout_ms, 2500);
        assert_eq!(config.cache_ttl_secs, 120);
    }

    #[test]
    #[serial]
    fn test_config_invalid_url() {
        let mut guard = EnvGuard::new();
        guard.set("INDEX_API_BASE", "not-a-url");

        let result = Config::from_env();
        assert!(result.is_err());
        if let Err(ConfigError::InvalidValue { var, .. }) = result {
            assert_eq!(var, "INDEX_API_BASE");
        }
    }

    #[test]
    #[serial]
    fn test_config_zero_timeout() {
        let mut guard = EnvGuard::new();
        guard.set("REQUEST_TIMEOUT_MS", "0");

        let result = Config::from_env();
        assert!(result.is_err());
        match result {
            Err(ConfigError::InvalidValue { var, .. }) => {
                assert_eq!(var, "REQUEST_TIMEOUT_MS");
            }
            other => panic!("Expected InvalidValue error, got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_parse_env_u64() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_U64", "42");

        let result = Config::parse_env_u64("TEST_U64", 10);
        assert_eq!(result.unwrap(), 42);

        let result = Config::parse_env_u64("NONEXISTENT", 10);
        assert_eq!(result.unwrap(), 10);
    }

    #[test]
    #[serial]
    fn test_parse_env_u64_invalid() {
        let mut guard = EnvGuard::new();
        guard.set("TEST_U64_INVALID", "not-a-number");

        let result = Config::parse_env_u64("TEST_U64_INVALID", 10);
        assert!(result.is_err());
    }
}
