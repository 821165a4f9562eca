//! Rate providers: one per external price source.
//!
//! Every provider implements the same contract: consult the cache unless
//! forced, issue one bounded outbound GET, extract and normalize the
//! provider-specific field, and write the result back with a TTL. All
//! failure modes (timeout, connection error, malformed body, missing
//! field) are logged and collapse into an absent rate; a provider never
//! raises to its caller and never blocks past its timeout.

use crate::cache::{Cache, CacheValue};
use crate::config::Config;
use crate::error::{FetchError, FetchResult};
use crate::metrics::Metrics;
use crate::models::Rate;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sent on every provider request; the index API rejects empty agents.
const USER_AGENT: &str = "dev";

/// Cache keys, one per provider.
pub mod keys {
    pub const INDEX: &str = "rate.index";
    pub const INDEX_BACKUP: &str = "rate.index_backup";
    pub const BITPAY: &str = "rate.bitpay";
    pub const BITSTAMP: &str = "rate.bitstamp";
    pub const COINBASE: &str = "rate.coinbase";
    pub const BTCE: &str = "rate.btce";
}

/// A single external rate source.
pub trait RateProvider: Send + Sync {
    /// Short provider name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Return the current rate, from cache unless `force` is set.
    ///
    /// `None` means the source could not produce a usable rate; the
    /// underlying cause is logged, never propagated.
    fn fetch(&self, force: bool) -> Option<Rate>;
}

/// Shared plumbing for the HTTP-backed providers: cache discipline,
/// bounded GET, JSON decoding, write-back, and diagnostics.
pub(crate) struct ProviderCore {
    name: &'static str,
    cache_key: &'static str,
    url: String,
    agent: ureq::Agent,
    cache: Arc<dyn Cache>,
    ttl: Duration,
    metrics: Metrics,
}

impl ProviderCore {
    fn new(
        name: &'static str,
        cache_key: &'static str,
        url: String,
        config: &Config,
        cache: Arc<dyn Cache>,
        metrics: Metrics,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build();

        Self {
            name,
            cache_key,
            url,
            agent,
            cache,
            ttl: Duration::from_secs(config.cache_ttl_secs),
            metrics,
        }
    }

    /// Test constructor with an explicit endpoint.
    fn with_url(
        name: &'static str,
        cache_key: &'static str,
        url: String,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self::new(name, cache_key, url, &Config::default(), cache, Metrics::new())
    }

    /// Run the full provider contract around a field-extraction function.
    fn fetch_with(&self, force: bool, extract: impl Fn(&Value) -> FetchResult<Rate>) -> Option<Rate> {
        if !force {
            if let Some(rate) = self.cache.get(self.cache_key).and_then(|v| v.as_rate()) {
                self.metrics.record_cache_hit();
                return Some(rate);
            }
            self.metrics.record_cache_miss();
        }

        match self.get_json().and_then(|body| extract(&body)) {
            Ok(rate) if rate > 0 => {
                self.cache
                    .set(self.cache_key, CacheValue::Rate(rate), self.ttl);
                tracing::debug!(provider = self.name, rate, "fetched rate");
                Some(rate)
            }
            Ok(_) => {
                tracing::warn!(provider = self.name, "provider returned a zero rate");
                None
            }
            Err(e) => {
                tracing::warn!(provider = self.name, error = %e, "rate fetch failed");
                None
            }
        }
    }

    /// Execute one bounded GET and decode the body as JSON.
    fn get_json(&self) -> FetchResult<Value> {
        let start = Instant::now();

        let result = self
            .agent
            .get(&self.url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(map_ureq_error);

        let duration = start.elapsed();
        if result.is_err() {
            self.metrics.record_http_error();
        }
        self.metrics.record_http_request(duration);

        let body = result?
            .into_string()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        serde_json::from_str(&body).map_err(FetchError::Json)
    }
}

/// Map a ureq error to a FetchError.
pub(crate) fn map_ureq_error(error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::Status(code, response) => {
            let message = response
                .into_string()
                .unwrap_or_else(|_| "Unknown error".to_string());
            FetchError::Status {
                status: code,
                message,
            }
        }
        ureq::Error::Transport(transport) => {
            if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                FetchError::Http("Connection failed".to_string())
            } else if transport.kind() == ureq::ErrorKind::Io {
                FetchError::Timeout
            } else {
                FetchError::Http(transport.to_string())
            }
        }
    }
}

/// Read a JSON value as a number, accepting numeric strings as well
/// (Bitstamp reports its prices as strings).
pub(crate) fn json_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .filter(|n| n.is_finite())
}

/// Extract a `price` reported in cents and floor it to whole dollars.
fn extract_price_cents(body: &Value) -> FetchResult<Rate> {
    let price = body
        .get("price")
        .and_then(json_number)
        .ok_or(FetchError::Field("price"))?;
    Ok((price / 100.0) as Rate)
}

// ========================= Index API (primary) =========================

/// Primary provider: the price index pulse endpoint.
pub struct IndexApiProvider {
    core: ProviderCore,
}

impl IndexApiProvider {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        let url = format!(
            "{}/api/v0/cash/pulse",
            config.index_api_base.trim_end_matches('/')
        );
        Self {
            core: ProviderCore::new("index", keys::INDEX, url, config, cache, metrics),
        }
    }

    /// Create a provider against an explicit endpoint (useful for testing).
    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        Self {
            core: ProviderCore::with_url("index", keys::INDEX, url.into(), cache),
        }
    }
}

impl RateProvider for IndexApiProvider {
    fn name(&self) -> &'static str {
        "index"
    }

    fn fetch(&self, force: bool) -> Option<Rate> {
        self.core.fetch_with(force, extract_price_cents)
    }
}

// ========================= Index API (backup) =========================

/// Backup provider: the legacy per-currency price endpoint, USD only.
/// Same normalization as the primary, but its own cache key so a backup
/// hit is never mistaken for a primary one.
pub struct IndexBackupProvider {
    core: ProviderCore,
}

impl IndexBackupProvider {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        let url = format!(
            "{}/api/v0/cash/price/usd/",
            config.index_api_base.trim_end_matches('/')
        );
        Self {
            core: ProviderCore::new("index_backup", keys::INDEX_BACKUP, url, config, cache, metrics),
        }
    }

    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        Self {
            core: ProviderCore::with_url("index_backup", keys::INDEX_BACKUP, url.into(), cache),
        }
    }
}

impl RateProvider for IndexBackupProvider {
    fn name(&self) -> &'static str {
        "index_backup"
    }

    fn fetch(&self, force: bool) -> Option<Rate> {
        self.core.fetch_with(force, extract_price_cents)
    }
}

// ========================= Bitpay =========================

/// Bitpay publishes an array of per-currency rates; the usable figure is
/// the ratio of the third entry's rate to the second's.
pub struct BitpayProvider {
    core: ProviderCore,
}

impl BitpayProvider {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        Self {
            core: ProviderCore::new(
                "bitpay",
                keys::BITPAY,
                config.bitpay_rates_url.clone(),
                config,
                cache,
                metrics,
            ),
        }
    }

    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        Self {
            core: ProviderCore::with_url("bitpay", keys::BITPAY, url.into(), cache),
        }
    }

    fn extract(body: &Value) -> FetchResult<Rate> {
        let rates = body.as_array().ok_or(FetchError::Field("rates array"))?;
        let numerator = rates
            .get(2)
            .and_then(|r| r.get("rate"))
            .and_then(json_number)
            .ok_or(FetchError::Field("rates[2].rate"))?;
        let denominator = rates
            .get(1)
            .and_then(|r| r.get("rate"))
            .and_then(json_number)
            .ok_or(FetchError::Field("rates[1].rate"))?;
        if denominator == 0.0 {
            return Err(FetchError::Field("rates[1].rate"));
        }
        Ok((numerator / denominator) as Rate)
    }
}

impl RateProvider for BitpayProvider {
    fn name(&self) -> &'static str {
        "bitpay"
    }

    fn fetch(&self, force: bool) -> Option<Rate> {
        self.core.fetch_with(force, Self::extract)
    }
}

// ========================= Bitstamp =========================

/// Bitstamp BCH/USD ticker. Uses the last traded price, not a high/low
/// midpoint.
pub struct BitstampProvider {
    core: ProviderCore,
}

impl BitstampProvider {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        Self {
            core: ProviderCore::new(
                "bitstamp",
                keys::BITSTAMP,
                config.bitstamp_ticker_url.clone(),
                config,
                cache,
                metrics,
            ),
        }
    }

    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        Self {
            core: ProviderCore::with_url("bitstamp", keys::BITSTAMP, url.into(), cache),
        }
    }

    fn extract(body: &Value) -> FetchResult<Rate> {
        let last = body
            .get("last")
            .and_then(json_number)
            .ok_or(FetchError::Field("last"))?;
        Ok(last as Rate)
    }
}

impl RateProvider for BitstampProvider {
    fn name(&self) -> &'static str {
        "bitstamp"
    }

    fn fetch(&self, force: bool) -> Option<Rate> {
        self.core.fetch_with(force, Self::extract)
    }
}

// ========================= Coinbase (not chained) =========================

/// Coinbase buy price. Kept out of the default resolver chain.
pub struct CoinbaseProvider {
    core: ProviderCore,
}

impl CoinbaseProvider {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        Self {
            core: ProviderCore::new(
                "coinbase",
                keys::COINBASE,
                config.coinbase_price_url.clone(),
                config,
                cache,
                metrics,
            ),
        }
    }

    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        Self {
            core: ProviderCore::with_url("coinbase", keys::COINBASE, url.into(), cache),
        }
    }

    fn extract(body: &Value) -> FetchResult<Rate> {
        let amount = body
            .get("total")
            .and_then(|t| t.get("amount"))
            .and_then(json_number)
            .ok_or(FetchError::Field("total.amount"))?;
        Ok(amount as Rate)
    }
}

impl RateProvider for CoinbaseProvider {
    fn name(&self) -> &'static str {
        "coinbase"
    }

    fn fetch(&self, force: bool) -> Option<Rate> {
        self.core.fetch_with(force, Self::extract)
    }
}

// ========================= BTC-e (not chained) =========================

/// BTC-e ticker average. Kept out of the default resolver chain.
pub struct BtceProvider {
    core: ProviderCore,
}

impl BtceProvider {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        Self {
            core: ProviderCore::new(
                "btce",
                keys::BTCE,
                config.btce_ticker_url.clone(),
                config,
                cache,
                metrics,
            ),
        }
    }

    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        Self {
            core: ProviderCore::with_url("btce", keys::BTCE, url.into(), cache),
        }
    }

    fn extract(body: &Value) -> FetchResult<Rate> {
        let avg = body
            .get("ticker")
            .and_then(|t| t.get("avg"))
            .and_then(json_number)
            .ok_or(FetchError::Field("ticker.avg"))?;
        Ok(avg as Rate)
    }
}

impl RateProvider for BtceProvider {
    fn name(&self) -> &'static str {
        "btce"
    }

    fn fetch(&self, force: bool) -> Option<Rate> {
        self.core.fetch_with(force, Self::extract)
    }
}
