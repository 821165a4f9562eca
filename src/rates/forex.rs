//! Multi-currency forex table builder.
//!
//! Builds the USD/EUR/GBP/JPY conversion table from the index API's
//! per-currency price endpoint. The table is only ever rebuilt wholesale:
//! consumers need a self-consistent snapshot, so any failure mid-build
//! discards the in-progress table and yields the static default instead
//! of mixing fresh and stale entries.

use crate::cache::{Cache, CacheValue};
use crate::config::Config;
use crate::error::{FetchError, FetchResult};
use crate::metrics::Metrics;
use crate::models::{round_to, Currency, ForexTable};
use crate::rates::provider::{json_number, map_ureq_error};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache key for the completed table.
pub const FOREX_CACHE_KEY: &str = "forex.table";

const USER_AGENT: &str = "dev";

/// Builds and caches the forex conversion table.
pub struct ForexService {
    base_url: String,
    agent: ureq::Agent,
    cache: Arc<dyn Cache>,
    ttl: Duration,
    metrics: Metrics,
}

impl ForexService {
    pub fn new(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build();

        Self {
            base_url: config.index_api_base.trim_end_matches('/').to_string(),
            agent,
            cache,
            ttl: Duration::from_secs(config.cache_ttl_secs),
            metrics,
        }
    }

    /// Create a service against an explicit base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        let config = Config {
            index_api_base: base_url.into(),
            ..Config::default()
        };
        Self::new(&config, cache, Metrics::new())
    }

    /// Current conversion table.
    ///
    /// Serves the cached table unless `force` is set or the entry has
    /// expired. A complete rebuild is cached for the configured TTL; a
    /// failed rebuild returns [`ForexTable::default`] without caching, so
    /// the next call retries the live source.
    pub fn rates(&self, force: bool) -> ForexTable {
        if !force {
            if let Some(table) = self
                .cache
                .get(FOREX_CACHE_KEY)
                .and_then(|v| v.as_forex().cloned())
            {
                self.metrics.record_cache_hit();
                return table;
            }
            self.metrics.record_cache_miss();
        }

        match self.build_table() {
            Ok(table) => {
                self.cache
                    .set(FOREX_CACHE_KEY, CacheValue::Forex(table.clone()), self.ttl);
                table
            }
            Err(e) => {
                tracing::warn!(error = %e, "forex rebuild failed, using default table");
                self.metrics.record_fallback();
                ForexTable::default()
            }
        }
    }

    /// Fetch every currency in order and assemble the table.
    ///
    /// USD comes first and its whole-dollar price is the reference for the
    /// other multipliers. EUR and GBP are rounded to two decimal places,
    /// JPY to a whole unit.
    fn build_table(&self) -> FetchResult<ForexTable> {
        let mut rates = BTreeMap::new();
        let mut usd_rate = 1.0f64;

        for currency in Currency::ALL {
            let url = format!("{}/api/v0/cash/price/{}", self.base_url, currency.code());
            let body = self.get_json(&url)?;
            let price = body
                .get("price")
                .and_then(json_number)
                .ok_or(FetchError::Field("price"))?;
            // Same normalization as the rate providers: cents to whole dollars
            let whole = (price / 100.0).trunc();

            match currency {
                Currency::Usd => {
                    if whole <= 0.0 {
                        return Err(FetchError::Field("price"));
                    }
                    usd_rate = whole;
                    rates.insert(currency, 1.0);
                }
                Currency::Jpy => {
                    rates.insert(currency, (whole / usd_rate).round());
                }
                _ => {
                    rates.insert(currency, round_to(whole / usd_rate, 2));
                }
            }
        }

        Ok(ForexTable::from_rates(rates))
    }

    fn get_json(&self, url: &str) -> FetchResult<Value> {
        let start = Instant::now();

        let result = self
            .agent
            .get(url)
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
