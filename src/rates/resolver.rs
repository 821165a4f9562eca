//! Fixed-priority rate resolution across providers.

use crate::cache::Cache;
use crate::config::Config;
use crate::metrics::Metrics;
use crate::models::{Currency, ForexTable, Rate};
use crate::rates::provider::{
    BitpayProvider, BitstampProvider, IndexApiProvider, IndexBackupProvider, RateProvider,
};
use std::sync::Arc;

/// Conspicuous sentinel returned when every provider has failed.
/// Deliberately unrealistic so a broken pipeline is visible at a glance.
pub const FALLBACK_RATE: Rate = 500;

/// Produces "the" current USD rate for all downstream consumers.
///
/// Providers are tried strictly in order, short-circuiting on the first
/// success; each link runs its own cache check. With every provider down
/// the resolver yields [`FALLBACK_RATE`], a valid (if degraded) value
/// rather than an error.
pub struct RateResolver {
    providers: Vec<Arc<dyn RateProvider>>,
    metrics: Metrics,
}

impl RateResolver {
    /// Build a resolver over an explicit provider chain.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self {
            providers,
            metrics: Metrics::new(),
        }
    }

    /// Build the default chain: primary index, backup index, Bitpay,
    /// Bitstamp. Coinbase and BTC-e providers exist but are not chained.
    pub fn from_config(config: &Config, cache: Arc<dyn Cache>, metrics: Metrics) -> Self {
        let providers: Vec<Arc<dyn RateProvider>> = vec![
            Arc::new(IndexApiProvider::new(config, cache.clone(), metrics.clone())),
            Arc::new(IndexBackupProvider::new(config, cache.clone(), metrics.clone())),
            Arc::new(BitpayProvider::new(config, cache.clone(), metrics.clone())),
            Arc::new(BitstampProvider::new(config, cache, metrics.clone())),
        ];
        Self { providers, metrics }
    }

    /// Current USD rate: first provider to answer wins.
    pub fn avg_rate(&self) -> Rate {
        for provider in &self.providers {
            if let Some(rate) = provider.fetch(false) {
                tracing::debug!(provider = provider.name(), rate, "rate resolved");
                return rate;
            }
        }

        tracing::warn!(
            fallback = FALLBACK_RATE,
            "every rate provider failed, returning fallback"
        );
        self.metrics.record_fallback();
        FALLBACK_RATE
    }

    /// Derived EUR view of [`avg_rate`](Self::avg_rate): the USD rate
    /// scaled by the default EUR multiplier and rounded to a whole unit.
    /// No caching of its own.
    pub fn avg_rate_euro(&self) -> Rate {
        let multiplier = ForexTable::default().multiplier(Currency::Eur);
        (self.avg_rate() as f64 * multiplier).round() as Rate
    }

    /// Shared metrics collector for this resolver and its providers.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
