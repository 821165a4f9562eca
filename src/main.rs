//! Rate pipeline check tool.
//!
//! Loads configuration, builds the resolver stack against the live
//! endpoints, and prints the current rate, forex table, and fee estimate.

use anyhow::Result;
use bchtip::{
    BitcoindRpc, Config, FeeEstimator, ForexService, MemoryCache, Metrics, RateResolver,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        index_api = %config.index_api_base,
        timeout_ms = config.request_timeout_ms,
        ttl_secs = config.cache_ttl_secs,
        "starting rate pipeline check"
    );

    let cache = Arc::new(MemoryCache::new());
    let metrics = Metrics::new();

    let resolver = RateResolver::from_config(&config, cache.clone(), metrics.clone());
    let forex = ForexService::new(&config, cache.clone(), metrics.clone());
    let fees = FeeEstimator::new(Arc::new(BitcoindRpc::new(&config)), cache, &config);

    let rate = resolver.avg_rate();
    info!(rate, euro_rate = resolver.avg_rate_euro(), "resolved rate");

    let table = forex.rates(false);
    for (currency, multiplier) in table.iter() {
        info!(%currency, multiplier, "forex entry");
    }

    // Fee estimation needs a reachable node; a failure here is expected
    // when running the check without one.
    match fees.estimate(false) {
        Ok(fee) => info!(%fee, "estimated network fee"),
        Err(e) => error!(error = %e, "fee estimation failed"),
    }

    let summary = metrics.summary();
    info!(
        http_requests = summary.http_requests_total,
        http_errors = summary.http_errors_total,
        cache_hits = summary.cache_hits_total,
        fallbacks = summary.fallbacks_total,
        "pipeline check complete"
    );

    Ok(())
}
