//! Network fee estimation via the payment node.
//!
//! Unlike the rate providers, fee estimation has a single upstream and no
//! fallback chain: an RPC failure propagates to the caller as an
//! [`UpstreamError`], and callers that need resilience handle it
//! themselves.

use crate::cache::{Cache, CacheValue};
use crate::config::Config;
use crate::error::{UpstreamError, UpstreamResult};
use crate::metrics::Metrics;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache key for the fee estimate.
pub const FEE_CACHE_KEY: &str = "fee.estimate";

/// Capability exposed by the payment node: estimate the current network
/// fee rate.
pub trait NodeRpc: Send + Sync {
    fn estimate_fee(&self) -> UpstreamResult<Decimal>;
}

/// Caches the node's fee estimate for the configured TTL.
pub struct FeeEstimator {
    rpc: Arc<dyn NodeRpc>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
    metrics: Metrics,
}

impl FeeEstimator {
    pub fn new(rpc: Arc<dyn NodeRpc>, cache: Arc<dyn Cache>, config: &Config) -> Self {
        Self {
            rpc,
            cache,
            ttl: Duration::from_secs(config.cache_ttl_secs),
            metrics: Metrics::new(),
        }
    }

    /// Current estimated fee rate, from cache unless `force` is set.
    pub fn estimate(&self, force: bool) -> UpstreamResult<Decimal> {
        if !force {
            if let Some(fee) = self.cache.get(FEE_CACHE_KEY).and_then(|v| v.as_fee()) {
                self.metrics.record_cache_hit();
                return Ok(fee);
            }
            self.metrics.record_cache_miss();
        }

        let fee = self.rpc.estimate_fee()?;
        self.cache.set(FEE_CACHE_KEY, CacheValue::Fee(fee), self.ttl);
        tracing::debug!(%fee, "fee estimate refreshed");
        Ok(fee)
    }
}

/// Minimal JSON-RPC client for the payment node's `estimatefee` call.
pub struct BitcoindRpc {
    url: String,
    agent: ureq::Agent,
}

impl BitcoindRpc {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build();

        Self {
            url: config.node_rpc_url.clone(),
            agent,
        }
    }

    /// Create a client against an explicit endpoint (useful for testing).
    #[doc(hidden)]
    pub fn with_url(url: impl Into<String>) -> Self {
        let config = Config {
            node_rpc_url: url.into(),
            ..Config::default()
        };
        Self::new(&config)
    }

    fn call(&self, method: &str) -> UpstreamResult<Value> {
        let request = json!({
            "jsonrpc": "1.0",
            "id": "bchtip",
            "method": method,
            "params": [],
        });

        let start = Instant::now();
        let response = self
            .agent
            .post(&self.url)
            .send_json(request)
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
        tracing::debug!(method, elapsed_ms = start.elapsed().as_millis() as u64, "node rpc call");

        let body = response
            .into_string()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
        let envelope: Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        if !envelope.get("error").map(Value::is_null).unwrap_or(true) {
            return Err(UpstreamError::Malformed(envelope["error"].to_string()));
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| UpstreamError::Malformed("missing result".to_string()))
    }
}

impl NodeRpc for BitcoindRpc {
    fn estimate_fee(&self) -> UpstreamResult<Decimal> {
        let result = self.call("estimatefee")?;
        serde_json::from_value(result).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}
