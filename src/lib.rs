//! bchtip: exchange-rate acquisition and wallet core for a BCH tip
//! voucher service.
//!
//! A wallet funds printable tip vouchers, each redeemable for a balance
//! once activated. Everything monetary the service displays hangs off one
//! subsystem: a multi-provider, cache-backed, fallback-chained rate
//! resolver that must produce a usable USD rate even when every external
//! API is down.
//!
//! # Architecture
//!
//! - **models**: wallets, tips, currencies, and the forex table
//! - **error**: custom error types for precise error handling
//! - **config**: configuration management from environment variables
//! - **cache**: injectable shared cache with per-entry TTL
//! - **rates**: rate providers, the priority-chain resolver, forex builder
//! - **fees**: payment-node fee estimation
//! - **metrics**: counters for HTTP, cache, and fallback behavior

pub mod cache;
pub mod config;
pub mod error;
pub mod fees;
pub mod metrics;
pub mod models;
pub mod rates;

pub use cache::{Cache, CacheValue, MemoryCache};
pub use config::Config;
pub use error::{ConfigError, FetchError, UpstreamError};
pub use fees::{BitcoindRpc, FeeEstimator, NodeRpc, FEE_CACHE_KEY};
pub use metrics::{Metrics, MetricsSummary};
pub use models::{Currency, ForexTable, Rate, Tip, Wallet};
pub use rates::{
    BitpayProvider, BitstampProvider, BtceProvider, CoinbaseProvider, ForexService,
    IndexApiProvider, IndexBackupProvider, RateProvider, RateResolver, FALLBACK_RATE,
    FOREX_CACHE_KEY,
};
