//! Exchange-rate acquisition: providers, resolver, and forex table.

pub mod forex;
pub mod provider;
pub mod resolver;

pub use forex::{ForexService, FOREX_CACHE_KEY};
pub use provider::{
    keys, BitpayProvider, BitstampProvider, BtceProvider, CoinbaseProvider, IndexApiProvider,
    IndexBackupProvider, RateProvider,
};
pub use resolver::{RateResolver, FALLBACK_RATE};
