//! Data models for wallets, tips, and currencies.

mod currency;
mod tip;
mod wallet;

pub use currency::{Currency, ForexTable};
pub use tip::Tip;
pub use wallet::Wallet;

/// Integer USD price of one coin, as produced by a single provider.
pub type Rate = u64;

/// Round `value` to `digits` decimal places.
pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(189.6399999, 2), 189.64);
        assert_eq!(round_to(0.0000314, 6), 0.000031);
        assert_eq!(round_to(109.4, 0), 109.0);
    }
}
