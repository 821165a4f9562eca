//! Tip model: a single printable voucher redeemable for its balance.

use crate::models::{round_to, Currency, ForexTable, Rate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tip voucher, funded by a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Tip {
    /// Secret tip key, printed on the voucher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctime: Option<DateTime<Utc>>,

    /// Activation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atime: Option<DateTime<Utc>>,

    /// Expiration time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etime: Option<DateTime<Utc>>,

    /// Redeemer IP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Redeemer user agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ua: Option<String>,

    /// Balance in satoshis
    pub balance: i64,

    /// Short printed identifier
    pub miniid: String,

    /// Thank-you comment left by the redeemer
    pub comment: String,

    /// When the comment was left
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_time: Option<DateTime<Utc>>,

    pub activated: bool,

    pub expired: bool,

    /// Address the tip was swept to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcaddr: Option<String>,

    /// Sweep transaction id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,

    /// Tip page visit counter
    pub times: i32,
}

impl Tip {
    /// Public URL of the tip page.
    pub fn absolute_url(&self, base_url: &str) -> String {
        format!("{}/{}/", base_url, self.key.as_deref().unwrap_or(""))
    }

    /// Balance in hundredths of a bit (1e3 satoshi units).
    pub fn balance_nbtc(&self) -> f64 {
        self.balance as f64 / 100.0
    }

    /// Balance in millibitcoin.
    pub fn balance_mbtc(&self) -> f64 {
        self.balance as f64 / 100_000.0
    }

    /// Balance in whole coins.
    pub fn balance_btc(&self) -> f64 {
        self.balance as f64 / 100_000_000.0
    }

    /// Balance in USD at the given rate, rounded to cents.
    pub fn balance_usd(&self, usd_rate: Rate) -> f64 {
        round_to(self.balance_btc() * usd_rate as f64, 2)
    }

    /// Balance in EUR at the given rate, rounded to cents.
    pub fn balance_eur(&self, eur_rate: Rate) -> f64 {
        round_to(self.balance_btc() * eur_rate as f64, 2)
    }

    /// Balance in the funding wallet's target currency, rounded to two
    /// decimal places.
    pub fn balance_fiat(&self, usd_rate: Rate, forex: &ForexTable, currency: Currency) -> f64 {
        round_to(self.balance_usd(usd_rate) * forex.multiplier(currency), 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_tip() -> Tip {
        Tip {
            key: Some("tipkey".to_string()),
            balance: 50_000_000, // 0.5 coins
            miniid: "a1b2".to_string(),
            ..Tip::default()
        }
    }

    #[test]
    fn test_balance_conversions() {
        let tip = funded_tip();
        assert_eq!(tip.balance_btc(), 0.5);
        assert_eq!(tip.balance_mbtc(), 500.0);
        assert_eq!(tip.balance_nbtc(), 500_000.0);
    }

    #[test]
    fn test_balance_usd() {
        let tip = funded_tip();
        assert_eq!(tip.balance_usd(431), 215.5);
    }

    #[test]
    fn test_balance_fiat_rounding() {
        let tip = funded_tip();
        let forex = ForexTable::default();
        // 0.5 * 431 = 215.50 USD; * 0.88 = 189.64 EUR
        assert_eq!(tip.balance_fiat(431, &forex, Currency::Eur), 189.64);
        // USD multiplier is exactly 1
        assert_eq!(tip.balance_fiat(431, &forex, Currency::Usd), 215.5);
    }

    #[test]
    fn test_absolute_url() {
        let tip = funded_tip();
        assert_eq!(
            tip.absolute_url("https://tips.example.com"),
            "https://tips.example.com/tipkey/"
        );
    }
}
