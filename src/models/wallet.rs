//! Wallet model: a funded batch of printable tip vouchers.

use crate::models::{round_to, Currency, ForexTable};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fallback per-kB fee when the wallet has no recorded fee.
const DEFAULT_FEE: f64 = 0.00001;

/// A wallet funding a batch of tips.
///
/// Balances are stored in satoshis; `rate` is the price of 1 BCH in the
/// wallet's target currency captured at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Wallet {
    /// Storage identifier
    pub id: i64,

    /// Secret wallet key
    pub key: String,

    /// Creation time
    pub ctime: DateTime<Utc>,

    /// Activation time (paid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atime: Option<DateTime<Utc>>,

    /// Creator IP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Creator user agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ua: Option<String>,

    /// Funding address (pay to)
    pub bcaddr: String,

    /// Address the funding payment came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcaddr_from: Option<String>,

    /// Target country code (AU, US, RU); none for universal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    /// Amount of every tip in the target currency, e.g. $2
    pub divide_by: Decimal,

    /// Target currency for tip amounts
    pub divide_currency: Currency,

    /// How many tips to print
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i16>,

    /// Front print template
    pub template: String,

    /// Back print template
    pub template_back: String,

    /// Language for the printed tips
    pub target_language: String,

    /// Custom message printed on the tips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Donation fee in percent
    pub price: Decimal,

    /// Hashtag for statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtag: Option<String>,

    /// Order print and post?
    pub print_and_post: bool,

    /// Price of 1 BCH in the target currency at creation
    pub rate: Decimal,

    /// Balance in satoshis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,

    /// Amount invoiced to the creator, in satoshis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<i64>,

    /// Whether the wallet has been paid for
    pub activated: bool,

    /// Expiration in days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i32>,

    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Network fee per kB captured for this wallet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            id: 0,
            key: String::new(),
            ctime: Utc::now(),
            atime: None,
            ip: None,
            ua: None,
            bcaddr: String::new(),
            bcaddr_from: None,
            audience: None,
            divide_by: Decimal::ZERO,
            divide_currency: Currency::Usd,
            quantity: None,
            template: "001-original.odt".to_string(),
            template_back: "0000-default.odt".to_string(),
            target_language: "en".to_string(),
            message: None,
            price: Decimal::ZERO,
            hashtag: None,
            print_and_post: false,
            rate: Decimal::ZERO,
            balance: None,
            invoice: None,
            activated: false,
            expiration: None,
            email: None,
            fee: None,
        }
    }
}

impl Wallet {
    /// Balance in hundredths of a bit (1e3 satoshi units).
    pub fn balance_nbtc(&self) -> f64 {
        self.balance.unwrap_or(0) as f64 / 100.0
    }

    /// Balance in millibitcoin.
    pub fn balance_mbtc(&self) -> f64 {
        self.balance.unwrap_or(0) as f64 / 100_000.0
    }

    /// Balance in whole coins, or `None` when the wallet is unfunded.
    pub fn balance_btc(&self) -> Option<f64> {
        match self.balance {
            Some(sats) if sats != 0 => Some(sats as f64 / 100_000_000.0),
            _ => None,
        }
    }

    /// Recorded fee as a float, falling back to the network minimum.
    pub fn fee_float(&self) -> f64 {
        self.fee
            .and_then(|f| f.to_f64())
            .filter(|f| *f != 0.0)
            .unwrap_or(DEFAULT_FEE)
    }

    /// Transaction fee budget: three times the recorded fee.
    pub fn txfee_float(&self) -> f64 {
        round_to(self.fee_float() * 3.0, 6)
    }

    /// Invoiced amount in whole coins.
    pub fn invoice_btc(&self) -> Option<f64> {
        self.invoice.map(|sats| sats as f64 / 100_000_000.0)
    }

    /// Payment URI for funding this wallet.
    pub fn bcaddr_uri(&self) -> Option<String> {
        self.invoice_btc()
            .map(|amount| format!("{}?amount={}&label=bchtip", self.bcaddr, amount))
    }

    /// Sign of the wallet's target currency.
    pub fn divide_currency_sign(&self) -> &'static str {
        self.divide_currency.sign()
    }

    /// Node account label: storage id plus the key's last six characters.
    pub fn account(&self) -> String {
        let tail_start = self.key.len().saturating_sub(6);
        format!("{}_{}", self.id, &self.key[tail_start..])
    }

    /// Creation-time rate converted into the wallet's target currency,
    /// truncated to a whole fiat unit.
    pub fn rate_fiat(&self, forex: &ForexTable) -> i64 {
        let rate = self.rate.to_f64().unwrap_or(0.0);
        (rate * forex.multiplier(self.divide_currency)).trunc() as i64
    }

    pub fn absolute_url(&self) -> String {
        format!("/w/{}/", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_conversions() {
        let wallet = Wallet {
            balance: Some(150_000_000),
            ..Wallet::default()
        };
        assert_eq!(wallet.balance_btc(), Some(1.5));
        assert_eq!(wallet.balance_mbtc(), 1500.0);
        assert_eq!(wallet.balance_nbtc(), 1_500_000.0);
    }

    #[test]
    fn test_balance_btc_unfunded() {
        let wallet = Wallet::default();
        assert_eq!(wallet.balance_btc(), None);

        let zeroed = Wallet {
            balance: Some(0),
            ..Wallet::default()
        };
        assert_eq!(zeroed.balance_btc(), None);
    }

    #[test]
    fn test_fee_defaults() {
        let wallet = Wallet::default();
        assert_eq!(wallet.fee_float(), 0.00001);
        assert_eq!(wallet.txfee_float(), 0.00003);
    }

    #[test]
    fn test_fee_recorded() {
        let wallet = Wallet {
            fee: Some(Decimal::new(21, 6)),
            ..Wallet::default()
        };
        assert_eq!(wallet.fee_float(), 0.000021);
        assert_eq!(wallet.txfee_float(), 0.000063);
    }

    #[test]
    fn test_bcaddr_uri() {
        let wallet = Wallet {
            bcaddr: "bitcoincash:qtestaddr".to_string(),
            invoice: Some(200_000_000),
            ..Wallet::default()
        };
        assert_eq!(
            wallet.bcaddr_uri().unwrap(),
            "bitcoincash:qtestaddr?amount=2&label=bchtip"
        );

        let unfunded = Wallet::default();
        assert_eq!(unfunded.bcaddr_uri(), None);
    }

    #[test]
    fn test_account_label() {
        let wallet = Wallet {
            id: 42,
            key: "abcdef0123456789".to_string(),
            ..Wallet::default()
        };
        assert_eq!(wallet.account(), "42_456789");
    }

    #[test]
    fn test_account_label_short_key() {
        let wallet = Wallet {
            id: 7,
            key: "abc".to_string(),
            ..Wallet::default()
        };
        assert_eq!(wallet.account(), "7_abc");
    }

    #[test]
    fn test_rate_fiat() {
        let wallet = Wallet {
            rate: Decimal::new(43150, 2),
            divide_currency: Currency::Eur,
            ..Wallet::default()
        };
        // 431.50 * 0.88 = 379.72, truncated to 379
        assert_eq!(wallet.rate_fiat(&ForexTable::default()), 379);

        let usd = Wallet {
            rate: Decimal::new(43150, 2),
            ..Wallet::default()
        };
        assert_eq!(usd.rate_fiat(&ForexTable::default()), 431);
    }

    #[test]
    fn test_absolute_url() {
        let wallet = Wallet {
            key: "walletkey".to_string(),
            ..Wallet::default()
        };
        assert_eq!(wallet.absolute_url(), "/w/walletkey/");
    }
}
