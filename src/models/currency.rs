//! Supported fiat currencies and the forex conversion table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A fiat currency supported for tip display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "JPY")]
    Jpy,
}

impl Currency {
    /// All supported currencies, in the order the forex table is built.
    /// USD must come first: it is the reference rate for the others.
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Jpy];

    /// ISO 4217 currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }

    /// Currency sign used on printed tips.
    pub fn sign(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A self-consistent snapshot of fiat multipliers relative to USD.
///
/// The USD entry is always exactly 1. The table is only ever built
/// wholesale; a partially fetched table is never observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForexTable {
    rates: BTreeMap<Currency, f64>,
}

impl ForexTable {
    /// Build a table from complete (currency, multiplier) pairs.
    pub fn from_rates(rates: BTreeMap<Currency, f64>) -> Self {
        Self { rates }
    }

    /// Multiplier for converting a USD amount into `currency`.
    ///
    /// Unknown entries fall back to 1 (USD parity) rather than panicking;
    /// the builders always populate every supported currency.
    pub fn multiplier(&self, currency: Currency) -> f64 {
        self.rates.get(&currency).copied().unwrap_or(1.0)
    }

    /// Iterate over (currency, multiplier) entries in currency order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.rates.iter().map(|(c, r)| (*c, *r))
    }
}

impl Default for ForexTable {
    /// Hard-coded fallback rates. Recalculated from the index API on
    /// demand; if that API fails, the system falls back to these.
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(Currency::Usd, 1.0);
        rates.insert(Currency::Eur, 0.88);
        rates.insert(Currency::Gbp, 0.79);
        rates.insert(Currency::Jpy, 109.76);
        Self { rates }
    }
}
