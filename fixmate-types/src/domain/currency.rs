//! Currencies and conversion between major and smallest units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies accepted by the payment processor.
///
/// Serialized in lowercase, which is the form the processor expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    LKR,
    USD,
    EUR,
    GBP,
    INR,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::LKR | Currency::USD | Currency::EUR | Currency::GBP | Currency::INR => 2,
        }
    }

    /// Returns the lowercase ISO code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::LKR => "lkr",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::INR => "inr",
        }
    }

    /// Converts a major-unit amount to the smallest unit, rounding to the
    /// nearest integer (`408.00` -> `40800`).
    pub fn to_minor_units(&self, major: f64) -> i64 {
        (major * self.scale()).round() as i64
    }

    /// Converts a smallest-unit amount back to the major unit.
    pub fn to_major_units(&self, minor: i64) -> f64 {
        minor as f64 / self.scale()
    }

    fn scale(&self) -> f64 {
        10f64.powi(self.decimal_places() as i32)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}. Supported: lkr, usd, eur, gbp, inr")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lkr" => Ok(Currency::LKR),
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "inr" => Ok(Currency::INR),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}
