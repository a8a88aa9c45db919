use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of currencies transactions may be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
    Sgd,
}

pub const SUPPORTED: [Currency; 4] = [Currency::Eur, Currency::Usd, Currency::Gbp, Currency::Sgd];

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Sgd => "SGD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            "SGD" => Ok(Currency::Sgd),
            _ => Err(UnsupportedCurrency),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnsupportedCurrency;

/// Human-readable list of supported codes, for validation messages.
pub fn supported_codes() -> String {
    SUPPORTED
        .iter()
        .map(Currency::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
