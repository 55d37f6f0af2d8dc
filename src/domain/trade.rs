//! Executed trades and equity-curve points consumed by the metrics code.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum TradeType {
    Buy,
    Sell,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => write!(f, "BUY"),
            TradeType::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            other => Err(format!("unknown trade type '{}' (expected BUY or SELL)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    pub trade_type: TradeType,
    pub date: NaiveDate,
    pub price: f64,
    pub shares: f64,
    /// price × shares as reported by the producer; informational only.
    pub value: f64,
    /// Realised profit, present on closing trades.
    pub profit: Option<f64>,
    pub reason: Option<String>,
    pub symbol: Option<String>,
}

impl Trade {
    /// Profit with a missing value read as 0.
    pub fn profit_or_zero(&self) -> f64 {
        self.profit.unwrap_or(0.0)
    }

    pub fn is_win(&self) -> bool {
        self.profit_or_zero() > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit_or_zero() < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityCurvePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// The bare values of an equity curve, in order.
pub fn equity_values(curve: &[EquityCurvePoint]) -> Vec<f64> {
    curve.iter().map(|p| p.value).collect()
}
