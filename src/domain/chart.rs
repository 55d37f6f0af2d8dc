//! Equity chart data for rendering collaborators.

use chrono::NaiveDate;

use super::metrics::drawdown_series;
use super::trade::{equity_values, EquityCurvePoint};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityChart {
    pub dates: Vec<NaiveDate>,
    pub equity: Vec<f64>,
    pub benchmark: Option<Vec<f64>>,
    /// Drawdown percent per point, aligned with `equity`.
    pub drawdown: Vec<f64>,
}

impl EquityChart {
    /// An empty benchmark is treated as absent.
    pub fn build(equity_curve: &[EquityCurvePoint], benchmark: Option<&[EquityCurvePoint]>) -> Self {
        let equity = equity_values(equity_curve);
        let drawdown = drawdown_series(&equity);

        EquityChart {
            dates: equity_curve.iter().map(|p| p.date).collect(),
            equity,
            benchmark: benchmark.filter(|b| !b.is_empty()).map(equity_values),
            drawdown,
        }
    }
}
