use serde::Serialize;

use super::types::{ProjectionResult, SavingsPlan};

/// Inflation assumed by the "advantage over inflation" estimate, in percent.
pub const ASSUMED_INFLATION_PERCENT: f64 = 2.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceBand {
    /// Gains exceed everything paid in.
    Excellent,
    Positive,
    AtRisk,
}

impl PerformanceBand {
    pub fn classify(total_gain: f64, total_contribution: f64) -> Self {
        if total_gain > total_contribution {
            PerformanceBand::Excellent
        } else if total_gain > 0.0 {
            PerformanceBand::Positive
        } else {
            PerformanceBand::AtRisk
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "excellent performance",
            PerformanceBand::Positive => "positive performance",
            PerformanceBand::AtRisk => "watch the risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub months: u32,
    pub final_balance: f64,
    pub total_contribution: f64,
    pub total_gain: f64,
    pub yield_percent: f64,
    pub multiplier: f64,
    pub cagr: Option<f64>,
    pub performance: PerformanceBand,
    pub inflation_advantage_percent: f64,
}

/// `(final / max(initial, 1))^(1/years) - 1`, as a decimal.
///
/// The `max(initial, 1)` floor keeps the rate defined for plans that start
/// from nothing. `None` when no years elapsed or the ratio has no real root.
pub fn compound_annual_growth_rate(final_balance: f64, initial_capital: f64, years: f64) -> Option<f64> {
    if years <= 0.0 {
        return None;
    }
    let cagr = (final_balance / initial_capital.max(1.0)).powf(1.0 / years) - 1.0;
    cagr.is_finite().then_some(cagr)
}

pub fn summarize(plan: &SavingsPlan, result: &ProjectionResult) -> ProjectionSummary {
    ProjectionSummary {
        months: result.rows.len() as u32,
        final_balance: result.final_balance,
        total_contribution: result.total_contribution,
        total_gain: result.total_gain,
        yield_percent: result.yield_percent,
        multiplier: result.final_balance / result.total_contribution.max(1.0),
        cagr: compound_annual_growth_rate(result.final_balance, plan.initial, f64::from(plan.years)),
        performance: PerformanceBand::classify(result.total_gain, result.total_contribution),
        inflation_advantage_percent: (plan.annual_percent - ASSUMED_INFLATION_PERCENT)
            * f64::from(plan.years),
    }
}
