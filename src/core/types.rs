use serde::{Deserialize, Serialize};

/// Engine-level inputs: money in currency units, rate as a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParameters {
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub duration_months: u32,
    pub annual_rate: f64,
}

/// The user-facing parameter set, in years and percent.
///
/// This is what the boundary validates and what a saved scenario snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlan {
    pub initial: f64,
    pub monthly: f64,
    pub years: u32,
    pub annual_percent: f64,
}

impl SavingsPlan {
    pub fn months(&self) -> u32 {
        self.years.saturating_mul(12)
    }

    pub fn to_parameters(self) -> ProjectionParameters {
        ProjectionParameters {
            initial_capital: self.initial,
            monthly_contribution: self.monthly,
            duration_months: self.months(),
            annual_rate: self.annual_percent / 100.0,
        }
    }
}

impl Default for SavingsPlan {
    fn default() -> Self {
        Self {
            initial: 1_000.0,
            monthly: 200.0,
            years: 10,
            annual_percent: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySample {
    pub month_index: u32,
    pub month_label: String,
    pub balance: f64,
    pub cumulative_contribution: f64,
    pub cumulative_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub rows: Vec<MonthlySample>,
    pub final_balance: f64,
    pub total_contribution: f64,
    pub total_gain: f64,
    pub yield_percent: f64,
    pub monthly_growth_rates: Vec<f64>,
}
