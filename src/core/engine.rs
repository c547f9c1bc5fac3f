use super::error::{ProjectionError, ProjectionOutcome};
use super::format::month_label;
use super::types::{MonthlySample, ProjectionParameters, ProjectionResult};

/// Geometric monthly equivalent of an annual rate, `(1 + r)^(1/12) - 1`.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Month-by-month balance trajectory with the contribution paid at the start
/// of each month and one month of growth applied after it.
///
/// Rows carry rounded values for display; the running balance is never
/// rounded, so `final_balance` and `total_gain` come from the exact series.
pub fn project(params: &ProjectionParameters) -> ProjectionOutcome<ProjectionResult> {
    check_parameters(params)?;

    let ProjectionParameters {
        initial_capital,
        monthly_contribution,
        duration_months,
        annual_rate,
    } = *params;
    let growth_factor = 1.0 + monthly_rate(annual_rate);

    let mut rows = Vec::with_capacity(duration_months as usize);
    let mut monthly_growth_rates = Vec::with_capacity(duration_months as usize);
    let mut balance = initial_capital;

    for month in 1..=duration_months {
        let previous_balance = balance;
        balance += monthly_contribution;
        balance *= growth_factor;

        if !balance.is_finite() {
            return Err(ProjectionError::InvalidParameters(format!(
                "balance overflowed at month {month}"
            )));
        }

        let cumulative_contribution = contribution_after(params, month);
        let shown_balance = balance.round();
        let shown_contribution = cumulative_contribution.round();

        monthly_growth_rates.push(growth_rate_percent(previous_balance, balance));
        rows.push(MonthlySample {
            month_index: month,
            month_label: month_label(month),
            balance: shown_balance,
            cumulative_contribution: shown_contribution,
            cumulative_gain: shown_balance - shown_contribution,
        });
    }

    let total_contribution = contribution_after(params, duration_months);
    let total_gain = balance - total_contribution;

    Ok(ProjectionResult {
        rows,
        final_balance: balance,
        total_contribution,
        total_gain,
        yield_percent: 100.0 * total_gain / total_contribution.max(1.0),
        monthly_growth_rates,
    })
}

fn check_parameters(params: &ProjectionParameters) -> ProjectionOutcome<()> {
    for (name, value) in [
        ("initial capital", params.initial_capital),
        ("monthly contribution", params.monthly_contribution),
        ("annual rate", params.annual_rate),
    ] {
        if !value.is_finite() {
            return Err(ProjectionError::InvalidParameters(format!(
                "{name} must be finite, got {value}"
            )));
        }
    }

    if params.duration_months == 0 {
        return Err(ProjectionError::InvalidParameters(
            "duration must be at least one month".to_string(),
        ));
    }

    // Below -100% the monthly root of (1 + r) is NaN.
    if params.annual_rate < -1.0 {
        return Err(ProjectionError::InvalidParameters(format!(
            "annual rate must be >= -100%, got {}",
            params.annual_rate
        )));
    }

    Ok(())
}

fn contribution_after(params: &ProjectionParameters, month: u32) -> f64 {
    params.initial_capital + params.monthly_contribution * f64::from(month)
}

fn growth_rate_percent(previous_balance: f64, balance: f64) -> f64 {
    (balance - previous_balance) / previous_balance.max(1.0) * 100.0
}
