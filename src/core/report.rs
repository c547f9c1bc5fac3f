use std::fmt::Write;

use chrono::NaiveDate;

use super::format::CURRENCY_SYMBOL;
use super::scenarios::Scenario;
use super::types::MonthlySample;

pub const REPORT_TITLE: &str = "Investment Projection - Report Export";

/// Column names of the data block, in row-line order. They are the serialized
/// field names of [`MonthlySample`], so the export and the JSON rows agree.
pub const ROW_HEADERS: [&str; 5] = [
    "monthLabel",
    "monthIndex",
    "balance",
    "cumulativeContribution",
    "cumulativeGain",
];

/// Plain comma-joined report of a projection and the saved scenarios.
///
/// Fields are not quoted or escaped; labels and numbers never contain commas.
/// Returns an empty string when there are no rows.
pub fn export_csv(rows: &[MonthlySample], scenarios: &[Scenario], generated_on: NaiveDate) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{REPORT_TITLE}");
    let _ = writeln!(out, "Date: {}", generated_on.format("%Y-%m-%d"));
    out.push('\n');

    out.push_str("SCENARIOS:\n");
    for scenario in scenarios {
        let plan = &scenario.plan;
        let _ = writeln!(
            out,
            "{},Initial: {CURRENCY_SYMBOL}{},Monthly: {CURRENCY_SYMBOL}{},Years: {},Rate: {}%",
            scenario.name, plan.initial, plan.monthly, plan.years, plan.annual_percent
        );
    }
    out.push('\n');

    out.push_str(&ROW_HEADERS.join(","));
    out.push('\n');
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            row.month_label,
            row.month_index,
            row.balance,
            row.cumulative_contribution,
            row.cumulative_gain
        );
    }

    out
}

/// Suggested download name, e.g. `investment-projection-2025-03-01.csv`.
pub fn export_file_name(generated_on: NaiveDate) -> String {
    format!("investment-projection-{}.csv", generated_on.format("%Y-%m-%d"))
}
