mod engine;
mod error;
mod format;
mod metrics;
mod report;
mod scenarios;
mod session;
mod types;
mod validation;

pub use engine::{monthly_rate, project};
pub use error::{ProjectionError, ProjectionOutcome, ValidationError, ValidationErrors};
pub use format::{format_currency, format_percent, month_label};
pub use metrics::{PerformanceBand, ProjectionSummary, compound_annual_growth_rate, summarize};
pub use report::{ROW_HEADERS, export_csv, export_file_name};
pub use scenarios::{SCENARIO_PALETTE, Scenario, ScenarioBook, ScenarioProjection, compare};
pub use session::{NOTES_MAX_CHARS, Session};
pub use types::{MonthlySample, ProjectionParameters, ProjectionResult, SavingsPlan};
pub use validation::validate_plan;
