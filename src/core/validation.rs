use super::error::{ValidationError, ValidationErrors};
use super::types::SavingsPlan;

pub const MAX_INITIAL: f64 = 1_000_000.0;
pub const MAX_MONTHLY: f64 = 50_000.0;
pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 50;
pub const MIN_ANNUAL_PERCENT: f64 = -20.0;
pub const MAX_ANNUAL_PERCENT: f64 = 50.0;

/// Range checks applied before a plan reaches the engine. Every violation is
/// reported, not just the first.
pub fn validate_plan(plan: &SavingsPlan) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_range(&mut errors, "initial", plan.initial, 0.0, MAX_INITIAL);
    check_range(&mut errors, "monthly", plan.monthly, 0.0, MAX_MONTHLY);
    check_range(
        &mut errors,
        "years",
        f64::from(plan.years),
        f64::from(MIN_YEARS),
        f64::from(MAX_YEARS),
    );
    check_range(
        &mut errors,
        "annualPercent",
        plan.annual_percent,
        MIN_ANNUAL_PERCENT,
        MAX_ANNUAL_PERCENT,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_range(errors: &mut ValidationErrors, field: &'static str, value: f64, min: f64, max: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::NotFinite { field });
    } else if !(min..=max).contains(&value) {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(initial: f64, monthly: f64, years: u32, annual_percent: f64) -> SavingsPlan {
        SavingsPlan {
            initial,
            monthly,
            years,
            annual_percent,
        }
    }

    #[test]
    fn default_plan_is_valid() {
        assert!(validate_plan(&SavingsPlan::default()).is_ok());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(validate_plan(&plan(0.0, 0.0, 1, -20.0)).is_ok());
        assert!(validate_plan(&plan(1_000_000.0, 50_000.0, 50, 50.0)).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let errors = validate_plan(&plan(-1.0, 50_001.0, 0, 51.0)).expect_err("all four invalid");
        assert_eq!(errors.len(), 4);

        let fields: Vec<&str> = errors
            .errors()
            .iter()
            .map(|e| match e {
                ValidationError::OutOfRange { field, .. } => *field,
                ValidationError::NotFinite { field } => *field,
            })
            .collect();
        assert_eq!(fields, ["initial", "monthly", "years", "annualPercent"]);
    }

    #[test]
    fn reports_upper_bound_breaches() {
        let errors = validate_plan(&plan(1_000_001.0, 0.0, 51, -20.5)).expect_err("invalid");
        let messages = errors.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("initial must be between 0 and 1000000"));
        assert!(messages[1].contains("years"));
        assert!(messages[2].contains("annualPercent"));
    }

    #[test]
    fn non_finite_values_are_reported_separately() {
        let errors = validate_plan(&plan(f64::NAN, f64::INFINITY, 10, 5.0)).expect_err("invalid");
        assert_eq!(
            errors.errors(),
            [
                ValidationError::NotFinite { field: "initial" },
                ValidationError::NotFinite { field: "monthly" },
            ]
        );
        assert!(errors.to_string().contains("initial must be a finite number"));
    }
}
