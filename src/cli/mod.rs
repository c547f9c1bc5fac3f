use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use crate::core::{
    ProjectionResult, SCENARIO_PALETTE, SavingsPlan, Scenario, ValidationErrors, compare,
    export_csv, format_currency, format_percent, project, summarize, validate_plan,
};

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    about = "Monthly-compounded savings projector with scenario comparison and report export"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Project one plan and print its summary
    Project {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(long, help = "Also print the month-by-month table")]
        table: bool,
    },
    /// Project several plans side by side
    Compare {
        #[arg(
            long = "scenario",
            required = true,
            value_parser = parse_plan_arg,
            help = "Plan as initial,monthly,years,annual-percent; repeatable"
        )]
        scenarios: Vec<SavingsPlan>,
    },
    /// Write the comma-separated report for a plan
    Export {
        #[command(flatten)]
        plan: PlanArgs,
        #[arg(
            long = "scenario",
            value_parser = parse_plan_arg,
            help = "Scenario to list in the report header, as initial,monthly,years,annual-percent"
        )]
        scenarios: Vec<SavingsPlan>,
        #[arg(long, short, help = "Output file; stdout when omitted")]
        output: Option<PathBuf>,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PlanArgs {
    #[arg(long, default_value_t = 1_000.0, help = "Initial capital in EUR")]
    pub initial: f64,
    #[arg(long, default_value_t = 200.0, help = "Monthly contribution in EUR")]
    pub monthly: f64,
    #[arg(long, default_value_t = 10, help = "Duration in years")]
    pub years: u32,
    #[arg(
        long,
        default_value_t = 8.0,
        allow_negative_numbers = true,
        help = "Expected annual return in percent, e.g. 8"
    )]
    pub annual_percent: f64,
}

impl From<PlanArgs> for SavingsPlan {
    fn from(args: PlanArgs) -> Self {
        SavingsPlan {
            initial: args.initial,
            monthly: args.monthly,
            years: args.years,
            annual_percent: args.annual_percent,
        }
    }
}

pub fn build_plan(args: PlanArgs) -> Result<SavingsPlan, ValidationErrors> {
    let plan = SavingsPlan::from(args);
    validate_plan(&plan)?;
    Ok(plan)
}

fn parse_plan_arg(raw: &str) -> Result<SavingsPlan, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let (initial, monthly, years, annual_percent) = match parts.as_slice() {
        [initial, monthly, years, annual_percent] => (*initial, *monthly, *years, *annual_percent),
        _ => {
            return Err(format!(
                "expected initial,monthly,years,annual-percent, got {raw:?}"
            ));
        }
    };

    let number = |name: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|e| format!("invalid {name} {value:?}: {e}"))
    };
    Ok(SavingsPlan {
        initial: number("initial", initial)?,
        monthly: number("monthly", monthly)?,
        years: years
            .parse::<u32>()
            .map_err(|e| format!("invalid years {years:?}: {e}"))?,
        annual_percent: number("annual percent", annual_percent)?,
    })
}

/// Runs every subcommand except `serve`, writing to stdout.
pub fn run(command: Command) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Project { plan, table } => run_project(&mut out, plan, table),
        Command::Compare { scenarios } => run_compare(&mut out, &scenarios),
        Command::Export {
            plan,
            scenarios,
            output,
        } => run_export(&mut out, plan, &scenarios, output),
        Command::Serve { .. } => bail!("serve must be started from the async entry point"),
    }
}

fn checked_plan(args: PlanArgs) -> Result<SavingsPlan> {
    build_plan(args).map_err(|errors| rejected(&errors, "invalid parameters"))
}

/// Every `--scenario` plan must pass the same range checks as the main plan.
fn checked_scenarios(plans: &[SavingsPlan]) -> Result<()> {
    for (i, plan) in plans.iter().enumerate() {
        validate_plan(plan)
            .map_err(|errors| rejected(&errors, &format!("invalid scenario {}", i + 1)))?;
    }
    Ok(())
}

fn rejected(errors: &ValidationErrors, context: &str) -> anyhow::Error {
    for error in errors.errors() {
        warn!("{context}: {error}");
    }
    anyhow::anyhow!("{context}: {errors}")
}

fn run_project<W: Write>(out: &mut W, args: PlanArgs, table: bool) -> Result<()> {
    let plan = checked_plan(args)?;
    let result = project(&plan.to_parameters())?;
    write_summary(out, &plan, &result)?;
    if table {
        writeln!(out)?;
        write_table(out, &result)?;
    }
    Ok(())
}

fn run_compare<W: Write>(out: &mut W, plans: &[SavingsPlan]) -> Result<()> {
    let scenarios = named_scenarios(plans);
    writeln!(
        out,
        "{:<12} {:>12} {:>10} {:>6} {:>7} {:>14} {:>8}",
        "scenario", "initial", "monthly", "years", "rate", "final", "yield"
    )?;
    for slot in compare(&scenarios) {
        let plan = slot.scenario.plan;
        let checked = validate_plan(&plan);
        let prefix = format!(
            "{:<12} {:>12} {:>10} {:>6} {:>7}",
            slot.scenario.name,
            format_currency(plan.initial),
            format_currency(plan.monthly),
            plan.years,
            format_percent(plan.annual_percent, 1),
        );
        if let Err(errors) = checked {
            for error in errors.errors() {
                warn!("{}: {error}", slot.scenario.name);
            }
            writeln!(out, "{prefix} invalid: {errors}")?;
            continue;
        }
        match slot.outcome {
            Ok(result) => writeln!(
                out,
                "{prefix} {:>14} {:>8}",
                format_currency(result.final_balance),
                format_percent(result.yield_percent, 1)
            )?,
            Err(err) => writeln!(out, "{prefix} error: {err}")?,
        }
    }
    Ok(())
}

fn run_export<W: Write>(
    out: &mut W,
    args: PlanArgs,
    plans: &[SavingsPlan],
    output: Option<PathBuf>,
) -> Result<()> {
    let plan = checked_plan(args)?;
    checked_scenarios(plans)?;
    let result = project(&plan.to_parameters())?;
    let report = export_csv(&result.rows, &named_scenarios(plans), Local::now().date_naive());

    match output {
        Some(path) => {
            fs::write(&path, &report)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!("wrote {} rows to {}", result.rows.len(), path.display());
        }
        None => out.write_all(report.as_bytes())?,
    }
    Ok(())
}

fn named_scenarios(plans: &[SavingsPlan]) -> Vec<Scenario> {
    plans
        .iter()
        .enumerate()
        .map(|(i, plan)| {
            Scenario::new(
                format!("Scenario {}", i + 1),
                SCENARIO_PALETTE[i % SCENARIO_PALETTE.len()],
                *plan,
            )
        })
        .collect()
}

fn write_summary<W: Write>(out: &mut W, plan: &SavingsPlan, result: &ProjectionResult) -> Result<()> {
    let summary = summarize(plan, result);
    writeln!(out, "Final balance:       {}", format_currency(summary.final_balance))?;
    writeln!(
        out,
        "Total contributions: {} ({} + {} x {})",
        format_currency(summary.total_contribution),
        format_currency(plan.initial),
        summary.months,
        format_currency(plan.monthly)
    )?;
    writeln!(out, "Total gains:         {}", format_currency(summary.total_gain))?;
    writeln!(out, "Yield:               {}", format_percent(summary.yield_percent, 1))?;
    writeln!(out, "Multiplier:          {:.2}x", summary.multiplier)?;
    match summary.cagr {
        Some(cagr) => writeln!(out, "CAGR:                {}", format_percent(cagr * 100.0, 1))?,
        None => writeln!(out, "CAGR:                n/a")?,
    }
    writeln!(
        out,
        "Vs. inflation (est.): {}",
        format_percent(summary.inflation_advantage_percent, 0)
    )?;
    writeln!(out, "Outlook:             {}", summary.performance.describe())?;
    Ok(())
}

fn write_table<W: Write>(out: &mut W, result: &ProjectionResult) -> Result<()> {
    writeln!(
        out,
        "{:>5} {:<8} {:>14} {:>14} {:>14} {:>8}",
        "month", "label", "balance", "contributed", "gain", "growth"
    )?;
    for (row, growth) in result.rows.iter().zip(&result.monthly_growth_rates) {
        writeln!(
            out,
            "{:>5} {:<8} {:>14} {:>14} {:>14} {:>8}",
            row.month_index,
            row.month_label,
            format_currency(row.balance),
            format_currency(row.cumulative_contribution),
            format_currency(row.cumulative_gain),
            format_percent(*growth, 2)
        )?;
    }
    Ok(())
}
