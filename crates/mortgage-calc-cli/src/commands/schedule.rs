use chrono::NaiveDate;
use clap::Args;
use serde_json::{json, Value};

use mortgage_calc_core::types::ScenarioId;

use crate::session::Session;

/// Arguments for amortisation schedule views
#[derive(Args)]
pub struct ScheduleArgs {
    /// Scenario id (see `list`)
    pub id: ScenarioId,

    /// Date of the first payment (YYYY-MM-DD); adds payment dates
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Summarise by loan year instead of listing every month
    #[arg(long, conflicts_with = "through_month")]
    pub yearly: bool,

    /// Show a single loan year (implies --yearly)
    #[arg(long, conflicts_with = "through_month")]
    pub year: Option<u32>,

    /// Only report interest paid over the first N months
    #[arg(long)]
    pub through_month: Option<u32>,
}

pub fn run_schedule(args: ScheduleArgs, session: &Session) -> Result<Value, Box<dyn std::error::Error>> {
    let calculator = session.calculator();

    if let Some(months) = args.through_month {
        let interest = calculator.interest_paid_through(args.id, months)?;
        return Ok(json!({
            "scenario_id": args.id,
            "through_month": months,
            "interest_paid": interest,
        }));
    }

    if args.yearly || args.year.is_some() {
        let mut years = calculator.yearly_breakdown(args.id, args.start_date)?;
        if let Some(year) = args.year {
            years.retain(|y| y.loan_year == year);
            if years.is_empty() {
                return Err(format!("Loan year {} is outside the schedule", year).into());
            }
        }
        return Ok(serde_json::to_value(years)?);
    }

    let report = calculator.schedule_report(args.id, args.start_date)?;
    Ok(serde_json::to_value(report)?)
}
