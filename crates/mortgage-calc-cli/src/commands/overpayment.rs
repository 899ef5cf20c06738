use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::types::ScenarioId;

use crate::session::Session;

/// Arguments for a one-off lump-sum overpayment
#[derive(Args)]
pub struct LumpSumArgs {
    /// Scenario id (see `list`)
    pub id: ScenarioId,

    /// Amount paid off the principal up front
    #[arg(long)]
    pub amount: Decimal,
}

/// Registers the reduced-principal scenario and reports the saving.
pub fn run_lump_sum(args: LumpSumArgs, session: &mut Session) -> Result<Value, Box<dyn std::error::Error>> {
    let projection = session
        .calculator_mut()
        .project_lump_sum(args.id, args.amount)?;
    session.save()?;
    Ok(serde_json::to_value(projection)?)
}

/// Arguments for a recurring monthly overpayment
#[derive(Args)]
pub struct OverpayArgs {
    /// Scenario id (see `list`)
    pub id: ScenarioId,

    /// Extra principal paid every month
    #[arg(long)]
    pub extra: Decimal,

    /// Include the shortened month-by-month schedule
    #[arg(long)]
    pub show_schedule: bool,
}

pub fn run_overpay(args: OverpayArgs, session: &Session) -> Result<Value, Box<dyn std::error::Error>> {
    let projection = session
        .calculator()
        .apply_monthly_overpayment(args.id, args.extra)?;
    let mut value = serde_json::to_value(projection)?;
    if !args.show_schedule {
        if let Some(Value::Object(result)) = value.get_mut("result") {
            result.remove("schedule");
        }
    }
    Ok(value)
}

/// Arguments for comparing two scenarios
#[derive(Args)]
pub struct CompareArgs {
    /// Scenario the difference is measured from
    pub base: ScenarioId,

    /// Scenario compared against the base
    pub other: ScenarioId,
}

pub fn run_compare(args: CompareArgs, session: &Session) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison = session.calculator().compare_scenarios(args.base, args.other)?;
    Ok(serde_json::to_value(comparison)?)
}
