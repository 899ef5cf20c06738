use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use mortgage_calc_core::types::ScenarioId;

use crate::input;
use crate::session::Session;

/// Arguments for registering a new mortgage scenario
#[derive(Args)]
pub struct AddArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual percentage rate as a percentage (e.g. 4.3 for 4.3%)
    #[arg(long)]
    pub apr: Decimal,

    /// Length of the mortgage in years
    #[arg(long, alias = "years")]
    pub term: u32,
}

pub fn run_add(args: AddArgs, session: &mut Session) -> Result<Value, Box<dyn std::error::Error>> {
    let id = session
        .calculator_mut()
        .create_scenario(args.principal, args.apr, args.term)?;
    session.save()?;
    scenario_value(session, id)
}

/// Arguments for bulk import of loan terms
#[derive(Args)]
pub struct ImportArgs {
    /// Path to JSON input file (array or single object); stdin when omitted
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_import(args: ImportArgs, session: &mut Session) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = input::read_loan_terms(args.input.as_deref())?;
    let calculator = session.calculator_mut();
    let ids: Vec<ScenarioId> = terms
        .into_iter()
        .map(|t| calculator.create_scenario(t.principal(), t.apr(), t.term_years()))
        .collect::<Result<_, _>>()?;
    session.save()?;
    Ok(json!({ "imported": ids.len(), "scenario_ids": ids }))
}

pub fn run_list(session: &Session) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(session.calculator().compute_summary_table())?)
}

/// Arguments that select a single scenario
#[derive(Args)]
pub struct ScenarioIdArgs {
    /// Scenario id (see `list`)
    pub id: ScenarioId,
}

pub fn run_show(args: ScenarioIdArgs, session: &Session) -> Result<Value, Box<dyn std::error::Error>> {
    scenario_value(session, args.id)
}

pub fn run_remove(args: ScenarioIdArgs, session: &mut Session) -> Result<Value, Box<dyn std::error::Error>> {
    let removed = session.calculator_mut().remove_scenario(args.id)?;
    session.save()?;
    Ok(json!({
        "removed": removed.id(),
        "remaining": session.calculator().list_scenarios().len(),
    }))
}

/// Headline figures for one scenario.
pub fn scenario_value(session: &Session, id: ScenarioId) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = session.calculator().get_scenario(id)?;
    Ok(json!({
        "scenario_id": scenario.id(),
        "principal": scenario.principal(),
        "apr": scenario.apr(),
        "term_years": scenario.term_years(),
        "monthly_payment": scenario.monthly_payment(),
        "total_interest": scenario.total_interest(),
        "details": scenario.details(),
    }))
}
