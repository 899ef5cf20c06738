//! The command surface offered to a front end: every user action maps onto
//! exactly one method here, so a menu or CLI can bind a dispatch table
//! directly to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::{self, AmortizationEntry, YearSummary};
use crate::overpayment::{self, LumpSumProjection, MonthlyOverpaymentProjection};
use crate::registry::ScenarioRegistry;
use crate::scenario::{LoanScenario, LoanTerms, SummaryRow};
use crate::store::ScenarioStore;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Percent, ScenarioId};
use crate::MortgageResult;

/// Full schedule report for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub scenario_id: ScenarioId,
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// Interest summed over the emitted entries.
    pub schedule_interest: Money,
    pub entries: Vec<AmortizationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_dates: Vec<NaiveDate>,
}

/// Side-by-side difference between two scenarios; positive values mean the
/// other scenario costs more than the base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub base_id: ScenarioId,
    pub other_id: ScenarioId,
    pub base_monthly_payment: Money,
    pub other_monthly_payment: Money,
    pub monthly_payment_difference: Money,
    pub base_total_interest: Money,
    pub other_total_interest: Money,
    pub total_interest_difference: Money,
    pub term_difference_years: i64,
    /// Scenario with the lower lifetime interest; `None` on a tie.
    pub cheaper_id: Option<ScenarioId>,
}

/// Owns the scenario registry and exposes the calculator's operations.
#[derive(Debug, Default)]
pub struct MortgageCalculator {
    registry: ScenarioRegistry,
}

impl MortgageCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: ScenarioRegistry) -> Self {
        MortgageCalculator { registry }
    }

    pub fn registry(&self) -> &ScenarioRegistry {
        &self.registry
    }

    pub fn create_scenario(
        &mut self,
        principal: Money,
        apr: Percent,
        term_years: u32,
    ) -> MortgageResult<ScenarioId> {
        let terms = LoanTerms::new(principal, apr, term_years)?;
        self.registry.add(terms)
    }

    pub fn get_scenario(&self, id: ScenarioId) -> MortgageResult<&LoanScenario> {
        self.registry.get(id)
    }

    pub fn list_scenarios(&self) -> &[LoanScenario] {
        self.registry.list_all()
    }

    pub fn remove_scenario(&mut self, id: ScenarioId) -> MortgageResult<LoanScenario> {
        self.registry.remove(id)
    }

    /// One summary row per scenario, in registry order.
    pub fn compute_summary_table(&self) -> Vec<SummaryRow> {
        self.registry
            .list_all()
            .iter()
            .map(LoanScenario::summary_row)
            .collect()
    }

    pub fn compute_schedule(&self, id: ScenarioId) -> MortgageResult<Vec<AmortizationEntry>> {
        Ok(self.registry.get(id)?.schedule().collect())
    }

    /// Schedule plus headline figures, optionally dated from the first
    /// payment.
    pub fn schedule_report(
        &self,
        id: ScenarioId,
        first_payment: Option<NaiveDate>,
    ) -> MortgageResult<ComputationOutput<ScheduleReport>> {
        let start = Instant::now();
        let scenario = self.registry.get(id)?;
        let entries: Vec<AmortizationEntry> = scenario.schedule().collect();
        let warnings = vec![format!(
            "Schedule lists {} of {} payments; the final settling payment is not shown",
            entries.len(),
            scenario.terms().total_months()
        )];

        let payment_dates = match first_payment {
            Some(first) => entries
                .iter()
                .filter_map(|e| amortization::payment_date(first, e.month_number))
                .collect(),
            None => Vec::new(),
        };

        let report = ScheduleReport {
            scenario_id: id,
            monthly_payment: scenario.monthly_payment(),
            total_interest: scenario.total_interest(),
            schedule_interest: round_currency(entries.iter().map(|e| e.interest_portion).sum()),
            entries: entries.iter().map(AmortizationEntry::rounded).collect(),
            payment_dates,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Level-payment amortisation schedule",
            &serde_json::json!({
                "principal": scenario.principal().to_string(),
                "apr": scenario.apr().to_string(),
                "term_years": scenario.term_years(),
            }),
            warnings,
            elapsed,
            report,
        ))
    }

    pub fn yearly_breakdown(
        &self,
        id: ScenarioId,
        first_payment: Option<NaiveDate>,
    ) -> MortgageResult<Vec<YearSummary>> {
        let entries = self.compute_schedule(id)?;
        Ok(amortization::yearly_breakdown(&entries, first_payment))
    }

    /// Interest paid during the first `months` payments.
    pub fn interest_paid_through(&self, id: ScenarioId, months: u32) -> MortgageResult<Money> {
        let entries = self.compute_schedule(id)?;
        Ok(round_currency(amortization::interest_paid_through(&entries, months)))
    }

    /// Register a reduced-principal copy of `id` and return the new id.
    pub fn apply_lump_sum(&mut self, id: ScenarioId, amount: Money) -> MortgageResult<ScenarioId> {
        Ok(self.project_lump_sum(id, amount)?.result.new_scenario_id)
    }

    /// As [`apply_lump_sum`](Self::apply_lump_sum), returning the savings summary.
    pub fn project_lump_sum(
        &mut self,
        id: ScenarioId,
        amount: Money,
    ) -> MortgageResult<ComputationOutput<LumpSumProjection>> {
        overpayment::apply_lump_sum(&mut self.registry, id, amount)
    }

    pub fn apply_monthly_overpayment(
        &self,
        id: ScenarioId,
        extra: Money,
    ) -> MortgageResult<ComputationOutput<MonthlyOverpaymentProjection>> {
        overpayment::apply_monthly_overpayment(self.registry.get(id)?, extra)
    }

    pub fn compare_scenarios(
        &self,
        base_id: ScenarioId,
        other_id: ScenarioId,
    ) -> MortgageResult<ScenarioComparison> {
        let base = self.registry.get(base_id)?;
        let other = self.registry.get(other_id)?;
        Ok(ScenarioComparison {
            base_id,
            other_id,
            base_monthly_payment: base.monthly_payment(),
            other_monthly_payment: other.monthly_payment(),
            monthly_payment_difference: other.monthly_payment() - base.monthly_payment(),
            base_total_interest: base.total_interest(),
            other_total_interest: other.total_interest(),
            total_interest_difference: other.total_interest() - base.total_interest(),
            term_difference_years: i64::from(other.term_years()) - i64::from(base.term_years()),
            cheaper_id: if base.is_cheaper_than(other) {
                Some(base_id)
            } else if other.is_cheaper_than(base) {
                Some(other_id)
            } else {
                None
            },
        })
    }

    pub fn save_to(&self, store: &dyn ScenarioStore) -> MortgageResult<()> {
        let records = self.registry.records();
        debug!(count = records.len(), "saving scenarios");
        store.save(&records)
    }

    /// Replace the registry contents with whatever `store` holds.
    pub fn load_from(&mut self, store: &dyn ScenarioStore) -> MortgageResult<usize> {
        let records = store.load()?;
        self.registry.restore(&records)?;
        Ok(records.len())
    }
}
