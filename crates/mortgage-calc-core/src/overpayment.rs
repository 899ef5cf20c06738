//! Overpayment projections: one-off lump sums and recurring extra principal.
//!
//! A lump sum produces a new, separately registered scenario with a lower
//! principal. Recurring overpayments keep the scenario as-is and simulate an
//! alternative payoff trajectory that stops as soon as the balance is cleared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::{monthly_rate, AmortizationEntry};
use crate::error::MortgageError;
use crate::registry::ScenarioRegistry;
use crate::scenario::LoanScenario;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Rate, ScenarioId};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Effect of paying a lump sum off the principal up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpSumProjection {
    pub original_scenario_id: ScenarioId,
    pub new_scenario_id: ScenarioId,
    pub lump_amount: Money,
    pub original_principal: Money,
    pub new_principal: Money,
    pub original_monthly_payment: Money,
    pub new_monthly_payment: Money,
    pub original_total_interest: Money,
    pub new_total_interest: Money,
    pub interest_saved: Money,
}

/// Effect of paying a fixed extra amount of principal every month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyOverpaymentProjection {
    pub scenario_id: ScenarioId,
    pub extra_per_month: Money,
    pub scheduled_payment: Money,
    pub scheduled_months: u32,
    /// Months until the balance reaches zero with the extra applied.
    pub months_to_payoff: u32,
    pub months_saved: u32,
    /// Interest over the full scheduled trajectory without overpayments.
    pub baseline_interest: Money,
    /// Interest over the shortened trajectory.
    pub projected_interest: Money,
    pub interest_saved: Money,
    /// Month-by-month trajectory with the extra applied, ending at payoff.
    pub schedule: Vec<AmortizationEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Register a new scenario whose principal is reduced by `lump_amount`, same
/// APR and term. The original scenario is left untouched.
pub fn apply_lump_sum(
    registry: &mut ScenarioRegistry,
    scenario_id: ScenarioId,
    lump_amount: Money,
) -> MortgageResult<ComputationOutput<LumpSumProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let original = registry.get(scenario_id)?.clone();

    if lump_amount < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "lump_amount",
            "Lump sum cannot be negative",
        ));
    }
    if lump_amount >= original.principal() {
        return Err(MortgageError::invalid(
            "lump_amount",
            format!(
                "Lump sum must be less than the principal ({})",
                original.principal()
            ),
        ));
    }
    if lump_amount.is_zero() {
        warnings.push("Lump sum of zero registers an identical scenario".into());
    }

    let revised_terms = original
        .terms()
        .with_principal(original.principal() - lump_amount)?;
    let new_id = registry.add(revised_terms)?;
    let revised = registry.get(new_id)?;

    let projection = LumpSumProjection {
        original_scenario_id: original.id(),
        new_scenario_id: new_id,
        lump_amount,
        original_principal: original.principal(),
        new_principal: revised.principal(),
        original_monthly_payment: original.monthly_payment(),
        new_monthly_payment: revised.monthly_payment(),
        original_total_interest: original.total_interest(),
        new_total_interest: revised.total_interest(),
        interest_saved: lump_sum_savings(&original, revised),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lump-sum principal reduction",
        &serde_json::json!({
            "scenario_id": scenario_id,
            "lump_amount": lump_amount.to_string(),
            "apr": original.apr().to_string(),
            "term_years": original.term_years(),
        }),
        warnings,
        elapsed,
        projection,
    ))
}

/// Nominal lifetime interest avoided by moving from `original` to `revised`.
pub fn lump_sum_savings(original: &LoanScenario, revised: &LoanScenario) -> Money {
    original.total_interest() - revised.total_interest()
}

/// Simulate paying `extra_per_month` on top of the scheduled payment until
/// the balance is cleared, and compare against the unmodified trajectory.
pub fn apply_monthly_overpayment(
    scenario: &LoanScenario,
    extra_per_month: Money,
) -> MortgageResult<ComputationOutput<MonthlyOverpaymentProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if extra_per_month < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "extra_per_month",
            "Monthly overpayment cannot be negative",
        ));
    }

    let rate = monthly_rate(scenario.apr());
    let payment = scenario.monthly_payment();
    let scheduled_months = scenario.terms().total_months();

    let baseline = simulate_payoff(scenario.principal(), rate, payment, scheduled_months, Decimal::ZERO);
    let projected = simulate_payoff(scenario.principal(), rate, payment, scheduled_months, extra_per_month);

    let months_to_payoff = projected.len() as u32;
    if months_to_payoff < scheduled_months {
        debug!(
            scenario_id = scenario.id(),
            months_to_payoff, scheduled_months, "overpayment shortens term"
        );
    }
    if extra_per_month >= scenario.principal() {
        warnings.push("Extra payment clears the loan in the first month".into());
    }

    let baseline_interest = sum_interest(&baseline);
    let projected_interest = sum_interest(&projected);

    let projection = MonthlyOverpaymentProjection {
        scenario_id: scenario.id(),
        extra_per_month,
        scheduled_payment: payment,
        scheduled_months,
        months_to_payoff,
        months_saved: scheduled_months - months_to_payoff,
        baseline_interest: round_currency(baseline_interest),
        projected_interest: round_currency(projected_interest),
        interest_saved: round_currency(baseline_interest - projected_interest),
        schedule: projected,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Recurring principal overpayment with early payoff",
        &serde_json::json!({
            "scenario_id": scenario.id(),
            "extra_per_month": extra_per_month.to_string(),
            "monthly_rate": rate.to_string(),
            "scheduled_payment": payment.to_string(),
        }),
        warnings,
        elapsed,
        projection,
    ))
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Amortise with `extra` added to the principal portion each month. The last
/// scheduled month, or any month the balance can be cleared, settles the
/// outstanding balance exactly and ends the trajectory.
fn simulate_payoff(
    principal: Money,
    rate: Rate,
    payment: Money,
    total_months: u32,
    extra: Money,
) -> Vec<AmortizationEntry> {
    let mut entries = Vec::with_capacity(total_months as usize);
    let mut balance = principal;

    for month in 1..=total_months {
        let interest = balance * rate;
        let mut principal_portion = payment - interest + extra;
        if principal_portion >= balance || month == total_months {
            principal_portion = balance;
        }
        balance -= principal_portion;

        entries.push(AmortizationEntry {
            month_number: month,
            payments_remaining: total_months - month,
            payment_amount: principal_portion + interest,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
        });

        if balance <= Decimal::ZERO {
            break;
        }
    }

    entries
}

fn sum_interest(entries: &[AmortizationEntry]) -> Money {
    entries.iter().map(|e| e.interest_portion).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::LoanTerms;
    use rust_decimal_macros::dec;

    fn registry_with(principal: Money, apr: Decimal, years: u32) -> (ScenarioRegistry, ScenarioId) {
        let mut reg = ScenarioRegistry::new();
        let id = reg.add(LoanTerms::new(principal, apr, years).unwrap()).unwrap();
        (reg, id)
    }

    #[test]
    fn test_lump_sum_creates_new_scenario() {
        let (mut reg, id) = registry_with(dec!(100000), dec!(5), 30);
        let out = apply_lump_sum(&mut reg, id, dec!(20000)).unwrap().result;

        assert_ne!(out.new_scenario_id, id);
        assert_eq!(out.new_principal, dec!(80000));
        assert!(out.new_total_interest < out.original_total_interest);
        assert_eq!(out.interest_saved, out.original_total_interest - out.new_total_interest);
        assert_eq!(reg.get(id).unwrap().principal(), dec!(100000));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_lump_sum_rejects_full_principal() {
        let (mut reg, id) = registry_with(dec!(100000), dec!(5), 30);
        assert!(apply_lump_sum(&mut reg, id, dec!(100000)).unwrap_err().is_domain_error());
        assert!(apply_lump_sum(&mut reg, id, dec!(150000)).is_err());
        assert!(apply_lump_sum(&mut reg, id, dec!(-1)).is_err());
        assert!(apply_lump_sum(&mut reg, id, dec!(99999)).is_ok());
    }

    #[test]
    fn test_lump_sum_leaving_unpayable_principal_rejected() {
        let (mut reg, id) = registry_with(dec!(100000), dec!(5), 30);
        let err = apply_lump_sum(&mut reg, id, dec!(99999.99)).unwrap_err();
        assert!(err.is_domain_error());
        assert_eq!(reg.len(), 1);
        assert!(reg.list_all().iter().all(|s| s.monthly_payment() > Decimal::ZERO));
    }

    #[test]
    fn test_lump_sum_unknown_scenario() {
        let (mut reg, _) = registry_with(dec!(100000), dec!(5), 30);
        assert!(apply_lump_sum(&mut reg, 42, dec!(1000)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_zero_overpayment_matches_term() {
        let (reg, id) = registry_with(dec!(350000), dec!(4.3), 19);
        let out = apply_monthly_overpayment(reg.get(id).unwrap(), Decimal::ZERO)
            .unwrap()
            .result;
        assert_eq!(out.months_to_payoff, 228);
        assert_eq!(out.months_saved, 0);
        assert_eq!(out.interest_saved, Decimal::ZERO);
        assert_eq!(out.schedule.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_shortens_and_saves() {
        let (reg, id) = registry_with(dec!(100000), dec!(5), 30);
        let out = apply_monthly_overpayment(reg.get(id).unwrap(), dec!(200))
            .unwrap()
            .result;
        assert!(out.months_to_payoff < 360);
        assert_eq!(out.months_saved, 360 - out.months_to_payoff);
        assert!(out.interest_saved > Decimal::ZERO);
        assert_eq!(out.schedule.len() as u32, out.months_to_payoff);

        let last = out.schedule.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert!(last.payment_amount <= out.scheduled_payment + dec!(200));
    }

    #[test]
    fn test_larger_overpayment_pays_off_sooner() {
        let (reg, id) = registry_with(dec!(250000), dec!(3.5), 25);
        let s = reg.get(id).unwrap();
        let small = apply_monthly_overpayment(s, dec!(100)).unwrap().result;
        let large = apply_monthly_overpayment(s, dec!(500)).unwrap().result;
        assert!(large.months_to_payoff < small.months_to_payoff);
        assert!(large.interest_saved > small.interest_saved);
    }

    #[test]
    fn test_overpayment_balance_non_increasing() {
        let (reg, id) = registry_with(dec!(180000), dec!(6.1), 20);
        let out = apply_monthly_overpayment(reg.get(id).unwrap(), dec!(350))
            .unwrap()
            .result;
        for pair in out.schedule.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
    }

    #[test]
    fn test_overpayment_clearing_in_first_month_warns() {
        let (reg, id) = registry_with(dec!(10000), dec!(5), 10);
        let out = apply_monthly_overpayment(reg.get(id).unwrap(), dec!(10000)).unwrap();
        assert_eq!(out.result.months_to_payoff, 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_negative_overpayment_rejected() {
        let (reg, id) = registry_with(dec!(100000), dec!(5), 30);
        assert!(apply_monthly_overpayment(reg.get(id).unwrap(), dec!(-50))
            .unwrap_err()
            .is_domain_error());
    }
}
