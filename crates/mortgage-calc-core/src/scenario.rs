use serde::{Deserialize, Serialize};

use crate::amortization::{self, Schedule};
use crate::types::{format_currency, Money, Percent, ScenarioId};
use crate::MortgageResult;

/// Validated loan parameters: principal, APR (as a percentage) and term.
///
/// Construction is the only way to obtain a value, so holders can rely on
/// `principal > 0`, `0 < apr < 100` and `term_years >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLoanTerms")]
pub struct LoanTerms {
    principal: Money,
    apr: Percent,
    term_years: u32,
}

#[derive(Deserialize)]
struct RawLoanTerms {
    principal: Money,
    apr: Percent,
    term_years: u32,
}

impl TryFrom<RawLoanTerms> for LoanTerms {
    type Error = crate::MortgageError;

    fn try_from(raw: RawLoanTerms) -> Result<Self, Self::Error> {
        LoanTerms::new(raw.principal, raw.apr, raw.term_years)
    }
}

impl LoanTerms {
    pub fn new(principal: Money, apr: Percent, term_years: u32) -> MortgageResult<Self> {
        amortization::validate_loan(principal, apr, term_years)?;
        Ok(LoanTerms {
            principal,
            apr,
            term_years,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn apr(&self) -> Percent {
        self.apr
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn total_months(&self) -> u32 {
        self.term_years * amortization::MONTHS_PER_YEAR
    }

    /// Same rate and term with a different principal.
    pub fn with_principal(&self, principal: Money) -> MortgageResult<Self> {
        LoanTerms::new(principal, self.apr, self.term_years)
    }
}

/// Fixed-order comparison row for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub id: ScenarioId,
    pub principal: String,
    pub apr: String,
    pub term_years: u32,
    pub monthly_payment: String,
    pub total_interest: String,
}

/// One registered set of loan terms. Immutable once created; revisions are
/// new scenarios with their own id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanScenario {
    id: ScenarioId,
    terms: LoanTerms,
}

impl LoanScenario {
    /// Only the registry mints scenarios, so ids stay unique.
    pub(crate) fn new(id: ScenarioId, terms: LoanTerms) -> Self {
        LoanScenario { id, terms }
    }

    pub fn id(&self) -> ScenarioId {
        self.id
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn principal(&self) -> Money {
        self.terms.principal
    }

    pub fn apr(&self) -> Percent {
        self.terms.apr
    }

    pub fn term_years(&self) -> u32 {
        self.terms.term_years
    }

    pub fn monthly_payment(&self) -> Money {
        amortization::level_payment(self.principal(), self.apr(), self.term_years())
    }

    pub fn total_interest(&self) -> Money {
        amortization::nominal_interest(self.principal(), self.apr(), self.term_years())
    }

    /// Fresh lazy schedule for this scenario.
    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.principal(), self.apr(), self.term_years())
    }

    pub fn summary_row(&self) -> SummaryRow {
        SummaryRow {
            id: self.id,
            principal: format_currency(self.principal()),
            apr: format!("{}%", self.apr().normalize()),
            term_years: self.term_years(),
            monthly_payment: format_currency(self.monthly_payment()),
            total_interest: format_currency(self.total_interest()),
        }
    }

    /// Multi-line human description of the scenario's inputs.
    pub fn details(&self) -> String {
        format!(
            "MORTGAGE {}:\nPrincipal: {}\nLength of Mortgage: {} years\nAnnual Percentage Rate: {}%",
            self.id,
            format_currency(self.principal()),
            self.term_years(),
            self.apr().normalize()
        )
    }

    /// Whether this scenario costs less interest over its life than `other`.
    pub fn is_cheaper_than(&self, other: &LoanScenario) -> bool {
        self.total_interest() < other.total_interest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn scenario() -> LoanScenario {
        LoanScenario::new(1, LoanTerms::new(dec!(100000), dec!(5), 30).unwrap())
    }

    #[test]
    fn test_terms_validation() {
        assert!(LoanTerms::new(dec!(100000), dec!(5), 30).is_ok());
        assert!(LoanTerms::new(dec!(0), dec!(5), 30).is_err());
        assert!(LoanTerms::new(dec!(100000), dec!(0), 30).is_err());
        assert!(LoanTerms::new(dec!(100000), dec!(100), 30).is_err());
        assert!(LoanTerms::new(dec!(100000), dec!(5), 0).is_err());
    }

    #[test]
    fn test_terms_deserialize_validates() {
        let ok: LoanTerms =
            serde_json::from_str(r#"{"principal":"250000","apr":"4.3","term_years":25}"#).unwrap();
        assert_eq!(ok.total_months(), 300);

        let bad = serde_json::from_str::<LoanTerms>(
            r#"{"principal":"-5","apr":"4.3","term_years":25}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_scenario_metrics_delegate_to_math() {
        let s = scenario();
        assert_eq!(s.monthly_payment(), dec!(536.82));
        assert_eq!(s.total_interest(), dec!(93255.20));
        assert_eq!(s.schedule().len(), 359);
    }

    #[test]
    fn test_summary_row() {
        assert_eq!(
            scenario().summary_row(),
            SummaryRow {
                id: 1,
                principal: "€100,000.00".into(),
                apr: "5%".into(),
                term_years: 30,
                monthly_payment: "€536.82".into(),
                total_interest: "€93,255.20".into(),
            }
        );
    }

    #[test]
    fn test_details() {
        let text = scenario().details();
        assert!(text.starts_with("MORTGAGE 1:"));
        assert!(text.contains("30 years"));
        assert!(text.contains("5%"));
    }

    #[test]
    fn test_is_cheaper_than() {
        let a = scenario();
        let b = LoanScenario::new(2, LoanTerms::new(dec!(100000), dec!(5), 15).unwrap());
        assert!(b.is_cheaper_than(&a));
        assert!(!a.is_cheaper_than(&b));
    }
}
