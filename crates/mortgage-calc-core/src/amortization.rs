//! Fixed-rate amortisation maths: level monthly payment, nominal lifetime
//! interest, and the month-by-month schedule.
//!
//! Everything here is a pure function of `(principal, apr, term_years)`.
//! The schedule is produced lazily by [`Schedule`]; cloning a schedule
//! before iterating gives an independent replay of the same sequence.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{round_currency, Money, Percent, Rate};
use crate::MortgageResult;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest term accepted. Keeps month counters comfortably inside `u32`.
pub const MAX_TERM_YEARS: u32 = 100;

const HUNDRED: Decimal = dec!(100);
const TWELVE: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One month of an amortisation schedule.
///
/// Values carry full precision; call [`AmortizationEntry::rounded`] for the
/// two-decimal display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month_number: u32,
    pub payments_remaining: u32,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

impl AmortizationEntry {
    /// Copy of this entry with every amount rounded to cents.
    pub fn rounded(&self) -> AmortizationEntry {
        AmortizationEntry {
            month_number: self.month_number,
            payments_remaining: self.payments_remaining,
            payment_amount: round_currency(self.payment_amount),
            principal_portion: round_currency(self.principal_portion),
            interest_portion: round_currency(self.interest_portion),
            remaining_balance: round_currency(self.remaining_balance),
        }
    }
}

/// Totals for one loan year (months 1-12 are year 1, and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub loan_year: u32,
    /// Calendar year of the first payment in this loan year, when a start
    /// date was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_year: Option<i32>,
    pub payments: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub closing_balance: Money,
}

/// Lazy month-by-month schedule for a level-payment loan.
///
/// Emits `term_years * 12 - 1` entries: the final payment that would clear
/// the balance is not modelled, so `payments_remaining` on the last entry
/// is 1 and `remaining_balance` is roughly one payment.
#[derive(Debug, Clone)]
pub struct Schedule {
    rate: Rate,
    payment: Money,
    balance: Money,
    month: u32,
    remaining: u32,
    last_month: u32,
}

impl Schedule {
    pub(crate) fn new(principal: Money, apr: Percent, term_years: u32) -> Self {
        let total_months = term_years * MONTHS_PER_YEAR;
        Schedule {
            rate: monthly_rate(apr),
            payment: level_payment(principal, apr, term_years),
            balance: principal,
            month: 0,
            remaining: total_months,
            last_month: total_months.saturating_sub(1),
        }
    }

    /// Level payment used for every entry.
    pub fn payment(&self) -> Money {
        self.payment
    }

    /// Monthly rate applied to the running balance.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl Iterator for Schedule {
    type Item = AmortizationEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.month >= self.last_month {
            return None;
        }
        self.month += 1;

        let interest = self.balance * self.rate;
        let principal = self.payment - interest;
        self.balance -= principal;
        self.remaining -= 1;

        Some(AmortizationEntry {
            month_number: self.month,
            payments_remaining: self.remaining,
            payment_amount: self.payment,
            principal_portion: principal,
            interest_portion: interest,
            remaining_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.last_month - self.month) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Schedule {}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment, rounded to cents.
///
/// `payment = r * P / (1 - (1 + r)^-(12 * years))` with `r = apr / 100 / 12`.
pub fn monthly_payment(principal: Money, apr: Percent, term_years: u32) -> MortgageResult<Money> {
    validate_loan(principal, apr, term_years)?;
    Ok(level_payment(principal, apr, term_years))
}

/// Nominal lifetime interest: every level payment over the full term, less
/// the principal. Rounded to cents.
pub fn total_interest(principal: Money, apr: Percent, term_years: u32) -> MortgageResult<Money> {
    validate_loan(principal, apr, term_years)?;
    Ok(nominal_interest(principal, apr, term_years))
}

/// Month-by-month schedule. See [`Schedule`] for the length convention.
pub fn generate_schedule(
    principal: Money,
    apr: Percent,
    term_years: u32,
) -> MortgageResult<Schedule> {
    validate_loan(principal, apr, term_years)?;
    Ok(Schedule::new(principal, apr, term_years))
}

/// Convert an APR percentage to the monthly decimal rate.
pub fn monthly_rate(apr: Percent) -> Rate {
    apr / HUNDRED / TWELVE
}

/// Check the preconditions shared by every amortisation function.
pub fn validate_loan(principal: Money, apr: Percent, term_years: u32) -> MortgageResult<()> {
    if principal <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "principal",
            "Principal must be greater than zero",
        ));
    }
    if apr <= Decimal::ZERO || apr >= HUNDRED {
        return Err(MortgageError::invalid(
            "apr",
            "APR must be between 0 and 100 (exclusive)",
        ));
    }
    if term_years == 0 {
        return Err(MortgageError::invalid(
            "term_years",
            "Term must be at least 1 year",
        ));
    }
    if term_years > MAX_TERM_YEARS {
        return Err(MortgageError::invalid(
            "term_years",
            format!("Term must not exceed {MAX_TERM_YEARS} years"),
        ));
    }
    // The cent-rounded payment must exceed the first month's interest or the
    // balance never falls.
    let first_interest = principal * monthly_rate(apr);
    if level_payment(principal, apr, term_years) <= first_interest {
        return Err(MortgageError::invalid(
            "principal",
            "Monthly payment at cent precision does not cover the first month's interest; the loan never amortises",
        ));
    }
    Ok(())
}

/// Interest paid over the first `through_month` entries of a schedule.
pub fn interest_paid_through(entries: &[AmortizationEntry], through_month: u32) -> Money {
    entries
        .iter()
        .take_while(|e| e.month_number <= through_month)
        .map(|e| e.interest_portion)
        .sum()
}

/// Aggregate a schedule into loan years.
///
/// When `first_payment` is given, each year is labelled with the calendar
/// year its first payment falls in.
pub fn yearly_breakdown(
    entries: &[AmortizationEntry],
    first_payment: Option<NaiveDate>,
) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();

    for entry in entries {
        let loan_year = (entry.month_number - 1) / MONTHS_PER_YEAR + 1;
        match years.last_mut() {
            Some(summary) if summary.loan_year == loan_year => {
                summary.payments += 1;
                summary.principal_paid += entry.principal_portion;
                summary.interest_paid += entry.interest_portion;
                summary.closing_balance = entry.remaining_balance;
            }
            _ => years.push(YearSummary {
                loan_year,
                calendar_year: first_payment
                    .and_then(|start| payment_date(start, entry.month_number))
                    .map(|d| d.year()),
                payments: 1,
                principal_paid: entry.principal_portion,
                interest_paid: entry.interest_portion,
                closing_balance: entry.remaining_balance,
            }),
        }
    }

    years
}

/// Date of payment `month_number`, where month 1 falls on `first_payment`.
///
/// Month-end dates clamp to the last day of shorter months.
pub fn payment_date(first_payment: NaiveDate, month_number: u32) -> Option<NaiveDate> {
    let offset = month_number.checked_sub(1)?;
    first_payment.checked_add_months(Months::new(offset))
}

// ---------------------------------------------------------------------------
// Internals (inputs already validated)
// ---------------------------------------------------------------------------

pub(crate) fn level_payment(principal: Money, apr: Percent, term_years: u32) -> Money {
    let rate = monthly_rate(apr);
    let denominator = annuity_denominator(rate, term_years * MONTHS_PER_YEAR);
    (rate * principal)
        .checked_div(denominator)
        .map(round_currency)
        .unwrap_or(Decimal::ZERO)
}

pub(crate) fn nominal_interest(principal: Money, apr: Percent, term_years: u32) -> Money {
    let months = Decimal::from(term_years * MONTHS_PER_YEAR);
    round_currency(months * level_payment(principal, apr, term_years) - principal)
}

/// `1 - (1 + r)^-n`. A growth factor beyond Decimal range discounts to zero.
fn annuity_denominator(rate: Rate, months: u32) -> Decimal {
    let discount = match (Decimal::ONE + rate).checked_powu(u64::from(months)) {
        Some(growth) if !growth.is_zero() => Decimal::ONE / growth,
        _ => Decimal::ZERO,
    };
    Decimal::ONE - discount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.000001);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_monthly_payment_known_answers() {
        assert_eq!(monthly_payment(dec!(100000), dec!(5), 30).unwrap(), dec!(536.82));
        assert_eq!(monthly_payment(dec!(200000), dec!(6), 30).unwrap(), dec!(1199.10));
    }

    #[test]
    fn test_monthly_payment_is_two_decimals() {
        let pmt = monthly_payment(dec!(350000), dec!(4.3), 19).unwrap();
        assert_eq!(pmt, pmt.round_dp(2));
        assert!(pmt > dec!(2240) && pmt < dec!(2260), "got {pmt}");
    }

    #[test]
    fn test_monthly_payment_stable() {
        let a = monthly_payment(dec!(275000), dec!(3.65), 25).unwrap();
        let b = monthly_payment(dec!(275000), dec!(3.65), 25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_monthly_payment_rejects_bad_inputs() {
        assert!(monthly_payment(dec!(0), dec!(5), 30).unwrap_err().is_domain_error());
        assert!(monthly_payment(dec!(-1), dec!(5), 30).is_err());
        assert!(monthly_payment(dec!(100000), dec!(0), 30).is_err());
        assert!(monthly_payment(dec!(100000), dec!(-2), 30).is_err());
        assert!(monthly_payment(dec!(100000), dec!(100), 30).is_err());
        assert!(monthly_payment(dec!(100000), dec!(5), 0).is_err());
        assert!(monthly_payment(dec!(100000), dec!(5), MAX_TERM_YEARS + 1).is_err());
    }

    #[test]
    fn test_extreme_rate_and_term_stay_finite() {
        // (1 + r)^n overflows Decimal; the payment rounds up past interest-only.
        let pmt = monthly_payment(dec!(100000.1), dec!(99.9), MAX_TERM_YEARS).unwrap();
        assert_eq!(pmt, dec!(8325.01));
        let first = generate_schedule(dec!(100000.1), dec!(99.9), MAX_TERM_YEARS)
            .unwrap()
            .next()
            .unwrap();
        assert!(first.principal_portion > Decimal::ZERO);
    }

    #[test]
    fn test_interest_only_payment_rejected() {
        // Payment rounds to exactly the monthly interest.
        let err = monthly_payment(dec!(100000), dec!(99.9), MAX_TERM_YEARS).unwrap_err();
        assert!(err.is_domain_error());
        // Payment rounds to just below the first month's interest.
        assert!(generate_schedule(dec!(100000.1), dec!(30), MAX_TERM_YEARS)
            .unwrap_err()
            .is_domain_error());
        assert!(total_interest(dec!(100000.1), dec!(30), MAX_TERM_YEARS).is_err());
    }

    #[test]
    fn test_tiny_principal_rejected() {
        // A zero payment would leave the balance untouched.
        assert!(monthly_payment(dec!(0.01), dec!(5), 30).unwrap_err().is_domain_error());
        assert!(monthly_payment(dec!(100), dec!(5), 30).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_accepted_long_term_balance_non_increasing() {
        let entries: Vec<_> = generate_schedule(dec!(100000), dec!(5), MAX_TERM_YEARS)
            .unwrap()
            .collect();
        for pair in entries.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
    }

    #[test]
    fn test_total_interest_matches_nominal_formula() {
        let p = dec!(100000);
        let pmt = monthly_payment(p, dec!(5), 30).unwrap();
        let ti = total_interest(p, dec!(5), 30).unwrap();
        assert_close(ti, dec!(360) * pmt - p, TOL, "total interest");
        assert_eq!(ti, dec!(93255.20));
    }

    #[test]
    fn test_schedule_length_quirk() {
        assert_eq!(generate_schedule(dec!(100000), dec!(5), 30).unwrap().count(), 359);
        assert_eq!(generate_schedule(dec!(100000), dec!(5), 1).unwrap().len(), 11);
    }

    #[test]
    fn test_schedule_first_entry() {
        let first = generate_schedule(dec!(100000), dec!(6), 30)
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(first.month_number, 1);
        assert_eq!(first.payments_remaining, 359);
        assert_eq!(first.interest_portion, dec!(500));
        assert_close(first.principal_portion, dec!(99.55), TOL, "principal");
        assert_close(first.remaining_balance, dec!(99900.45), TOL, "balance");
    }

    #[test]
    fn test_schedule_portions_sum_to_payment() {
        for e in generate_schedule(dec!(350000), dec!(4.3), 19).unwrap() {
            assert_close(
                e.principal_portion + e.interest_portion,
                e.payment_amount,
                TOL,
                "portion sum",
            );
        }
    }

    #[test]
    fn test_schedule_balance_non_increasing() {
        let entries: Vec<_> = generate_schedule(dec!(350000), dec!(4.3), 19)
            .unwrap()
            .collect();
        for pair in entries.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
    }

    #[test]
    fn test_schedule_countdown() {
        let entries: Vec<_> = generate_schedule(dec!(50000), dec!(3), 2).unwrap().collect();
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(e.month_number, i as u32 + 1);
            assert_eq!(e.payments_remaining, 24 - (i as u32 + 1));
        }
        assert_eq!(entries.last().unwrap().payments_remaining, 1);
    }

    #[test]
    fn test_schedule_clone_replays() {
        let schedule = generate_schedule(dec!(120000), dec!(4), 10).unwrap();
        let a: Vec<_> = schedule.clone().collect();
        let b: Vec<_> = schedule.collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rounded_entry() {
        let e = generate_schedule(dec!(100000), dec!(4.3), 15)
            .unwrap()
            .next()
            .unwrap()
            .rounded();
        assert_eq!(e.interest_portion, dec!(358.33));
        assert_eq!(e.remaining_balance, e.remaining_balance.round_dp(2));
    }

    #[test]
    fn test_interest_paid_through() {
        let entries: Vec<_> = generate_schedule(dec!(100000), dec!(6), 30).unwrap().collect();
        assert_eq!(interest_paid_through(&entries, 0), Decimal::ZERO);
        assert_eq!(interest_paid_through(&entries, 1), dec!(500));
        let all: Money = entries.iter().map(|e| e.interest_portion).sum();
        assert_eq!(interest_paid_through(&entries, 10_000), all);
    }

    #[test]
    fn test_yearly_breakdown_groups_by_twelve() {
        let entries: Vec<_> = generate_schedule(dec!(100000), dec!(5), 3).unwrap().collect();
        let years = yearly_breakdown(&entries, None);
        assert_eq!(years.len(), 3);
        assert_eq!(years[0].payments, 12);
        assert_eq!(years[2].payments, 11);
        assert!(years[0].interest_paid > years[1].interest_paid);
        assert_eq!(years[2].closing_balance, entries.last().unwrap().remaining_balance);
        assert!(years.iter().all(|y| y.calendar_year.is_none()));
    }

    #[test]
    fn test_yearly_breakdown_calendar_years() {
        let entries: Vec<_> = generate_schedule(dec!(100000), dec!(5), 2).unwrap().collect();
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let years = yearly_breakdown(&entries, Some(start));
        assert_eq!(years[0].calendar_year, Some(2024));
        assert_eq!(years[1].calendar_year, Some(2025));
    }

    #[test]
    fn test_payment_date_clamps_month_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(payment_date(start, 1), Some(start));
        assert_eq!(payment_date(start, 2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(payment_date(start, 13), NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(payment_date(start, 0), None);
    }
}
