use mortgage_calc_core::amortization::{self, monthly_rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Level payment / nominal interest properties
// ===========================================================================

const LOANS: [(Decimal, Decimal, u32); 6] = [
    (dec!(350000), dec!(4.3), 19),
    (dec!(100000), dec!(5), 30),
    (dec!(80000), dec!(2.75), 10),
    (dec!(1250000), dec!(7.9), 35),
    (dec!(15000), dec!(12.5), 1),
    (dec!(499999.99), dec!(0.5), 40),
];

#[test]
fn test_payment_positive_and_repeatable() {
    for (p, apr, years) in LOANS {
        let first = amortization::monthly_payment(p, apr, years).unwrap();
        let second = amortization::monthly_payment(p, apr, years).unwrap();
        assert!(first > Decimal::ZERO, "payment for {p} @ {apr}% / {years}y");
        assert_eq!(first, second);
    }
}

#[test]
fn test_total_interest_equals_payments_less_principal() {
    for (p, apr, years) in LOANS {
        let pmt = amortization::monthly_payment(p, apr, years).unwrap();
        let ti = amortization::total_interest(p, apr, years).unwrap();
        let expected = Decimal::from(years * 12) * pmt - p;
        assert!(
            (ti - expected).abs() <= dec!(0.000001),
            "total interest {ti} vs {expected}"
        );
    }
}

// ===========================================================================
// Schedule properties
// ===========================================================================

#[test]
fn test_schedule_length_is_term_months_minus_one() {
    for (p, apr, years) in LOANS {
        let schedule = amortization::generate_schedule(p, apr, years).unwrap();
        assert_eq!(schedule.count() as u32, years * 12 - 1);
    }
}

#[test]
fn test_schedule_rows_balance() {
    for (p, apr, years) in LOANS {
        let entries: Vec<_> = amortization::generate_schedule(p, apr, years)
            .unwrap()
            .collect();
        for e in &entries {
            let diff = (e.principal_portion + e.interest_portion - e.payment_amount).abs();
            assert!(diff <= dec!(0.000001), "month {} off by {diff}", e.month_number);
        }
        for pair in entries.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
    }
}

#[test]
fn test_reference_loan_schedule_reconciles_with_total_interest() {
    // 350,000 at 4.3% over 19 years: 227 entries emitted.
    let (p, apr, years) = (dec!(350000), dec!(4.3), 19);
    let entries: Vec<_> = amortization::generate_schedule(p, apr, years)
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 227);

    let total = amortization::total_interest(p, apr, years).unwrap();
    let summed: Decimal = entries.iter().map(|e| e.interest_portion).sum();
    let last_balance = entries.last().unwrap().remaining_balance;
    let final_month_interest = last_balance * monthly_rate(apr);

    // The unmodelled final payment carries one more month of interest; the
    // rest of the gap is the cent rounding of the level payment compounded
    // over the term.
    let gap = (total - (summed + final_month_interest)).abs();
    assert!(gap < dec!(2), "gap between nominal and schedule interest: {gap}");

    // The last emitted balance is roughly one payment away from zero.
    let pmt = amortization::monthly_payment(p, apr, years).unwrap();
    assert!((last_balance - pmt).abs() < dec!(20), "last balance {last_balance}");
}

#[test]
fn test_invalid_inputs_are_domain_errors() {
    let cases = [
        (dec!(0), dec!(5), 30),
        (dec!(-100), dec!(5), 30),
        (dec!(100000), dec!(0), 30),
        (dec!(100000), dec!(100), 30),
        (dec!(100000), dec!(5), 0),
    ];
    for (p, apr, years) in cases {
        assert!(amortization::monthly_payment(p, apr, years).unwrap_err().is_domain_error());
        assert!(amortization::total_interest(p, apr, years).is_err());
        assert!(amortization::generate_schedule(p, apr, years).is_err());
    }
}
