use crate::config::LoanTerms;
use crate::errors::Result;
use crate::schedule::{LedgerBuilder, RatePhases, ScheduledPayment};

/// standard level-payment schedule
///
/// Runs for the contracted number of months, stopping early only if the
/// signed balance goes negative. Displayed balances are clamped at zero.
pub(crate) fn standard_payments(terms: &LoanTerms) -> Result<Vec<ScheduledPayment>> {
    let mut phases = RatePhases::new(terms)?;
    let mut ledger = LedgerBuilder::new(terms.principal(), terms.total_term_months());
    let mut balance = terms.principal();
    let mut month = 1;

    while month <= terms.total_term_months() && !balance.is_negative() {
        let phase = phases.for_month(month, balance)?;
        let payment = phase.quote.level_payment;
        let interest = balance.apply_rate(phase.quote.monthly_rate);
        let principal_portion = payment - interest;
        balance -= principal_portion;

        ledger.push(month, &phase, payment, interest, principal_portion, balance);
        month += 1;
    }

    Ok(ledger.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use rust_decimal_macros::dec;

    #[test]
    fn test_first_month_split() {
        let terms = LoanTerms::fixed_only(Money::from_major(330_000), Rate::from_percent(dec!(4.5)), 360).unwrap();
        let payments = standard_payments(&terms).unwrap();
        let first = &payments[0];

        assert_eq!(first.interest_portion, Money::from_major(1_237) + Money::from_minor(50, 2));
        assert_eq!(first.principal_portion, first.payment_amount - first.interest_portion);
        assert_eq!(first.ending_balance, Money::from_major(330_000) - first.principal_portion);
        assert_eq!(first.cumulative_paid, first.payment_amount);
    }

    #[test]
    fn test_interest_declines_each_month() {
        let terms = LoanTerms::fixed_only(Money::from_major(100_000), Rate::from_percentage(12), 12).unwrap();
        let payments = standard_payments(&terms).unwrap();

        for i in 1..payments.len() {
            assert!(payments[i].interest_portion < payments[i - 1].interest_portion);
            assert!(payments[i].principal_portion > payments[i - 1].principal_portion);
        }
    }

    #[test]
    fn test_single_month_term() {
        let terms = LoanTerms::fixed_only(Money::from_major(1_000), Rate::from_percentage(12), 1).unwrap();
        let payments = standard_payments(&terms).unwrap();

        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payment_amount, Money::from_major(1_010));
        assert_eq!(payments[0].ending_balance, Money::ZERO);
    }
}
