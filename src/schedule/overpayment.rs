use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::{MortgageError, Result};
use crate::schedule::{LedgerBuilder, RatePhases, ScheduledPayment};

/// balance at or below which the loan counts as repaid
const PAYOFF_THRESHOLD: Money = Money::CENT;

/// schedule with a fixed monthly overpayment
///
/// Each month pays `min(balance + interest, level payment + overpayment)`,
/// rounded to pence, and the loop runs until the balance is within a cent of
/// zero. In the final contracted month the whole remaining balance is paid so
/// the schedule never outruns the original term.
///
/// With no overpayment the level payment is used as-is (no pence rounding),
/// which reproduces the standard schedule row for row.
pub(crate) fn overpayment_payments(terms: &LoanTerms, overpayment: Money) -> Result<Vec<ScheduledPayment>> {
    if overpayment.is_negative() {
        return Err(MortgageError::InvalidOverpayment { amount: overpayment });
    }

    let mut phases = RatePhases::new(terms)?;
    let mut ledger = LedgerBuilder::new(terms.principal(), terms.total_term_months());
    let mut balance = terms.principal();
    let mut month = 1;

    while balance > PAYOFF_THRESHOLD && month <= terms.total_term_months() {
        let phase = phases.for_month(month, balance)?;
        let interest = balance.apply_rate(phase.quote.monthly_rate);

        let payment = if overpayment.is_zero() {
            phase.quote.level_payment
        } else {
            let payoff = balance + interest;
            let due = if month == terms.total_term_months() {
                payoff
            } else {
                payoff.min(phase.quote.level_payment + overpayment)
            };
            due.round_dp(2)
        };

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
    use crate::decimal::Rate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overpayment_reduces_months() {
        let terms = LoanTerms::fixed_only(Money::from_major(300_000), Rate::from_percent(dec!(3.5)), 360).unwrap();
        let payments = overpayment_payments(&terms, Money::from_major(500)).unwrap();

        assert!(payments.len() < 360);
        let last = payments.last().unwrap();
        assert!(last.ending_balance <= PAYOFF_THRESHOLD);
        assert!(last.payment_amount < payments[0].payment_amount);
    }

    #[test]
    fn test_zero_rate_overpayment() {
        let terms = LoanTerms::fixed_only(Money::from_major(12_000), Rate::ZERO, 12).unwrap();
        let payments = overpayment_payments(&terms, Money::from_major(1_000)).unwrap();

        // 1,000 level + 1,000 over clears 12,000 in six months
        assert_eq!(payments.len(), 6);
        assert!(payments.iter().all(|p| p.payment_amount == Money::from_major(2_000)));
        assert_eq!(payments[5].ending_balance, Money::ZERO);
    }

    #[test]
    fn test_negative_overpayment() {
        let terms = LoanTerms::fixed_only(Money::from_major(12_000), Rate::ZERO, 12).unwrap();
        let result = overpayment_payments(&terms, Money::from_major(-5));
        assert!(matches!(result, Err(MortgageError::InvalidOverpayment { .. })));
    }
}
