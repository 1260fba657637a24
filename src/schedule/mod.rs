pub mod amortization;
pub mod comparison;
pub mod overpayment;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::format::{format_amount, format_percent, format_rate};
use crate::interest::{QuoteCache, RateQuote};
use crate::sink::{Table, Tabular};
use crate::types::{RateType, TermLength};

pub use comparison::{ComparisonRow, ComparisonSchedule};

/// column names shared by every schedule table
pub const SCHEDULE_COLUMNS: [&str; 11] = [
    "Month",
    "Rate",
    "Rate type",
    "Payment",
    "Interest charged",
    "Principal repaid",
    "Paid to date",
    "Interest charged to date",
    "Principal repaid to date",
    "Loan balance",
    "Equity",
];

/// one month of an amortisation or overpayment schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledPayment {
    pub month: u32,
    pub rate: Rate,
    pub rate_type: RateType,
    pub payment_amount: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub cumulative_paid: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
    /// remaining balance, clamped at zero
    pub ending_balance: Money,
    /// cumulative principal / original principal
    pub equity: Decimal,
}

impl ScheduledPayment {
    /// display cells for every column after `Month`
    pub(crate) fn value_cells(&self) -> Vec<String> {
        vec![
            format_rate(self.rate),
            self.rate_type.to_string(),
            format_amount(self.payment_amount),
            format_amount(self.interest_portion),
            format_amount(self.principal_portion),
            format_amount(self.cumulative_paid),
            format_amount(self.cumulative_interest),
            format_amount(self.cumulative_principal),
            format_amount(self.ending_balance),
            format_percent(self.equity),
        ]
    }
}

/// a completed schedule: the loan it was run for plus its rows
#[derive(Debug, Clone, Serialize)]
pub struct AmortizationSchedule {
    terms: LoanTerms,
    overpayment: Money,
    payments: Vec<ScheduledPayment>,
}

impl AmortizationSchedule {
    pub(crate) fn new(terms: LoanTerms, overpayment: Money, payments: Vec<ScheduledPayment>) -> Self {
        Self {
            terms,
            overpayment,
            payments,
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// monthly overpayment this schedule was run with (zero for standard)
    pub fn overpayment(&self) -> Money {
        self.overpayment
    }

    pub fn payments(&self) -> &[ScheduledPayment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// get payment for a specific month (1-based)
    pub fn get_payment(&self, month: u32) -> Option<&ScheduledPayment> {
        month
            .checked_sub(1)
            .and_then(|idx| self.payments.get(idx as usize))
    }

    pub fn last(&self) -> Option<&ScheduledPayment> {
        self.payments.last()
    }

    pub fn total_paid(&self) -> Option<Money> {
        self.last().map(|p| p.cumulative_paid)
    }

    pub fn total_interest(&self) -> Option<Money> {
        self.last().map(|p| p.cumulative_interest)
    }

    pub fn final_balance(&self) -> Option<Money> {
        self.last().map(|p| p.ending_balance)
    }

    /// months until payoff as years and months
    pub fn term(&self) -> TermLength {
        TermLength::from_months(self.payments.len() as u32)
    }
}

impl Tabular for AmortizationSchedule {
    fn to_table(&self) -> Table {
        let headers = SCHEDULE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = self
            .payments
            .iter()
            .map(|p| {
                let mut cells = vec![p.month.to_string()];
                cells.extend(p.value_cells());
                cells
            })
            .collect();
        Table::new(headers, rows)
    }
}

/// rate period in force for one month
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActivePhase {
    pub rate_type: RateType,
    pub rate: Rate,
    pub quote: RateQuote,
}

/// fixed -> variable state machine over the month index
///
/// The variable quote is priced once, lazily, from the balance carried out of
/// the fixed period and reused for every later month.
pub(crate) struct RatePhases<'a> {
    terms: &'a LoanTerms,
    cache: QuoteCache,
    fixed: RateQuote,
    variable: Option<RateQuote>,
}

impl<'a> RatePhases<'a> {
    pub fn new(terms: &'a LoanTerms) -> Result<Self> {
        let mut cache = QuoteCache::new();
        let fixed = cache.quote(terms.principal(), terms.fixed_rate(), terms.total_term_months())?;
        Ok(Self {
            terms,
            cache,
            fixed,
            variable: None,
        })
    }

    pub fn for_month(&mut self, month: u32, balance: Money) -> Result<ActivePhase> {
        if !self.terms.has_variable_phase() || month <= self.terms.fixed_term_months() {
            return Ok(ActivePhase {
                rate_type: RateType::Fixed,
                rate: self.terms.fixed_rate(),
                quote: self.fixed,
            });
        }

        let quote = match self.variable {
            Some(quote) => quote,
            None => {
                let quote = self.cache.quote(
                    balance,
                    self.terms.variable_rate(),
                    self.terms.variable_term_months(),
                )?;
                tracing::debug!(
                    month,
                    carried_balance = %balance,
                    level_payment = %quote.level_payment,
                    "fixed period ended, switching to variable rate"
                );
                self.variable = Some(quote);
                quote
            }
        };

        Ok(ActivePhase {
            rate_type: RateType::Variable,
            rate: self.terms.variable_rate(),
            quote,
        })
    }
}

/// running totals and row assembly shared by both schedule loops
pub(crate) struct LedgerBuilder {
    principal: Money,
    cumulative_paid: Money,
    cumulative_interest: Money,
    cumulative_principal: Money,
    rows: Vec<ScheduledPayment>,
}

impl LedgerBuilder {
    pub fn new(principal: Money, capacity: u32) -> Self {
        Self {
            principal,
            cumulative_paid: Money::ZERO,
            cumulative_interest: Money::ZERO,
            cumulative_principal: Money::ZERO,
            rows: Vec::with_capacity(capacity as usize),
        }
    }

    pub fn push(
        &mut self,
        month: u32,
        phase: &ActivePhase,
        payment: Money,
        interest: Money,
        principal_portion: Money,
        balance: Money,
    ) {
        self.cumulative_paid += payment;
        self.cumulative_interest += interest;
        self.cumulative_principal += principal_portion;

        let equity = (self.cumulative_principal.as_decimal() / self.principal.as_decimal())
            .max(Decimal::ZERO)
            .min(Decimal::ONE);

        self.rows.push(ScheduledPayment {
            month,
            rate: phase.rate,
            rate_type: phase.rate_type,
            payment_amount: payment,
            interest_portion: interest,
            principal_portion,
            cumulative_paid: self.cumulative_paid,
            cumulative_interest: self.cumulative_interest,
            cumulative_principal: self.cumulative_principal,
            ending_balance: balance.max(Money::ZERO),
            equity,
        });
    }

    pub fn finish(self) -> Vec<ScheduledPayment> {
        self.rows
    }
}

/// schedule engine for one set of loan terms
///
/// Every call recomputes from the terms; nothing is carried between calls.
#[derive(Debug, Clone)]
pub struct ScheduleEngine {
    terms: LoanTerms,
}

impl ScheduleEngine {
    pub fn new(terms: LoanTerms) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// standard schedule: level payments for the full term
    pub fn amortisation(&self) -> Result<AmortizationSchedule> {
        let payments = amortization::standard_payments(&self.terms)?;
        let schedule = AmortizationSchedule::new(self.terms.clone(), Money::ZERO, payments);
        tracing::info!(
            months = schedule.len(),
            total_interest = %schedule.total_interest().unwrap_or(Money::ZERO),
            "amortisation schedule complete"
        );
        Ok(schedule)
    }

    /// schedule with a fixed monthly overpayment on top of the level payment
    pub fn overpayment(&self, overpayment: Money) -> Result<AmortizationSchedule> {
        let payments = overpayment::overpayment_payments(&self.terms, overpayment)?;
        let schedule = AmortizationSchedule::new(self.terms.clone(), overpayment, payments);
        tracing::info!(
            months = schedule.len(),
            overpayment = %overpayment,
            total_interest = %schedule.total_interest().unwrap_or(Money::ZERO),
            "overpayment schedule complete"
        );
        Ok(schedule)
    }

    /// standard and overpayment schedules joined by month
    pub fn compare(&self, overpayment: Money) -> Result<ComparisonSchedule> {
        let standard = self.amortisation()?;
        let overpaid = self.overpayment(overpayment)?;
        Ok(ComparisonSchedule::join(standard, overpaid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine(principal: i64, fixed: Decimal, variable: Decimal, years: u32, fixed_years: u32) -> ScheduleEngine {
        let terms = LoanTerms::builder()
            .amount(Money::from_major(principal))
            .fixed_rate(Rate::from_percent(fixed))
            .variable_rate(Rate::from_percent(variable))
            .term_years(years)
            .fixed_term_years(fixed_years)
            .build()
            .unwrap();
        ScheduleEngine::new(terms)
    }

    fn assert_ledger_invariants(schedule: &AmortizationSchedule) {
        let principal = schedule.terms().principal();
        let last = schedule.last().unwrap();

        assert!(last.cumulative_paid >= principal);
        assert!((last.cumulative_principal - principal).abs() <= Money::CENT);
        assert!((last.equity - Decimal::ONE).abs() <= dec!(0.001));

        for pair in schedule.payments().windows(2) {
            assert!(pair[1].ending_balance <= pair[0].ending_balance);
            assert!(pair[1].equity >= pair[0].equity);
            assert_eq!(pair[1].month, pair[0].month + 1);
        }
    }

    #[test]
    fn test_fixed_rate_thirty_years() {
        let schedule = engine(330_000, dec!(4.5), Decimal::ZERO, 30, 0).amortisation().unwrap();

        assert_eq!(schedule.len(), 360);
        assert_eq!(schedule.get_payment(1).unwrap().month, 1);
        assert!(schedule.get_payment(0).is_none());
        assert!(schedule.get_payment(361).is_none());

        for pair in schedule.payments().windows(2) {
            assert!(pair[1].ending_balance < pair[0].ending_balance);
        }
        assert_eq!(schedule.final_balance().unwrap().round_dp(2), Money::ZERO);

        // level payment is constant every month
        let level = schedule.payments()[0].payment_amount;
        assert!(schedule.payments().iter().all(|p| p.payment_amount == level));
        assert!(schedule.payments().iter().all(|p| p.rate_type == RateType::Fixed));

        assert_ledger_invariants(&schedule);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let schedule = engine(120_000, Decimal::ZERO, Decimal::ZERO, 20, 0).amortisation().unwrap();

        assert_eq!(schedule.len(), 240);
        for payment in schedule.payments() {
            assert_eq!(payment.payment_amount, Money::from_major(500));
            assert_eq!(payment.interest_portion, Money::ZERO);
        }
        assert_eq!(schedule.final_balance(), Some(Money::ZERO));
        assert_eq!(schedule.total_paid(), Some(Money::from_major(120_000)));
        assert_ledger_invariants(&schedule);
    }

    #[test]
    fn test_fixed_then_variable_switches_once() {
        let schedule = engine(331_794, dec!(4.55), dec!(6.99), 30, 5).amortisation().unwrap();
        assert_eq!(schedule.len(), 360);

        let fixed_payment = schedule.get_payment(60).unwrap();
        let first_variable = schedule.get_payment(61).unwrap();
        assert_eq!(fixed_payment.rate_type, RateType::Fixed);
        assert_eq!(fixed_payment.rate, Rate::from_percent(dec!(4.55)));
        assert_eq!(first_variable.rate_type, RateType::Variable);
        assert_eq!(first_variable.rate, Rate::from_percent(dec!(6.99)));

        // higher rate on the remaining balance raises the payment, priced once
        assert!(first_variable.payment_amount > fixed_payment.payment_amount);
        for payment in &schedule.payments()[60..] {
            assert_eq!(payment.payment_amount, first_variable.payment_amount);
        }

        // variable payment amortises the carried balance over the remaining 300 months
        let expected = crate::interest::quote(
            fixed_payment.ending_balance,
            Rate::from_percent(dec!(6.99)),
            300,
        )
        .unwrap();
        assert_eq!(first_variable.payment_amount, expected.level_payment);

        assert_eq!(schedule.final_balance().unwrap().round_dp(2), Money::ZERO);
        assert_ledger_invariants(&schedule);
    }

    #[test]
    fn test_variable_rate_from_first_month() {
        let schedule = engine(200_000, dec!(3), dec!(5), 25, 0).amortisation().unwrap();
        assert!(schedule.payments().iter().all(|p| p.rate_type == RateType::Variable));
        assert_ledger_invariants(&schedule);
    }

    #[test]
    fn test_zero_overpayment_matches_standard_rows() {
        let engine = engine(300_000, dec!(3.5), Decimal::ZERO, 30, 5);
        let standard = engine.amortisation().unwrap();
        let overpaid_by_zero = engine.overpayment(Money::ZERO).unwrap();

        assert_eq!(standard.len(), overpaid_by_zero.len());
        assert_eq!(standard.payments(), overpaid_by_zero.payments());
    }

    #[test]
    fn test_zero_overpayment_matches_standard_rows_with_variable_phase() {
        let engine = engine(331_794, dec!(4.55), dec!(6.99), 30, 5);
        let standard = engine.amortisation().unwrap();
        let overpaid_by_zero = engine.overpayment(Money::ZERO).unwrap();
        assert_eq!(standard.payments(), overpaid_by_zero.payments());
    }

    #[test]
    fn test_overpayment_shortens_term() {
        let engine = engine(300_000, dec!(3.5), Decimal::ZERO, 30, 0);
        let standard = engine.amortisation().unwrap();
        let overpaid = engine.overpayment(Money::from_major(100)).unwrap();

        assert!(overpaid.len() < standard.len());
        assert!(overpaid.total_interest().unwrap() < standard.total_interest().unwrap());
        assert!(overpaid.final_balance().unwrap() <= Money::CENT);
        assert_ledger_invariants(&overpaid);

        // every payment before the last is cent-quantised and includes the overpayment
        let level = standard.payments()[0].payment_amount;
        for payment in &overpaid.payments()[..overpaid.len() - 1] {
            assert_eq!(payment.payment_amount, payment.payment_amount.round_dp(2));
            assert_eq!(payment.payment_amount, (level + Money::from_major(100)).round_dp(2));
        }

        // final payment is capped at what is owed
        let last = overpaid.last().unwrap();
        assert!(last.payment_amount <= (level + Money::from_major(100)).round_dp(2));
    }

    #[test]
    fn test_tiny_overpayment_still_finishes_within_term() {
        let engine = engine(300_000, dec!(3.5), Decimal::ZERO, 30, 0);
        let overpaid = engine.overpayment(Money::from_str_exact("0.001").unwrap()).unwrap();
        assert!(overpaid.len() <= 360);
        assert!(overpaid.final_balance().unwrap() <= Money::CENT);
    }

    #[test]
    fn test_overpayment_larger_than_balance_pays_off_in_one_month() {
        let engine = engine(10_000, dec!(5), Decimal::ZERO, 10, 0);
        let overpaid = engine.overpayment(Money::from_major(50_000)).unwrap();

        assert_eq!(overpaid.len(), 1);
        let only = overpaid.last().unwrap();
        let owed = Money::from_major(10_000) + Money::from_major(10_000).apply_rate(Rate::from_percentage(5).monthly_rate());
        assert_eq!(only.payment_amount, owed.round_dp(2));
        assert_eq!(only.ending_balance.round_dp(2), Money::ZERO);
    }

    #[test]
    fn test_overpayment_reprices_variable_leg_from_lower_balance() {
        let engine = engine(331_794, dec!(4.55), dec!(6.99), 30, 5);
        let standard = engine.amortisation().unwrap();
        let overpaid = engine.overpayment(Money::from_major(500)).unwrap();

        let standard_variable = standard.get_payment(61).unwrap().payment_amount;
        let overpaid_variable = overpaid.get_payment(61).unwrap().payment_amount;
        // 500 overpayment on top of a smaller level payment
        assert!(overpaid_variable < standard_variable + Money::from_major(500));
        assert_eq!(overpaid.get_payment(61).unwrap().rate_type, RateType::Variable);
        assert_ledger_invariants(&overpaid);
    }

    #[test]
    fn test_negative_overpayment_rejected() {
        let engine = engine(100_000, dec!(4), Decimal::ZERO, 25, 0);
        assert!(engine.overpayment(Money::from_major(-1)).is_err());
    }

    #[test]
    fn test_schedule_table_columns() {
        let schedule = engine(100_000, dec!(4), Decimal::ZERO, 1, 0).amortisation().unwrap();
        let table = schedule.to_table();

        assert_eq!(table.headers.len(), SCHEDULE_COLUMNS.len());
        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.rows[0][0], "1");
        assert_eq!(table.rows[0][1], "4.00");
        assert_eq!(table.rows[0][2], "Fixed");
        assert_eq!(table.rows[0][4], "333.33");
        assert_eq!(table.rows[11][9], "0.00");
        assert_eq!(table.rows[11][10], "100.00%");
    }
}
