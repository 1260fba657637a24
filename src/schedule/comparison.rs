use serde::Serialize;
use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::errors::{MortgageError, Result};
use crate::schedule::{AmortizationSchedule, ScheduledPayment, SCHEDULE_COLUMNS};
use crate::sink::{Table, Tabular};
use crate::types::TermLength;

/// one month of the standard schedule next to the overpayment schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub month: u32,
    pub standard: ScheduledPayment,
    /// `None` once the overpayment schedule has paid the loan off
    pub overpayment: Option<ScheduledPayment>,
}

/// standard and overpayment schedules left-joined on month
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSchedule {
    standard: AmortizationSchedule,
    overpayment: AmortizationSchedule,
    rows: Vec<ComparisonRow>,
}

impl ComparisonSchedule {
    /// left join on month; the inputs are kept untouched
    pub fn join(standard: AmortizationSchedule, overpayment: AmortizationSchedule) -> Self {
        let mut by_month: BTreeMap<u32, &ScheduledPayment> =
            overpayment.payments().iter().map(|p| (p.month, p)).collect();

        let rows = standard
            .payments()
            .iter()
            .map(|p| ComparisonRow {
                month: p.month,
                standard: p.clone(),
                overpayment: by_month.remove(&p.month).cloned(),
            })
            .collect();

        if !by_month.is_empty() {
            tracing::warn!(
                unmatched = by_month.len(),
                "overpayment schedule runs past the standard schedule; extra months dropped"
            );
        }

        Self {
            standard,
            overpayment,
            rows,
        }
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn standard(&self) -> &AmortizationSchedule {
        &self.standard
    }

    pub fn overpayment(&self) -> &AmortizationSchedule {
        &self.overpayment
    }

    /// months in which the overpayment schedule still has a payment
    pub fn overpayment_months(&self) -> u32 {
        self.rows.iter().filter(|r| r.overpayment.is_some()).count() as u32
    }

    /// payoff term with overpayments, as years and months
    pub fn overpayment_term(&self) -> TermLength {
        TermLength::from_months(self.overpayment_months())
    }

    /// standard lifetime interest minus overpayment lifetime interest
    pub fn interest_savings(&self) -> Result<Money> {
        let standard = self.standard.total_interest().ok_or(MortgageError::EmptyLedger)?;
        let overpaid = self
            .rows
            .iter()
            .rev()
            .find_map(|r| r.overpayment.as_ref())
            .map(|p| p.cumulative_interest)
            .ok_or(MortgageError::EmptyLedger)?;
        Ok(standard - overpaid)
    }
}

impl Tabular for ComparisonSchedule {
    fn to_table(&self) -> Table {
        let value_columns = &SCHEDULE_COLUMNS[1..];
        let mut headers = vec![SCHEDULE_COLUMNS[0].to_string()];
        headers.extend(value_columns.iter().map(|c| format!("{} standard", c)));
        headers.extend(value_columns.iter().map(|c| format!("{} overpayment", c)));

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.month.to_string()];
                cells.extend(row.standard.value_cells());
                match &row.overpayment {
                    Some(p) => cells.extend(p.value_cells()),
                    None => cells.extend(value_columns.iter().map(|_| String::new())),
                }
                cells
            })
            .collect();

        Table::new(headers, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanTerms;
    use crate::decimal::Rate;
    use crate::schedule::ScheduleEngine;
    use rust_decimal_macros::dec;

    fn split_rate_engine() -> ScheduleEngine {
        let terms = LoanTerms::builder()
            .amount(Money::from_major(331_794))
            .fixed_rate(Rate::from_percent(dec!(4.55)))
            .variable_rate(Rate::from_percent(dec!(6.99)))
            .term_years(30)
            .fixed_term_years(5)
            .build()
            .unwrap();
        ScheduleEngine::new(terms)
    }

    #[test]
    fn test_comparison_with_overpayment() {
        let comparison = split_rate_engine().compare(Money::from_major(500)).unwrap();

        assert_eq!(comparison.rows().len(), 360);
        assert!(comparison.overpayment_months() < 360);
        assert_eq!(comparison.overpayment_months() as usize, comparison.overpayment().len());
        assert!(comparison.interest_savings().unwrap() >= Money::ZERO);

        let term = comparison.overpayment_term();
        assert_eq!(term.total_months(), comparison.overpayment_months());

        // rows after payoff carry no overpayment side
        let paid_off = comparison.overpayment_months() as usize;
        assert!(comparison.rows()[paid_off - 1].overpayment.is_some());
        assert!(comparison.rows()[paid_off..].iter().all(|r| r.overpayment.is_none()));
    }

    #[test]
    fn test_interest_savings_matches_schedule_totals() {
        let comparison = split_rate_engine().compare(Money::from_major(250)).unwrap();
        let expected = comparison.standard().total_interest().unwrap()
            - comparison.overpayment().total_interest().unwrap();
        assert_eq!(comparison.interest_savings().unwrap(), expected);
    }

    #[test]
    fn test_zero_overpayment_comparison_has_no_savings() {
        let comparison = split_rate_engine().compare(Money::ZERO).unwrap();
        assert_eq!(comparison.overpayment_months(), 360);
        assert_eq!(comparison.interest_savings().unwrap(), Money::ZERO);
        assert!(comparison.rows().iter().all(|r| r.overpayment.as_ref() == Some(&r.standard)));
    }

    #[test]
    fn test_comparison_table_suffixes_and_blanks() {
        let comparison = split_rate_engine().compare(Money::from_major(500)).unwrap();
        let table = comparison.to_table();

        assert_eq!(table.headers.len(), 21);
        assert_eq!(table.headers[0], "Month");
        assert_eq!(table.headers[1], "Rate standard");
        assert_eq!(table.headers[11], "Rate overpayment");
        assert_eq!(table.headers[20], "Equity overpayment");

        let last = table.rows.last().unwrap();
        assert_eq!(last[0], "360");
        assert!(!last[3].is_empty());
        assert!(last[11..].iter().all(|cell| cell.is_empty()));
    }
}
