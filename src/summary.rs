use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::{MortgageError, Result};
use crate::format::{format_currency, format_grouped};
use crate::schedule::{AmortizationSchedule, ComparisonSchedule};
use crate::types::TermLength;

const RULE_WIDTH: usize = 30;

/// how the loan is priced over its term
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RateStructure {
    FixedOnly {
        rate: Rate,
    },
    FixedThenVariable {
        fixed_rate: Rate,
        fixed_term: TermLength,
        variable_rate: Rate,
    },
}

impl RateStructure {
    pub fn for_terms(terms: &LoanTerms) -> Self {
        if terms.has_variable_phase() {
            RateStructure::FixedThenVariable {
                fixed_rate: terms.fixed_rate(),
                fixed_term: terms.fixed_term(),
                variable_rate: terms.variable_rate(),
            }
        } else {
            RateStructure::FixedOnly {
                rate: terms.fixed_rate(),
            }
        }
    }
}

/// overpayment-side statistics of a comparison run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub overpayment_repayment_ratio: Decimal,
    pub overpayment_term: TermLength,
    pub interest_savings: Money,
}

/// statistics derived from a finished ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanSummary {
    pub principal: Money,
    pub term: TermLength,
    pub rate_structure: RateStructure,
    pub monthly_overpayment: Money,
    /// total paid per unit borrowed
    pub repayment_ratio: Decimal,
    pub comparison: Option<ComparisonSummary>,
}

fn percent(rate: Rate) -> String {
    format!("{:.2}%", rate.as_percentage().round_dp(2))
}

fn years_phrase(term: TermLength) -> String {
    if term.months == 0 {
        format!("{} years", term.years)
    } else {
        term.to_string()
    }
}

impl LoanSummary {
    /// report lines in display order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            " Loan Summary".to_string(),
            "-".repeat(RULE_WIDTH),
            format!("• Amount: {}", format_currency(self.principal)),
            format!(
                "• Term: {} years ({} months)",
                self.term.years,
                self.term.total_months()
            ),
        ];

        match self.rate_structure {
            RateStructure::FixedOnly { rate } => {
                lines.push(format!("• Fixed Rate: {} (full term)", percent(rate)));
            }
            RateStructure::FixedThenVariable {
                fixed_rate,
                fixed_term,
                variable_rate,
            } => {
                lines.push(format!("• Fixed: {} for {}", percent(fixed_rate), years_phrase(fixed_term)));
                lines.push(format!("• Variable: {} thereafter", percent(variable_rate)));
            }
        }

        if self.monthly_overpayment.is_positive() {
            lines.push(format!(
                "• Monthly Overpayment: {}",
                format_currency(self.monthly_overpayment)
            ));
        }

        lines.push(format!(
            "• Repayment Ratio: £{} for every £1 borrowed",
            format_grouped(self.repayment_ratio)
        ));

        if let Some(comparison) = &self.comparison {
            lines.push(" Comparison Summary:".to_string());
            lines.push(format!(
                "   - Overpayment Repayment Ratio: £{} per £1 borrowed",
                format_grouped(comparison.overpayment_repayment_ratio)
            ));
            lines.push(format!(
                "   - Mortgage Term with Overpayment: {}",
                comparison.overpayment_term
            ));
            lines.push(format!(
                "   - Interest Savings: {}",
                format_currency(comparison.interest_savings)
            ));
        }

        lines
    }
}

impl fmt::Display for LoanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// derives summary statistics from completed ledgers
pub struct SummaryReporter;

impl SummaryReporter {
    fn repayment_ratio(schedule: &AmortizationSchedule) -> Result<Decimal> {
        let total_paid = schedule.total_paid().ok_or(MortgageError::EmptyLedger)?;
        total_paid
            .ratio_to(schedule.terms().principal())
            .ok_or_else(|| MortgageError::DivisionByZero {
                context: "repayment ratio against zero principal".to_string(),
            })
    }

    /// summary of a single standard or overpayment schedule
    pub fn for_schedule(schedule: &AmortizationSchedule) -> Result<LoanSummary> {
        let terms = schedule.terms();
        Ok(LoanSummary {
            principal: terms.principal(),
            term: terms.total_term(),
            rate_structure: RateStructure::for_terms(terms),
            monthly_overpayment: schedule.overpayment(),
            repayment_ratio: Self::repayment_ratio(schedule)?,
            comparison: None,
        })
    }

    /// summary of a comparison run: standard-side figures plus overpayment statistics
    pub fn for_comparison(comparison: &ComparisonSchedule) -> Result<LoanSummary> {
        let mut summary = Self::for_schedule(comparison.standard())?;
        summary.monthly_overpayment = comparison.overpayment().overpayment();
        summary.comparison = Some(ComparisonSummary {
            overpayment_repayment_ratio: Self::repayment_ratio(comparison.overpayment())?,
            overpayment_term: comparison.overpayment_term(),
            interest_savings: comparison.interest_savings()?,
        });
        Ok(summary)
    }
}
