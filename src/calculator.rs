//! Request-level entry points.
//!
//! Each call validates its request, computes the full ledger from scratch,
//! summarises it and hands the finished table to the caller's sink.

use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use std::path::PathBuf;

use crate::balance::{BalanceLedger, BalanceReplay, PaymentSource};
use crate::config::{BalanceRequest, ScheduleRequest};
use crate::errors::Result;
use crate::schedule::{AmortizationSchedule, ComparisonSchedule, ScheduleEngine};
use crate::sink::{Table, Tabular, TabularSink};
use crate::summary::{LoanSummary, SummaryReporter};

pub const AMORTISATION_PRODUCER: &str = "amortisation_schedule";
pub const OVERPAYMENT_PRODUCER: &str = "overpayment_schedule";
pub const BALANCE_PRODUCER: &str = "calculate_balance";

/// ledger produced by a schedule request
#[derive(Debug, Clone, Serialize)]
pub enum ScheduleLedger {
    Single(AmortizationSchedule),
    Comparison(ComparisonSchedule),
}

impl ScheduleLedger {
    /// the schedule actually paid under the request
    pub fn schedule(&self) -> &AmortizationSchedule {
        match self {
            ScheduleLedger::Single(schedule) => schedule,
            ScheduleLedger::Comparison(comparison) => comparison.overpayment(),
        }
    }

    pub fn comparison(&self) -> Option<&ComparisonSchedule> {
        match self {
            ScheduleLedger::Single(_) => None,
            ScheduleLedger::Comparison(comparison) => Some(comparison),
        }
    }
}

impl Tabular for ScheduleLedger {
    fn to_table(&self) -> Table {
        match self {
            ScheduleLedger::Single(schedule) => schedule.to_table(),
            ScheduleLedger::Comparison(comparison) => comparison.to_table(),
        }
    }
}

/// result of a schedule request
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub ledger: ScheduleLedger,
    pub summary: LoanSummary,
    /// file written by the sink, when it writes one
    pub exported: Option<PathBuf>,
}

/// standard amortisation; overpayment fields on the request are ignored
pub fn amortisation_schedule(request: &ScheduleRequest, sink: &mut dyn TabularSink) -> Result<ScheduleReport> {
    let engine = ScheduleEngine::new(request.loan_terms()?);
    let schedule = engine.amortisation()?;
    let summary = SummaryReporter::for_schedule(&schedule)?;
    let ledger = ScheduleLedger::Single(schedule);

    let exported = sink.write_table(AMORTISATION_PRODUCER, &ledger.to_table())?;
    Ok(ScheduleReport {
        ledger,
        summary,
        exported,
    })
}

/// overpayment schedule, or the standard/overpayment comparison when requested
pub fn overpayment_schedule(request: &ScheduleRequest, sink: &mut dyn TabularSink) -> Result<ScheduleReport> {
    let engine = ScheduleEngine::new(request.loan_terms()?);
    let overpayment = request.validated_overpayment()?;

    let (ledger, summary) = if request.compare_with_standard {
        let comparison = engine.compare(overpayment)?;
        let summary = SummaryReporter::for_comparison(&comparison)?;
        (ScheduleLedger::Comparison(comparison), summary)
    } else {
        let schedule = engine.overpayment(overpayment)?;
        let summary = SummaryReporter::for_schedule(&schedule)?;
        (ScheduleLedger::Single(schedule), summary)
    };

    let exported = sink.write_table(OVERPAYMENT_PRODUCER, &ledger.to_table())?;
    Ok(ScheduleReport {
        ledger,
        summary,
        exported,
    })
}

/// replay the csv history at the request's `payment_history_location`
pub fn calculate_balance(
    request: &BalanceRequest,
    time: &SafeTimeProvider,
    sink: &mut dyn TabularSink,
) -> Result<BalanceLedger> {
    calculate_balance_from(request, &request.payment_source(), time, sink)
}

/// replay the payment history in the request's mode
///
/// The source is read once and treated as a snapshot for the whole replay.
pub fn calculate_balance_from(
    request: &BalanceRequest,
    source: &dyn PaymentSource,
    time: &SafeTimeProvider,
    sink: &mut dyn TabularSink,
) -> Result<BalanceLedger> {
    let replay = BalanceReplay::from_request(request, time)?;
    let events = source.payments()?;
    let ledger = replay.run(request.mode(), &events)?;

    if let Some(path) = sink.write_table(BALANCE_PRODUCER, &ledger.to_table())? {
        tracing::debug!(path = %path.display(), "balance ledger exported");
    }
    Ok(ledger)
}
