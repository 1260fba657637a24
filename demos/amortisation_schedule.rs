/// amortisation schedule - fixed then variable mortgage, exported to csv
use mortgage_ledger_rs::{amortisation_schedule, CsvSink, Money, SafeTimeProvider, ScheduleRequest, TimeSource};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 4.55% fixed for 5 years, 6.99% for the remaining 25
    let request = ScheduleRequest::new(Money::from_major(331_794), dec!(4.55), 30)
        .with_variable_rate(dec!(6.99), 5);

    let time = SafeTimeProvider::new(TimeSource::System);
    let mut sink = CsvSink::in_default_dir(&time);
    let report = amortisation_schedule(&request, &mut sink)?;

    let schedule = report.ledger.schedule();
    for month in [1, 60, 61, 360] {
        if let Some(p) = schedule.get_payment(month) {
            println!(
                "month {:>3}: {} {:>6}%  payment {}  balance {}",
                p.month,
                p.rate_type,
                p.rate.as_percentage(),
                p.payment_amount.round_dp(2),
                p.ending_balance.round_dp(2)
            );
        }
    }

    println!();
    print!("{}", report.summary);

    if let Some(path) = report.exported {
        println!("\nschedule written to {}", path.display());
    }

    Ok(())
}
