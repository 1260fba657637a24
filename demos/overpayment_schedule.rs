/// overpayment schedule - £500 a month on top, compared with the standard schedule
use mortgage_ledger_rs::{overpayment_schedule, ConsoleSink, MemorySink, Money, ScheduleRequest, TabularSink};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let request = ScheduleRequest::new(Money::from_major(331_794), dec!(4.55), 30)
        .with_variable_rate(dec!(6.99), 5)
        .with_overpayment(Money::from_major(500), true);

    // render only the first year to the terminal
    let mut preview = MemorySink::new();
    let report = overpayment_schedule(&request, &mut preview)?;

    if let Some(table) = preview.last() {
        let mut first_year = table.clone();
        first_year.rows.truncate(12);
        ConsoleSink::stdout().write_table("overpayment_schedule", &first_year)?;
    }

    println!();
    print!("{}", report.summary);

    Ok(())
}
