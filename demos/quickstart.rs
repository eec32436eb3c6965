//! Forecast a small sales table twelve months ahead.
//!
//! Run with `cargo run --example quickstart`.

use monthly_forecast::prelude::*;

fn main() -> Result<()> {
    let mut csv = String::from("order_date,delivery_date,sales,price\n");
    for i in 0..36u32 {
        let year = 2021 + i / 12;
        let month = i % 12 + 1;
        let sales = 200.0 + 3.0 * i as f64 + if month == 12 { 60.0 } else { 0.0 };
        let price = 9.5 + (i % 4) as f64 * 0.5;
        csv.push_str(&format!(
            "{year}-{month:02}-03,{year}-{month:02}-11,{sales},{price}\n"
        ));
    }
    // a data-entry error: delivered after the last known order
    csv.push_str("2023-12-20,2024-03-01,5000,10\n");

    let table = RawTable::from_csv_reader(csv.as_bytes())?;
    let selection = ColumnSelection::new("delivery_date", "sales")
        .with_order_delivery("order_date", "delivery_date")
        .with_regressors(["price"]);
    let pipeline = ForecastPipeline::new(selection, PipelineConfig::default());

    let prepared = pipeline.prepare(&table)?;
    for warning in prepared.quality.warnings() {
        println!("warning: {warning}");
    }
    println!(
        "{} months of history, {} damped",
        prepared.aggregated.len(),
        prepared.damped_months.len()
    );

    let report = pipeline.forecast(&prepared)?;
    println!("{:<12} {:>10} {:>10} {:>10}", "ds", "yhat", "lower", "upper");
    for row in report.forecast.core_tail(12) {
        println!(
            "{:<12} {:>10.1} {:>10.1} {:>10.1}",
            row.ds, row.yhat, row.yhat_lower, row.yhat_upper
        );
    }
    println!(
        "in-sample MAE {:.2}, RMSE {:.2}, R^2 {:.3}",
        report.diagnostics.mae, report.diagnostics.rmse, report.diagnostics.r_squared
    );
    Ok(())
}
