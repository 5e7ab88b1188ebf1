//! Compare live job data against the training data and write the drift report as JSON.

// cargo run --release --example drift_report
// cargo run --release --example drift_report -- reference.csv live.csv report.json

use driftscope::{CsvLoader, DriftDetector, JsonIO};
use std::env;
use std::error::Error;
use std::time::SystemTime;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let reference_path = args.get(1).map(String::as_str).unwrap_or("demos/data/job_data.csv");
    let observed_path = args.get(2).map(String::as_str).unwrap_or("demos/data/live_data.csv");
    let report_path = args.get(3).map(String::as_str).unwrap_or("drift_report.json");

    let loader = CsvLoader::new();
    let reference = loader.load_path(reference_path)?;
    let observed = loader.load_path(observed_path)?;
    println!(
        "Reference: {} rows, observed: {} rows, {} columns.",
        reference.n_rows(),
        observed.n_rows(),
        reference.n_columns()
    );

    let start = SystemTime::now();
    let detector = DriftDetector::default();
    let report = detector.detect(&reference, &observed)?;
    println!("Detection took {} ms.", start.elapsed()?.as_millis());

    for result in report.results() {
        println!("{}", result);
    }
    let summary = report.summary();
    println!(
        "{} of {} columns drifted ({:.0}%).",
        summary.drifted_features,
        summary.total_features,
        summary.drift_share() * 100.0
    );

    report.save(report_path)?;
    println!("Report written to {}.", report_path);
    Ok(())
}
