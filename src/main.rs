// Main module for transaction anomaly detection using a pre-trained
// autoencoder. Orchestrates model loading, CSV scoring, and result presentation.
use std::error::Error;
use std::process::ExitCode;

use batch::{run_batch, BatchSummary, RowOutcome};
use csv_reader::read_transactions;
use model::DenseAutoencoder;
use scorer::{ScalerParams, Scorer, RECONSTRUCTION_ERROR_THRESHOLD};

mod batch;
mod csv_reader;
mod error;
mod model;
mod scorer;

const DEFAULT_MODEL_PATH: &str = "assets/autoencoder_model.json";
const DEFAULT_SCALER_PATH: &str = "assets/scaler_params.json";

// Prints one table line per row outcome
// Inputs: a scored or skipped row
// Outputs: formatted line on stdout
fn print_row(outcome: &RowOutcome) {
    match outcome {
        RowOutcome::Scored(verdict) => {
            let status = if verdict.is_anomaly { "Fraud" } else { "Normal" };
            println!("{:>6}  {:>12.2}  {}", verdict.record, verdict.amount, status);
        }
        RowOutcome::Skipped { record, error } => {
            println!("{:>6}  {:>12}  skipped ({})", record, "-", error);
        }
    }
}

// Prints aggregate counts and percentages for the whole batch
// Inputs: the batch summary
// Outputs: formatted summary on stdout
// Key steps:
// 1. Show scored / skipped totals
// 2. Show the fraud vs normal split as percentages of scored rows
fn print_summary(summary: &BatchSummary) {
    println!("\nBatch Summary:");
    println!("Rows processed: {}", summary.total());
    println!("Rows scored: {}", summary.scored());
    println!("Parse failures: {}", summary.parse_failures);
    println!("Inference failures: {}", summary.inference_failures);

    if summary.scored() > 0 {
        let fraud_pct = summary.anomalous as f64 / summary.scored() as f64 * 100.0;
        println!(
            "Fraud: {} ({:.1}%)  Normal: {} ({:.1}%)",
            summary.anomalous,
            fraud_pct,
            summary.normal,
            100.0 - fraud_pct
        );
    }
}

// Main entry point for the anomaly detection batch
// Inputs: CSV path (argument 1), optional model and scaler paths (2, 3)
// Outputs: per-row verdict table and batch summary; non-zero exit on startup failure
// Key steps:
// 1. Load scaler parameters and the autoencoder model
// 2. Bind them into a Scorer (fatal if they disagree on feature width)
// 3. Read the CSV and score every row on the batch worker
// 4. Print the table and the summary counts
fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let csv_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: anomaly_detection <transactions.csv> [model.json] [scaler.json]");
            return Err("missing CSV path".into());
        }
    };
    let model_path = args.next().unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
    let scaler_path = args.next().unwrap_or_else(|| DEFAULT_SCALER_PATH.to_string());

    // Startup: any failure here is fatal, no scoring happens with partial data
    let params = ScalerParams::from_file(&scaler_path)?;
    let model = DenseAutoencoder::from_file(&model_path)?;
    let scorer = Scorer::new(params, Box::new(model), RECONSTRUCTION_ERROR_THRESHOLD)?;
    log::info!(
        "model loaded: {} features, threshold {}",
        scorer.input_len(),
        RECONSTRUCTION_ERROR_THRESHOLD
    );

    let rows = read_transactions(&csv_path, scorer.input_len())?;
    if rows.is_empty() {
        println!("No transactions found in {}", csv_path);
        return Ok(());
    }

    println!("{:>6}  {:>12}  Status", "Row", "Amount");
    let summary = run_batch(scorer, rows, print_row);

    print_summary(&summary);
    log::info!(
        "batch done: {} fraud, {} normal, {} parse failures, {} inference failures",
        summary.anomalous,
        summary.normal,
        summary.parse_failures,
        summary.inference_failures
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
