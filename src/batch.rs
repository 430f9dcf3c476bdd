// Batch orchestration. Scoring runs on a dedicated worker thread so the
// caller's presentation loop never blocks on inference; per-row outcomes
// stream back over a channel in row order.
use std::sync::mpsc;
use std::thread;
use crate::csv_reader::TransactionRow;
use crate::error::DetectorError;
use crate::scorer::Scorer;

#[derive(Debug, Clone)]
pub struct RowVerdict {
    pub record: usize,
    pub amount: f64,
    pub is_anomaly: bool,
}

#[derive(Debug)]
pub enum RowOutcome {
    Scored(RowVerdict),
    Skipped { record: usize, error: DetectorError },
}

// Aggregate counts across the batch. Skipped rows are counted separately from
// verdicts, so anomalous + normal is the number of rows actually scored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub anomalous: usize,
    pub normal: usize,
    pub parse_failures: usize,
    pub inference_failures: usize,
}

impl BatchSummary {
    pub fn scored(&self) -> usize {
        self.anomalous + self.normal
    }

    pub fn total(&self) -> usize {
        self.scored() + self.parse_failures + self.inference_failures
    }
}

// Scores every row and feeds each outcome to the callback as it arrives.
// Inputs: the scorer (moved to the worker and dropped when the batch ends),
//         parsed rows, and a per-row callback for presentation
// Outputs: the aggregate summary
// Key steps:
// 1. Spawn the scoring worker with the scorer and the rows
// 2. Worker scores row by row; a failed row becomes a Skipped outcome and
//    later rows still run (no retries)
// 3. Receive outcomes on the channel, tally them, hand them to the callback
pub fn run_batch<F>(
    scorer: Scorer,
    rows: Vec<Result<TransactionRow, DetectorError>>,
    mut on_row: F,
) -> BatchSummary
where
    F: FnMut(&RowOutcome),
{
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        for (i, row) in rows.into_iter().enumerate() {
            let record = i + 1;
            let outcome = match row {
                Ok(row) => match scorer.is_anomaly(&row.features) {
                    Ok(is_anomaly) => RowOutcome::Scored(RowVerdict {
                        record,
                        amount: row.amount,
                        is_anomaly,
                    }),
                    Err(error) => RowOutcome::Skipped { record, error },
                },
                Err(error) => RowOutcome::Skipped { record, error },
            };
            // receiver gone means the caller stopped listening
            if tx.send(outcome).is_err() {
                break;
            }
        }
    });

    let mut summary = BatchSummary::default();
    for outcome in rx {
        match &outcome {
            RowOutcome::Scored(verdict) => {
                if verdict.is_anomaly {
                    summary.anomalous += 1;
                } else {
                    summary.normal += 1;
                }
            }
            RowOutcome::Skipped { record, error } => {
                log::warn!("row {} skipped: {}", record, error);
                match error {
                    DetectorError::RowParse(_) => summary.parse_failures += 1,
                    _ => summary.inference_failures += 1,
                }
            }
        }
        on_row(&outcome);
    }

    if worker.join().is_err() {
        log::error!("scoring worker panicked");
    }
    summary
}
