// Error taxonomy for the anomaly detector. Startup errors (Config, ModelLoad)
// are fatal; row-level errors (RowParse, Inference) are recovered by the batch
// loop, which skips the row and keeps going.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    // Scaler parameters missing, malformed, or inconsistent with the model
    #[error("scaler configuration error: {0}")]
    Config(String),

    // Model artifact missing, unreadable, or internally inconsistent
    #[error("model load error: {0}")]
    ModelLoad(String),

    // One CSV record could not be turned into a feature vector
    #[error("malformed row: {0}")]
    RowParse(String),

    // Inference failed or returned an unexpected shape for one row
    #[error("inference error: {0}")]
    Inference(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
