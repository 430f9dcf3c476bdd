// Reads transaction records: N feature fields followed by a trailing Amount
// field. The amount is only carried through for display, never scored.
// The first record is a header and is skipped.
use std::fs::File;
use std::path::Path;
use crate::error::DetectorError;

#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub features: Vec<f64>,
    pub amount: f64,
}

// Reads every data record from the file. The outer Result is fatal (file
// unreadable); each inner Result is one row, so a malformed record becomes a
// RowParse entry at its position instead of aborting the batch. Row numbers
// are positions in the returned vector, 1-based, header excluded.
pub fn read_transactions<P: AsRef<Path>>(
    path: P,
    feature_len: usize,
) -> Result<Vec<Result<TransactionRow, DetectorError>>, DetectorError> {
    let file = File::open(path)?;
    read_transactions_from_reader(file, feature_len)
}

pub fn read_transactions_from_reader<R: std::io::Read>(
    reader: R,
    feature_len: usize,
) -> Result<Vec<Result<TransactionRow, DetectorError>>, DetectorError> {
    // flexible() so short or long records reach our own width check below
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                rows.push(Err(DetectorError::RowParse(e.to_string())));
                continue;
            }
        };
        rows.push(parse_record(&record, feature_len));
    }
    Ok(rows)
}

fn parse_record(
    record: &csv::StringRecord,
    feature_len: usize,
) -> Result<TransactionRow, DetectorError> {
    // N feature columns plus the pass-through amount column
    let expected = feature_len + 1;
    if record.len() != expected {
        return Err(DetectorError::RowParse(format!(
            "expected {} fields, found {}",
            expected,
            record.len()
        )));
    }

    let mut values = Vec::with_capacity(expected);
    for field in record.iter() {
        let value: f64 = field
            .trim()
            .parse()
            .map_err(|_| DetectorError::RowParse(format!("'{}' is not a number", field.trim())))?;
        values.push(value);
    }

    let amount = values[feature_len];
    values.truncate(feature_len);
    Ok(TransactionRow {
        features: values,
        amount,
    })
}
