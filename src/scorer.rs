// Core anomaly scoring: normalize a feature vector, reconstruct it through the
// model, compare the mean squared reconstruction error against a fixed threshold.
use std::fs::File;
use std::path::Path;
use serde::Deserialize;
use crate::error::DetectorError;

// Reconstruction error above this value flags the row as fraud. Ties count as normal.
pub const RECONSTRUCTION_ERROR_THRESHOLD: f64 = 0.5;

// Per-feature normalization parameters exported at training time.
// Loaded once at startup; read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerParams {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| DetectorError::Config(format!("cannot open {}: {}", path.display(), e)))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, DetectorError> {
        let params: ScalerParams = serde_json::from_reader(reader)
            .map_err(|e| DetectorError::Config(format!("invalid scaler document: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    // A bad scaler document must stop startup, never silently truncate.
    fn validate(&self) -> Result<(), DetectorError> {
        if self.mean.is_empty() {
            return Err(DetectorError::Config("mean array is empty".to_string()));
        }
        if self.mean.len() != self.scale.len() {
            return Err(DetectorError::Config(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        for (i, &s) in self.scale.iter().enumerate() {
            if !s.is_finite() || s == 0.0 {
                return Err(DetectorError::Config(format!(
                    "scale[{}] is {} (must be finite and non-zero)",
                    i, s
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }
}

// The opaque inference seam. The scorer only relies on "takes a float vector
// of the model's input width, returns a float vector". Send + Sync so a Scorer
// can move to the batch worker thread; whether a concrete model tolerates
// concurrent callers is that model's own contract.
pub trait Model: Send + Sync {
    fn input_len(&self) -> usize;
    fn run(&self, input: &[f64]) -> Result<Vec<f64>, DetectorError>;
}

// Decides whether a feature vector is anomalous. Holds no mutable state, so
// repeated and shared calls are safe once constructed.
pub struct Scorer {
    params: ScalerParams,
    model: Box<dyn Model>,
    threshold: f64,
}

impl Scorer {
    // Binds scaler, model and threshold together. Fails if the scaler and the
    // model disagree on the feature width.
    pub fn new(
        params: ScalerParams,
        model: Box<dyn Model>,
        threshold: f64,
    ) -> Result<Self, DetectorError> {
        if params.len() != model.input_len() {
            return Err(DetectorError::Config(format!(
                "scaler has {} features but model expects {}",
                params.len(),
                model.input_len()
            )));
        }
        Ok(Scorer {
            params,
            model,
            threshold,
        })
    }

    pub fn input_len(&self) -> usize {
        self.params.len()
    }

    // output[i] = (raw[i] - mean[i]) / scale[i]
    pub fn normalize(&self, raw: &[f64]) -> Result<Vec<f64>, DetectorError> {
        if raw.len() != self.params.len() {
            return Err(DetectorError::Inference(format!(
                "feature vector has {} values, expected {}",
                raw.len(),
                self.params.len()
            )));
        }
        Ok(raw
            .iter()
            .zip(self.params.mean.iter().zip(self.params.scale.iter()))
            .map(|(&x, (&m, &s))| (x - m) / s)
            .collect())
    }

    // Mean squared error over paired elements. Pure; defined only for equal lengths.
    pub fn reconstruction_error(a: &[f64], b: &[f64]) -> Result<f64, DetectorError> {
        if a.len() != b.len() {
            return Err(DetectorError::Inference(format!(
                "reconstruction has {} values, expected {}",
                b.len(),
                a.len()
            )));
        }
        let sum: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).powi(2)).sum();
        Ok(sum / a.len() as f64)
    }

    // normalize -> reconstruct -> error -> compare. Strictly greater than the
    // threshold flags fraud; an error exactly at the threshold is normal.
    pub fn is_anomaly(&self, raw: &[f64]) -> Result<bool, DetectorError> {
        let scaled = self.normalize(raw)?;
        let reconstructed = self.model.run(&scaled)?;
        let error = Self::reconstruction_error(&scaled, &reconstructed)?;
        log::debug!("reconstruction error {:.6} (threshold {})", error, self.threshold);
        Ok(error > self.threshold)
    }
}
