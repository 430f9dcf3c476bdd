// Dense autoencoder backend behind the Model trait. The artifact is a JSON
// document listing fully-connected layers; the forward pass is a chain of
// ndarray matrix-vector products with an elementwise activation.
use std::fs::File;
use std::path::Path;
use ndarray::{Array1, Array2};
use serde::Deserialize;
use crate::error::DetectorError;
use crate::scorer::Model;

#[derive(Debug, Deserialize)]
struct LayerSpec {
    // Row-major: weights[out][in]
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    activation: String,
}

#[derive(Debug, Deserialize)]
struct ModelSpec {
    layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone, Copy)]
enum Activation {
    Relu,
    Tanh,
    Sigmoid,
    Linear,
}

impl Activation {
    fn parse(name: &str) -> Result<Self, DetectorError> {
        match name {
            "relu" => Ok(Activation::Relu),
            "tanh" => Ok(Activation::Tanh),
            "sigmoid" => Ok(Activation::Sigmoid),
            "linear" => Ok(Activation::Linear),
            other => Err(DetectorError::ModelLoad(format!(
                "unknown activation '{}'",
                other
            ))),
        }
    }

    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Linear => x,
        }
    }
}

struct Layer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

pub struct DenseAutoencoder {
    layers: Vec<Layer>,
    input_len: usize,
}

impl DenseAutoencoder {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DetectorError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DetectorError::ModelLoad(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, DetectorError> {
        let spec: ModelSpec = serde_json::from_reader(reader)
            .map_err(|e| DetectorError::ModelLoad(format!("invalid model document: {}", e)))?;
        Self::from_spec(spec)
    }

    // Validates layer shapes while building: rows must be rectangular, bias
    // must match the output width, consecutive layers must chain, and the
    // final layer must reproduce the input width (it is an autoencoder).
    fn from_spec(spec: ModelSpec) -> Result<Self, DetectorError> {
        if spec.layers.is_empty() {
            return Err(DetectorError::ModelLoad("model has no layers".to_string()));
        }

        let mut layers = Vec::with_capacity(spec.layers.len());
        let mut prev_out: Option<usize> = None;
        for (i, layer) in spec.layers.into_iter().enumerate() {
            let rows = layer.weights.len();
            if rows == 0 {
                return Err(DetectorError::ModelLoad(format!(
                    "layer {} has an empty weight matrix",
                    i
                )));
            }
            let cols = layer.weights[0].len();
            if cols == 0 || layer.weights.iter().any(|row| row.len() != cols) {
                return Err(DetectorError::ModelLoad(format!(
                    "layer {} weight matrix is not rectangular",
                    i
                )));
            }
            if layer.bias.len() != rows {
                return Err(DetectorError::ModelLoad(format!(
                    "layer {} has {} bias entries for {} outputs",
                    i,
                    layer.bias.len(),
                    rows
                )));
            }
            if let Some(prev) = prev_out {
                if cols != prev {
                    return Err(DetectorError::ModelLoad(format!(
                        "layer {} expects {} inputs but layer {} produces {}",
                        i,
                        cols,
                        i - 1,
                        prev
                    )));
                }
            }
            prev_out = Some(rows);

            let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((rows, cols), flat).map_err(|e| {
                DetectorError::ModelLoad(format!("layer {} weight matrix: {}", i, e))
            })?;
            layers.push(Layer {
                weights,
                bias: Array1::from(layer.bias),
                activation: Activation::parse(&layer.activation)?,
            });
        }

        let input_len = layers[0].weights.ncols();
        let output_len = layers[layers.len() - 1].weights.nrows();
        if output_len != input_len {
            return Err(DetectorError::ModelLoad(format!(
                "autoencoder output width {} does not match input width {}",
                output_len, input_len
            )));
        }

        Ok(DenseAutoencoder { layers, input_len })
    }
}

impl Model for DenseAutoencoder {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn run(&self, input: &[f64]) -> Result<Vec<f64>, DetectorError> {
        if input.len() != self.input_len {
            return Err(DetectorError::Inference(format!(
                "model expects {} inputs, got {}",
                self.input_len,
                input.len()
            )));
        }
        let mut x = Array1::from(input.to_vec());
        for layer in &self.layers {
            x = layer.weights.dot(&x) + &layer.bias;
            x.mapv_inplace(|v| layer.activation.apply(v));
        }
        Ok(x.to_vec())
    }
}
