use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::http_client::read_location;

pub const MODEL_ARTIFACT_VERSION: u32 = 1;

/// Vector in, scalar out. Evaluated once per player-game.
pub trait ScoringModel {
    /// Ordered feature columns the model was trained on. Empty means the model
    /// takes every feature column of the table in table order.
    fn feature_names(&self) -> &[String];

    fn input_width(&self) -> usize;

    fn score(&self, features: &[f32]) -> std::result::Result<f32, PipelineError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// `weights` is row-major, one row per output unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteModelArtifact {
    pub version: u32,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_means: Vec<f32>,
    #[serde(default)]
    pub feature_stds: Vec<f32>,
    pub layers: Vec<DenseLayer>,
}

/// Small dense network exported as JSON.
#[derive(Debug, Clone)]
pub struct VoteModel {
    artifact: VoteModelArtifact,
    width: usize,
}

impl VoteModel {
    pub fn from_artifact(artifact: VoteModelArtifact) -> std::result::Result<Self, PipelineError> {
        let invalid = |msg: String| -> std::result::Result<Self, PipelineError> {
            Err(PipelineError::InvalidModel(msg))
        };

        if artifact.version != MODEL_ARTIFACT_VERSION {
            return invalid(format!("unsupported version {}", artifact.version));
        }
        let Some(first) = artifact.layers.first() else {
            return invalid("no layers".to_string());
        };
        let width = if artifact.feature_names.is_empty() {
            first.weights.first().map(Vec::len).unwrap_or(0)
        } else {
            artifact.feature_names.len()
        };
        if width == 0 {
            return invalid("zero input width".to_string());
        }
        for (name, v) in [
            ("feature_means", &artifact.feature_means),
            ("feature_stds", &artifact.feature_stds),
        ] {
            if !v.is_empty() && v.len() != width {
                return invalid(format!("{name} has {} entries, expected {width}", v.len()));
            }
        }

        let mut fan_in = width;
        for (idx, layer) in artifact.layers.iter().enumerate() {
            if layer.weights.is_empty() || layer.weights.len() != layer.bias.len() {
                return invalid(format!(
                    "layer {idx}: {} weight rows vs {} biases",
                    layer.weights.len(),
                    layer.bias.len()
                ));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != fan_in) {
                return invalid(format!(
                    "layer {idx}: row of width {} but fan-in is {fan_in}",
                    row.len()
                ));
            }
            fan_in = layer.bias.len();
        }
        if fan_in != 1 {
            return invalid(format!("final layer has {fan_in} outputs, expected 1"));
        }

        Ok(Self { artifact, width })
    }

    pub fn from_json_bytes(bytes: &[u8]) -> std::result::Result<Self, PipelineError> {
        let artifact = serde_json::from_slice::<VoteModelArtifact>(bytes)
            .map_err(|e| PipelineError::InvalidModel(e.to_string()))?;
        Self::from_artifact(artifact)
    }

    fn standardized(&self, idx: usize, x: f32) -> f32 {
        let mean = self.artifact.feature_means.get(idx).copied().unwrap_or(0.0);
        let std = self.artifact.feature_stds.get(idx).copied().unwrap_or(1.0);
        if std.abs() <= f32::EPSILON {
            x - mean
        } else {
            (x - mean) / std
        }
    }
}

impl ScoringModel for VoteModel {
    fn feature_names(&self) -> &[String] {
        &self.artifact.feature_names
    }

    fn input_width(&self) -> usize {
        self.width
    }

    fn score(&self, features: &[f32]) -> std::result::Result<f32, PipelineError> {
        if features.len() != self.width {
            return Err(PipelineError::FeatureWidth {
                expected: self.width,
                found: features.len(),
            });
        }
        let mut activations: Vec<f32> = features
            .iter()
            .enumerate()
            .map(|(idx, x)| self.standardized(idx, *x))
            .collect();
        for layer in &self.artifact.layers {
            activations = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, b)| {
                    let z = row.iter().zip(&activations).map(|(w, a)| w * a).sum::<f32>() + b;
                    layer.activation.apply(z)
                })
                .collect();
        }
        Ok(activations[0])
    }
}

/// Loads a model artifact from a local path or an http(s) URL.
pub fn load_vote_model(location: &str) -> Result<VoteModel> {
    info!("fetching model from {location}");
    let bytes = read_location(location)?;
    let model = VoteModel::from_json_bytes(&bytes)
        .with_context(|| format!("load vote model {location}"))?;
    info!(
        "loaded model with {} inputs and {} layers",
        model.input_width(),
        model.artifact.layers.len()
    );
    Ok(model)
}
