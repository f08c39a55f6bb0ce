//! Typed views over the payloads the backend documents.
//!
//! The client itself hands back opaque JSON. These structs are for callers
//! that want to read the well-known fields without indexing into `Value`s.
//! Unknown fields are ignored and most known ones are optional, since the
//! backend adds and drops metrics between architectures.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ClientError;

/// One entry of the architecture list (`GET /{version}/archs/...`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArchitecture {
    pub model: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub map_val: Option<MapValues>,
    #[serde(default)]
    pub speed: Option<SpeedProfile>,
    /// Parameter count in millions. Sent as either a number or a string.
    #[serde(default, deserialize_with = "number_or_string")]
    pub params_m: Option<f64>,
    /// FLOPs in billions.
    #[serde(default, deserialize_with = "number_or_string")]
    pub flops_b: Option<f64>,
}

/// mAP on the validation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValues {
    #[serde(default)]
    pub val_50: Option<f64>,
    #[serde(default)]
    pub val_50_59: Option<f64>,
}

/// Inference latency in milliseconds per hardware/batch combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    #[serde(default)]
    pub cpu_b1: Option<f64>,
    #[serde(default)]
    pub v100_b1: Option<f64>,
    #[serde(default)]
    pub v100_b32: Option<f64>,
}

/// One step of a training run (`GET /{version}/track/...`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStep {
    pub step: u64,
    #[serde(default)]
    pub train: Option<LossBreakdown>,
    #[serde(default)]
    pub metrics: Option<EvalMetrics>,
    #[serde(default)]
    pub val: Option<LossBreakdown>,
    /// Learning rates per parameter group.
    #[serde(default)]
    pub x: Option<LearningRates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LossBreakdown {
    #[serde(default)]
    pub box_loss: f64,
    #[serde(default)]
    pub obj_loss: f64,
    #[serde(default)]
    pub cls_loss: f64,
}

impl LossBreakdown {
    pub fn total(&self) -> f64 {
        self.box_loss + self.obj_loss + self.cls_loss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalMetrics {
    #[serde(default)]
    pub precision: f64,
    #[serde(default)]
    pub recall: f64,
    #[serde(default)]
    pub map_0_5: f64,
    #[serde(default)]
    pub map_0_5_0_95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LearningRates {
    #[serde(default)]
    pub lr0: f64,
    #[serde(default)]
    pub lr1: f64,
    #[serde(default)]
    pub lr2: f64,
}

impl ModelArchitecture {
    /// Reads the `data` array returned by `list_models`.
    pub fn list_from(data: &Value) -> Result<Vec<Self>, ClientError> {
        Ok(Vec::<Self>::deserialize(data)?)
    }
}

impl TrainStep {
    /// Reads the `data` array returned by `train_details`.
    pub fn list_from(data: &Value) -> Result<Vec<Self>, ClientError> {
        Ok(Vec::<Self>::deserialize(data)?)
    }
}

/// Returns the step with the best `map_0_5_0_95`, if any step reported metrics.
pub fn best_step(steps: &[TrainStep]) -> Option<&TrainStep> {
    steps
        .iter()
        .filter(|s| s.metrics.is_some())
        .max_by(|a, b| {
            let a = a.metrics.map(|m| m.map_0_5_0_95).unwrap_or_default();
            let b = b.metrics.map(|m| m.map_0_5_0_95).unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
