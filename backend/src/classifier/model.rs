use thiserror::Error;
use tract_onnx::prelude::*;

use super::config::ModelSpec;
use super::preprocess::{self, PreprocessError};

type OnnxPlan = RunnableModel<TypedFact, Box<dyn TypedOp>, TypedModel>;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Preprocessing error: {0}")]
    Preprocessing(#[from] PreprocessError),
    #[error("Model error: {0}")]
    Model(TractError),
    #[error("Model produced an empty output vector")]
    EmptyOutput,
}

// TractError is an anyhow alias, so thiserror's #[from] cannot wrap it.
impl From<TractError> for InferenceError {
    fn from(err: TractError) -> Self {
        InferenceError::Model(err)
    }
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub class_index: usize,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Maximum class probability as a percentage.
    pub fn confidence(&self) -> f32 {
        self.probabilities
            .get(self.class_index)
            .copied()
            .unwrap_or(0.0)
            * 100.0
    }
}

/// One pre-trained classifier: an optimized tract plan pinned to the input
/// shape its export was trained with.
#[derive(Debug)]
pub struct Classifier {
    spec: ModelSpec,
    plan: OnnxPlan,
}

impl Classifier {
    pub fn load(key: &str, spec: &ModelSpec) -> Result<Self, InferenceError> {
        let (width, height) = (spec.input.width as usize, spec.input.height as usize);
        let plan = tract_onnx::onnx()
            .model_for_path(&spec.path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, height, width, 3)),
            )?
            .into_optimized()?
            .into_runnable()?;
        log::info!("Loaded classifier '{}' from {}", key, spec.path);
        Ok(Self {
            spec: spec.clone(),
            plan,
        })
    }

    /// Full per-request sequence: decode, resize/normalize, forward pass,
    /// argmax.
    pub fn predict(&self, image: &[u8]) -> Result<Prediction, InferenceError> {
        let img = preprocess::decode(image)?;
        let tensor = preprocess::to_tensor(&img, &self.spec);
        let result = self.plan.run(tvec!(tensor.into()))?;
        let output = result[0].to_array_view::<f32>()?;

        let mut probabilities: Vec<f32> = output.iter().copied().collect();
        if self.spec.softmax {
            probabilities = softmax(&probabilities);
        }
        let class_index = argmax(&probabilities).ok_or(InferenceError::EmptyOutput)?;
        Ok(Prediction {
            class_index,
            probabilities,
        })
    }
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best = None;
    let mut best_score = f32::NEG_INFINITY;
    for (i, &score) in values.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best = Some(i);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one_and_keeps_argmax() {
        let probs = softmax(&[1.0, 3.0, 0.5]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(argmax(&probs), Some(1));
        assert!(probs[1] > probs[0] && probs[1] > probs[2]);
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn argmax_picks_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), Some(1));
    }

    #[test]
    fn argmax_of_empty_input_is_none() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn confidence_is_max_probability_times_hundred() {
        let prediction = Prediction {
            class_index: 2,
            probabilities: vec![0.1, 0.05, 0.85],
        };
        assert!((prediction.confidence() - 85.0).abs() < 1e-4);
    }

    #[test]
    fn confidence_of_out_of_range_index_is_zero() {
        let prediction = Prediction {
            class_index: 9,
            probabilities: vec![0.5, 0.5],
        };
        assert_eq!(prediction.confidence(), 0.0);
    }
}
