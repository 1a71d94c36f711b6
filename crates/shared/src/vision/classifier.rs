use std::path::{Path, PathBuf};

use thiserror::Error;
use tract_onnx::prelude::*;

use super::preprocess::{INPUT_SHAPE, ImageTensor};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model file not found at {0}")]
    MissingModel(PathBuf),
    #[error("failed to load model: {0}")]
    Load(String),
    #[error("model outputs {actual} classes but the label table has {expected}")]
    OutputWidth { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Scores one preprocessed image, returning one score per class.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError>;
}

/// Runs an ONNX export of the trained network on the CPU.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxClassifier {
    pub fn load(path: &Path, expected_classes: usize) -> Result<Self, ClassifierError> {
        if !path.is_file() {
            return Err(ClassifierError::MissingModel(path.to_path_buf()));
        }

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(INPUT_SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .map_err(|err| ClassifierError::Load(err.to_string()))?;

        let output_fact = model
            .output_fact(0)
            .map_err(|err| ClassifierError::Load(err.to_string()))?;
        if let Some(dims) = output_fact.shape.as_concrete() {
            let actual = dims.last().copied().unwrap_or(0);
            if actual != expected_classes {
                return Err(ClassifierError::OutputWidth {
                    expected: expected_classes,
                    actual,
                });
            }
        }

        let plan = model
            .into_runnable()
            .map_err(|err| ClassifierError::Load(err.to_string()))?;

        Ok(Self { plan })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        let tensor = Tensor::from_shape(&input.shape, &input.data)
            .map_err(|err| ClassifierError::Inference(err.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|err| ClassifierError::Inference(err.to_string()))?;
        let scores = outputs
            .first()
            .ok_or_else(|| ClassifierError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|err| ClassifierError::Inference(err.to_string()))?;

        Ok(scores.iter().copied().collect())
    }
}

/// Index of the highest score. The first index wins ties and NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, score) in scores.iter().copied().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::argmax;

    #[test]
    fn picks_highest_score() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
    }

    #[test]
    fn first_index_wins_ties() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some(0));
    }

    #[test]
    fn ignores_nan_and_handles_empty() {
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.1]), Some(1));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }
}
