pub mod classifier;
pub mod labels;
pub mod preprocess;

use thiserror::Error;

pub use classifier::{ClassifierError, ImageClassifier, OnnxClassifier, argmax};
pub use labels::{CLASS_NAMES, label_for_index};
pub use preprocess::{INPUT_SHAPE, INPUT_SIZE, ImageTensor, PreprocessError, preprocess_image};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("classifier returned no usable scores")]
    EmptyOutput,
    #[error("predicted class index {0} is outside the label table")]
    UnknownClass(usize),
}

/// Decodes, preprocesses and classifies one encoded image, returning its label.
pub fn classify_image(
    classifier: &dyn ImageClassifier,
    image_bytes: &[u8],
) -> Result<&'static str, PredictError> {
    let tensor = preprocess_image(image_bytes)?;
    let scores = classifier.classify(&tensor)?;
    let index = argmax(&scores).ok_or(PredictError::EmptyOutput)?;
    label_for_index(index).ok_or(PredictError::UnknownClass(index))
}
