use image::imageops::{self, FilterType};
use thiserror::Error;

/// Side length of the square input the classifier was trained on.
pub const INPUT_SIZE: u32 = 224;
pub const INPUT_CHANNELS: usize = 3;
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, INPUT_CHANNELS];

/// A single-image batch in NHWC layout with channel values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("image payload is empty")]
    Empty,
    #[error("failed to decode image: {0}")]
    Decode(String),
}

pub fn preprocess_image(bytes: &[u8]) -> Result<ImageTensor, PreprocessError> {
    if bytes.is_empty() {
        return Err(PreprocessError::Empty);
    }

    let decoded =
        image::load_from_memory(bytes).map_err(|err| PreprocessError::Decode(err.to_string()))?;
    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let data = resized
        .as_raw()
        .iter()
        .map(|channel| f32::from(*channel) / 255.0)
        .collect();

    Ok(ImageTensor {
        shape: INPUT_SHAPE,
        data,
    })
}
