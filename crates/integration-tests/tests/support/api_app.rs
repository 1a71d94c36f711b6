#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use api_server::http::{AppState, build_router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use shared::llm::{GeminiGateway, GeminiGatewayConfig, PersonaTemplate};
use shared::sessions::SessionStore;
use shared::vision::{CLASS_NAMES, ClassifierError, ImageClassifier, ImageTensor};

pub const TEST_FRONTEND_ORIGIN: &str = "https://leafcheck.example.com";
const TEST_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Scores every image the same way, favoring one class.
pub struct FixedClassifier {
    predicted_index: usize,
}

impl FixedClassifier {
    pub fn predicting(label: &str) -> Self {
        let predicted_index = CLASS_NAMES
            .iter()
            .position(|candidate| *candidate == label)
            .expect("label should be in the class table");
        Self { predicted_index }
    }
}

impl ImageClassifier for FixedClassifier {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        assert_eq!(input.shape, [1, 224, 224, 3]);
        let mut scores = vec![0.001; CLASS_NAMES.len()];
        scores[self.predicted_index] = 0.9;
        Ok(scores)
    }
}

pub struct FailingClassifier;

impl ImageClassifier for FailingClassifier {
    fn classify(&self, _input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        Err(ClassifierError::Inference("graph execution failed".to_string()))
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub sessions: SessionStore,
}

pub fn build_test_app(
    generate_content_url: &str,
    timeout_ms: u64,
    classifier: Arc<dyn ImageClassifier>,
) -> TestApp {
    let gateway = GeminiGateway::new(GeminiGatewayConfig {
        generate_content_url: generate_content_url.to_string(),
        api_key: "integration-test-key".to_string(),
        timeout_ms,
    })
    .expect("gemini gateway should build");

    let sessions = SessionStore::new(Arc::new(gateway), PersonaTemplate::default());
    let router = build_router(AppState {
        sessions: sessions.clone(),
        classifier,
        allowed_origins: shared::config::allowed_origins(Some(TEST_FRONTEND_ORIGIN)),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
    });

    TestApp { router, sessions }
}

pub fn leaf_image(format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(320, 240, |x, y| Rgb([(x % 256) as u8, 140, (y % 256) as u8]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, format)
        .expect("test image should encode");
    bytes.into_inner()
}
