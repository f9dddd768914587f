//! OCR (Optical Character Recognition) module
//!
//! Uses PaddleOCR models via ONNX Runtime for text detection and recognition.

use image::{DynamicImage, GenericImageView};
use ndarray::{s, Ix4};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::detection::{extract_boxes, DetectedBox};
use super::models::{ModelKind, ModelPaths, OnnxSession, CONFIG_FILE, MODEL_FILE};
use super::preprocess::{crop_text_region, preprocess_for_detection, preprocess_for_recognition};
use super::recognition::{ctc_greedy_decode, CharDictionary};
use super::EngineOptions;
use crate::error::{OcrError, OcrResult};

/// Single recognized text line
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Recognized text
    pub text: String,
    /// Recognition confidence
    pub score: f32,
    /// Corners in page pixels: top-left, top-right, bottom-right, bottom-left
    pub polygon: [[f32; 2]; 4],
}

/// A loaded recognition engine.
///
/// Engines are immutable after construction and shared between the UI thread and
/// the worker as `Arc<dyn OcrEngine>`.
pub trait OcrEngine: Send + Sync {
    /// Detect and recognize the text lines of one page, in reading order
    fn recognize(&self, image: &DynamicImage) -> OcrResult<Vec<TextLine>>;

    /// Parameters the engine was built with
    fn options(&self) -> EngineOptions {
        EngineOptions::default()
    }
}

/// OCR engine using PaddleOCR via ONNX Runtime
pub struct PaddleOcrEngine {
    detector: OnnxSession,
    recognizer: OnnxSession,
    dictionary: CharDictionary,
    options: EngineOptions,
}

impl PaddleOcrEngine {
    /// Load both models.
    ///
    /// The model directories are checked before anything is read from disk;
    /// a missing directory fails with [`OcrError::ModelDirMissing`].
    pub fn load(paths: &ModelPaths, options: &EngineOptions) -> OcrResult<Self> {
        for kind in ModelKind::ALL {
            let dir = paths.dir(kind);
            if !dir.is_dir() {
                return Err(OcrError::ModelDirMissing(dir.to_path_buf()));
            }
        }
        options.validate()?;

        let start = Instant::now();
        info!(
            "Initializing PaddleOCR (det: {:?}, rec: {:?})",
            paths.detection_dir(),
            paths.recognition_dir()
        );

        let detector = OnnxSession::new(&paths.detection_dir().join(MODEL_FILE), options.num_threads)?;
        let recognizer =
            OnnxSession::new(&paths.recognition_dir().join(MODEL_FILE), options.num_threads)?;
        let dictionary =
            CharDictionary::from_inference_config(&paths.recognition_dir().join(CONFIG_FILE))?;

        info!(
            "PaddleOCR initialized in {:?} ({} character classes)",
            start.elapsed(),
            dictionary.len()
        );

        Ok(Self {
            detector,
            recognizer,
            dictionary,
            options: options.clone(),
        })
    }

    /// Run the detection model and return text boxes in page coordinates
    fn detect(&self, image: &DynamicImage) -> OcrResult<Vec<DetectedBox>> {
        let (input, scale) = preprocess_for_detection(image, self.options.det_limit_side_len)?;
        let output = self.detector.run(&input)?;

        let prob = output.into_dimensionality::<Ix4>().map_err(|e| {
            OcrError::Inference(format!("unexpected detection output shape: {}", e))
        })?;
        let prob_map = prob.slice(s![0, 0, .., ..]);

        Ok(extract_boxes(
            prob_map,
            &self.options.det_params(),
            scale,
            image.dimensions(),
        ))
    }

    /// Run the recognition model on one cropped line
    fn recognize_crop(&self, crop: &DynamicImage) -> OcrResult<(String, f32)> {
        let input = preprocess_for_recognition(
            crop,
            self.options.rec_image_height,
            self.options.rec_max_width,
        )?;
        let output = self.recognizer.run(&input)?;
        ctc_greedy_decode(&output.view(), &self.dictionary)
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> OcrResult<Vec<TextLine>> {
        let start = Instant::now();
        let boxes = self.detect(image)?;
        debug!("Detected {} text boxes", boxes.len());

        let mut lines = Vec::with_capacity(boxes.len());
        for detected in boxes {
            let crop = match crop_text_region(image, &detected.polygon) {
                Ok(crop) => crop,
                Err(e) => {
                    warn!("Skipping text box {:?}: {}", detected.polygon, e);
                    continue;
                }
            };

            let (text, score) = self.recognize_crop(&crop)?;
            if text.is_empty() || score < self.options.rec_score_thresh {
                continue;
            }

            lines.push(TextLine {
                text,
                score,
                polygon: detected.polygon,
            });
        }

        debug!("Recognized {} lines in {:?}", lines.len(), start.elapsed());
        Ok(lines)
    }

    fn options(&self) -> EngineOptions {
        self.options.clone()
    }
}

/// Build the engine for a model pair
pub fn init_ocr_model(paths: &ModelPaths, options: &EngineOptions) -> OcrResult<PaddleOcrEngine> {
    PaddleOcrEngine::load(paths, options)
}
