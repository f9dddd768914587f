//! Vision/OCR Layer
//!
//! Runs PP-OCRv5 text detection and recognition over page images.
//! The models are ONNX exports executed by ONNX Runtime; this layer carries the
//! pre/post-processing around them and the page-level result types.

pub mod detection;
pub mod document;
pub mod models;
pub mod ocr;
pub mod prediction;
pub mod preprocess;
pub mod recognition;

use serde::{Deserialize, Serialize};

use crate::error::{OcrError, OcrResult};
use detection::DetParams;

pub use document::Document;
pub use models::{verify_model_files, ModelCheck, ModelKind, ModelManifest, ModelPaths, OnnxSession};
pub use ocr::{init_ocr_model, OcrEngine, PaddleOcrEngine, TextLine};
pub use prediction::PagePrediction;

/// Engine parameters.
///
/// The three pipeline toggles are carried so they appear in configuration and
/// result dumps, but the sub-models behind them are not shipped, so enabling any
/// of them is rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Whole-page orientation classification
    pub use_doc_orientation_classify: bool,
    /// Page unwarping
    pub use_doc_unwarping: bool,
    /// Per-line orientation classification
    pub use_textline_orientation: bool,
    /// Pixel threshold on the detection probability map
    pub det_thresh: f32,
    /// Minimum mean probability of a detected box
    pub det_box_threshold: f32,
    /// Box expansion ratio
    pub det_unclip_ratio: f32,
    /// Maximum number of candidate regions per page
    pub det_max_candidates: usize,
    /// Longest side of the detection input
    pub det_limit_side_len: u32,
    /// Recognition input height
    pub rec_image_height: u32,
    /// Recognition input width cap
    pub rec_max_width: u32,
    /// Lines scoring below this are dropped
    pub rec_score_thresh: f32,
    /// ONNX Runtime intra-op threads
    pub num_threads: usize,
    /// PDF rasterization scale (1.0 = 72 dpi)
    pub pdf_render_scale: f32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            use_doc_orientation_classify: false,
            use_doc_unwarping: false,
            use_textline_orientation: false,
            det_thresh: 0.3,
            det_box_threshold: 0.6,
            det_unclip_ratio: 1.5,
            det_max_candidates: 1000,
            det_limit_side_len: 960,
            rec_image_height: 48,
            rec_max_width: 320,
            rec_score_thresh: 0.0,
            num_threads: 4,
            pdf_render_scale: 2.0,
        }
    }
}

impl EngineOptions {
    pub fn det_params(&self) -> DetParams {
        DetParams {
            thresh: self.det_thresh,
            box_thresh: self.det_box_threshold,
            unclip_ratio: self.det_unclip_ratio,
            max_candidates: self.det_max_candidates,
        }
    }

    /// Reject toggles whose sub-models are not available and out-of-range sizes
    pub fn validate(&self) -> OcrResult<()> {
        if self.use_doc_orientation_classify {
            return Err(OcrError::Unsupported("document orientation classification"));
        }
        if self.use_doc_unwarping {
            return Err(OcrError::Unsupported("document unwarping"));
        }
        if self.use_textline_orientation {
            return Err(OcrError::Unsupported("text line orientation classification"));
        }
        if self.rec_image_height == 0 || self.rec_max_width == 0 {
            return Err(OcrError::InvalidOption(format!(
                "recognition input must be at least 1x1, got {}x{}",
                self.rec_max_width, self.rec_image_height
            )));
        }
        if self.det_limit_side_len == 0 {
            return Err(OcrError::InvalidOption(
                "det_limit_side_len must be positive".to_string(),
            ));
        }
        if !(self.pdf_render_scale.is_finite() && self.pdf_render_scale > 0.0) {
            return Err(OcrError::InvalidOption(format!(
                "pdf_render_scale must be positive, got {}",
                self.pdf_render_scale
            )));
        }
        Ok(())
    }
}
