//! Per-page recognition result and its on-disk formats

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ocr::TextLine;
use super::EngineOptions;
use crate::error::OcrResult;

const BOX_COLOR: Rgb<u8> = Rgb([0, 200, 60]);

/// File name suffix of the annotated page image
pub const ANNOTATED_IMAGE_SUFFIX: &str = "_ocr_res_img.png";
/// File name suffix of the JSON dump
pub const JSON_SUFFIX: &str = "_res.json";

/// Recognition output for one page, along with the page image it was computed on
#[derive(Debug, Clone)]
pub struct PagePrediction {
    /// File the page came from
    pub input_path: PathBuf,
    /// Zero-based page number for multi-page documents, `None` for single images
    pub page_index: Option<usize>,
    pub image: DynamicImage,
    /// Lines in reading order
    pub lines: Vec<TextLine>,
    pub options: EngineOptions,
}

#[derive(Serialize)]
struct ModelSettingsJson {
    use_doc_preprocessor: bool,
    use_doc_orientation_classify: bool,
    use_doc_unwarping: bool,
    use_textline_orientation: bool,
}

#[derive(Serialize)]
struct DetParamsJson {
    limit_side_len: u32,
    thresh: f32,
    box_thresh: f32,
    unclip_ratio: f32,
    max_candidates: usize,
}

#[derive(Serialize)]
struct PredictionJson<'a> {
    input_path: String,
    page_index: Option<usize>,
    model_settings: ModelSettingsJson,
    text_det_params: DetParamsJson,
    text_rec_score_thresh: f32,
    rec_texts: Vec<&'a str>,
    rec_scores: Vec<f32>,
    rec_polys: Vec<[[i32; 2]; 4]>,
}

impl PagePrediction {
    /// Recognized texts in reading order
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }

    /// `<stem>` or `<stem>_<page>` used to name the saved files
    fn file_prefix(&self) -> String {
        let stem = self
            .input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "page".to_string());

        match self.page_index {
            Some(idx) => format!("{}_{}", stem, idx),
            None => stem,
        }
    }

    /// Page image with every detected polygon outlined
    pub fn annotated_image(&self) -> RgbImage {
        let mut canvas = self.image.to_rgb8();

        for line in &self.lines {
            let p = &line.polygon;
            for i in 0..4 {
                let a = p[i];
                let b = p[(i + 1) % 4];
                draw_line_segment_mut(&mut canvas, (a[0], a[1]), (b[0], b[1]), BOX_COLOR);
                // Two pixels wide
                draw_line_segment_mut(
                    &mut canvas,
                    (a[0] + 1.0, a[1] + 1.0),
                    (b[0] + 1.0, b[1] + 1.0),
                    BOX_COLOR,
                );
            }
        }

        canvas
    }

    /// Write `<prefix>_ocr_res_img.png` into `dir`
    pub fn save_to_img(&self, dir: &Path) -> OcrResult<PathBuf> {
        let path = dir.join(format!("{}{}", self.file_prefix(), ANNOTATED_IMAGE_SUFFIX));
        self.annotated_image().save(&path)?;
        debug!("Saved annotated image {:?}", path);
        Ok(path)
    }

    /// Write `<prefix>_res.json` into `dir`
    pub fn save_to_json(&self, dir: &Path) -> OcrResult<PathBuf> {
        let path = dir.join(format!("{}{}", self.file_prefix(), JSON_SUFFIX));
        let opts = &self.options;

        let dump = PredictionJson {
            input_path: self.input_path.display().to_string(),
            page_index: self.page_index,
            model_settings: ModelSettingsJson {
                use_doc_preprocessor: opts.use_doc_orientation_classify || opts.use_doc_unwarping,
                use_doc_orientation_classify: opts.use_doc_orientation_classify,
                use_doc_unwarping: opts.use_doc_unwarping,
                use_textline_orientation: opts.use_textline_orientation,
            },
            text_det_params: DetParamsJson {
                limit_side_len: opts.det_limit_side_len,
                thresh: opts.det_thresh,
                box_thresh: opts.det_box_threshold,
                unclip_ratio: opts.det_unclip_ratio,
                max_candidates: opts.det_max_candidates,
            },
            text_rec_score_thresh: opts.rec_score_thresh,
            rec_texts: self.lines.iter().map(|l| l.text.as_str()).collect(),
            rec_scores: self.lines.iter().map(|l| l.score).collect(),
            rec_polys: self
                .lines
                .iter()
                .map(|l| l.polygon.map(|[x, y]| [x.round() as i32, y.round() as i32]))
                .collect(),
        };

        std::fs::write(&path, serde_json::to_string_pretty(&dump)?)?;
        debug!("Saved JSON result {:?}", path);
        Ok(path)
    }
}
