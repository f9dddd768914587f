//! Image preprocessing for OCR models
//!
//! Handles image resizing, normalization, and tensor conversion for PaddleOCR models.

use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbImage};
use ndarray::{Array3, Array4};

use crate::error::{OcrError, OcrResult};

/// ImageNet statistics used by the detection model
pub const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Recognition model expects (pixel / 255.0 - 0.5) / 0.5, mapping [0, 255] -> [-1, 1]
pub const REC_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const REC_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Scale factors between the detection input and the original page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetScale {
    /// resized width / original width
    pub ratio_w: f32,
    /// resized height / original height
    pub ratio_h: f32,
}

/// Convert an RGB image to an HWC f32 array in 0-1
pub fn rgb_to_f32(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut rgb = Array3::<f32>::zeros((height as usize, width as usize, 3));

    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            rgb[[y as usize, x as usize, c]] = pixel.0[c] as f32 / 255.0;
        }
    }

    rgb
}

/// Normalize image with mean and std
pub fn normalize(image: &Array3<f32>, mean: &[f32; 3], std: &[f32; 3]) -> Array3<f32> {
    let (h, w, _) = image.dim();
    let mut normalized = Array3::<f32>::zeros((h, w, 3));

    for y in 0..h {
        for x in 0..w {
            for c in 0..3 {
                normalized[[y, x, c]] = (image[[y, x, c]] - mean[c]) / std[c];
            }
        }
    }

    normalized
}

/// Convert HWC image to NCHW tensor (batch size 1)
pub fn hwc_to_nchw(image: &Array3<f32>) -> Array4<f32> {
    let (h, w, c) = image.dim();
    let mut tensor = Array4::<f32>::zeros((1, c, h, w));

    for y in 0..h {
        for x in 0..w {
            for ch in 0..c {
                tensor[[0, ch, y, x]] = image[[y, x, ch]];
            }
        }
    }

    tensor
}

/// Target size for the detection input: longest side capped at `max_side`,
/// both sides rounded to a multiple of 32 (minimum 32)
pub fn detection_input_size(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let max_dim = width.max(height) as f32;
    let ratio = if max_dim > max_side as f32 {
        max_side as f32 / max_dim
    } else {
        1.0
    };

    let round32 = |v: f32| (((v / 32.0).round() as u32) * 32).max(32);
    (round32(width as f32 * ratio), round32(height as f32 * ratio))
}

/// Full preprocessing pipeline for detection
pub fn preprocess_for_detection(
    image: &DynamicImage,
    max_side: u32,
) -> OcrResult<(Array4<f32>, DetScale)> {
    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(OcrError::Inference("page image has zero dimensions".to_string()));
    }

    let (new_w, new_h) = detection_input_size(orig_w, orig_h, max_side);
    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();

    let rgb = rgb_to_f32(&resized);
    let normalized = normalize(&rgb, &DET_MEAN, &DET_STD);
    let scale = DetScale {
        ratio_w: new_w as f32 / orig_w as f32,
        ratio_h: new_h as f32 / orig_h as f32,
    };

    Ok((hwc_to_nchw(&normalized), scale))
}

/// Full preprocessing pipeline for recognition (fixed height, variable width)
pub fn preprocess_for_recognition(
    crop: &DynamicImage,
    target_height: u32,
    max_width: u32,
) -> OcrResult<Array4<f32>> {
    let (orig_w, orig_h) = crop.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(OcrError::Inference("text crop has zero dimensions".to_string()));
    }
    if target_height == 0 {
        return Err(OcrError::InvalidOption("recognition height is zero".to_string()));
    }

    let ratio = orig_w as f32 / orig_h as f32;
    let new_w = ((target_height as f32 * ratio).ceil() as u32).clamp(1, max_width.max(1));
    let resized = crop.resize_exact(new_w, target_height, FilterType::Triangle).to_rgb8();

    let rgb = rgb_to_f32(&resized);
    let normalized = normalize(&rgb, &REC_MEAN, &REC_STD);
    Ok(hwc_to_nchw(&normalized))
}

/// Crop the axis-aligned bounding box of a quadrilateral.
///
/// Tall crops (height >= 1.5 x width) are rotated to read horizontally, which is how
/// vertical text lines are fed to the recognizer.
pub fn crop_text_region(image: &DynamicImage, polygon: &[[f32; 2]; 4]) -> OcrResult<DynamicImage> {
    let (img_w, img_h) = image.dimensions();

    let min_x = polygon.iter().map(|p| p[0]).fold(f32::MAX, f32::min);
    let max_x = polygon.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
    let min_y = polygon.iter().map(|p| p[1]).fold(f32::MAX, f32::min);
    let max_y = polygon.iter().map(|p| p[1]).fold(f32::MIN, f32::max);

    let x = (min_x.max(0.0) as u32).min(img_w.saturating_sub(1));
    let y = (min_y.max(0.0) as u32).min(img_h.saturating_sub(1));
    let w = ((max_x - min_x).max(1.0) as u32).min(img_w - x);
    let h = ((max_y - min_y).max(1.0) as u32).min(img_h - y);

    if w == 0 || h == 0 {
        return Err(OcrError::Inference("crop region has zero size".to_string()));
    }

    let crop = image.crop_imm(x, y, w, h);
    if h as f32 >= w as f32 * 1.5 {
        Ok(crop.rotate270())
    } else {
        Ok(crop)
    }
}
