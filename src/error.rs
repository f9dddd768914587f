//! Error types for model loading, recognition and result persistence

use std::path::PathBuf;

/// Result type alias for OCR operations
pub type OcrResult<T> = std::result::Result<T, OcrError>;

/// Errors raised by the loader, the engine and the per-file processor
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    /// A configured model directory does not exist
    #[error("model directory not found: {}", .0.display())]
    ModelDirMissing(PathBuf),

    /// The file selected for recognition does not exist
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input exists but is neither a PDF nor a decodable image
    #[error("unsupported input file: {}", .0.display())]
    UnsupportedInput(PathBuf),

    /// A feature toggle was enabled that this engine cannot honour
    #[error("unsupported engine option: {0}")]
    Unsupported(&'static str),

    /// An engine parameter is out of range
    #[error("invalid engine option: {0}")]
    InvalidOption(String),

    /// ONNX Runtime refused the model
    #[error("failed to load OCR model: {0}")]
    ModelLoad(String),

    /// Inference failed or produced an unexpected tensor
    #[error("OCR inference failed: {0}")]
    Inference(String),

    /// Character dictionary could not be read from the recognition model config
    #[error("character dictionary error: {0}")]
    Dictionary(String),

    /// PDFium failed to bind, open or rasterize the document
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OcrError::ModelDirMissing(PathBuf::from("testmodel/PP-OCRv5_mobile_det_infer"));
        assert!(err.to_string().contains("PP-OCRv5_mobile_det_infer"));

        let err = OcrError::Unsupported("use_doc_unwarping");
        assert_eq!(err.to_string(), "unsupported engine option: use_doc_unwarping");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: OcrError = io.into();
        assert!(matches!(err, OcrError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
