//! Input documents: PDFs rendered page by page through PDFium, or single raster images

use image::{DynamicImage, ImageReader};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::{OcrError, OcrResult};

static PDFIUM: OnceLock<Result<Pdfium, String>> = OnceLock::new();

/// Bind PDFium once per process, preferring a library next to the executable
fn pdfium() -> OcrResult<&'static Pdfium> {
    PDFIUM
        .get_or_init(|| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map(Pdfium::new)
                .map_err(|e| format!("failed to bind PDFium: {}", e))
        })
        .as_ref()
        .map_err(|e| OcrError::Pdf(e.clone()))
}

enum Source {
    Pdf { bytes: Vec<u8>, page_count: usize },
    Images(Vec<DynamicImage>),
}

/// A file opened for recognition
pub struct Document {
    path: PathBuf,
    source: Source,
    /// Pages carry an index in their results
    paged: bool,
    render_scale: f32,
}

impl Document {
    /// Open a PDF or image. `render_scale` applies to PDF pages (1.0 = 72 dpi).
    pub fn open(path: &Path, render_scale: f32) -> OcrResult<Self> {
        if !path.is_file() {
            return Err(OcrError::InputNotFound(path.to_path_buf()));
        }

        if is_pdf(path) {
            let bytes = std::fs::read(path)?;
            let page_count = {
                let document = pdfium()?
                    .load_pdf_from_byte_slice(&bytes, None)
                    .map_err(|e| OcrError::Pdf(format!("{}: {}", path.display(), e)))?;
                document.pages().len() as usize
            };
            info!("Opened PDF {:?} ({} pages)", path, page_count);

            return Ok(Self {
                path: path.to_path_buf(),
                source: Source::Pdf { bytes, page_count },
                paged: true,
                render_scale,
            });
        }

        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| {
                debug!("Failed to decode {:?}: {}", path, e);
                OcrError::UnsupportedInput(path.to_path_buf())
            })?;
        info!("Opened image {:?} ({}x{})", path, image.width(), image.height());

        Ok(Self {
            path: path.to_path_buf(),
            source: Source::Images(vec![image]),
            paged: false,
            render_scale,
        })
    }

    /// Multi-page document backed by already decoded pages
    pub fn from_images(path: impl Into<PathBuf>, pages: Vec<DynamicImage>) -> Self {
        Self {
            path: path.into(),
            source: Source::Images(pages),
            paged: true,
            render_scale: 1.0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        match &self.source {
            Source::Pdf { page_count, .. } => *page_count,
            Source::Images(pages) => pages.len(),
        }
    }

    /// Index recorded in results for the zero-based page `idx`
    pub fn page_index(&self, idx: usize) -> Option<usize> {
        self.paged.then_some(idx)
    }

    /// Visit every page in order with its zero-based index, stopping at the first error
    pub fn for_each_page<F>(&self, mut f: F) -> OcrResult<()>
    where
        F: FnMut(usize, DynamicImage) -> OcrResult<()>,
    {
        match &self.source {
            Source::Images(pages) => {
                for (idx, page) in pages.iter().enumerate() {
                    f(idx, page.clone())?;
                }
            }
            Source::Pdf { bytes, .. } => {
                let document = pdfium()?
                    .load_pdf_from_byte_slice(bytes, None)
                    .map_err(|e| OcrError::Pdf(format!("{}: {}", self.path.display(), e)))?;
                let config = PdfRenderConfig::new().scale_page_by_factor(self.render_scale);

                for (idx, page) in document.pages().iter().enumerate() {
                    let bitmap = page
                        .render_with_config(&config)
                        .map_err(|e| OcrError::Pdf(format!("page {}: {}", idx + 1, e)))?;
                    let image = bitmap.as_image();
                    debug!("Rendered page {} at {}x{}", idx + 1, image.width(), image.height());
                    f(idx, image)?;
                }
            }
        }
        Ok(())
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn blank(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_missing_input() {
        let result = Document::open(Path::new("/nonexistent/input.pdf"), 2.0);
        assert!(matches!(result, Err(OcrError::InputNotFound(_))));
    }

    #[test]
    fn test_open_image() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan.png");
        blank(30, 20).save(&path).unwrap();

        let doc = Document::open(&path, 2.0).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.page_index(0), None);

        let mut sizes = Vec::new();
        doc.for_each_page(|_, page| {
            sizes.push((page.width(), page.height()));
            Ok(())
        })
        .unwrap();
        assert_eq!(sizes, vec![(30, 20)]);
    }

    #[test]
    fn test_undecodable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let result = Document::open(&path, 2.0);
        assert!(matches!(result, Err(OcrError::UnsupportedInput(_))));
    }

    #[test]
    fn test_pages_visited_in_order() {
        let doc = Document::from_images("book.pdf", vec![blank(10, 10), blank(20, 20), blank(30, 30)]);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_index(1), Some(1));

        let mut seen = Vec::new();
        doc.for_each_page(|idx, page| {
            seen.push((idx, page.width()));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![(0, 10), (1, 20), (2, 30)]);
    }

    #[test]
    fn test_visit_stops_at_error() {
        let doc = Document::from_images("book.pdf", vec![blank(10, 10), blank(10, 10)]);
        let mut visited = 0;
        let result = doc.for_each_page(|_, _| {
            visited += 1;
            Err(OcrError::Inference("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_pdf_extension_case_insensitive() {
        assert!(is_pdf(Path::new("a/B.PDF")));
        assert!(!is_pdf(Path::new("a/b.png")));
    }
}
