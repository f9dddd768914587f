//! Per-file processor
//!
//! Runs the engine over every page of a document and persists the results:
//! one `page_<NNN>_result/` folder per page holding the annotated image, the JSON
//! dump and the recognized text. Pages already written stay on disk if a later
//! page fails.

pub mod progress;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{OcrError, OcrResult};
use crate::vision::{Document, OcrEngine, PagePrediction};

pub use progress::Progress;

/// Output of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// 1-based page number
    pub page_number: usize,
    /// Recognized lines in reading order
    pub lines: Vec<String>,
    /// The page's `page_<NNN>_result` folder
    pub output_dir: PathBuf,
}

/// Aggregate output of one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    /// Folder of the first page, `None` when the document had no pages
    pub first_result_dir: Option<PathBuf>,
    /// All recognized lines, page after page
    pub all_text: Vec<String>,
    pub pages: Vec<PageResult>,
}

impl RunOutput {
    pub fn line_count(&self) -> usize {
        self.all_text.len()
    }

    /// Completion message shown by the front ends
    pub fn summary(&self) -> String {
        let location = self
            .first_result_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "(no pages)".to_string());
        format!(
            "Recognition complete!\n\nRecognized {} lines of text\nResults saved in: {}",
            self.line_count(),
            location
        )
    }
}

/// Folder name for the 1-based page `number`
pub fn page_dir_name(number: usize) -> String {
    format!("page_{:03}_result", number)
}

/// Recognize a PDF or image file and write per-page results under `output_dir`
pub fn process_file(
    path: &Path,
    engine: &dyn OcrEngine,
    output_dir: &Path,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> OcrResult<RunOutput> {
    if !path.exists() {
        return Err(OcrError::InputNotFound(path.to_path_buf()));
    }

    info!("Processing file: {:?}", path);
    if let Some(report) = progress.as_mut() {
        report(Progress::LoadingFile);
    }

    let document = Document::open(path, engine.options().pdf_render_scale)?;
    process_document(&document, engine, output_dir, progress)
}

/// Recognize an opened document and write per-page results under `output_dir`
pub fn process_document(
    document: &Document,
    engine: &dyn OcrEngine,
    output_dir: &Path,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> OcrResult<RunOutput> {
    std::fs::create_dir_all(output_dir)?;

    let total = Some(document.page_count());
    let options = engine.options();
    let mut output = RunOutput::default();

    document.for_each_page(|idx, image| {
        let number = idx + 1;
        if let Some(report) = progress.as_mut() {
            report(Progress::Page { number, total });
        }

        let lines = engine.recognize(&image)?;

        // Only recognized pages get a folder
        let page_dir = output_dir.join(page_dir_name(number));
        std::fs::create_dir_all(&page_dir)?;
        if output.first_result_dir.is_none() {
            output.first_result_dir = Some(page_dir.clone());
        }

        let prediction = PagePrediction {
            input_path: document.path().to_path_buf(),
            page_index: document.page_index(idx),
            image,
            lines,
            options: options.clone(),
        };

        prediction.save_to_img(&page_dir)?;
        prediction.save_to_json(&page_dir)?;

        let texts = prediction.texts();
        let txt_path = page_dir.join(format!("{}.txt", page_dir_name(number)));
        std::fs::write(&txt_path, texts.join("\n"))?;
        debug!("Page {}: {} lines -> {:?}", number, texts.len(), page_dir);

        output.all_text.extend(texts.iter().cloned());
        let page = PageResult {
            page_number: number,
            lines: texts,
            output_dir: page_dir,
        };
        if let Some(report) = progress.as_mut() {
            report(Progress::PageDone {
                page: page.clone(),
                total,
            });
        }
        output.pages.push(page);
        Ok(())
    })?;

    info!(
        "Processed {} pages, {} lines recognized",
        output.pages.len(),
        output.line_count()
    );
    if let Some(report) = progress.as_mut() {
        report(Progress::Complete {
            lines: output.line_count(),
        });
    }

    Ok(output)
}


#[cfg(test)]
mod tests {
    use super::test_support::{page, FakeEngine};
    use super::*;
    use tempfile::TempDir;

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_two_pages_produce_two_result_dirs() {
        let temp = TempDir::new().unwrap();
        let document = Document::from_images("/in/report.pdf", vec![page(20), page(30)]);

        let output = process_document(&document, &FakeEngine::default(), temp.path(), None).unwrap();

        assert_eq!(files_in(temp.path()), vec!["page_001_result", "page_002_result"]);
        assert_eq!(
            files_in(&temp.path().join("page_001_result")),
            vec![
                "page_001_result.txt",
                "report_0_ocr_res_img.png",
                "report_0_res.json"
            ]
        );
        assert_eq!(
            files_in(&temp.path().join("page_002_result")),
            vec![
                "page_002_result.txt",
                "report_1_ocr_res_img.png",
                "report_1_res.json"
            ]
        );
        assert_eq!(output.first_result_dir, Some(temp.path().join("page_001_result")));
    }

    #[test]
    fn test_aggregate_is_page_order_concatenation() {
        let temp = TempDir::new().unwrap();
        let document = Document::from_images("doc.pdf", vec![page(20), page(30)]);

        let output = process_document(&document, &FakeEngine::default(), temp.path(), None).unwrap();

        assert_eq!(output.all_text, vec!["w20-0", "w20-1", "w30-0", "w30-1", "w30-2"]);
        assert_eq!(output.pages[0].lines, vec!["w20-0", "w20-1"]);

        let txt = std::fs::read_to_string(
            temp.path().join("page_002_result").join("page_002_result.txt"),
        )
        .unwrap();
        assert_eq!(txt, "w30-0\nw30-1\nw30-2");
    }

    #[test]
    fn test_empty_page_writes_empty_text() {
        let temp = TempDir::new().unwrap();
        let document = Document::from_images("blank.pdf", vec![page(5)]);

        let output = process_document(&document, &FakeEngine::default(), temp.path(), None).unwrap();

        assert!(output.all_text.is_empty());
        let txt_path = temp.path().join("page_001_result").join("page_001_result.txt");
        assert_eq!(std::fs::read_to_string(txt_path).unwrap(), "");
    }

    #[test]
    fn test_failure_keeps_written_pages() {
        let temp = TempDir::new().unwrap();
        let document = Document::from_images("doc.pdf", vec![page(20), page(13), page(30)]);
        let engine = FakeEngine::default();

        let result = process_document(&document, &engine, temp.path(), None);

        assert!(matches!(result, Err(OcrError::Inference(_))));
        assert_eq!(*engine.calls.lock(), 2);
        assert!(temp.path().join("page_001_result").join("page_001_result.txt").exists());
        // The failing page leaves no folder behind
        assert!(!temp.path().join("page_002_result").exists());
        assert!(!temp.path().join("page_003_result").exists());
        assert_eq!(files_in(temp.path()), vec!["page_001_result"]);
    }

    #[test]
    fn test_progress_reports_pages_with_total() {
        let temp = TempDir::new().unwrap();
        let document = Document::from_images("doc.pdf", vec![page(10), page(10)]);
        let mut seen = Vec::new();
        let mut record = |p: Progress| seen.push(p);

        process_document(&document, &FakeEngine::default(), temp.path(), Some(&mut record)).unwrap();

        let done = |number: usize| PageResult {
            page_number: number,
            lines: vec!["w10-0".to_string()],
            output_dir: temp.path().join(page_dir_name(number)),
        };
        assert_eq!(
            seen,
            vec![
                Progress::Page { number: 1, total: Some(2) },
                Progress::PageDone { page: done(1), total: Some(2) },
                Progress::Page { number: 2, total: Some(2) },
                Progress::PageDone { page: done(2), total: Some(2) },
                Progress::Complete { lines: 2 },
            ]
        );
    }

    #[test]
    fn test_missing_input() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.pdf");

        let result = process_file(&missing, &FakeEngine::default(), temp.path(), None);

        assert!(matches!(result, Err(OcrError::InputNotFound(p)) if p == missing));
        assert!(files_in(temp.path()).is_empty());
    }

    #[test]
    fn test_process_image_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("scan.png");
        page(40).save(&input).unwrap();
        let out = temp.path().join("out");

        let output = process_file(&input, &FakeEngine::default(), &out, None).unwrap();

        assert_eq!(output.line_count(), 4);
        assert!(out.join("page_001_result").join("scan_ocr_res_img.png").exists());
        assert!(out.join("page_001_result").join("scan_res.json").exists());
    }
}
