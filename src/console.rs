//! Terminal presenter for the command-line front end

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app::{FileKind, Presenter};
use crate::processor::{PageResult, Progress, RunOutput};

const RULE_WIDTH: usize = 50;

/// Writes progress and results as plain text
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_page(&mut self, page: &PageResult) -> std::io::Result<()> {
        writeln!(self.out, "\n=== Page {} ===", page.page_number)?;
        for line in &page.lines {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "Saved: {}", page.output_dir.display())?;
        self.out.flush()
    }

    fn write_result(&mut self, output: &RunOutput) -> std::io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{}", rule)?;
        writeln!(self.out, "All recognized text:")?;
        writeln!(self.out, "{}", rule)?;
        for line in &output.all_text {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "\nDone!")?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    /// The input file comes from configuration; there is nothing to pick
    fn select_file(&mut self, _kind: FileKind) -> Option<PathBuf> {
        None
    }

    /// Pages are printed as soon as they are saved
    fn show_progress(&mut self, progress: &Progress) {
        let written = match progress {
            Progress::PageDone { page, .. } => self.write_page(page),
            other => writeln!(self.out, "{}", other),
        };
        if let Err(e) = written {
            tracing::warn!("Could not write progress to the terminal: {}", e);
        }
    }

    fn show_result(&mut self, output: &RunOutput) {
        if let Err(e) = self.write_result(output) {
            tracing::warn!("Could not write results to the terminal: {}", e);
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

/// PDF files directly inside `dir`, sorted by name
pub fn list_pdfs(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.to_lowercase().ends_with(".pdf"))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(number: usize, lines: &[&str]) -> PageResult {
        PageResult {
            page_number: number,
            lines: lines.iter().map(|l| l.to_string()).collect(),
            output_dir: PathBuf::from(format!("out/page_{:03}_result", number)),
        }
    }

    #[test]
    fn test_pages_printed_as_they_finish() {
        let mut presenter = ConsolePresenter::new(Vec::new());

        presenter.show_progress(&Progress::Page {
            number: 1,
            total: Some(2),
        });
        presenter.show_progress(&Progress::PageDone {
            page: page(1, &["alpha", "beta"]),
            total: Some(2),
        });

        // Page one is on screen before page two starts or the run ends
        let text = String::from_utf8(presenter.out.clone()).unwrap();
        assert!(text.starts_with("Processing page 1/2..."));
        assert!(text.contains("=== Page 1 ===\nalpha\nbeta\n"));
        assert!(!text.contains("All recognized text:"));
    }

    #[test]
    fn test_result_lists_pages_then_aggregate() {
        let pages = vec![page(1, &["alpha", "beta"]), page(2, &["gamma"])];
        let output = RunOutput {
            first_result_dir: Some(pages[0].output_dir.clone()),
            all_text: vec!["alpha".into(), "beta".into(), "gamma".into()],
            pages: pages.clone(),
        };
        let mut presenter = ConsolePresenter::new(Vec::new());

        for page in pages {
            presenter.show_progress(&Progress::PageDone {
                page,
                total: Some(2),
            });
        }
        presenter.show_result(&output);

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let page_one = text.find("=== Page 1 ===").unwrap();
        let page_two = text.find("=== Page 2 ===").unwrap();
        let aggregate = text.find("All recognized text:").unwrap();
        assert!(page_one < page_two && page_two < aggregate);
        assert!(text[aggregate..].contains("alpha\nbeta\ngamma\n"));
        assert!(text.trim_end().ends_with("Done!"));
    }

    #[test]
    fn test_list_pdfs() {
        let temp = TempDir::new().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "scan.png"] {
            std::fs::write(temp.path().join(name), "").unwrap();
        }

        assert_eq!(list_pdfs(temp.path()), vec!["A.PDF", "b.pdf"]);
        assert!(list_pdfs(&temp.path().join("missing")).is_empty());
    }
}
