//! Progress reports emitted while a file is being recognized

use std::fmt;

use super::PageResult;

/// Stage of a recognition run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Loading the models (first run only)
    InitializingModel,
    /// Engine ready, recognition starting
    Recognizing,
    /// Opening the input file
    LoadingFile,
    /// Working on page `number` (1-based) of `total`, when the total is known
    Page { number: usize, total: Option<usize> },
    /// Page results written to disk
    PageDone { page: PageResult, total: Option<usize> },
    /// Finished with `lines` recognized lines
    Complete { lines: usize },
}

impl Progress {
    /// Position for a determinate progress bar, in 0.0..=1.0
    pub fn fraction(&self) -> f32 {
        match self {
            Progress::InitializingModel => 0.1,
            Progress::Recognizing | Progress::LoadingFile => 0.5,
            Progress::Page { number, total: Some(total) } if *total > 0 => {
                page_fraction(*number, *total)
            }
            Progress::PageDone { page, total: Some(total) } if *total > 0 => {
                page_fraction(page.page_number, *total)
            }
            Progress::Page { .. } | Progress::PageDone { .. } => 0.7,
            Progress::Complete { .. } => 1.0,
        }
    }
}

fn page_fraction(number: usize, total: usize) -> f32 {
    0.5 + 0.45 * (number as f32 / total as f32).min(1.0)
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::InitializingModel => write!(f, "Initializing OCR model, please wait..."),
            Progress::Recognizing => write!(f, "Recognizing text, please wait..."),
            Progress::LoadingFile => write!(f, "Loading file..."),
            Progress::Page { number, total: Some(total) } => {
                write!(f, "Processing page {}/{}...", number, total)
            }
            Progress::Page { number, total: None } => write!(f, "Processing page {}...", number),
            Progress::PageDone { page, .. } => write!(
                f,
                "Page {} done: {} lines",
                page.page_number,
                page.lines.len()
            ),
            Progress::Complete { lines } => write!(f, "Recognition complete! {} lines", lines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_messages() {
        let known = Progress::Page {
            number: 2,
            total: Some(5),
        };
        assert_eq!(known.to_string(), "Processing page 2/5...");

        let unknown = Progress::Page {
            number: 3,
            total: None,
        };
        assert_eq!(unknown.to_string(), "Processing page 3...");
    }

    #[test]
    fn test_fraction_is_monotonic() {
        let stages = [
            Progress::InitializingModel,
            Progress::Recognizing,
            Progress::Page { number: 1, total: Some(2) },
            Progress::Page { number: 2, total: Some(2) },
            Progress::Complete { lines: 4 },
        ];

        let done = Progress::PageDone {
            page: PageResult {
                page_number: 1,
                lines: vec!["a".into(), "b".into()],
                output_dir: "out/page_001_result".into(),
            },
            total: Some(2),
        };
        assert_eq!(done.fraction(), stages[2].fraction());
        assert_eq!(done.to_string(), "Page 1 done: 2 lines");

        for pair in stages.windows(2) {
            assert!(pair[0].fraction() <= pair[1].fraction(), "{:?}", pair);
        }
        assert_eq!(Progress::Complete { lines: 0 }.fraction(), 1.0);
    }
}
