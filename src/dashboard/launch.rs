//! Opening result files with the platform's default handlers

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

use crate::vision::prediction::ANNOTATED_IMAGE_SUFFIX;

/// Open a file or folder with the default application
pub fn open_path(path: &Path) -> io::Result<()> {
    let mut command = opener();
    command.arg(path);
    command.spawn()?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener() -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]);
    command
}

#[cfg(target_os = "macos")]
fn opener() -> Command {
    Command::new("open")
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener() -> Command {
    Command::new("xdg-open")
}

/// Annotated image and text file inside a page result folder, first by name
pub fn find_result_files(result_dir: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(result_dir) else {
        return (None, None);
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let image = files
        .iter()
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with(ANNOTATED_IMAGE_SUFFIX))
                .unwrap_or(false)
        })
        .cloned();
    let text = files
        .iter()
        .find(|path| path.extension().map(|ext| ext == "txt").unwrap_or(false))
        .cloned();

    (image, text)
}

/// Folder opened for a run: the whole output folder on Windows, the page folder elsewhere
fn folder_to_open(result_dir: &Path) -> &Path {
    if cfg!(target_os = "windows") {
        result_dir.parent().unwrap_or(result_dir)
    } else {
        result_dir
    }
}

/// Show the results of a run: the folder, then the annotated image and the text.
/// Failures are logged and skipped.
pub fn open_results(result_dir: &Path) {
    let (image, text) = find_result_files(result_dir);
    let targets = std::iter::once(folder_to_open(result_dir).to_path_buf())
        .chain(image)
        .chain(text);

    for target in targets {
        match open_path(&target) {
            Ok(()) => info!("Opened {:?}", target),
            Err(e) => warn!("Could not open {:?}: {}", target, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_result_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        std::fs::write(dir.join("page_001_result.txt"), "hello").unwrap();
        std::fs::write(dir.join("doc_0_res.json"), "{}").unwrap();
        std::fs::write(dir.join("doc_0_ocr_res_img.png"), "png").unwrap();

        let (image, text) = find_result_files(dir);

        assert_eq!(image, Some(dir.join("doc_0_ocr_res_img.png")));
        assert_eq!(text, Some(dir.join("page_001_result.txt")));
    }

    #[test]
    fn test_find_result_files_missing_dir() {
        assert_eq!(
            find_result_files(Path::new("/nonexistent/page_001_result")),
            (None, None)
        );
    }
}
