//! Model management for ONNX Runtime
//!
//! Locates, verifies and loads the PP-OCRv5 detection and recognition exports.
//! Each model lives in its own directory holding `inference.onnx` (the network)
//! and `inference.yml` (the export config, which carries the character set for
//! recognition).

use ndarray::{Array4, ArrayD};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{OcrError, OcrResult};

/// Directory name of the detection model
pub const DETECTION_MODEL_NAME: &str = "PP-OCRv5_mobile_det_infer";

/// Directory name of the recognition model
pub const RECOGNITION_MODEL_NAME: &str = "PP-OCRv5_mobile_rec_infer";

/// Network weights inside a model directory
pub const MODEL_FILE: &str = "inference.onnx";

/// Export config inside a model directory
pub const CONFIG_FILE: &str = "inference.yml";

/// Files every model directory must contain
pub const REQUIRED_MODEL_FILES: [&str; 2] = [MODEL_FILE, CONFIG_FILE];

/// Model identifier for PaddleOCR components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Text detection model (DB)
    Detection,
    /// Text recognition model (CTC)
    Recognition,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Detection, ModelKind::Recognition];

    /// Directory name for this model
    pub fn dir_name(&self) -> &'static str {
        match self {
            ModelKind::Detection => DETECTION_MODEL_NAME,
            ModelKind::Recognition => RECOGNITION_MODEL_NAME,
        }
    }

    /// Display name for progress reporting
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Detection => "Text Detection",
            ModelKind::Recognition => "Text Recognition",
        }
    }
}

/// Validated locations of the two model directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    detection_dir: PathBuf,
    recognition_dir: PathBuf,
}

impl ModelPaths {
    /// Both directories must exist. Nothing inside them is read.
    pub fn new(detection_dir: impl Into<PathBuf>, recognition_dir: impl Into<PathBuf>) -> OcrResult<Self> {
        let detection_dir = detection_dir.into();
        let recognition_dir = recognition_dir.into();

        for dir in [&detection_dir, &recognition_dir] {
            if !dir.is_dir() {
                return Err(OcrError::ModelDirMissing(dir.clone()));
            }
        }

        Ok(Self {
            detection_dir,
            recognition_dir,
        })
    }

    pub fn detection_dir(&self) -> &Path {
        &self.detection_dir
    }

    pub fn recognition_dir(&self) -> &Path {
        &self.recognition_dir
    }

    pub fn dir(&self, kind: ModelKind) -> &Path {
        match kind {
            ModelKind::Detection => &self.detection_dir,
            ModelKind::Recognition => &self.recognition_dir,
        }
    }
}

/// Result of checking one model directory for its required files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCheck {
    pub complete: bool,
    /// Missing file names, or the directory itself when it does not exist
    pub missing: Vec<String>,
}

/// Check that `dir` holds every file in [`REQUIRED_MODEL_FILES`]
pub fn verify_model_files(dir: &Path) -> ModelCheck {
    if !dir.is_dir() {
        return ModelCheck {
            complete: false,
            missing: vec![dir.display().to_string()],
        };
    }

    let missing: Vec<String> = REQUIRED_MODEL_FILES
        .iter()
        .filter(|name| !dir.join(name).is_file())
        .map(|name| name.to_string())
        .collect();

    ModelCheck {
        complete: missing.is_empty(),
        missing,
    }
}

/// Manifest written next to prepared models
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelManifest {
    pub version: String,
    pub models: Vec<ModelFileInfo>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelFileInfo {
    /// Model directory name
    pub model: String,
    pub filename: String,
    pub size_bytes: u64,
    pub sha256: String,
}

impl Default for ModelManifest {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            models: Vec::new(),
        }
    }
}

impl ModelManifest {
    pub const FILE_NAME: &'static str = "manifest.json";

    /// Describe the required files of every model under `root`
    pub fn build(root: &Path) -> OcrResult<Self> {
        Self::build_named(root, &ModelKind::ALL.map(|kind| kind.dir_name()))
    }

    /// Same as [`build`](Self::build) for the model directories `names`
    pub fn build_named(root: &Path, names: &[&str]) -> OcrResult<Self> {
        let mut manifest = Self::default();

        for name in names {
            let dir = root.join(name);
            for filename in REQUIRED_MODEL_FILES {
                let path = dir.join(filename);
                let size_bytes = std::fs::metadata(&path)?.len();
                manifest.models.push(ModelFileInfo {
                    model: name.to_string(),
                    filename: filename.to_string(),
                    size_bytes,
                    sha256: sha256_file(&path)?,
                });
            }
        }

        Ok(manifest)
    }

    pub fn load(root: &Path) -> OcrResult<Self> {
        let content = std::fs::read_to_string(root.join(Self::FILE_NAME))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, root: &Path) -> OcrResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(root.join(Self::FILE_NAME), content)?;
        Ok(())
    }
}

/// Hex SHA-256 of a file, streamed in chunks
pub fn sha256_file(path: &Path) -> OcrResult<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// ONNX Runtime session wrapper.
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex and
/// the wrapper can be shared between threads.
pub struct OnnxSession {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxSession {
    /// Create a new ONNX session from a model file (CPU execution)
    pub fn new(model_path: &Path, intra_threads: usize) -> OcrResult<Self> {
        info!("Loading ONNX model from {:?}", model_path);

        let session = Session::builder()
            .map_err(model_load_error(model_path))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_load_error(model_path))?
            .with_intra_threads(intra_threads.max(1))
            .map_err(model_load_error(model_path))?
            .commit_from_file(model_path)
            .map_err(model_load_error(model_path))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                OcrError::ModelLoad(format!("{} declares no inputs", model_path.display()))
            })?;

        let output_names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        debug!("Model loaded. Input: {}, Outputs: {:?}", input_name, output_names);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }

    /// Name of the model's image input
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Run the model on an NCHW tensor and return its first output
    pub fn run(&self, input: &Array4<f32>) -> OcrResult<ArrayD<f32>> {
        let tensor = TensorRef::from_array_view(input)
            .map_err(|e| OcrError::Inference(format!("failed to create input tensor: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| OcrError::Inference(format!("inference failed: {}", e)))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| OcrError::Inference("model produced no outputs".to_string()))?;

        let array = output
            .try_extract_array::<f32>()
            .map_err(|e| OcrError::Inference(format!("failed to extract output: {}", e)))?;

        Ok(array.to_owned())
    }
}

fn model_load_error<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> OcrError + '_ {
    move |e| OcrError::ModelLoad(format!("{}: {}", path.display(), e))
}
