//! Character dictionary and CTC decoding for the recognition model

use ndarray::ArrayViewD;
use serde::Deserialize;
use std::path::Path;

use crate::error::{OcrError, OcrResult};

/// Subset of the exported `inference.yml` that carries the character set
#[derive(Debug, Deserialize)]
struct InferenceConfig {
    #[serde(rename = "PostProcess")]
    post_process: Option<PostProcessConfig>,
}

#[derive(Debug, Deserialize)]
struct PostProcessConfig {
    character_dict: Option<Vec<serde_yaml::Value>>,
}

/// Recognition alphabet in model output order.
///
/// Index 0 is the CTC blank and the last entry is a space, matching how PaddleOCR
/// recognition heads are trained.
#[derive(Debug, Clone)]
pub struct CharDictionary {
    symbols: Vec<String>,
}

impl CharDictionary {
    /// Build from the raw character list (without blank and space)
    pub fn from_entries(entries: Vec<String>) -> OcrResult<Self> {
        if entries.is_empty() {
            return Err(OcrError::Dictionary("character list is empty".to_string()));
        }

        let mut symbols = Vec::with_capacity(entries.len() + 2);
        symbols.push(String::new());
        symbols.extend(entries);
        symbols.push(" ".to_string());

        Ok(Self { symbols })
    }

    /// Parse the `PostProcess.character_dict` list of an `inference.yml`
    pub fn from_yaml_str(content: &str) -> OcrResult<Self> {
        let config: InferenceConfig = serde_yaml::from_str(content)
            .map_err(|e| OcrError::Dictionary(format!("invalid inference.yml: {}", e)))?;

        let values = config
            .post_process
            .and_then(|p| p.character_dict)
            .ok_or_else(|| {
                OcrError::Dictionary("inference.yml has no PostProcess.character_dict".to_string())
            })?;

        let entries = values
            .into_iter()
            .map(|value| match value {
                serde_yaml::Value::String(s) => Ok(s),
                serde_yaml::Value::Number(n) => Ok(n.to_string()),
                serde_yaml::Value::Bool(b) => Ok(b.to_string()),
                other => Err(OcrError::Dictionary(format!(
                    "unexpected dictionary entry: {:?}",
                    other
                ))),
            })
            .collect::<OcrResult<Vec<_>>>()?;

        Self::from_entries(entries)
    }

    /// Read the dictionary from a recognition model's `inference.yml`
    pub fn from_inference_config(path: &Path) -> OcrResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OcrError::Dictionary(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Number of output classes including blank and space
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }
}

/// Greedy CTC decoding of a `[N, T, C]` or `[T, C]` score tensor.
///
/// Takes the argmax per timestep, collapses repeats and drops blanks. The returned
/// score is the mean of the kept characters' probabilities (0.0 for empty text).
pub fn ctc_greedy_decode(
    output: &ArrayViewD<f32>,
    dictionary: &CharDictionary,
) -> OcrResult<(String, f32)> {
    let shape = output.shape();
    let (seq_len, num_classes) = match shape.len() {
        2 => (shape[0], shape[1]),
        3 => (shape[1], shape[2]),
        _ => {
            return Err(OcrError::Inference(format!(
                "unexpected recognition output shape {:?}",
                shape
            )))
        }
    };

    let mut text = String::new();
    let mut scores = Vec::new();
    let mut prev_idx = 0usize;

    for t in 0..seq_len {
        let mut max_idx = 0;
        let mut max_prob = f32::MIN;

        for c in 0..num_classes {
            let prob = if shape.len() == 3 {
                output[[0, t, c]]
            } else {
                output[[t, c]]
            };
            if prob > max_prob {
                max_prob = prob;
                max_idx = c;
            }
        }

        if max_idx != 0 && max_idx != prev_idx {
            if let Some(symbol) = dictionary.symbol(max_idx) {
                text.push_str(symbol);
                scores.push(max_prob);
            }
        }
        prev_idx = max_idx;
    }

    let score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f32>() / scores.len() as f32
    };

    Ok((text, score))
}
