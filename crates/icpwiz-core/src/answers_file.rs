//! Reading wizard answers from disk
//!
//! The format follows the extension: `.yaml`/`.yml` is YAML, anything else is
//! JSON. Both go through [`IcpAnswers::from_value`] so legacy key spellings
//! are accepted and reported.

use crate::error::{CoreError, Result};
use icpwiz_types::{IcpAnswers, ShapeNote};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()),
        Some(ref ext) if ext == "yaml" || ext == "yml"
    )
}

/// Parse answers text; `yaml` selects the YAML reader
pub fn parse_answers(text: &str, yaml: bool) -> std::result::Result<(IcpAnswers, Vec<ShapeNote>), String> {
    let value: Value = if yaml {
        serde_yaml::from_str(text).map_err(|e| e.to_string())?
    } else {
        serde_json::from_str(text).map_err(|e| e.to_string())?
    };
    IcpAnswers::from_value(value).map_err(|e| e.to_string())
}

/// Load an answers file, logging every legacy key that was reconciled
pub fn read_answers_file(path: &Path) -> Result<(IcpAnswers, Vec<ShapeNote>)> {
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::StorageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (answers, notes) =
        parse_answers(&text, is_yaml(path)).map_err(|message| CoreError::AnswersParse {
            path: path.to_path_buf(),
            message,
        })?;

    for note in &notes {
        warn!(path = %path.display(), "{}", note);
    }
    Ok((answers, notes))
}
