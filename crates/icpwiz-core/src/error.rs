//! Error types for icpwiz-core
//!
//! Network and HTTP failures never reach this type directly: API calls resolve
//! to an [`ApiResult`](crate::api::ApiResult) envelope, and callers convert a
//! failed envelope into [`CoreError::Api`] only when they need `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for icpwiz operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Storage Errors
    // ===================
    #[error("Failed to read local storage: {path}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write local storage: {path}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Local storage file is corrupted: {path}")]
    StorageCorrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Session Errors
    // ===================
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Workspace not found: {slug}")]
    WorkspaceNotFound { slug: String },

    // ===================
    // Backend Errors
    // ===================
    #[error("{}", api_message(.status, .message))]
    Api { status: Option<u16>, message: String },

    #[error("A submission is already in flight")]
    SubmissionInProgress,

    // ===================
    // Input Errors
    // ===================
    #[error("Failed to parse answers file {path}: {message}")]
    AnswersParse { path: PathBuf, message: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Could not determine a data directory; pass --data-dir or set ICPWIZ_HOME")]
    DataDirNotFound,
}

impl CoreError {
    /// Actionable hint for the CLI, when one exists
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CoreError::NotAuthenticated => Some("Run 'icpwiz login' first".to_string()),
            CoreError::Api {
                status: Some(401), ..
            } => Some("Session expired or invalid; run 'icpwiz login' again".to_string()),
            CoreError::Api { status: None, .. } => {
                Some("Check the backend URL with 'icpwiz config show'".to_string())
            }
            CoreError::StorageCorrupted { path, .. } => Some(format!(
                "Inspect or remove the file: {}",
                path.display()
            )),
            CoreError::AnswersParse { .. } => Some(
                "Answers files are JSON (.json) or YAML (.yaml, .yml) documents".to_string(),
            ),
            CoreError::WorkspaceNotFound { .. } => {
                Some("List available workspaces with 'icpwiz workspaces'".to_string())
            }
            _ => None,
        }
    }
}

fn api_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Backend error ({}): {}", code, message),
        None => format!("Backend error: {}", message),
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
