//! icpwiz-core - Core library for icpwiz
//!
//! Provides the local cache, session and REST clients, the wizard step
//! validator and state machine, and the workspace permission gate.

pub mod answers_file;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod loader;
pub mod permissions;
pub mod storage;
pub mod summary;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod fixtures;

pub use answers_file::{parse_answers, read_answers_file};
pub use api::{ApiClient, ApiResult};
pub use auth::{AuthClient, AuthSession, SessionStore};
pub use config::ClientConfig;
pub use error::CoreError;
pub use loader::WorkspaceLoader;
pub use permissions::{access_basis, derive_access, AccessBasis, AccessRights};
pub use storage::{FileStore, LocalStore, MemoryStore, StorageService};
pub use summary::{WizardCompletion, WorkspaceSummary};
pub use validation::{validate_all, validate_step, StepFailure, ValidationResult, WizardStep};
pub use wizard::{SubmitOutcome, SubmitTarget, WizardSession, WizardSubmitter};
