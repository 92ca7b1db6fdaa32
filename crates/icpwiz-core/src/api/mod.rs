//! REST clients for the ICP backend
//!
//! Every call resolves to an [`ApiResult`] envelope; failures are values, not
//! errors. No retry, no backoff, no request de-duplication.

pub mod client;
pub mod collaborators;
pub mod resources;
pub mod result;
pub mod suggestions;
pub mod workspaces;

pub use client::ApiClient;
pub use resources::ResourceKind;
pub use result::ApiResult;
pub use suggestions::SuggestionKind;
pub use workspaces::{slugify, WorkspacePayload};
