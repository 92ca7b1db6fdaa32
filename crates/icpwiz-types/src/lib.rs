//! icpwiz-types - Shared data types for icpwiz
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types.
//!
//! Used by:
//! - icpwiz-core (storage, API client, validation)
//! - icpwiz (CLI front-end)

pub mod models;

pub use models::{
    Collaborator, CollaboratorRole, CompanyInfo, Competitor, DecisionInfluence, IcpAnswers,
    Persona, Product, Segment, ShapeNote, User, Workspace,
};
