//! Data models shared between the wizard, the cache and the REST backend

pub mod answers;
pub mod collaborator;
pub mod product;
pub mod segment;
pub mod workspace;

pub use answers::{CompanyInfo, IcpAnswers, ShapeNote};
pub use collaborator::{Collaborator, CollaboratorRole, User};
pub use product::{Competitor, Product};
pub use segment::{DecisionInfluence, Persona, Segment};
pub use workspace::Workspace;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

/// Deserialize an optional value, treating `null` and blank strings as `None`.
///
/// Form payloads send `""` for an unselected dropdown.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => T::deserialize(v).map(Some).map_err(D::Error::custom),
    }
}

/// True when a string is empty after trimming
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
