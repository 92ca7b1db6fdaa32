//! Workspace: the tenant container for one company's ICP data

use super::{Persona, Product, Segment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// User ids or emails with access
    #[serde(default)]
    pub collaborators: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,

    #[serde(default)]
    pub personas: Vec<Persona>,

    #[serde(default)]
    pub segments: Vec<Segment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Workspace {
    /// Owner id: `creatorId` wins over `ownerId`
    pub fn owner(&self) -> Option<&str> {
        [&self.creator_id, &self.owner_id]
            .into_iter()
            .filter_map(|id| id.as_deref())
            .find(|id| !id.is_empty())
    }

    /// Top-level personas followed by personas nested in segments
    pub fn all_personas(&self) -> impl Iterator<Item = &Persona> {
        self.personas
            .iter()
            .chain(self.segments.iter().flat_map(|s| s.personas.iter()))
    }

    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id.as_deref() == Some(id))
    }

    /// Whether a user id or email appears in the collaborator list
    pub fn lists_collaborator(&self, user_id: &str, email: &str) -> bool {
        self.collaborators
            .iter()
            .any(|c| c == user_id || c.eq_ignore_ascii_case(email))
    }
}
