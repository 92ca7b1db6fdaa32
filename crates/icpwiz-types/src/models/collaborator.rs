//! Users and the role-based access they are granted on workspaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An authenticated account as returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Role granted to a collaborator on a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl CollaboratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Admin => "admin",
            CollaboratorRole::Editor => "editor",
            CollaboratorRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollaboratorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(CollaboratorRole::Admin),
            "editor" => Ok(CollaboratorRole::Editor),
            "viewer" => Ok(CollaboratorRole::Viewer),
            other => Err(format!(
                "unknown role '{}' (expected admin, editor or viewer)",
                other
            )),
        }
    }
}

/// A user granted access to a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub email: String,

    #[serde(default)]
    pub role: CollaboratorRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl Collaborator {
    pub fn new(email: impl Into<String>, role: CollaboratorRole) -> Self {
        Self {
            email: email.into(),
            role,
            user_id: None,
            added_at: Utc::now(),
        }
    }

    /// Case-insensitive email comparison
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}
