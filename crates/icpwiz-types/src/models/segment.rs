//! Target segments and the buyer personas nested inside them

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much weight a persona carries in the buying decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionInfluence {
    #[serde(alias = "decisionMaker", alias = "Decision Maker")]
    DecisionMaker,
    #[serde(alias = "Influencer")]
    Influencer,
    #[serde(alias = "endUser", alias = "End User")]
    EndUser,
    #[serde(alias = "Gatekeeper")]
    Gatekeeper,
    #[serde(alias = "Champion")]
    Champion,
}

impl DecisionInfluence {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionInfluence::DecisionMaker => "Decision Maker",
            DecisionInfluence::Influencer => "Influencer",
            DecisionInfluence::EndUser => "End User",
            DecisionInfluence::Gatekeeper => "Gatekeeper",
            DecisionInfluence::Champion => "Champion",
        }
    }
}

impl fmt::Display for DecisionInfluence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A buyer role profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub seniority: String,

    #[serde(default)]
    pub department: String,

    #[serde(
        default,
        deserialize_with = "super::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub decision_influence: Option<DecisionInfluence>,

    #[serde(default)]
    pub responsibilities: Vec<String>,

    #[serde(default)]
    pub pain_points: Vec<String>,

    #[serde(default)]
    pub goals: Vec<String>,

    #[serde(default)]
    pub channels: Vec<String>,
}

/// A target market slice with qualification criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub industry: String,

    #[serde(default)]
    pub company_size: String,

    #[serde(default)]
    pub geography: String,

    #[serde(default)]
    pub locations: Vec<String>,

    #[serde(default)]
    pub signals: Vec<String>,

    #[serde(default)]
    pub qualification_criteria: Vec<String>,

    #[serde(default)]
    pub personas: Vec<Persona>,
}

impl Segment {
    /// Create a segment with just a name (the form's "add segment" button)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Display name, falling back to the industry for unnamed segments
    pub fn display_name(&self) -> &str {
        if !super::is_blank(&self.name) {
            &self.name
        } else if !super::is_blank(&self.industry) {
            &self.industry
        } else {
            "(unnamed segment)"
        }
    }
}
