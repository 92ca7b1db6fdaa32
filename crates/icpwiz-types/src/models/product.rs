//! Product positioning: value proposition, features, competitors

use serde::{Deserialize, Serialize};

/// A competitor and how the product differs from it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub differentiation: String,
}

impl Competitor {
    /// A row the user added but never filled in
    pub fn is_empty(&self) -> bool {
        super::is_blank(&self.domain) && super::is_blank(&self.differentiation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub value_proposition: String,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

impl Product {
    /// Features with blank entries dropped
    pub fn filled_features(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .map(String::as_str)
            .filter(|f| !super::is_blank(f))
    }
}
