//! The wizard's aggregate answer object
//!
//! Two wizard variants produce overlapping shapes: the older one writes
//! `companyUrl` and `segments`, the newer one `domain` and
//! `targetAccountSegments`. [`IcpAnswers::from_value`] accepts both and reports
//! every legacy key and every conflict as a [`ShapeNote`] instead of picking a
//! side silently. Serialization always uses the newer spelling.

use super::{Product, Segment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(default)]
    pub company_name: String,

    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub industry: String,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcpAnswers {
    #[serde(default)]
    pub company: CompanyInfo,

    #[serde(default)]
    pub product: Product,

    #[serde(default)]
    pub target_account_segments: Vec<Segment>,
}

/// Something noteworthy found while normalizing an answer document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeNote {
    /// Only the legacy key was present; its value was used
    LegacyKey {
        legacy: &'static str,
        canonical: &'static str,
    },
    /// Both keys were present with different values; the canonical one was kept
    Conflict {
        legacy: &'static str,
        canonical: &'static str,
    },
}

impl fmt::Display for ShapeNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeNote::LegacyKey { legacy, canonical } => {
                write!(f, "legacy key '{}' read as '{}'", legacy, canonical)
            }
            ShapeNote::Conflict { legacy, canonical } => write!(
                f,
                "'{}' and '{}' disagree; kept '{}' and ignored '{}'",
                legacy, canonical, canonical, legacy
            ),
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Fold `legacy` into `canonical` within one JSON object
fn reconcile(
    object: &mut Map<String, Value>,
    legacy: &'static str,
    canonical: &'static str,
    notes: &mut Vec<ShapeNote>,
) {
    let Some(legacy_value) = object.remove(legacy) else {
        return;
    };

    match object.get(canonical) {
        Some(current) if !is_empty_value(current) => {
            if *current != legacy_value && !is_empty_value(&legacy_value) {
                notes.push(ShapeNote::Conflict { legacy, canonical });
            }
        }
        _ => {
            notes.push(ShapeNote::LegacyKey { legacy, canonical });
            object.insert(canonical.to_string(), legacy_value);
        }
    }
}

impl IcpAnswers {
    /// Parse an answer document in either wizard shape
    pub fn from_value(mut value: Value) -> Result<(Self, Vec<ShapeNote>), serde_json::Error> {
        let mut notes = Vec::new();

        if let Value::Object(root) = &mut value {
            reconcile(root, "segments", "targetAccountSegments", &mut notes);

            // The older wizard kept the URL next to the company block
            if let Some(url) = root.remove("companyUrl") {
                let company = root
                    .entry("company")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(company) = company {
                    match company.get("companyUrl") {
                        Some(nested) if !is_empty_value(nested) => {
                            if *nested != url && !is_empty_value(&url) {
                                notes.push(ShapeNote::Conflict {
                                    legacy: "companyUrl",
                                    canonical: "company.companyUrl",
                                });
                            }
                        }
                        _ => {
                            company.insert("companyUrl".to_string(), url);
                        }
                    }
                }
            }

            if let Some(Value::Object(company)) = root.get_mut("company") {
                reconcile(company, "companyUrl", "domain", &mut notes);
            }
        }

        let answers = serde_json::from_value(value)?;
        Ok((answers, notes))
    }

    /// Total personas across all segments
    pub fn persona_count(&self) -> usize {
        self.target_account_segments
            .iter()
            .map(|s| s.personas.len())
            .sum()
    }
}
