//! AI suggestion endpoint: the backend drafts list entries from the current answers

use super::{ApiClient, ApiResult};
use icpwiz_types::IcpAnswers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Segments,
    Personas,
    ValueProposition,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SuggestionKind::Segments => "segments",
            SuggestionKind::Personas => "personas",
            SuggestionKind::ValueProposition => "value_proposition",
        })
    }
}

impl FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "segments" => Ok(SuggestionKind::Segments),
            "personas" => Ok(SuggestionKind::Personas),
            "value_proposition" => Ok(SuggestionKind::ValueProposition),
            other => Err(format!(
                "unknown suggestion kind '{}' (expected segments, personas or value-proposition)",
                other
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct SuggestionRequest<'a> {
    kind: SuggestionKind,
    context: &'a IcpAnswers,
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(default)]
    suggestions: Vec<String>,
}

impl ApiClient {
    pub async fn request_suggestions(
        &self,
        slug: &str,
        kind: SuggestionKind,
        context: &IcpAnswers,
    ) -> ApiResult<Vec<String>> {
        let request = self
            .post(&["api", "workspaces", slug, "suggestions"])
            .json(&SuggestionRequest { kind, context });
        self.send::<SuggestionResponse>(request)
            .await
            .map(|response| response.suggestions)
    }
}
