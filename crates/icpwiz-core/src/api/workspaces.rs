//! `/api/workspaces` endpoints

use super::{ApiClient, ApiResult};
use icpwiz_types::{CompanyInfo, IcpAnswers, Product, Segment, Workspace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// URL-safe slug: lowercase ASCII alphanumerics joined by single dashes
pub fn slugify(name: &str) -> String {
    NON_SLUG_CHARS
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Body of workspace create/update calls: the wizard aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub company: CompanyInfo,
    pub product: Product,
    pub segments: Vec<Segment>,
}

impl WorkspacePayload {
    /// Payload creating a new workspace named `name`
    pub fn create(name: &str, answers: &IcpAnswers) -> Self {
        Self {
            name: Some(name.to_string()),
            slug: Some(slugify(name)),
            ..Self::update(answers)
        }
    }

    /// Payload updating an existing workspace's ICP data
    pub fn update(answers: &IcpAnswers) -> Self {
        Self {
            name: None,
            slug: None,
            company: answers.company.clone(),
            product: answers.product.clone(),
            segments: answers.target_account_segments.clone(),
        }
    }
}

impl ApiClient {
    pub async fn list_workspaces(&self) -> ApiResult<Vec<Workspace>> {
        self.send(self.get(&["api", "workspaces"])).await
    }

    pub async fn get_workspace(&self, slug: &str) -> ApiResult<Workspace> {
        self.send(self.get(&["api", "workspaces", slug])).await
    }

    pub async fn create_workspace(&self, payload: &WorkspacePayload) -> ApiResult<Workspace> {
        self.send(self.post(&["api", "workspaces"]).json(payload)).await
    }

    pub async fn update_workspace(
        &self,
        slug: &str,
        payload: &WorkspacePayload,
    ) -> ApiResult<Workspace> {
        self.send(self.put(&["api", "workspaces", slug]).json(payload)).await
    }

    pub async fn delete_workspace(&self, slug: &str) -> ApiResult<()> {
        self.send_empty(self.delete(&["api", "workspaces", slug])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Corp"), "acme-corp");
        assert_eq!(slugify("  --Hello,  World!!  "), "hello-world");
        assert_eq!(slugify("Café 2024"), "caf-2024");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_payload_shapes() {
        let mut answers = IcpAnswers::default();
        answers.company.company_name = "Acme".to_string();
        answers.target_account_segments.push(Segment::named("SMB"));

        let create = serde_json::to_value(WorkspacePayload::create("Acme Corp", &answers)).unwrap();
        assert_eq!(create["name"], "Acme Corp");
        assert_eq!(create["slug"], "acme-corp");
        assert_eq!(create["segments"][0]["name"], "SMB");
        assert_eq!(create["company"]["companyName"], "Acme");

        let update = serde_json::to_value(WorkspacePayload::update(&answers)).unwrap();
        assert!(update.get("name").is_none());
        assert!(update.get("slug").is_none());
    }
}
