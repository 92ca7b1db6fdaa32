//! `/api/workspaces/:slug/collaborators` endpoints

use super::{ApiClient, ApiResult};
use icpwiz_types::{Collaborator, CollaboratorRole};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct InviteRequest<'a> {
    email: &'a str,
    role: CollaboratorRole,
}

impl ApiClient {
    pub async fn list_collaborators(&self, slug: &str) -> ApiResult<Vec<Collaborator>> {
        self.send(self.get(&["api", "workspaces", slug, "collaborators"]))
            .await
    }

    pub async fn invite_collaborator(
        &self,
        slug: &str,
        email: &str,
        role: CollaboratorRole,
    ) -> ApiResult<Collaborator> {
        let request = self
            .post(&["api", "workspaces", slug, "collaborators"])
            .json(&InviteRequest { email, role });
        self.send(request).await
    }

    pub async fn remove_collaborator(&self, slug: &str, email: &str) -> ApiResult<()> {
        self.send_empty(self.delete(&["api", "workspaces", slug, "collaborators", email]))
            .await
    }
}
