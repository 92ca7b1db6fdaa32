//! Read-through loading of workspaces and their collaborators

use crate::api::ApiClient;
use crate::error::{CoreError, Result};
use crate::storage::{LocalStore, StorageService};
use icpwiz_types::{Collaborator, Workspace};
use tracing::{debug, warn};

pub struct WorkspaceLoader<'a, S: LocalStore> {
    api: &'a ApiClient,
    storage: &'a StorageService<S>,
}

impl<'a, S: LocalStore> WorkspaceLoader<'a, S> {
    pub fn new(api: &'a ApiClient, storage: &'a StorageService<S>) -> Self {
        Self { api, storage }
    }

    /// Cached copy when present (unless `refresh`), else fetch and cache
    pub async fn load(&self, slug: &str, refresh: bool) -> Result<Workspace> {
        if !refresh {
            if let Some(workspace) = self.storage.get_workspace(slug)? {
                return Ok(workspace);
            }
        }

        debug!(slug, refresh, "Fetching workspace from backend");
        let result = self.api.get_workspace(slug).await;
        if result.is_not_found() {
            return Err(CoreError::WorkspaceNotFound {
                slug: slug.to_string(),
            });
        }

        let workspace = result.into_result()?;
        self.storage.save_workspace(&workspace)?;
        Ok(workspace)
    }

    /// Fetch every workspace the user can see and cache each one
    pub async fn load_all(&self) -> Result<Vec<Workspace>> {
        let workspaces = self.api.list_workspaces().await.into_result()?;
        for workspace in &workspaces {
            self.storage.save_workspace(workspace)?;
        }
        Ok(workspaces)
    }

    /// Collaborators from the backend, falling back to the cache
    pub async fn collaborators(&self, workspace: &Workspace) -> Result<Vec<Collaborator>> {
        let result = self.api.list_collaborators(&workspace.slug).await;
        match result.into_result() {
            Ok(list) => {
                self.storage.set_collaborators(&workspace.id, &list)?;
                Ok(list)
            }
            Err(e) => {
                warn!(slug = %workspace.slug, error = %e, "Using cached collaborators");
                self.storage.get_collaborators(&workspace.id)
            }
        }
    }
}
