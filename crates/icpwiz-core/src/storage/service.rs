//! Typed cache of workspaces, wizard answers and collaborators
//!
//! Layout inside the [`LocalStore`]:
//! - `icp_wizard_workspaces`: JSON array of workspaces
//! - `icp_wizard_icp_data`: `{ workspaceId: answers }`
//! - `icp_wizard_collaborators`: `{ workspaceId: [collaborator] }`
//! - `<prefix>-<slug>`: per-workspace ad hoc entries, see [`ScopedKey`]
//!
//! No eviction, no TTL, no size bound.

use super::LocalStore;
use crate::error::{CoreError, Result};
use icpwiz_types::{Collaborator, IcpAnswers, Workspace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub const WORKSPACES_KEY: &str = "icp_wizard_workspaces";
pub const ICP_DATA_KEY: &str = "icp_wizard_icp_data";
pub const COLLABORATORS_KEY: &str = "icp_wizard_collaborators";

/// Per-workspace entries stored under `<prefix>-<slug>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedKey {
    /// Free-form outbound play notes
    OutboundPlays,
    /// Wizard answers that failed validation and were kept for later
    WizardDraft,
}

impl ScopedKey {
    pub const ALL: [ScopedKey; 2] = [ScopedKey::OutboundPlays, ScopedKey::WizardDraft];

    pub fn prefix(&self) -> &'static str {
        match self {
            ScopedKey::OutboundPlays => "outbound-plays",
            ScopedKey::WizardDraft => "icp-wizard-draft",
        }
    }

    pub fn key_for(&self, slug: &str) -> String {
        format!("{}-{}", self.prefix(), slug)
    }
}

pub struct StorageService<S: LocalStore> {
    store: S,
}

impl<S: LocalStore> StorageService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read a JSON value; absent or malformed entries read as the default
    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(raw) = self.store.get_item(key)? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "Malformed cache entry, treating as empty");
                Ok(T::default())
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| CoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set_item(key, &raw)
    }

    fn to_value<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Value> {
        serde_json::to_value(value).map_err(|source| CoreError::Encode {
            key: key.to_string(),
            source,
        })
    }

    // ===================
    // Workspaces
    // ===================

    /// Cached workspaces; records that no longer decode are skipped
    pub fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        let raw: Vec<Value> = self.read_json(WORKSPACES_KEY)?;
        Ok(raw
            .into_iter()
            .filter_map(|value| decode_entry(WORKSPACES_KEY, value))
            .collect())
    }

    /// Insert or replace (matched by id) a workspace record
    ///
    /// Records that fail to decode are written back untouched.
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<()> {
        let record = Self::to_value(WORKSPACES_KEY, workspace)?;
        let mut raw: Vec<Value> = self.read_json(WORKSPACES_KEY)?;
        match raw.iter_mut().find(|w| record_id(w) == Some(workspace.id.as_str())) {
            Some(existing) => *existing = record,
            None => raw.push(record),
        }
        self.write_json(WORKSPACES_KEY, &raw)?;
        debug!(slug = %workspace.slug, "Workspace cached");
        Ok(())
    }

    pub fn get_workspace(&self, slug: &str) -> Result<Option<Workspace>> {
        let found = self
            .list_workspaces()?
            .into_iter()
            .find(|w| w.slug == slug);
        debug!(slug, hit = found.is_some(), "Workspace cache lookup");
        Ok(found)
    }

    pub fn get_workspace_by_id(&self, id: &str) -> Result<Option<Workspace>> {
        Ok(self.list_workspaces()?.into_iter().find(|w| w.id == id))
    }

    /// Remove a workspace and everything cached for it
    ///
    /// Returns false when no workspace with that id was cached; keyed ICP data
    /// and collaborators are removed either way.
    pub fn delete_workspace(&self, id: &str) -> Result<bool> {
        let slug = self.get_workspace_by_id(id)?.map(|w| w.slug);
        let mut raw: Vec<Value> = self.read_json(WORKSPACES_KEY)?;
        raw.retain(|w| record_id(w) != Some(id));
        self.write_json(WORKSPACES_KEY, &raw)?;

        for key in [ICP_DATA_KEY, COLLABORATORS_KEY] {
            let mut map: Map<String, Value> = self.read_json(key)?;
            if map.remove(id).is_some() {
                self.write_json(key, &map)?;
            }
        }

        if let Some(slug) = &slug {
            for scoped in ScopedKey::ALL {
                self.store.remove_item(&scoped.key_for(slug))?;
            }
        }

        info!(workspace_id = id, found = slug.is_some(), "Workspace evicted from cache");
        Ok(slug.is_some())
    }

    /// Drop a deleted segment from the cached workspace and its answers
    pub fn evict_segment(&self, workspace_id: &str, segment_id: &str) -> Result<()> {
        if let Some(mut workspace) = self.get_workspace_by_id(workspace_id)? {
            workspace
                .segments
                .retain(|s| s.id.as_deref() != Some(segment_id));
            self.save_workspace(&workspace)?;
        }

        if let Some(mut answers) = self.get_icp_data(workspace_id)? {
            answers
                .target_account_segments
                .retain(|s| s.id.as_deref() != Some(segment_id));
            self.save_icp_data(workspace_id, &answers)?;
        }
        Ok(())
    }

    /// Drop a deleted persona wherever the cached workspace embeds it
    pub fn evict_persona(&self, workspace_id: &str, persona_id: &str) -> Result<()> {
        let keep = |p: &icpwiz_types::Persona| p.id.as_deref() != Some(persona_id);

        if let Some(mut workspace) = self.get_workspace_by_id(workspace_id)? {
            workspace.personas.retain(keep);
            for segment in &mut workspace.segments {
                segment.personas.retain(keep);
            }
            self.save_workspace(&workspace)?;
        }

        if let Some(mut answers) = self.get_icp_data(workspace_id)? {
            for segment in &mut answers.target_account_segments {
                segment.personas.retain(keep);
            }
            self.save_icp_data(workspace_id, &answers)?;
        }
        Ok(())
    }

    // ===================
    // Wizard answers
    // ===================

    /// Store answers under a workspace id; other entries are left as stored
    pub fn save_icp_data(&self, workspace_id: &str, answers: &IcpAnswers) -> Result<()> {
        let entry = Self::to_value(ICP_DATA_KEY, answers)?;
        let mut icp_data: Map<String, Value> = self.read_json(ICP_DATA_KEY)?;
        icp_data.insert(workspace_id.to_string(), entry);
        self.write_json(ICP_DATA_KEY, &icp_data)
    }

    pub fn get_icp_data(&self, workspace_id: &str) -> Result<Option<IcpAnswers>> {
        let mut icp_data: Map<String, Value> = self.read_json(ICP_DATA_KEY)?;
        Ok(icp_data
            .remove(workspace_id)
            .and_then(|value| decode_entry(ICP_DATA_KEY, value)))
    }

    // ===================
    // Collaborators
    // ===================

    /// Add a collaborator; an entry with the same email is replaced
    pub fn add_collaborator(&self, workspace_id: &str, collaborator: Collaborator) -> Result<()> {
        let record = Self::to_value(COLLABORATORS_KEY, &collaborator)?;
        let mut all: Map<String, Value> = self.read_json(COLLABORATORS_KEY)?;
        let mut list = match all.remove(workspace_id) {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        };
        list.retain(|c| !record_email(c).is_some_and(|email| collaborator.has_email(email)));
        list.push(record);
        all.insert(workspace_id.to_string(), Value::Array(list));
        self.write_json(COLLABORATORS_KEY, &all)
    }

    /// Cached collaborators; entries that no longer decode are skipped
    pub fn get_collaborators(&self, workspace_id: &str) -> Result<Vec<Collaborator>> {
        let mut all: Map<String, Value> = self.read_json(COLLABORATORS_KEY)?;
        let list = match all.remove(workspace_id) {
            Some(Value::Array(list)) => list,
            Some(_) => {
                warn!(workspace_id, "Collaborator entry is not a list, ignoring");
                Vec::new()
            }
            None => Vec::new(),
        };
        Ok(list
            .into_iter()
            .filter_map(|value| decode_entry(COLLABORATORS_KEY, value))
            .collect())
    }

    /// Replace the cached collaborator list with what the backend returned
    pub fn set_collaborators(&self, workspace_id: &str, list: &[Collaborator]) -> Result<()> {
        let entry = Self::to_value(COLLABORATORS_KEY, list)?;
        let mut all: Map<String, Value> = self.read_json(COLLABORATORS_KEY)?;
        all.insert(workspace_id.to_string(), entry);
        self.write_json(COLLABORATORS_KEY, &all)
    }

    pub fn remove_collaborator(&self, workspace_id: &str, email: &str) -> Result<bool> {
        let mut all: Map<String, Value> = self.read_json(COLLABORATORS_KEY)?;
        let Some(Value::Array(list)) = all.get_mut(workspace_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|c| {
            !record_email(c).is_some_and(|stored| stored.trim().eq_ignore_ascii_case(email.trim()))
        });
        let removed = list.len() != before;
        if removed {
            self.write_json(COLLABORATORS_KEY, &all)?;
        }
        Ok(removed)
    }

    // ===================
    // Ad hoc per-workspace keys
    // ===================

    pub fn save_scoped<T: Serialize + ?Sized>(
        &self,
        key: ScopedKey,
        slug: &str,
        value: &T,
    ) -> Result<()> {
        self.write_json(&key.key_for(slug), value)
    }

    pub fn get_scoped<T: DeserializeOwned>(&self, key: ScopedKey, slug: &str) -> Result<Option<T>> {
        let key = key.key_for(slug);
        let Some(raw) = self.store.get_item(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Malformed scoped entry, ignoring");
                Ok(None)
            }
        }
    }

    pub fn remove_scoped(&self, key: ScopedKey, slug: &str) -> Result<()> {
        self.store.remove_item(&key.key_for(slug))
    }

    /// Wipe all cached workspace data (the session keys are left alone)
    pub fn clear(&self) -> Result<()> {
        for key in self.store.keys()? {
            if key == crate::auth::TOKEN_KEY || key == crate::auth::USER_KEY {
                continue;
            }
            self.store.remove_item(&key)?;
        }
        Ok(())
    }
}

/// Decode one cached record, skipping it with a warning when it no longer fits
fn decode_entry<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(key, error = %e, "Skipping malformed cache record");
            None
        }
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record
        .get("_id")
        .or_else(|| record.get("id"))
        .and_then(Value::as_str)
}

fn record_email(record: &Value) -> Option<&str> {
    record.get("email").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use icpwiz_types::{CollaboratorRole, Persona, Segment};

    fn workspace(id: &str, slug: &str) -> Workspace {
        Workspace {
            id: id.to_string(),
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            creator_id: Some("u1".to_string()),
            owner_id: None,
            collaborators: vec!["u2".to_string()],
            product: None,
            personas: vec![],
            segments: vec![Segment {
                id: Some("s1".to_string()),
                name: "SMB".to_string(),
                personas: vec![Persona {
                    id: Some("p1".to_string()),
                    title: "Founder".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            created_at: None,
            updated_at: None,
        }
    }

    fn service() -> StorageService<MemoryStore> {
        StorageService::new(MemoryStore::new())
    }

    #[test]
    fn test_save_then_get_round_trip() {
        let storage = service();
        let ws = workspace("w1", "acme");
        storage.save_workspace(&ws).unwrap();

        assert_eq!(storage.get_workspace("acme").unwrap(), Some(ws.clone()));
        assert_eq!(storage.get_workspace_by_id("w1").unwrap(), Some(ws));
        assert_eq!(storage.get_workspace("other").unwrap(), None);
    }

    #[test]
    fn test_save_workspace_upserts_by_id() {
        let storage = service();
        storage.save_workspace(&workspace("w1", "acme")).unwrap();
        storage.save_workspace(&workspace("w2", "globex")).unwrap();

        let mut renamed = workspace("w1", "acme");
        renamed.name = "Acme Corp".to_string();
        storage.save_workspace(&renamed).unwrap();

        let all = storage.list_workspaces().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Acme Corp");
        assert_eq!(all[1].slug, "globex");
    }

    #[test]
    fn test_delete_workspace_cascades() {
        let storage = service();
        storage.save_workspace(&workspace("w1", "acme")).unwrap();
        storage.save_workspace(&workspace("w2", "globex")).unwrap();
        storage.save_icp_data("w1", &IcpAnswers::default()).unwrap();
        storage.save_icp_data("w2", &IcpAnswers::default()).unwrap();
        storage
            .add_collaborator("w1", Collaborator::new("a@acme.io", CollaboratorRole::Editor))
            .unwrap();
        storage
            .save_scoped(ScopedKey::OutboundPlays, "acme", &vec!["call CFOs"])
            .unwrap();

        assert!(storage.delete_workspace("w1").unwrap());

        assert_eq!(storage.get_workspace("acme").unwrap(), None);
        assert_eq!(storage.get_icp_data("w1").unwrap(), None);
        assert!(storage.get_collaborators("w1").unwrap().is_empty());
        assert_eq!(
            storage
                .get_scoped::<Vec<String>>(ScopedKey::OutboundPlays, "acme")
                .unwrap(),
            None
        );

        // Untouched neighbour
        assert!(storage.get_workspace("globex").unwrap().is_some());
        assert!(storage.get_icp_data("w2").unwrap().is_some());

        assert!(!storage.delete_workspace("w1").unwrap());
    }

    #[test]
    fn test_malformed_entry_reads_as_empty() {
        let storage = service();
        storage.store().set_item(WORKSPACES_KEY, "not json").unwrap();
        assert!(storage.list_workspaces().unwrap().is_empty());

        // And can be overwritten
        storage.save_workspace(&workspace("w1", "acme")).unwrap();
        assert_eq!(storage.list_workspaces().unwrap().len(), 1);
    }

    #[test]
    fn test_one_bad_record_does_not_cost_the_others() {
        let storage = service();
        storage.save_workspace(&workspace("w1", "acme")).unwrap();
        storage.save_icp_data("w1", &IcpAnswers::default()).unwrap();

        let mut workspaces: Vec<Value> =
            serde_json::from_str(&storage.store().get_item(WORKSPACES_KEY).unwrap().unwrap())
                .unwrap();
        workspaces.push(serde_json::json!({ "_id": "w2", "slug": 42 }));
        storage
            .store()
            .set_item(WORKSPACES_KEY, &serde_json::to_string(&workspaces).unwrap())
            .unwrap();

        assert_eq!(storage.list_workspaces().unwrap().len(), 1);
        storage.save_workspace(&workspace("w3", "initech")).unwrap();

        let raw = storage.store().get_item(WORKSPACES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"w2\""));
        assert_eq!(storage.list_workspaces().unwrap().len(), 2);

        storage
            .add_collaborator("w1", Collaborator::new("pat@acme.io", CollaboratorRole::Editor))
            .unwrap();
        let mut collaborators: Map<String, Value> =
            serde_json::from_str(&storage.store().get_item(COLLABORATORS_KEY).unwrap().unwrap())
                .unwrap();
        collaborators["w1"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({ "email": "kim@acme.io", "role": "owner" }));
        storage
            .store()
            .set_item(COLLABORATORS_KEY, &serde_json::to_string(&collaborators).unwrap())
            .unwrap();

        let listed = storage.get_collaborators("w1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "pat@acme.io");
        assert!(storage.remove_collaborator("w1", "kim@acme.io").unwrap());
    }

    #[test]
    fn test_collaborator_same_email_replaced() {
        let storage = service();
        storage
            .add_collaborator("w1", Collaborator::new("pat@acme.io", CollaboratorRole::Viewer))
            .unwrap();
        storage
            .add_collaborator("w1", Collaborator::new("PAT@acme.io", CollaboratorRole::Admin))
            .unwrap();
        storage
            .add_collaborator("w1", Collaborator::new("kim@acme.io", CollaboratorRole::Editor))
            .unwrap();

        let list = storage.get_collaborators("w1").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].role, CollaboratorRole::Admin);

        assert!(storage.remove_collaborator("w1", "kim@acme.io").unwrap());
        assert!(!storage.remove_collaborator("w1", "kim@acme.io").unwrap());
        assert!(!storage.remove_collaborator("w9", "kim@acme.io").unwrap());
        assert_eq!(storage.get_collaborators("w1").unwrap().len(), 1);
    }

    #[test]
    fn test_evict_segment_and_persona() {
        let storage = service();
        let ws = workspace("w1", "acme");
        storage.save_workspace(&ws).unwrap();
        storage
            .save_icp_data(
                "w1",
                &IcpAnswers {
                    target_account_segments: ws.segments.clone(),
                    ..Default::default()
                },
            )
            .unwrap();

        storage.evict_persona("w1", "p1").unwrap();
        let cached = storage.get_workspace("acme").unwrap().unwrap();
        assert!(cached.segments[0].personas.is_empty());
        assert_eq!(storage.get_icp_data("w1").unwrap().unwrap().persona_count(), 0);

        storage.evict_segment("w1", "s1").unwrap();
        let cached = storage.get_workspace("acme").unwrap().unwrap();
        assert!(cached.segments.is_empty());
        assert!(storage
            .get_icp_data("w1")
            .unwrap()
            .unwrap()
            .target_account_segments
            .is_empty());
    }

    #[test]
    fn test_clear_keeps_session() {
        let storage = service();
        storage.store().set_item(crate::auth::TOKEN_KEY, "t").unwrap();
        storage.save_workspace(&workspace("w1", "acme")).unwrap();

        storage.clear().unwrap();

        assert!(storage.list_workspaces().unwrap().is_empty());
        assert_eq!(
            storage.store().get_item(crate::auth::TOKEN_KEY).unwrap().as_deref(),
            Some("t")
        );
    }
}
