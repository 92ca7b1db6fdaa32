//! Permission gate: what the current user may do in a workspace
//!
//! Derived synchronously from ownership and the cached collaborator roles.
//! Nothing here is reactive; callers re-derive whenever they render.

use icpwiz_types::{Collaborator, CollaboratorRole, User, Workspace};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRights {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_invite: bool,
    pub can_delete: bool,
}

impl AccessRights {
    pub const NONE: AccessRights = AccessRights {
        can_view: false,
        can_edit: false,
        can_invite: false,
        can_delete: false,
    };

    pub const OWNER: AccessRights = AccessRights {
        can_view: true,
        can_edit: true,
        can_invite: true,
        can_delete: true,
    };

    pub fn for_role(role: CollaboratorRole) -> Self {
        match role {
            CollaboratorRole::Admin => AccessRights {
                can_view: true,
                can_edit: true,
                can_invite: true,
                can_delete: false,
            },
            CollaboratorRole::Editor => AccessRights {
                can_view: true,
                can_edit: true,
                ..Self::NONE
            },
            CollaboratorRole::Viewer => AccessRights {
                can_view: true,
                ..Self::NONE
            },
        }
    }
}

/// How the rights were decided, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessBasis {
    Anonymous,
    Owner,
    Role(CollaboratorRole),
    Listed,
    Outsider,
}

impl AccessBasis {
    pub fn rights(self) -> AccessRights {
        match self {
            AccessBasis::Owner => AccessRights::OWNER,
            AccessBasis::Role(role) => AccessRights::for_role(role),
            AccessBasis::Listed => AccessRights::for_role(CollaboratorRole::Viewer),
            AccessBasis::Anonymous | AccessBasis::Outsider => AccessRights::NONE,
        }
    }
}

/// Why `user` has the access it has on `workspace`
///
/// Owner first, then a cached role (matched by user id, then by email), then
/// a bare listing in the workspace's collaborator ids.
pub fn access_basis(
    workspace: &Workspace,
    user: Option<&User>,
    collaborators: &[Collaborator],
) -> AccessBasis {
    let Some(user) = user else {
        return AccessBasis::Anonymous;
    };

    if workspace.owner() == Some(user.id.as_str()) {
        return AccessBasis::Owner;
    }

    let role = collaborators
        .iter()
        .find(|c| c.user_id.as_deref() == Some(user.id.as_str()))
        .or_else(|| collaborators.iter().find(|c| c.has_email(&user.email)))
        .map(|c| c.role);
    if let Some(role) = role {
        return AccessBasis::Role(role);
    }

    if workspace.lists_collaborator(&user.id, &user.email) {
        return AccessBasis::Listed;
    }

    AccessBasis::Outsider
}

/// Rights of `user` on `workspace`, given the cached collaborators
pub fn derive_access(
    workspace: &Workspace,
    user: Option<&User>,
    collaborators: &[Collaborator],
) -> AccessRights {
    access_basis(workspace, user, collaborators).rights()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::workspace;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: None,
        }
    }

    #[test]
    fn test_anonymous_gets_nothing() {
        let ws = workspace("w1", "acme", "owner");
        assert_eq!(derive_access(&ws, None, &[]), AccessRights::NONE);
        assert_eq!(access_basis(&ws, None, &[]), AccessBasis::Anonymous);
    }

    #[test]
    fn test_owner_gets_everything() {
        let ws = workspace("w1", "acme", "owner");
        let owner = user("owner", "o@acme.io");
        assert_eq!(derive_access(&ws, Some(&owner), &[]), AccessRights::OWNER);
        assert_eq!(access_basis(&ws, Some(&owner), &[]), AccessBasis::Owner);
    }

    #[test]
    fn test_owner_id_fallback() {
        let mut ws = workspace("w1", "acme", "someone");
        ws.creator_id = None;
        ws.owner_id = Some("owner".to_string());
        let rights = derive_access(&ws, Some(&user("owner", "o@acme.io")), &[]);
        assert!(rights.can_delete);
    }

    #[test]
    fn test_roles_from_cache() {
        let ws = workspace("w1", "acme", "owner");
        let collaborators = vec![
            Collaborator::new("admin@acme.io", CollaboratorRole::Admin),
            Collaborator::new("Editor@Acme.io", CollaboratorRole::Editor),
            Collaborator {
                user_id: Some("u-viewer".to_string()),
                ..Collaborator::new("viewer@elsewhere.io", CollaboratorRole::Viewer)
            },
        ];

        let admin = derive_access(&ws, Some(&user("u1", "admin@acme.io")), &collaborators);
        assert!(admin.can_view && admin.can_edit && admin.can_invite);
        assert!(!admin.can_delete);

        let editor_user = user("u2", "editor@acme.io");
        let editor = derive_access(&ws, Some(&editor_user), &collaborators);
        assert!(editor.can_edit && !editor.can_invite);
        assert_eq!(
            access_basis(&ws, Some(&editor_user), &collaborators),
            AccessBasis::Role(CollaboratorRole::Editor)
        );

        let viewer = derive_access(&ws, Some(&user("u-viewer", "other@acme.io")), &collaborators);
        assert!(viewer.can_view && !viewer.can_edit);
    }

    #[test]
    fn test_user_id_match_wins_over_email() {
        let ws = workspace("w1", "acme", "owner");
        let collaborators = vec![
            Collaborator::new("pat@acme.io", CollaboratorRole::Viewer),
            Collaborator {
                user_id: Some("u-pat".to_string()),
                ..Collaborator::new("pat.old@acme.io", CollaboratorRole::Admin)
            },
        ];
        let basis = access_basis(&ws, Some(&user("u-pat", "pat@acme.io")), &collaborators);
        assert_eq!(basis, AccessBasis::Role(CollaboratorRole::Admin));
    }

    #[test]
    fn test_listed_without_role_is_view_only() {
        let mut ws = workspace("w1", "acme", "owner");
        ws.collaborators = vec!["u7".to_string()];
        let listed = user("u7", "x@acme.io");
        assert_eq!(access_basis(&ws, Some(&listed), &[]), AccessBasis::Listed);
        let rights = derive_access(&ws, Some(&listed), &[]);
        assert!(rights.can_view && !rights.can_edit);

        let outsider = user("u8", "y@acme.io");
        assert_eq!(access_basis(&ws, Some(&outsider), &[]), AccessBasis::Outsider);
        assert_eq!(derive_access(&ws, Some(&outsider), &[]), AccessRights::NONE);
    }
}
