//! Access decisions for alias-scoped operations.
//!
//! Read access = owner or any collaborator role. Send access = owner or
//! member. Manage access (toggling, collaborator membership) = owner only.
//!
//! Callers with no relation to an alias receive the same "not found" answer
//! as callers of a nonexistent alias, so lookups cannot probe for alias
//! existence. Role failures after a successful resolve (a viewer trying to
//! send, a member trying to manage) are reported as permission errors.

use super::types::{Alias, Collaborator};

/// A caller's relation to an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// The alias owner.
    Owner,
    /// Collaborator with read and send access.
    Member,
    /// Collaborator with read-only access.
    Viewer,
    /// No relation to the alias.
    None,
}

impl AccessLevel {
    /// Whether the caller may read the alias mailbox.
    pub fn can_read(&self) -> bool {
        !matches!(self, AccessLevel::None)
    }

    /// Whether the caller may send from the alias.
    pub fn can_send(&self) -> bool {
        matches!(self, AccessLevel::Owner | AccessLevel::Member)
    }

    /// Whether the caller may manage the alias (toggle, membership).
    pub fn can_manage(&self) -> bool {
        matches!(self, AccessLevel::Owner)
    }
}

/// Determine a user's access level on an alias given its collaborator set.
pub fn check_role(alias: &Alias, collaborators: &[Collaborator], user_id: i64) -> AccessLevel {
    if alias.user_id == user_id {
        return AccessLevel::Owner;
    }
    match collaborators.iter().find(|c| c.user_id == user_id) {
        Some(c) => match c.role {
            super::types::CollaboratorRole::Member => AccessLevel::Member,
            super::types::CollaboratorRole::Viewer => AccessLevel::Viewer,
        },
        None => AccessLevel::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::types::CollaboratorRole;

    fn sample_alias(owner: i64) -> Alias {
        Alias {
            id: 1,
            user_id: owner,
            local_part: "sales".to_string(),
            address: "sales@m.test".to_string(),
            is_collaborative: true,
            is_active: true,
            emails_sent: 0,
            emails_received: 0,
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn collaborator(user_id: i64, role: CollaboratorRole) -> Collaborator {
        Collaborator {
            id: 1,
            alias_id: 1,
            user_id,
            role,
            added_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_owner_has_full_access() {
        let alias = sample_alias(10);
        let level = check_role(&alias, &[], 10);
        assert_eq!(level, AccessLevel::Owner);
        assert!(level.can_read());
        assert!(level.can_send());
        assert!(level.can_manage());
    }

    #[test]
    fn test_member_can_read_and_send() {
        let alias = sample_alias(10);
        let collabs = vec![collaborator(20, CollaboratorRole::Member)];
        let level = check_role(&alias, &collabs, 20);
        assert_eq!(level, AccessLevel::Member);
        assert!(level.can_read());
        assert!(level.can_send());
        assert!(!level.can_manage());
    }

    #[test]
    fn test_viewer_is_read_only() {
        let alias = sample_alias(10);
        let collabs = vec![collaborator(20, CollaboratorRole::Viewer)];
        let level = check_role(&alias, &collabs, 20);
        assert_eq!(level, AccessLevel::Viewer);
        assert!(level.can_read());
        assert!(!level.can_send());
        assert!(!level.can_manage());
    }

    #[test]
    fn test_stranger_has_no_access() {
        let alias = sample_alias(10);
        let collabs = vec![collaborator(20, CollaboratorRole::Member)];
        let level = check_role(&alias, &collabs, 30);
        assert_eq!(level, AccessLevel::None);
        assert!(!level.can_read());
        assert!(!level.can_send());
        assert!(!level.can_manage());
    }

    #[test]
    fn test_owner_wins_over_collaborator_entry() {
        // An owner accidentally present in the collaborator list still
        // resolves as owner
        let alias = sample_alias(10);
        let collabs = vec![collaborator(10, CollaboratorRole::Viewer)];
        assert_eq!(check_role(&alias, &collabs, 10), AccessLevel::Owner);
    }
}
