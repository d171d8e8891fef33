//! Alias service for Postmask.
//!
//! High-level alias registry operations: creation with plan-based quota
//! enforcement, activation toggling, collaborator membership, and the
//! access-guarded lookups every other component goes through.

use serde_json::json;

use crate::activity::{ActivityAction, ActivityRepository, NewActivity};
use crate::db::{Database, UserRepository};
use crate::{PostmaskError, Result};

use super::access::{check_role, AccessLevel};
use super::repository::AliasRepository;
use super::types::{Alias, Collaborator, CollaboratorRole, NewAlias};
use super::validation::{normalize_name, validate_name};

/// A collaborator annotated with its resolved display identity.
#[derive(Debug, Clone)]
pub struct CollaboratorInfo {
    /// Collaborating user ID.
    pub user_id: i64,
    /// Collaborator email address.
    pub email: String,
    /// Collaborator display name.
    pub name: String,
    /// Permission level.
    pub role: CollaboratorRole,
}

/// An accessible alias with its resolved collaborator identities.
#[derive(Debug, Clone)]
pub struct AliasWithCollaborators {
    /// The alias record.
    pub alias: Alias,
    /// The caller's access level on it.
    pub access: AccessLevel,
    /// Resolved collaborators.
    pub collaborators: Vec<CollaboratorInfo>,
}

/// Service for alias registry operations.
///
/// The alias domain is injected at construction; addresses are always
/// derived as `localpart@domain`.
pub struct AliasService<'a> {
    db: &'a Database,
    domain: &'a str,
}

impl<'a> AliasService<'a> {
    /// Create a new AliasService over the given database and alias domain.
    pub fn new(db: &'a Database, domain: &'a str) -> Self {
        Self { db, domain }
    }

    /// Create a new alias for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name fails format, length or reserved-word validation
    /// - A free-plan owner requests a collaborative alias
    /// - A free-plan owner already holds 5 personal aliases
    /// - The derived address is already taken
    pub fn create_alias(
        &self,
        owner_id: i64,
        raw_name: &str,
        is_collaborative: bool,
    ) -> Result<Alias> {
        let users = UserRepository::new(self.db);
        let owner = users
            .get_by_id(owner_id)?
            .ok_or_else(|| PostmaskError::NotFound("user".to_string()))?;

        let name = normalize_name(raw_name);
        validate_name(&name).map_err(|e| PostmaskError::Validation(e.to_string()))?;

        if is_collaborative && !owner.plan.allows_collaboration() {
            return Err(PostmaskError::PlanRequired(
                "collaborative aliases require the pro plan".to_string(),
            ));
        }

        let repo = AliasRepository::new(self.db);

        // Only personal aliases count against the free quota
        if !is_collaborative {
            if let Some(limit) = owner.plan.personal_alias_limit() {
                let count = repo.count_personal(owner_id)?;
                if count >= limit {
                    return Err(PostmaskError::QuotaExceeded(format!(
                        "the {} plan allows at most {limit} personal aliases; \
                         upgrade to pro for unlimited aliases",
                        owner.plan
                    )));
                }
            }
        }

        let address = format!("{name}@{}", self.domain);
        if repo.get_by_address(&address)?.is_some() {
            return Err(PostmaskError::Conflict(format!(
                "alias address {address} is already taken"
            )));
        }

        // The UNIQUE constraint still backstops a concurrent create
        let alias = repo.create(&NewAlias {
            user_id: owner_id,
            local_part: name,
            address,
            is_collaborative,
        })?;

        tracing::info!(
            alias = %alias.address,
            owner = owner_id,
            collaborative = is_collaborative,
            "alias created"
        );
        Ok(alias)
    }

    /// Resolve an alias by ID on behalf of a caller with read access.
    ///
    /// A missing alias and an alias the caller has no relation to produce
    /// the same NotFound error.
    pub fn get_for_read(&self, alias_id: i64, caller_id: i64) -> Result<(Alias, AccessLevel)> {
        let repo = AliasRepository::new(self.db);
        let alias = repo
            .get_by_id(alias_id)?
            .ok_or_else(|| PostmaskError::NotFound("alias".to_string()))?;
        let collaborators = repo.list_collaborators(alias_id)?;
        let level = check_role(&alias, &collaborators, caller_id);
        if !level.can_read() {
            return Err(PostmaskError::NotFound("alias".to_string()));
        }
        Ok((alias, level))
    }

    /// Resolve an alias by address on behalf of a caller with read access.
    ///
    /// Same existence-collapsing behavior as [`Self::get_for_read`].
    pub fn get_by_address_for_read(
        &self,
        address: &str,
        caller_id: i64,
    ) -> Result<(Alias, AccessLevel)> {
        let repo = AliasRepository::new(self.db);
        let alias = repo
            .get_by_address(address)?
            .ok_or_else(|| PostmaskError::NotFound("alias".to_string()))?;
        self.get_for_read(alias.id, caller_id)
    }

    /// Toggle the active flag of an alias.
    ///
    /// Restricted to the owner, uniformly for personal and collaborative
    /// aliases.
    pub fn toggle_active(&self, alias_id: i64, caller_id: i64, new_state: bool) -> Result<Alias> {
        let (alias, level) = self.get_for_read(alias_id, caller_id)?;
        if !level.can_manage() {
            return Err(PostmaskError::Permission(
                "only the alias owner may change the active state".to_string(),
            ));
        }

        let repo = AliasRepository::new(self.db);
        repo.set_active(alias.id, new_state)?;
        let updated = repo
            .get_by_id(alias.id)?
            .ok_or_else(|| PostmaskError::NotFound("alias".to_string()))?;

        tracing::info!(alias = %updated.address, active = new_state, "alias toggled");
        Ok(updated)
    }

    /// Add a collaborator to a collaborative alias.
    ///
    /// Owner-only. The target user is resolved by case-insensitive exact
    /// email match.
    pub fn add_collaborator(
        &self,
        alias_id: i64,
        owner_id: i64,
        target_email: &str,
        role: CollaboratorRole,
    ) -> Result<Collaborator> {
        let (alias, level) = self.get_for_read(alias_id, owner_id)?;
        if !level.can_manage() {
            return Err(PostmaskError::Permission(
                "only the alias owner may manage collaborators".to_string(),
            ));
        }
        if !alias.is_collaborative {
            return Err(PostmaskError::Validation(
                "collaborators can only be added to collaborative aliases".to_string(),
            ));
        }

        let users = UserRepository::new(self.db);
        let target = users
            .get_by_email(target_email)?
            .ok_or_else(|| PostmaskError::NotFound("user".to_string()))?;

        if target.id == alias.user_id {
            return Err(PostmaskError::Validation(
                "the owner is already a full member of the alias".to_string(),
            ));
        }

        let repo = AliasRepository::new(self.db);
        if repo.get_collaborator(alias.id, target.id)?.is_some() {
            return Err(PostmaskError::Conflict(
                "user is already a collaborator".to_string(),
            ));
        }

        let collaborator = repo.add_collaborator(alias.id, target.id, role)?;

        ActivityRepository::new(self.db).append(
            &NewActivity::new(alias.id, ActivityAction::AddedCollaborator, owner_id)
                .with_payload(json!({ "email": target.email, "role": role.as_str() })),
        )?;

        tracing::info!(
            alias = %alias.address,
            collaborator = %target.email,
            role = %role,
            "collaborator added"
        );
        Ok(collaborator)
    }

    /// Remove a collaborator from an alias. Owner-only.
    pub fn remove_collaborator(
        &self,
        alias_id: i64,
        owner_id: i64,
        collaborator_id: i64,
    ) -> Result<()> {
        let (alias, level) = self.get_for_read(alias_id, owner_id)?;
        if !level.can_manage() {
            return Err(PostmaskError::Permission(
                "only the alias owner may manage collaborators".to_string(),
            ));
        }

        let repo = AliasRepository::new(self.db);
        let removed = repo.remove_collaborator(alias.id, collaborator_id)?;
        if !removed {
            return Err(PostmaskError::NotFound("collaborator".to_string()));
        }

        ActivityRepository::new(self.db).append(
            &NewActivity::new(alias.id, ActivityAction::RemovedCollaborator, owner_id)
                .with_payload(json!({ "user_id": collaborator_id })),
        )?;

        tracing::info!(alias = %alias.address, collaborator = collaborator_id, "collaborator removed");
        Ok(())
    }

    /// List every alias a user owns or collaborates on, each annotated with
    /// resolved collaborator identities.
    pub fn list_accessible(&self, user_id: i64) -> Result<Vec<AliasWithCollaborators>> {
        let repo = AliasRepository::new(self.db);
        let users = UserRepository::new(self.db);
        let aliases = repo.list_accessible(user_id)?;

        let mut result = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let collaborators = repo.list_collaborators(alias.id)?;
            let access = check_role(&alias, &collaborators, user_id);

            let ids: Vec<i64> = collaborators.iter().map(|c| c.user_id).collect();
            let identities = users.get_by_ids(&ids)?;

            let infos = collaborators
                .iter()
                .filter_map(|c| {
                    identities.iter().find(|u| u.id == c.user_id).map(|u| {
                        CollaboratorInfo {
                            user_id: u.id,
                            email: u.email.clone(),
                            name: u.name.clone(),
                            role: c.role,
                        }
                    })
                })
                .collect();

            result.push(AliasWithCollaborators {
                alias,
                access,
                collaborators: infos,
            });
        }
        Ok(result)
    }
}
