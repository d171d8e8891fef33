//! Reverse-alias service for Postmask.

use crate::alias::AliasService;
use crate::db::Database;
use crate::{PostmaskError, Result};

use super::repository::ReverseAliasRepository;
use super::types::{mint_reverse_id, ReverseAlias};

/// Service for reverse-alias operations.
///
/// The alias domain is injected at construction and used to derive the
/// full reverse address.
pub struct ReverseAliasService<'a> {
    db: &'a Database,
    domain: &'a str,
}

impl<'a> ReverseAliasService<'a> {
    /// Create a new ReverseAliasService over the given database and domain.
    pub fn new(db: &'a Database, domain: &'a str) -> Self {
        Self { db, domain }
    }

    /// Get the existing active mapping for (alias, recipient), or mint one.
    ///
    /// Idempotent: repeated sends to the same recipient reuse the same
    /// identifier. A concurrent mint for the same new pair loses the insert
    /// race against the pair constraint and returns the winning row.
    pub fn get_or_create(
        &self,
        alias_id: i64,
        recipient_email: &str,
        alias_address: &str,
    ) -> Result<ReverseAlias> {
        let recipient = recipient_email.trim().to_lowercase();
        let repo = ReverseAliasRepository::new(self.db);

        if let Some(existing) = repo.find_active_pair(alias_id, &recipient)? {
            return Ok(existing);
        }

        let reverse_id = mint_reverse_id();
        match repo.insert(&reverse_id, alias_id, &recipient, alias_address) {
            Ok(reverse) => {
                tracing::info!(
                    reverse = %reverse.reverse_id,
                    alias = %alias_address,
                    recipient = %recipient,
                    "reverse alias minted"
                );
                Ok(reverse)
            }
            // Lost the race against a concurrent mint; the pair constraint
            // guarantees the winner is the one active row
            Err(PostmaskError::Conflict(_)) => repo
                .find_active_pair(alias_id, &recipient)?
                .ok_or_else(|| PostmaskError::NotFound("reverse alias".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Full address for a mapping (`<reverse_id>@domain`).
    pub fn address_for(&self, reverse: &ReverseAlias) -> String {
        format!("{}@{}", reverse.reverse_id, self.domain)
    }

    /// Resolve an active mapping by its opaque identifier.
    pub fn resolve(&self, reverse_id: &str) -> Result<Option<ReverseAlias>> {
        ReverseAliasRepository::new(self.db).resolve_active(reverse_id)
    }

    /// Record an outbound send through a mapping.
    pub fn record_outbound(&self, id: i64) -> Result<()> {
        ReverseAliasRepository::new(self.db).record_outbound(id)
    }

    /// Record an inbound reply through a mapping.
    pub fn record_inbound(&self, id: i64) -> Result<()> {
        ReverseAliasRepository::new(self.db).record_inbound(id)
    }

    /// Deactivate a mapping on behalf of a caller.
    ///
    /// Requires read access to the owning alias; a missing mapping and a
    /// mapping on an inaccessible alias are indistinguishable.
    pub fn deactivate(&self, id: i64, caller_id: i64) -> Result<ReverseAlias> {
        let repo = ReverseAliasRepository::new(self.db);
        let reverse = repo
            .get_by_id(id)?
            .ok_or_else(|| PostmaskError::NotFound("reverse alias".to_string()))?;

        // Collapses to NotFound when the caller has no relation
        let aliases = AliasService::new(self.db, self.domain);
        aliases
            .get_for_read(reverse.alias_id, caller_id)
            .map_err(|_| PostmaskError::NotFound("reverse alias".to_string()))?;

        repo.deactivate(reverse.id)?;
        let updated = repo
            .get_by_id(reverse.id)?
            .ok_or_else(|| PostmaskError::NotFound("reverse alias".to_string()))?;

        tracing::info!(reverse = %updated.reverse_id, "reverse alias deactivated");
        Ok(updated)
    }

    /// List mappings for an alias on behalf of a caller with read access.
    pub fn list_for_alias(&self, alias_id: i64, caller_id: i64) -> Result<Vec<ReverseAlias>> {
        let aliases = AliasService::new(self.db, self.domain);
        aliases.get_for_read(alias_id, caller_id)?;
        ReverseAliasRepository::new(self.db).list_for_alias(alias_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasService;
    use crate::db::{NewUser, Plan, UserRepository};

    const DOMAIN: &str = "m.test";

    fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let (owner_id, alias_id) = {
            let users = UserRepository::new(&db);
            let owner = users
                .create(&NewUser::new("owner@example.com", "Owner").with_plan(Plan::Pro))
                .unwrap();
            let aliases = AliasService::new(&db, DOMAIN);
            let alias = aliases.create_alias(owner.id, "sales", false).unwrap();
            (owner.id, alias.id)
        };
        (db, owner_id, alias_id)
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (db, _owner, alias_id) = setup();
        let service = ReverseAliasService::new(&db, DOMAIN);

        let first = service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();
        let second = service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.reverse_id, second.reverse_id);
    }

    #[test]
    fn test_get_or_create_normalizes_recipient() {
        let (db, _owner, alias_id) = setup();
        let service = ReverseAliasService::new(&db, DOMAIN);

        let first = service
            .get_or_create(alias_id, "Buyer@Ext.com", "sales@m.test")
            .unwrap();
        let second = service
            .get_or_create(alias_id, " buyer@ext.com ", "sales@m.test")
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.recipient_email, "buyer@ext.com");
    }

    #[test]
    fn test_distinct_recipients_get_distinct_mappings() {
        let (db, _owner, alias_id) = setup();
        let service = ReverseAliasService::new(&db, DOMAIN);

        let a = service
            .get_or_create(alias_id, "a@ext.com", "sales@m.test")
            .unwrap();
        let b = service
            .get_or_create(alias_id, "b@ext.com", "sales@m.test")
            .unwrap();
        assert_ne!(a.reverse_id, b.reverse_id);
    }

    #[test]
    fn test_address_for() {
        let (db, _owner, alias_id) = setup();
        let service = ReverseAliasService::new(&db, DOMAIN);

        let reverse = service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();
        let address = service.address_for(&reverse);
        assert_eq!(address, format!("{}@{DOMAIN}", reverse.reverse_id));
    }

    #[test]
    fn test_deactivate_requires_access() {
        let (db, owner, alias_id) = setup();
        let stranger = {
            let users = UserRepository::new(&db);
            users
                .create(&NewUser::new("stranger@example.com", "Stranger"))
                .unwrap()
                .id
        };
        let service = ReverseAliasService::new(&db, DOMAIN);

        let reverse = service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();

        // A stranger sees NotFound, not a permission error
        let result = service.deactivate(reverse.id, stranger);
        assert!(matches!(result, Err(PostmaskError::NotFound(_))));

        let deactivated = service.deactivate(reverse.id, owner).unwrap();
        assert!(!deactivated.is_active);
    }

    #[test]
    fn test_deactivated_mapping_stops_resolving_and_is_reminted() {
        let (db, owner, alias_id) = setup();
        let service = ReverseAliasService::new(&db, DOMAIN);

        let first = service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();
        service.deactivate(first.id, owner).unwrap();

        assert!(service.resolve(&first.reverse_id).unwrap().is_none());

        // Reuse after deactivation mints a fresh identifier
        let second = service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();
        assert_ne!(first.reverse_id, second.reverse_id);
    }

    #[test]
    fn test_list_for_alias_guarded() {
        let (db, owner, alias_id) = setup();
        let stranger = {
            let users = UserRepository::new(&db);
            users
                .create(&NewUser::new("stranger@example.com", "Stranger"))
                .unwrap()
                .id
        };
        let service = ReverseAliasService::new(&db, DOMAIN);

        service
            .get_or_create(alias_id, "buyer@ext.com", "sales@m.test")
            .unwrap();

        assert_eq!(service.list_for_alias(alias_id, owner).unwrap().len(), 1);
        assert!(matches!(
            service.list_for_alias(alias_id, stranger),
            Err(PostmaskError::NotFound(_))
        ));
    }
}
