//! Reverse-alias types for Postmask.

use rand::Rng;

/// Local-part prefix identifying reverse aliases on the wire.
///
/// The inbound classifier depends on this prefix; it is part of the
/// address format contract and must remain stable.
pub const REVERSE_PREFIX: &str = "ra_";

/// A minted reverse alias standing in for (alias, external recipient).
#[derive(Debug, Clone)]
pub struct ReverseAlias {
    /// Row ID.
    pub id: i64,
    /// Opaque identifier used as the address local part.
    pub reverse_id: String,
    /// Owning alias.
    pub alias_id: i64,
    /// External recipient this mapping stands in for.
    pub recipient_email: String,
    /// Snapshot of the originating alias address.
    pub alias_address: String,
    /// Outbound usage counter.
    pub emails_sent: i64,
    /// Inbound usage counter.
    pub emails_received: i64,
    /// Whether the mapping still resolves.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last send or receive through this mapping.
    pub last_used_at: Option<String>,
    /// Deactivation timestamp, if deactivated.
    pub deactivated_at: Option<String>,
}

/// Check whether an address local part is a reverse-alias identifier.
pub fn is_reverse_local_part(local_part: &str) -> bool {
    local_part.starts_with(REVERSE_PREFIX)
}

/// Mint a new reverse-alias identifier.
///
/// 64 bits of random entropy plus a time-derived suffix, hex-encoded so
/// the result is safe as an email local part and collisions are
/// practically impossible within a second.
pub fn mint_reverse_id() -> String {
    let entropy: u64 = rand::thread_rng().gen();
    let secs = chrono::Utc::now().timestamp() as u64;
    format!("{REVERSE_PREFIX}{entropy:016x}{secs:08x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_id_has_prefix() {
        let id = mint_reverse_id();
        assert!(id.starts_with(REVERSE_PREFIX));
        assert!(is_reverse_local_part(&id));
    }

    #[test]
    fn test_minted_id_is_safe_local_part() {
        let id = mint_reverse_id();
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'));
        // prefix + 16 hex entropy + 8 hex time
        assert_eq!(id.len(), REVERSE_PREFIX.len() + 24);
    }

    #[test]
    fn test_minted_ids_differ() {
        let a = mint_reverse_id();
        let b = mint_reverse_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_classifier_rejects_plain_names() {
        assert!(!is_reverse_local_part("sales"));
        assert!(!is_reverse_local_part("random"));
        assert!(is_reverse_local_part("ra_0011aabb"));
    }
}
