//! Outbound mail sending.
//!
//! Sends go out with the alias address as the visible sender and reply-to;
//! the caller's real address never reaches the external recipient. The
//! reverse alias minted (or reused) for the destination makes sure the
//! recipient's reply routes back through the system.

use std::sync::Arc;

use crate::activity::{preview, ActivityAction, ActivityRepository, NewActivity};
use crate::alias::{AliasRepository, AliasService};
use crate::db::SharedDatabase;
use crate::mailbox::{MailboxEntry, MailboxRepository, NewMailboxEntry};
use crate::relay::{MailRelay, OutboundMessage};
use crate::reverse::{ReverseAliasRepository, ReverseAliasService};
use crate::{PostmaskError, Result};

/// Result of a successful send.
#[derive(Debug)]
pub struct SentMail {
    /// The persisted mailbox entry.
    pub entry: MailboxEntry,
    /// The reverse address the recipient will reply to.
    pub reverse_address: String,
}

/// Sender for authenticated outbound mail.
pub struct OutboundSender {
    db: SharedDatabase,
    relay: Arc<dyn MailRelay>,
    domain: String,
}

impl OutboundSender {
    /// Create a new outbound sender.
    pub fn new(db: SharedDatabase, relay: Arc<dyn MailRelay>, domain: impl Into<String>) -> Self {
        Self {
            db,
            relay,
            domain: domain.into(),
        }
    }

    /// Send a message from an alias on behalf of an authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The alias does not resolve for the caller (missing and
    ///   inaccessible are indistinguishable)
    /// - The caller is a viewer on a collaborative alias
    /// - The destination address is malformed
    /// - The relay call fails (no retry; the attempt is terminal)
    pub async fn send(
        &self,
        caller_id: i64,
        from_alias_address: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SentMail> {
        let to = to.trim();
        if to.is_empty() || !to.contains('@') {
            return Err(PostmaskError::Validation(
                "destination must be a valid email address".to_string(),
            ));
        }

        // Authorize and obtain the reverse mapping inside one lock scope
        let (alias, reverse, reverse_address) = {
            let db = self.db.lock().await;

            let aliases = AliasService::new(&db, &self.domain);
            let (alias, level) = aliases.get_by_address_for_read(from_alias_address, caller_id)?;

            // Viewers may read the shared mailbox but never send from it
            if !level.can_send() {
                return Err(PostmaskError::Permission(
                    "viewers cannot send from this alias".to_string(),
                ));
            }

            let reverses = ReverseAliasService::new(&db, &self.domain);
            let reverse = reverses.get_or_create(alias.id, to, &alias.address)?;
            let reverse_address = reverses.address_for(&reverse);
            (alias, reverse, reverse_address)
        };

        // Relay outside the lock; failure surfaces to the caller with no
        // mailbox side effects
        let receipt = self
            .relay
            .send(&OutboundMessage {
                from: alias.address.clone(),
                to: to.to_string(),
                subject: subject.to_string(),
                text: body.to_string(),
                html: None,
                reply_to: alias.address.clone(),
            })
            .await?;

        let entry = {
            let db = self.db.lock().await;

            let entry = MailboxRepository::new(&db).create(
                &NewMailboxEntry::sent(alias.id, to, subject, body, caller_id)
                    .with_transport_id(&receipt.transport_id)
                    .with_reverse_alias(reverse.id),
            )?;

            ReverseAliasRepository::new(&db).record_outbound(reverse.id)?;
            AliasRepository::new(&db).increment_sent(alias.id)?;

            if alias.is_collaborative {
                ActivityRepository::new(&db).append(
                    &NewActivity::new(alias.id, ActivityAction::Sent, caller_id).with_payload(
                        serde_json::json!({
                            "to": to,
                            "subject": subject,
                            "preview": preview(body),
                        }),
                    ),
                )?;
            }

            entry
        };

        tracing::info!(
            alias = %alias.address,
            to = %to,
            transport = %receipt.transport_id,
            "mail sent"
        );
        Ok(SentMail {
            entry,
            reverse_address,
        })
    }
}
