//! Inbound mail routing.
//!
//! One state machine per webhook message: parse the recipient, classify it
//! as a reply (reverse-alias local part) or fresh mail (alias address),
//! persist a mailbox entry and fan out forwarded copies. Unknown or
//! inactive recipients are accepted and dropped rather than rejected, so
//! the relay never generates bounce storms for stale addresses.

use std::sync::Arc;

use futures::future;

use crate::activity::{preview, ActivityAction, ActivityRepository, NewActivity};
use crate::alias::{Alias, AliasRepository};
use crate::db::{SharedDatabase, UserRepository};
use crate::mailbox::{MailboxRepository, NewMailboxEntry};
use crate::relay::{MailRelay, OutboundMessage};
use crate::reverse::{is_reverse_local_part, ReverseAliasRepository};
use crate::Result;

/// Decoded inbound message, as handed over by the webhook layer.
///
/// Content-type-dependent payload decoding happens upstream; the router
/// only consumes this tuple.
#[derive(Debug, Clone)]
pub struct InboundEmail {
    /// Envelope recipient address.
    pub recipient: String,
    /// Envelope sender address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body_text: String,
    /// Optional HTML body.
    pub body_html: Option<String>,
    /// Transport message identifier.
    pub message_id: Option<String>,
}

/// Why an accepted message was dropped without delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The recipient address did not parse as local@domain.
    MalformedRecipient,
    /// The reverse-alias identifier does not resolve (unknown or
    /// deactivated).
    UnknownReverseAlias,
    /// No alias exists for the recipient address.
    UnknownAlias,
    /// The target alias is deactivated.
    InactiveAlias,
}

/// Outcome of routing one inbound message.
///
/// Dropped outcomes are successes from the webhook's point of view; only
/// infrastructure failures surface as errors.
#[derive(Debug)]
pub enum InboundOutcome {
    /// The message was stored and forwarded.
    Forwarded {
        /// The persisted mailbox entry.
        entry_id: i64,
        /// Whether this was a reply through a reverse alias.
        reply: bool,
        /// Forward attempts that the relay accepted.
        delivered: usize,
        /// Total forward attempts.
        attempted: usize,
    },
    /// The message was accepted and silently discarded.
    Dropped(DropReason),
}

/// Router for inbound webhook messages.
pub struct InboundRouter {
    db: SharedDatabase,
    relay: Arc<dyn MailRelay>,
    domain: String,
}

impl InboundRouter {
    /// Create a new inbound router.
    pub fn new(db: SharedDatabase, relay: Arc<dyn MailRelay>, domain: impl Into<String>) -> Self {
        Self {
            db,
            relay,
            domain: domain.into(),
        }
    }

    /// Route one inbound message.
    pub async fn handle(&self, email: InboundEmail) -> Result<InboundOutcome> {
        let recipient = email.recipient.trim().to_lowercase();
        let Some((local_part, _)) = recipient.split_once('@') else {
            tracing::debug!(recipient = %email.recipient, "dropping malformed recipient");
            return Ok(InboundOutcome::Dropped(DropReason::MalformedRecipient));
        };

        if is_reverse_local_part(local_part) {
            self.handle_reply(local_part, &email).await
        } else {
            self.handle_fresh(&recipient, &email).await
        }
    }

    /// Reply path: the recipient is a reverse-alias identifier.
    async fn handle_reply(&self, local_part: &str, email: &InboundEmail) -> Result<InboundOutcome> {
        // Resolve the mapping and persist the entry inside one lock scope
        let (reverse, alias, entry, recipients) = {
            let db = self.db.lock().await;

            let Some(reverse) = ReverseAliasRepository::new(&db).resolve_active(local_part)? else {
                tracing::info!(reverse = %local_part, "dropping reply to unknown reverse alias");
                return Ok(InboundOutcome::Dropped(DropReason::UnknownReverseAlias));
            };

            let alias = AliasRepository::new(&db).get_by_id(reverse.alias_id)?;
            let Some(alias) = alias.filter(|a| a.is_active) else {
                tracing::info!(reverse = %local_part, "dropping reply to inactive alias");
                return Ok(InboundOutcome::Dropped(DropReason::InactiveAlias));
            };

            let mut new_entry = NewMailboxEntry::reply(
                alias.id,
                &email.sender,
                &email.subject,
                &email.body_text,
                reverse.id,
            );
            if let Some(message_id) = &email.message_id {
                new_entry = new_entry.with_transport_id(message_id);
            }
            let entry = MailboxRepository::new(&db).create(&new_entry)?;

            let recipients = forward_recipients(&db, &alias)?;
            (reverse, alias, entry, recipients)
        };

        // Replies continue to route through the original alias address, not
        // the reverse alias, so conversations never accumulate nested hops
        let (delivered, attempted) = self
            .fan_out(&recipients, &reverse.alias_address, email)
            .await;

        // Finalize only after every forward attempt settled
        {
            let db = self.db.lock().await;
            MailboxRepository::new(&db).mark_forwarded(entry.id)?;
            ReverseAliasRepository::new(&db).record_inbound(reverse.id)?;

            if alias.is_collaborative {
                ActivityRepository::new(&db).append(
                    &NewActivity::new(alias.id, ActivityAction::ReplyReceived, alias.user_id)
                        .with_payload(serde_json::json!({
                            "from": email.sender,
                            "subject": preview(&email.subject),
                        })),
                )?;
            }
        }

        tracing::info!(
            alias = %alias.address,
            reverse = %reverse.reverse_id,
            delivered,
            attempted,
            "reply forwarded"
        );
        Ok(InboundOutcome::Forwarded {
            entry_id: entry.id,
            reply: true,
            delivered,
            attempted,
        })
    }

    /// Fresh path: the recipient is a normal alias address.
    async fn handle_fresh(&self, recipient: &str, email: &InboundEmail) -> Result<InboundOutcome> {
        let (alias, entry, recipients) = {
            let db = self.db.lock().await;

            let Some(alias) = AliasRepository::new(&db).get_by_address(recipient)? else {
                tracing::info!(recipient = %recipient, "dropping mail to unknown alias");
                return Ok(InboundOutcome::Dropped(DropReason::UnknownAlias));
            };
            if !alias.is_active {
                tracing::info!(alias = %alias.address, "dropping mail to inactive alias");
                return Ok(InboundOutcome::Dropped(DropReason::InactiveAlias));
            }

            let mut new_entry = NewMailboxEntry::received(
                alias.id,
                &email.sender,
                &email.subject,
                &email.body_text,
            );
            if let Some(message_id) = &email.message_id {
                new_entry = new_entry.with_transport_id(message_id);
            }
            let entry = MailboxRepository::new(&db).create(&new_entry)?;

            let recipients = forward_recipients(&db, &alias)?;
            (alias, entry, recipients)
        };

        let (delivered, attempted) = self.fan_out(&recipients, &alias.address, email).await;

        {
            let db = self.db.lock().await;
            MailboxRepository::new(&db).mark_forwarded(entry.id)?;
            AliasRepository::new(&db).increment_received(alias.id)?;

            if alias.is_collaborative {
                ActivityRepository::new(&db).append(
                    &NewActivity::new(alias.id, ActivityAction::Received, alias.user_id)
                        .with_payload(serde_json::json!({
                            "from": email.sender,
                            "subject": preview(&email.subject),
                        })),
                )?;
            }
        }

        tracing::info!(
            alias = %alias.address,
            delivered,
            attempted,
            "inbound mail forwarded"
        );
        Ok(InboundOutcome::Forwarded {
            entry_id: entry.id,
            reply: false,
            delivered,
            attempted,
        })
    }

    /// Forward one copy per recipient, concurrently and best-effort.
    ///
    /// Individual failures are logged and never abort the operation; the
    /// caller finalizes once every attempt has settled.
    async fn fan_out(
        &self,
        recipients: &[String],
        reply_to: &str,
        email: &InboundEmail,
    ) -> (usize, usize) {
        let tasks = recipients.iter().map(|recipient| {
            let message = OutboundMessage {
                from: format!("forwarder@{}", self.domain),
                to: recipient.clone(),
                subject: email.subject.clone(),
                text: email.body_text.clone(),
                html: email.body_html.clone(),
                reply_to: reply_to.to_string(),
            };
            let relay = Arc::clone(&self.relay);
            async move { relay.send(&message).await.map(|r| (message.to, r)) }
        });

        let results = future::join_all(tasks).await;
        let attempted = results.len();
        let mut delivered = 0;
        for result in results {
            match result {
                Ok((to, receipt)) => {
                    tracing::debug!(to = %to, transport = %receipt.transport_id, "forward delivered");
                    delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "forward attempt failed");
                }
            }
        }
        (delivered, attempted)
    }
}

/// The forward recipient set for an alias: the owner plus every
/// collaborator, regardless of role (viewers receive mail too, they just
/// cannot send). Deactivated accounts are skipped.
fn forward_recipients(db: &crate::db::Database, alias: &Alias) -> Result<Vec<String>> {
    let users = UserRepository::new(db);
    let collaborators = AliasRepository::new(db).list_collaborators(alias.id)?;

    let mut ids: Vec<i64> = Vec::with_capacity(collaborators.len() + 1);
    ids.push(alias.user_id);
    ids.extend(collaborators.iter().map(|c| c.user_id));

    let recipients = users
        .get_by_ids(&ids)?
        .into_iter()
        .filter(|u| u.is_active)
        .map(|u| u.email)
        .collect();
    Ok(recipients)
}
