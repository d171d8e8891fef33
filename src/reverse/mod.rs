//! Reverse-alias module for Postmask.
//!
//! A reverse alias is an opaque minted address standing in for one
//! (alias, external recipient) pair, so replies route back through the
//! system instead of exposing the user's real address. This module owns
//! the bijection and its usage counters.

mod repository;
mod service;
mod types;

pub use repository::ReverseAliasRepository;
pub use service::ReverseAliasService;
pub use types::{is_reverse_local_part, mint_reverse_id, ReverseAlias, REVERSE_PREFIX};
