//! Alias registry module for Postmask.
//!
//! This module owns alias records: creation with plan-based quota
//! enforcement, name validation, activation toggling, and collaborator
//! membership. Access decisions for every alias-scoped operation live in
//! the `access` submodule.

pub mod access;
mod repository;
mod service;
mod types;
pub mod validation;

pub use access::AccessLevel;
pub use repository::AliasRepository;
pub use service::{AliasService, AliasWithCollaborators, CollaboratorInfo};
pub use types::{Alias, Collaborator, CollaboratorRole, NewAlias};
