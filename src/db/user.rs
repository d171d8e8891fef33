//! User model for Postmask.
//!
//! Accounts are created by the external registration flow and plan tiers are
//! changed by the external billing flow. This core only reads identity, plan
//! and the real delivery address.

use std::fmt;
use std::str::FromStr;

/// Subscription plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Plan {
    /// Free tier: up to 5 personal aliases, no collaborative aliases.
    #[default]
    Free,
    /// Paid tier: unlimited aliases, collaborative aliases allowed.
    Pro,
}

impl Plan {
    /// Convert plan to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }

    /// Whether this plan may own collaborative aliases.
    pub fn allows_collaboration(&self) -> bool {
        matches!(self, Plan::Pro)
    }

    /// Personal alias quota for this plan, if any.
    pub fn personal_alias_limit(&self) -> Option<i64> {
        match self {
            Plan::Free => Some(5),
            Plan::Pro => None,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            _ => Err(format!("unknown plan: {s}")),
        }
    }
}

/// User entity representing a registered account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Real email address (unique, the forwarding destination).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Subscription plan.
    pub plan: Plan,
    /// Whether the account is active.
    pub is_active: bool,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Real email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Subscription plan (defaults to Free).
    pub plan: Plan,
}

impl NewUser {
    /// Create a new user record with the free plan.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            plan: Plan::Free,
        }
    }

    /// Set the plan.
    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = plan;
        self
    }
}

/// User update request.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New plan tier.
    pub plan: Option<Plan>,
    /// New active state.
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Create an empty update request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the plan tier.
    pub fn plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Set the active state.
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.plan.is_none() && self.is_active.is_none()
    }
}
