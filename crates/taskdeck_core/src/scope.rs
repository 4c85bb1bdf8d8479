//! Acting-identity scope for data access.
//!
//! # Responsibility
//! - Carry the identity every repository and service call is bound to.
//! - Model the "no identity" case as an explicit fail-closed variant.
//!
//! # Invariants
//! - `Scope::Anonymous` never yields rows and never performs writes.
//! - The scope is passed per construction, never stored globally.

use uuid::Uuid;

/// Stable identifier for an owning user.
pub type UserId = Uuid;

/// Identity a repository is bound to for the duration of one request.
///
/// Every repository guards once at method entry: `Anonymous` reads resolve
/// to empty results and `Anonymous` writes are denied before any SQL runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Operations are restricted to rows owned by this user.
    User(UserId),
    /// No authenticated identity; all operations fail closed.
    Anonymous,
}

impl Scope {
    /// Convenience constructor for the common authenticated case.
    pub fn user(id: UserId) -> Self {
        Self::User(id)
    }

    /// Returns the acting user id, or `None` for the anonymous scope.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Anonymous => None,
        }
    }
}
