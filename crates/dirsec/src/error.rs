//! Authorization error types.
//!
//! The variants are deliberately distinguishable to callers: a rights
//! shortfall ([`Error::AccessDenied`]) is user-correctable and never
//! retried; a self-inconsistent request ([`Error::ConstraintViolation`])
//! is returned even to fully-privileged callers; operational failures
//! ([`Error::SchemaInconsistency`], [`Error::StoreUnavailable`]) are safe
//! to retry at a higher layer. No failure is ever downgraded to a grant.

use crate::schema::SchemaError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller lacks a right the operation requires.
    #[error("insufficient access rights: {0}")]
    AccessDenied(String),

    /// The request is self-inconsistent (malformed password-change shape,
    /// invalid SPN value, ...), regardless of the caller's rights.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The schema collaborator failed to resolve a name the operation
    /// references.
    #[error("schema inconsistency: {0}")]
    SchemaInconsistency(#[from] SchemaError),

    /// The directory store failed to answer a lookup.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A hard refusal unrelated to rights, such as deleting a
    /// naming-context root.
    #[error("operation refused by policy: {0}")]
    PolicyRefused(String),
}

impl Error {
    /// Whether the failure came from a collaborator rather than the
    /// request itself, making a retry at a higher layer meaningful.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Error::SchemaInconsistency(_) | Error::StoreUnavailable(_)
        )
    }

    pub(crate) fn denied(what: impl Into<String>) -> Error {
        Error::AccessDenied(what.into())
    }
}
