//! The directory-store collaborator interface.
//!
//! All entry state - descriptors, classes, tree structure - is fetched
//! through [`DirectoryStore`] at decision time, as a consistent snapshot.
//! Granted operations are handed to the [`NextLayer`] in the pipeline.

use dirsec_dtyp::{Guid, SID, SecurityDescriptor};

use crate::ops::Operation;

/// Read access to the directory tree, as the authorization engine needs
/// it. Entries are addressed by distinguished name; DN syntax itself is
/// the host's concern.
pub trait DirectoryStore {
    /// The entry's stored security descriptor, if it has one. Entries
    /// predating access control have none.
    fn security_descriptor(&self, dn: &str) -> Result<Option<SecurityDescriptor>, StoreError>;

    /// The DN of the entry's parent, or `None` at a tree root.
    fn parent_dn(&self, dn: &str) -> Result<Option<String>, StoreError>;

    /// The entry's most specific structural object class.
    fn object_class(&self, dn: &str) -> Result<String, StoreError>;

    /// Whether the entry is the root of a naming context. Naming-context
    /// roots are created and deleted through higher-privilege paths, not
    /// through ordinary add/delete.
    fn is_naming_context_root(&self, dn: &str) -> Result<bool, StoreError>;

    /// Resolves a DN-valued attribute value to the SID of the entry it
    /// names, for self-membership tests.
    fn resolve_dn_sid(&self, dn: &str) -> Result<SID, StoreError>;

    /// The identity material SPN validation checks new values against.
    fn spn_identity(&self, dn: &str) -> Result<SpnIdentity, StoreError>;
}

/// Account identity used to validate `servicePrincipalName` values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpnIdentity {
    /// `sAMAccountName`, possibly with a trailing `$` for machine
    /// accounts.
    pub account_name: String,
    /// `dNSHostName`, when set.
    pub dns_host_name: Option<String>,
    /// Whether the account is a domain controller.
    pub is_domain_controller: bool,
    /// The NTDS settings object GUID of a domain controller.
    pub ntds_guid: Option<Guid>,
    /// The forest root DNS name, for the `<guid>._msdcs.<forest>` SPN
    /// host form.
    pub forest_dns_name: Option<String>,
}

/// The next layer in the operation pipeline. Called exactly once per
/// granted mutating operation; denied operations are never forwarded.
pub trait NextLayer {
    fn forward(&self, operation: Operation) -> Result<(), StoreError>;
}

/// A directory-store failure. Operational: safe to retry at a higher
/// layer, never a grant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no such entry: {0}")]
    NoSuchEntry(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
