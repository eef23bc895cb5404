//! The schema-catalog collaborator interface.
//!
//! The engine resolves attribute and class names to GUIDs and flags
//! through [`SchemaCatalog`]; it never owns schema state of its own. A
//! resolution failure is a schema inconsistency and always denies the
//! operation (fail-closed).

use modular_bitfield::prelude::*;

use dirsec_dtyp::Guid;

/// Well-known object GUIDs the policy layer special-cases: control access
/// rights, validated writes, and the attributes they guard.
pub mod well_known {
    use dirsec_dtyp::Guid;

    /// User-Force-Change-Password control access right.
    pub const FORCE_CHANGE_PASSWORD: Guid =
        Guid::parse_const("00299570-246d-11d0-a768-00aa006e0529");
    /// User-Change-Password control access right (the "self change").
    pub const USER_CHANGE_PASSWORD: Guid =
        Guid::parse_const("ab721a53-1e2f-11d0-9819-00aa0040529b");
    /// Self-Membership validated write on the `member` attribute.
    pub const SELF_MEMBERSHIP: Guid = Guid::parse_const("bf9679c0-0de6-11d0-a285-00aa003049e2");
    /// Validated-SPN validated write on `servicePrincipalName`.
    pub const VALIDATED_SPN: Guid = Guid::parse_const("f3a64788-5306-11d1-a9c5-0000f80367c1");
    /// The `nTSecurityDescriptor` attribute.
    pub const NT_SECURITY_DESCRIPTOR: Guid =
        Guid::parse_const("bf9679e3-0de6-11d0-a285-00aa003049e2");
}

/// Attribute names the policy layer matches on (case-insensitive, as in
/// the directory schema).
pub mod attrs {
    pub const NT_SECURITY_DESCRIPTOR: &str = "nTSecurityDescriptor";
    pub const MEMBER: &str = "member";
    pub const SERVICE_PRINCIPAL_NAME: &str = "servicePrincipalName";
    pub const NAME: &str = "name";

    /// Attributes carrying a password representation; writes to these are
    /// classified by request shape, never by the generic property path.
    pub const PASSWORD_ATTRS: &[&str] = &["unicodePwd", "dBCSPwd", "clearTextPassword"];

    /// Whether `name` is one of [`PASSWORD_ATTRS`].
    pub fn is_password_attribute(name: &str) -> bool {
        PASSWORD_ATTRS.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}

/// Schema-sourced metadata of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    /// The attribute's own GUID (`schemaIDGUID`).
    pub guid: Guid,
    /// The GUID of the attribute set this attribute belongs to, when the
    /// schema declares one. A single object ACE covering the set grants
    /// every attribute in it.
    pub attribute_set: Option<Guid>,
    pub flags: AttributeFlags,
}

/// Schema flags relevant to authorization.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeFlags {
    /// Never returned to non-system callers (password hashes and the
    /// like).
    pub secret: bool,
    /// Computed on read; never stored, never writable.
    pub constructed: bool,
    /// Only the system may write it.
    pub system_only: bool,
    #[skip]
    __: B5,
}

/// Resolves names from incoming operations against the schema snapshot.
///
/// Implementations must answer from a consistent-as-of-now snapshot;
/// authorization decisions are not safe to make against a stale schema.
pub trait SchemaCatalog {
    /// Resolves an attribute name to its GUID, attribute set and flags.
    fn attribute(&self, name: &str) -> Result<AttributeSchema, SchemaError>;

    /// Resolves an object-class name to its `schemaIDGUID`.
    fn class_guid(&self, name: &str) -> Result<Guid, SchemaError>;

    /// Every attribute the given class (with its superclasses) may carry.
    fn class_attributes(&self, class: &str) -> Result<Vec<String>, SchemaError>;

    /// The classes that may be created directly under an entry of the
    /// given class (`possibleInferiors`).
    fn possible_inferiors(&self, class: &str) -> Result<Vec<String>, SchemaError>;
}

/// A schema lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("unknown object class: {0}")]
    UnknownClass(String),
    #[error("schema catalog unavailable: {0}")]
    Unavailable(String),
}
