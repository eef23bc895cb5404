//! The directory-operation model the interceptor authorizes.

/// An incoming operation, as handed to the next pipeline layer after a
/// grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add(AddRequest),
    Modify(ModifyRequest),
    Delete(DeleteRequest),
    Rename(RenameRequest),
    Extended(ExtendedRequest),
}

/// Creation of a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    /// DN of the entry being created.
    pub dn: String,
    /// The new entry's most specific structural class.
    pub object_class: String,
}

/// Modification of one entry: an ordered list of attribute changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    pub dn: String,
    pub changes: Vec<AttributeChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Add,
    Delete,
    Replace,
}

/// One attribute change within a modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub action: ChangeAction,
    pub values: Vec<String>,
}

impl AttributeChange {
    pub fn new(name: &str, action: ChangeAction, values: &[&str]) -> AttributeChange {
        AttributeChange {
            name: name.to_string(),
            action,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub dn: String,
}

/// Rename, possibly moving the entry under a new parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub dn: String,
    /// The new RDN attribute name (for example `cn`).
    pub new_rdn_attribute: String,
    /// DN of the new parent, when the entry moves; `None` for an in-place
    /// rename.
    pub new_parent_dn: Option<String>,
}

/// An extended operation, identified by OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRequest {
    pub oid: String,
}

/// One entry of a search result, before redaction and constructed
/// attribute computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub dn: String,
    pub attributes: Vec<(String, Vec<String>)>,
}

impl SearchEntry {
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }
}
