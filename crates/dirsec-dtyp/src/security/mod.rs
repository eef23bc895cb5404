//! MS-DTYP 2.4: Security structures.

mod access_mask;
mod ace;
mod acl;
mod security_descriptor;

pub use access_mask::AccessMask;
pub use ace::{ACE, AccessAce, AceFlags, AceType, AceValue, ObjectAce};
pub use acl::{ACL, AclRevision, canonicalize_dacl};
pub use security_descriptor::SecurityDescriptor;
