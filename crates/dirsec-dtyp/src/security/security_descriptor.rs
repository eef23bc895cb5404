//! MS-DTYP 2.4.6: Security Descriptor

use crate::SID;

use super::ACL;

/// The logical security descriptor of a directory object.
///
/// Pure data: owner and group identity plus the discretionary and system
/// ACLs. Deserialization from the self-relative wire form is the directory
/// store's concern; descriptors reach this crate already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityDescriptor {
    pub owner_sid: Option<SID>,
    pub group_sid: Option<SID>,
    pub dacl: Option<ACL>,
    pub sacl: Option<ACL>,
}

impl SecurityDescriptor {
    /// Reorders the DACL (when present) into the canonical evaluation
    /// order. See [`ACL::order_aces`].
    pub fn order_dacl(&mut self) {
        if let Some(dacl) = self.dacl.as_mut() {
            dacl.order_aces();
        }
    }
}
