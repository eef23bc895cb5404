//! MS-DTYP 2.4.5: ACL

use std::cmp::Ordering;

use super::ACE;

/// An ordered list of ACEs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ACL {
    pub acl_revision: AclRevision,
    pub ace: Vec<ACE>,
}

impl ACL {
    /// An empty DACL in directory (DS) revision.
    pub fn empty() -> ACL {
        ACL {
            acl_revision: AclRevision::DS,
            ace: Vec::new(),
        }
    }

    /// Orders the ACEs in the ACL according to the canonical order.
    ///
    /// The preferred order, applied as a stable sort so that entries the
    /// rules do not distinguish keep their relative positions:
    /// 1. All explicit (non-inherited) ACEs are placed before any inherited ACEs.
    /// 2. Within each of the two partitions:
    ///    a. access-denied ACEs before access-allowed ACEs (audit/alarm
    ///       entries sort with the allowed group),
    ///    b. ACEs effective on the object itself (inherit-only unset)
    ///       before inherit-only ACEs,
    ///    c. ACEs that propagate to sub-objects before ACEs that do not.
    ///
    /// See [Order of ACEs in a DACL - MSDN](<https://learn.microsoft.com/en-us/windows/win32/secauthz/order-of-aces-in-a-dacl>)
    pub fn order_aces(&mut self) {
        self.ace.sort_by(Self::sort_aces_by);
    }

    /// Whether the ACEs already satisfy the canonical order.
    ///
    /// See [`order_aces`][ACL::order_aces] for the ordering rules.
    pub fn is_ace_sorted(&self) -> bool {
        self.ace
            .is_sorted_by(|a, b| Self::sort_aces_by(a, b).is_le())
    }

    /// Sorting function for ACEs.
    ///
    /// See [`order_aces`][ACL::order_aces] for the ordering rules.
    fn sort_aces_by(a: &ACE, b: &ACE) -> Ordering {
        let a_inherited = a.ace_flags.inherited();
        let b_inherited = b.ace_flags.inherited();
        if a_inherited != b_inherited {
            return a_inherited.cmp(&b_inherited); // (1) explicit first
        }
        // (2a) denied first <=> "not denied" last
        let a_not_deny = !a.is_access_denied();
        let b_not_deny = !b.is_access_denied();
        if a_not_deny != b_not_deny {
            return a_not_deny.cmp(&b_not_deny);
        }
        // (2b) effective on the object before inherit-only
        let a_inherit_only = a.ace_flags.inherit_only();
        let b_inherit_only = b.ace_flags.inherit_only();
        if a_inherit_only != b_inherit_only {
            return a_inherit_only.cmp(&b_inherit_only);
        }
        // (2c) propagating before non-propagating; "equal" otherwise, the
        // sort is stable
        let a_not_propagating = !a.is_inheritable();
        let b_not_propagating = !b.is_inheritable();
        a_not_propagating.cmp(&b_not_propagating)
    }

    /// Insert an ACE into the ACL, maintaining the canonical order.
    /// See [`order_aces`][ACL::order_aces] for the ordering rules.
    pub fn insert_ace(&mut self, ace: ACE) {
        self.ace.push(ace);
        self.order_aces();
    }
}

/// Reorders a bare ACE vector into the canonical DACL order.
///
/// Same ordering as [`ACL::order_aces`], for callers that hold the entry
/// list outside an [`ACL`] (for example, just before persisting a
/// descriptor).
pub fn canonicalize_dacl(aces: &mut Vec<ACE>) {
    aces.sort_by(ACL::sort_aces_by);
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[repr(u8)]
pub enum AclRevision {
    /// Windows NT 4.0
    Nt4 = 2,
    /// Active directory
    DS = 4,
}
