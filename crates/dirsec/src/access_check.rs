//! The NT-style directory access check.
//!
//! Evaluates a security descriptor's DACL against a caller token and a
//! requested mask, optionally scoped per attribute/class via an
//! [`ObjectTree`]. Deny bits override allow bits once seen, and bits
//! accumulate across multiple ACEs; a "first matching ACE wins outright"
//! simplification would be wrong under object-specific ACEs.

use std::borrow::Cow;

use dirsec_dtyp::{ACE, ACL, AccessMask, Guid, SecurityDescriptor};

use crate::object_tree::{NodeId, ObjectTree};
use crate::token::SecurityToken;

/// Why an access check failed. Carries the scope and the bits that were
/// missing or explicitly denied, for logging and error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDeniedReason {
    #[error("access bits {missing:#010x} not granted on the object")]
    Object { missing: u32 },
    #[error("access bits {missing:#010x} not granted for object type {object_type}")]
    Scoped { object_type: Guid, missing: u32 },
}

/// Checks whether `token` holds `requested` under `descriptor`.
///
/// Returns the granted mask, or the first scope that fell short. The
/// decision rules, in order:
/// 1. The system principal is granted unconditionally.
/// 2. An absent descriptor grants unconditionally: an entry created before
///    access control applied has no owner to assert rights against. This
///    permissiveness is deliberate, inherited behavior; see DESIGN.md
///    before tightening it.
/// 3. A descriptor without a DACL grants unconditionally (null-DACL
///    semantics), while an empty DACL grants nothing.
/// 4. Otherwise the DACL is walked in canonical order, accumulating
///    granted and denied bits per scope. With a `tree`, every node's
///    required bits must be granted in that node's scope; without one, the
///    single object-level mask must be fully granted.
pub fn check_access(
    descriptor: Option<&SecurityDescriptor>,
    token: &SecurityToken,
    requested: AccessMask,
    tree: Option<&ObjectTree>,
) -> Result<AccessMask, AccessDeniedReason> {
    if token.is_system {
        return Ok(full_request(requested, tree));
    }
    let Some(descriptor) = descriptor else {
        return Ok(full_request(requested, tree));
    };
    let Some(dacl) = &descriptor.dacl else {
        return Ok(full_request(requested, tree));
    };

    // The walk is only correct over a canonical DACL; descriptors read
    // back from the store are already ordered, so this rarely copies.
    let dacl = if dacl.is_ace_sorted() {
        Cow::Borrowed(dacl)
    } else {
        let mut ordered = dacl.clone();
        ordered.order_aces();
        Cow::Owned(ordered)
    };

    let Some(tree) = tree else {
        let granted = evaluate_scope(&dacl, token, requested, None);
        let missing = requested.difference(granted);
        if missing.is_empty() {
            return Ok(granted);
        }
        return Err(AccessDeniedReason::Object {
            missing: missing.bits(),
        });
    };

    // Every node must be satisfied independently; a single shortfall
    // denies the whole operation.
    let mut granted_union = AccessMask::new();
    for id in tree.node_ids() {
        let required = tree.required(id) | if id == tree.root() { requested } else { AccessMask::new() };
        if required.is_empty() {
            continue;
        }
        let granted = evaluate_scope(&dacl, token, required, Some((tree, id)));
        let missing = required.difference(granted);
        if !missing.is_empty() {
            return Err(match tree.guid(id) {
                Some(object_type) => AccessDeniedReason::Scoped {
                    object_type,
                    missing: missing.bits(),
                },
                None => AccessDeniedReason::Object {
                    missing: missing.bits(),
                },
            });
        }
        granted_union |= granted;
    }
    Ok(granted_union)
}

/// The mask a short-circuited (system or descriptor-less) check grants:
/// everything that was asked for, across the whole tree.
fn full_request(requested: AccessMask, tree: Option<&ObjectTree>) -> AccessMask {
    let mut granted = requested;
    if let Some(tree) = tree {
        for id in tree.node_ids() {
            granted |= tree.required(id);
        }
    }
    granted
}

/// Walks the DACL once for a single scope, returning the granted bits.
///
/// Per-bit, first match wins: a deny on a bit blocks later allows of that
/// bit, and an allow on a bit shields it from later denies.
fn evaluate_scope(
    dacl: &ACL,
    token: &SecurityToken,
    requested: AccessMask,
    node: Option<(&ObjectTree, NodeId)>,
) -> AccessMask {
    let mut granted = AccessMask::new();
    let mut denied = AccessMask::new();

    for ace in &dacl.ace {
        if ace.is_audit_or_alarm() {
            continue;
        }
        // Inherit-only entries do not apply to the object itself.
        if ace.ace_flags.inherit_only() {
            continue;
        }
        if !token.is_member_of(ace.trustee()) {
            continue;
        }
        if !ace_applies_to_scope(ace, node) {
            continue;
        }

        let overlap = ace.access_mask() & requested;
        if ace.is_access_denied() {
            denied |= overlap.difference(granted);
        } else {
            granted |= overlap.difference(denied);
        }
    }

    granted
}

/// Whether an ACE applies to the scope being evaluated. A plain ACE, or an
/// object ACE without an object type, covers every scope; an object ACE
/// with a GUID covers only tree nodes carrying that GUID (or nodes below
/// them).
fn ace_applies_to_scope(ace: &ACE, node: Option<(&ObjectTree, NodeId)>) -> bool {
    match ace.object_type() {
        None => true,
        Some(object_type) => match node {
            Some((tree, id)) => tree.in_scope(id, object_type),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use dirsec_dtyp::{AceType, AceValue, AclRevision, ObjectAce, SID};

    use super::*;

    fn trustee() -> SID {
        SID::from_str("S-1-5-21-1-2-3-1104").unwrap()
    }

    fn token() -> SecurityToken {
        SecurityToken::new(vec![trustee()])
    }

    fn descriptor_with_dacl(aces: Vec<ACE>) -> SecurityDescriptor {
        SecurityDescriptor {
            owner_sid: None,
            group_sid: None,
            dacl: Some(ACL {
                acl_revision: AclRevision::DS,
                ace: aces,
            }),
            sacl: None,
        }
    }

    fn object_allow(object_type: Guid, mask: AccessMask, sid: SID) -> ACE {
        ACE {
            ace_flags: Default::default(),
            value: AceValue::AccessAllowedObject(ObjectAce {
                access_mask: mask,
                object_type: Some(object_type),
                inherited_object_type: None,
                sid,
            }),
        }
    }

    fn guid(n: u32) -> Guid {
        Guid {
            data1: n,
            ..Guid::ZERO
        }
    }

    const WRITE_PROP: fn() -> AccessMask = || AccessMask::new().with_write_property(true);
    const DELETE: fn() -> AccessMask = || AccessMask::new().with_delete(true);

    #[test]
    fn test_system_token_granted_in_full() {
        let sd = descriptor_with_dacl(vec![ACE::plain(
            AceType::AccessDenied,
            DELETE(),
            trustee(),
        )]);
        let granted =
            check_access(Some(&sd), &SecurityToken::system(), DELETE(), None).unwrap();
        assert_eq!(granted, DELETE());
    }

    #[test]
    fn test_absent_descriptor_grants() {
        let granted = check_access(None, &token(), WRITE_PROP(), None).unwrap();
        assert_eq!(granted, WRITE_PROP());
    }

    #[test]
    fn test_missing_dacl_grants_but_empty_dacl_denies() {
        let no_dacl = SecurityDescriptor::default();
        assert!(check_access(Some(&no_dacl), &token(), DELETE(), None).is_ok());

        let empty = descriptor_with_dacl(vec![]);
        assert_eq!(
            check_access(Some(&empty), &token(), DELETE(), None),
            Err(AccessDeniedReason::Object {
                missing: DELETE().bits()
            })
        );
    }

    #[test]
    fn test_deny_precedes_allow() {
        let sd = descriptor_with_dacl(vec![
            ACE::plain(AceType::AccessDenied, DELETE(), trustee()),
            ACE::plain(AceType::AccessAllowed, DELETE(), trustee()),
        ]);
        assert!(check_access(Some(&sd), &token(), DELETE(), None).is_err());
    }

    #[test]
    fn test_bits_accumulate_across_aces() {
        // Neither ACE alone covers the request; together they do.
        let sd = descriptor_with_dacl(vec![
            ACE::plain(AceType::AccessAllowed, WRITE_PROP(), trustee()),
            ACE::plain(AceType::AccessAllowed, DELETE(), trustee()),
        ]);
        let requested = WRITE_PROP() | DELETE();
        assert_eq!(
            check_access(Some(&sd), &token(), requested, None).unwrap(),
            requested
        );
    }

    #[test]
    fn test_foreign_trustee_and_inherit_only_skipped() {
        let other = SID::from_str("S-1-5-21-9-9-9-500").unwrap();
        let mut inherit_only = ACE::plain(AceType::AccessAllowed, DELETE(), trustee());
        inherit_only.ace_flags = inherit_only.ace_flags.with_inherit_only(true);
        let sd = descriptor_with_dacl(vec![
            ACE::plain(AceType::AccessAllowed, DELETE(), other),
            inherit_only,
        ]);
        assert!(check_access(Some(&sd), &token(), DELETE(), None).is_err());
    }

    #[test]
    fn test_object_ace_scopes_to_attribute() {
        let attr_a = guid(0xa);
        let attr_b = guid(0xb);
        let sd = descriptor_with_dacl(vec![object_allow(attr_a, WRITE_PROP(), trustee())]);

        let mut tree_a = ObjectTree::new(AccessMask::new());
        tree_a.insert(tree_a.root(), attr_a, WRITE_PROP());
        assert_eq!(
            check_access(Some(&sd), &token(), AccessMask::new(), Some(&tree_a)).unwrap(),
            WRITE_PROP()
        );

        let mut tree_b = ObjectTree::new(AccessMask::new());
        tree_b.insert(tree_b.root(), attr_b, WRITE_PROP());
        assert_eq!(
            check_access(Some(&sd), &token(), AccessMask::new(), Some(&tree_b)),
            Err(AccessDeniedReason::Scoped {
                object_type: attr_b,
                missing: WRITE_PROP().bits()
            })
        );
    }

    #[test]
    fn test_object_ace_ignored_without_tree() {
        let sd = descriptor_with_dacl(vec![object_allow(guid(0xa), WRITE_PROP(), trustee())]);
        assert!(check_access(Some(&sd), &token(), WRITE_PROP(), None).is_err());
    }

    #[test]
    fn test_attribute_set_ace_covers_member_attributes() {
        let set = guid(0x100);
        let attr = guid(0x101);
        let sd = descriptor_with_dacl(vec![object_allow(set, WRITE_PROP(), trustee())]);

        let mut tree = ObjectTree::new(AccessMask::new());
        let set_node = tree.insert(tree.root(), set, AccessMask::new());
        tree.insert(set_node, attr, WRITE_PROP());
        assert!(check_access(Some(&sd), &token(), AccessMask::new(), Some(&tree)).is_ok());
    }

    #[test]
    fn test_tree_conjunction_denies_on_single_node() {
        let attr_a = guid(0xa);
        let attr_b = guid(0xb);
        let sd = descriptor_with_dacl(vec![object_allow(attr_a, WRITE_PROP(), trustee())]);

        let mut tree = ObjectTree::new(AccessMask::new());
        tree.insert(tree.root(), attr_a, WRITE_PROP());
        tree.insert(tree.root(), attr_b, WRITE_PROP());
        assert_eq!(
            check_access(Some(&sd), &token(), AccessMask::new(), Some(&tree)),
            Err(AccessDeniedReason::Scoped {
                object_type: attr_b,
                missing: WRITE_PROP().bits()
            })
        );
    }

    #[test]
    fn test_plain_allow_covers_tree_nodes() {
        let sd = descriptor_with_dacl(vec![ACE::plain(
            AceType::AccessAllowed,
            WRITE_PROP(),
            trustee(),
        )]);
        let mut tree = ObjectTree::new(AccessMask::new());
        tree.insert(tree.root(), guid(0xa), WRITE_PROP());
        assert!(check_access(Some(&sd), &token(), AccessMask::new(), Some(&tree)).is_ok());
    }

    #[test]
    fn test_unsorted_dacl_is_canonicalized_before_evaluation() {
        // Allow listed before deny; canonical order still puts the deny
        // first, so the request must fail.
        let sd = descriptor_with_dacl(vec![
            ACE::plain(AceType::AccessAllowed, DELETE(), trustee()),
            ACE::plain(AceType::AccessDenied, DELETE(), trustee()),
        ]);
        assert!(check_access(Some(&sd), &token(), DELETE(), None).is_err());
    }
}
