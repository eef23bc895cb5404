//! Modify-operation classification.
//!
//! Each changed attribute is classified before the generic
//! "write property" path: the security-descriptor attribute, group
//! membership, password representations and service principal names all
//! carry their own rules. The classifications are independent checks over
//! the same request; a modify touching several special attributes must
//! satisfy every applicable rule before it is forwarded.

use dirsec_dtyp::{AccessMask, SecurityDescriptor};

use crate::error::Error;
use crate::object_tree::ObjectTree;
use crate::ops::{AttributeChange, ChangeAction, ModifyRequest, Operation};
use crate::schema::{SchemaCatalog, attrs, well_known};
use crate::store::{DirectoryStore, NextLayer, SpnIdentity};
use crate::token::SecurityToken;

use super::AuthorizationInterceptor;

impl<S: SchemaCatalog, D: DirectoryStore, N: NextLayer> AuthorizationInterceptor<S, D, N> {
    /// Authorizes a modify request, applying every special-case rule that
    /// matches before falling back to per-attribute "write property".
    pub fn authorize_modify(
        &self,
        token: &SecurityToken,
        request: ModifyRequest,
    ) -> crate::Result<()> {
        if token.is_system {
            return self.forward_modify(request);
        }

        let descriptor = self.store().security_descriptor(&request.dn)?;
        let sd = descriptor.as_ref();

        let mut generic_tree = ObjectTree::new(AccessMask::new());
        let mut generic_attrs = 0usize;
        let mut password_attrs: Vec<&str> = Vec::new();
        let mut member_changes: Vec<&AttributeChange> = Vec::new();
        let mut spn_changes: Vec<&AttributeChange> = Vec::new();

        for change in &request.changes {
            let name = change.name.as_str();
            if attrs::is_password_attribute(name) {
                if !password_attrs.iter().any(|a| a.eq_ignore_ascii_case(name)) {
                    password_attrs.push(name);
                }
            } else if name.eq_ignore_ascii_case(attrs::NT_SECURITY_DESCRIPTOR) {
                // A generic property-write grant is not sufficient for the
                // descriptor itself.
                self.check(
                    sd,
                    token,
                    AccessMask::new().with_write_dacl(true),
                    None,
                    "write security descriptor",
                )?;
            } else if name.eq_ignore_ascii_case(attrs::MEMBER) {
                member_changes.push(change);
            } else if name.eq_ignore_ascii_case(attrs::SERVICE_PRINCIPAL_NAME) {
                spn_changes.push(change);
            } else {
                self.require_write_property(&mut generic_tree, name)?;
                generic_attrs += 1;
            }
        }

        for attr in password_attrs {
            self.check_password_change(sd, token, attr, &request.changes)?;
        }
        if !member_changes.is_empty() {
            self.check_membership_change(sd, token, &member_changes)?;
        }
        if !spn_changes.is_empty() {
            self.check_spn_change(sd, token, &request.dn, &spn_changes)?;
        }
        if generic_attrs > 0 {
            self.check(
                sd,
                token,
                AccessMask::new(),
                Some(&generic_tree),
                "write property",
            )?;
        }

        self.forward_modify(request)
    }

    /// Password writes are classified by request shape, not by rights
    /// alone:
    /// - deletions only: passed through, the password-hashing layer
    ///   enforces its own rule;
    /// - exactly one added and one deleted value: a user password change,
    ///   needing the narrow change-password right - its absence is a
    ///   constraint violation, which legacy password-change clients
    ///   expect;
    /// - anything else (replace, or unpaired adds/deletes): an
    ///   administrative reset, needing the force-change-password right.
    fn check_password_change(
        &self,
        sd: Option<&SecurityDescriptor>,
        token: &SecurityToken,
        attribute: &str,
        changes: &[AttributeChange],
    ) -> crate::Result<()> {
        let shape = PasswordChangeShape::classify(attribute, changes);
        match shape {
            PasswordChangeShape::DeleteOnly => Ok(()),
            PasswordChangeShape::UserChange => {
                if self.holds_scoped_right(
                    sd,
                    token,
                    well_known::USER_CHANGE_PASSWORD,
                    AccessMask::new().with_control_access(true),
                ) {
                    Ok(())
                } else {
                    log::debug!("{}: paired change without change-password right", attribute);
                    Err(Error::ConstraintViolation(format!(
                        "password change on {} requires the change-password right",
                        attribute
                    )))
                }
            }
            PasswordChangeShape::AdministrativeReset => {
                if self.holds_scoped_right(
                    sd,
                    token,
                    well_known::FORCE_CHANGE_PASSWORD,
                    AccessMask::new().with_control_access(true),
                ) {
                    Ok(())
                } else {
                    Err(Error::denied(format!(
                        "password reset on {} requires the force-change-password right",
                        attribute
                    )))
                }
            }
        }
    }

    /// Group-membership writes: a full "write property" grant on the
    /// member attribute allows anything; without one, only a pure
    /// self-add or self-remove is allowed, under the self-membership
    /// validated write. Mixed requests stay denied even for holders of
    /// the self-membership right.
    fn check_membership_change(
        &self,
        sd: Option<&SecurityDescriptor>,
        token: &SecurityToken,
        changes: &[&AttributeChange],
    ) -> crate::Result<()> {
        let mut tree = ObjectTree::new(AccessMask::new());
        self.require_write_property(&mut tree, attrs::MEMBER)?;
        if self
            .check(sd, token, AccessMask::new(), Some(&tree), "write member")
            .is_ok()
        {
            return Ok(());
        }

        if !self.is_pure_self_membership(token, changes)? {
            return Err(Error::denied(
                "membership change touches principals other than the caller".to_string(),
            ));
        }
        if self.holds_scoped_right(
            sd,
            token,
            well_known::SELF_MEMBERSHIP,
            AccessMask::new().with_self_write(true),
        ) {
            Ok(())
        } else {
            Err(Error::denied(
                "self-membership change requires the self-membership right".to_string(),
            ))
        }
    }

    /// Whether every member value being added or removed resolves to the
    /// caller's own SID. Replace operations are never a self change.
    fn is_pure_self_membership(
        &self,
        token: &SecurityToken,
        changes: &[&AttributeChange],
    ) -> crate::Result<bool> {
        let Some(user_sid) = token.user_sid() else {
            return Ok(false);
        };
        for change in changes {
            if matches!(change.action, ChangeAction::Replace) || change.values.is_empty() {
                return Ok(false);
            }
            for value in &change.values {
                if &self.store().resolve_dn_sid(value)? != user_sid {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Service-principal-name writes without a generic write grant fall
    /// back to the validated-SPN right, and every new value must pass
    /// format and ownership validation against the account's own
    /// identity. A failing value is a constraint violation regardless of
    /// rights.
    fn check_spn_change(
        &self,
        sd: Option<&SecurityDescriptor>,
        token: &SecurityToken,
        dn: &str,
        changes: &[&AttributeChange],
    ) -> crate::Result<()> {
        let mut tree = ObjectTree::new(AccessMask::new());
        self.require_write_property(&mut tree, attrs::SERVICE_PRINCIPAL_NAME)?;
        if self
            .check(sd, token, AccessMask::new(), Some(&tree), "write SPN")
            .is_ok()
        {
            return Ok(());
        }

        if !self.holds_scoped_right(
            sd,
            token,
            well_known::VALIDATED_SPN,
            AccessMask::new().with_self_write(true),
        ) {
            return Err(Error::denied(
                "SPN change requires write property or the validated-SPN right".to_string(),
            ));
        }

        let identity = self.store().spn_identity(dn)?;
        for change in changes {
            if matches!(change.action, ChangeAction::Delete) {
                continue;
            }
            for value in &change.values {
                if !spn_matches_identity(value, &identity) {
                    log::debug!("SPN value {:?} failed validation for {}", value, dn);
                    return Err(Error::ConstraintViolation(format!(
                        "SPN value {} does not match the target account identity",
                        value
                    )));
                }
            }
        }
        Ok(())
    }

    fn forward_modify(&self, request: ModifyRequest) -> crate::Result<()> {
        Ok(self.next().forward(Operation::Modify(request))?)
    }
}

/// Shape of a password-attribute modify, per the classification rules in
/// [`check_password_change`](AuthorizationInterceptor::check_password_change).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PasswordChangeShape {
    DeleteOnly,
    UserChange,
    AdministrativeReset,
}

impl PasswordChangeShape {
    pub(crate) fn classify(attribute: &str, changes: &[AttributeChange]) -> PasswordChangeShape {
        let mut adds = 0usize;
        let mut deletes = 0usize;
        let mut replaces = false;
        for change in changes {
            if !change.name.eq_ignore_ascii_case(attribute) {
                continue;
            }
            match change.action {
                ChangeAction::Add => adds += change.values.len(),
                ChangeAction::Delete => deletes += change.values.len(),
                ChangeAction::Replace => replaces = true,
            }
        }
        if replaces {
            PasswordChangeShape::AdministrativeReset
        } else if adds == 0 {
            PasswordChangeShape::DeleteOnly
        } else if adds == 1 && deletes == 1 {
            PasswordChangeShape::UserChange
        } else {
            PasswordChangeShape::AdministrativeReset
        }
    }
}

/// Validates one SPN value against the target account's identity.
///
/// Accepted forms: `service/host`, `service/host:port`,
/// `service/host/servicename` (and the port variant of the last). The
/// host must be the account's DNS host name, its SAM account name with a
/// trailing `$` removed, or, for a domain controller, the
/// `<ntds-guid>._msdcs.<forest>` alias.
pub(crate) fn spn_matches_identity(value: &str, identity: &SpnIdentity) -> bool {
    let mut parts = value.split('/');
    let Some(service) = parts.next() else {
        return false;
    };
    let Some(host_and_port) = parts.next() else {
        return false;
    };
    let service_name = parts.next();
    // At most three components, none empty.
    if parts.next().is_some()
        || service.is_empty()
        || host_and_port.is_empty()
        || service_name.is_some_and(str::is_empty)
    {
        return false;
    }

    let host = match host_and_port.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => host,
        Some(_) => return false,
        None => host_and_port,
    };
    if host.is_empty() {
        return false;
    }

    if let Some(dns_host) = &identity.dns_host_name {
        if host.eq_ignore_ascii_case(dns_host) {
            return true;
        }
    }
    let netbios = identity.account_name.trim_end_matches('$');
    if !netbios.is_empty() && host.eq_ignore_ascii_case(netbios) {
        return true;
    }
    if identity.is_domain_controller {
        if let (Some(ntds_guid), Some(forest)) = (&identity.ntds_guid, &identity.forest_dns_name) {
            let dc_alias = format!("{}._msdcs.{}", ntds_guid, forest);
            if host.eq_ignore_ascii_case(&dc_alias) {
                return true;
            }
        }
    }
    false
}
