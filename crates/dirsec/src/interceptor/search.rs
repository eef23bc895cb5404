//! Search-result post-processing.
//!
//! Searches themselves are not gated; each returned entry is
//! post-processed instead: secret attributes are stripped for everyone but
//! the system principal, and constructed pseudo-attributes are computed on
//! demand by probing [`check_access`] once per candidate attribute, class
//! or descriptor part.

use dirsec_dtyp::AccessMask;

use crate::access_check::check_access;
use crate::object_tree::ObjectTree;
use crate::ops::SearchEntry;
use crate::schema::SchemaCatalog;
use crate::store::{DirectoryStore, NextLayer};
use crate::token::SecurityToken;

use super::AuthorizationInterceptor;

/// The constructed pseudo-attributes a search may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructedAttribute {
    /// Every attribute the entry's class may carry.
    AllowedAttributes,
    /// The subset of `allowedAttributes` the caller may write.
    AllowedAttributesEffective,
    /// Every class creatable under the entry.
    AllowedChildClasses,
    /// The subset of `allowedChildClasses` the caller may create.
    AllowedChildClassesEffective,
    /// Bitmask of the security-descriptor parts the caller may modify:
    /// owner 0x1, group 0x2, DACL 0x4, SACL 0x8.
    SdRightsEffective,
}

impl ConstructedAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            ConstructedAttribute::AllowedAttributes => "allowedAttributes",
            ConstructedAttribute::AllowedAttributesEffective => "allowedAttributesEffective",
            ConstructedAttribute::AllowedChildClasses => "allowedChildClasses",
            ConstructedAttribute::AllowedChildClassesEffective => "allowedChildClassesEffective",
            ConstructedAttribute::SdRightsEffective => "sDRightsEffective",
        }
    }
}

impl<S: SchemaCatalog, D: DirectoryStore, N: NextLayer> AuthorizationInterceptor<S, D, N> {
    /// Post-processes one search-result entry: strips secret attributes
    /// and appends the requested constructed attributes. Never mutates
    /// store state.
    pub fn filter_search_result(
        &self,
        token: &SecurityToken,
        mut entry: SearchEntry,
        constructed: &[ConstructedAttribute],
    ) -> crate::Result<SearchEntry> {
        if !token.is_system {
            self.redact_secret_attributes(&mut entry)?;
        }
        for attribute in constructed {
            let values = self.compute_constructed(token, &entry.dn, *attribute)?;
            entry.attributes.push((attribute.name().to_string(), values));
        }
        Ok(entry)
    }

    fn redact_secret_attributes(&self, entry: &mut SearchEntry) -> crate::Result<()> {
        let mut kept = Vec::with_capacity(entry.attributes.len());
        for (name, values) in entry.attributes.drain(..) {
            if self.schema().attribute(&name)?.flags.secret() {
                log::debug!("stripping secret attribute {} from {}", name, entry.dn);
                continue;
            }
            kept.push((name, values));
        }
        entry.attributes = kept;
        Ok(())
    }

    fn compute_constructed(
        &self,
        token: &SecurityToken,
        dn: &str,
        attribute: ConstructedAttribute,
    ) -> crate::Result<Vec<String>> {
        let class = self.store().object_class(dn)?;
        match attribute {
            ConstructedAttribute::AllowedAttributes => {
                Ok(self.schema().class_attributes(&class)?)
            }
            ConstructedAttribute::AllowedAttributesEffective => {
                let candidates = self.schema().class_attributes(&class)?;
                if token.is_system {
                    return Ok(candidates);
                }
                let sd = self.store().security_descriptor(dn)?;
                let mut writable = Vec::new();
                for name in candidates {
                    let schema = self.schema().attribute(&name)?;
                    if schema.flags.constructed() || schema.flags.system_only() {
                        continue;
                    }
                    let mut tree = ObjectTree::new(AccessMask::new());
                    self.require_write_property(&mut tree, &name)?;
                    if check_access(sd.as_ref(), token, AccessMask::new(), Some(&tree)).is_ok() {
                        writable.push(name);
                    }
                }
                Ok(writable)
            }
            ConstructedAttribute::AllowedChildClasses => {
                Ok(self.schema().possible_inferiors(&class)?)
            }
            ConstructedAttribute::AllowedChildClassesEffective => {
                let candidates = self.schema().possible_inferiors(&class)?;
                if token.is_system {
                    return Ok(candidates);
                }
                let sd = self.store().security_descriptor(dn)?;
                let mut creatable = Vec::new();
                for name in candidates {
                    let class_guid = self.schema().class_guid(&name)?;
                    let mut tree = ObjectTree::new(AccessMask::new());
                    tree.insert(
                        tree.root(),
                        class_guid,
                        AccessMask::new().with_create_child(true),
                    );
                    if check_access(sd.as_ref(), token, AccessMask::new(), Some(&tree)).is_ok() {
                        creatable.push(name);
                    }
                }
                Ok(creatable)
            }
            ConstructedAttribute::SdRightsEffective => {
                let parts = self.sd_rights_effective(token, dn)?;
                Ok(vec![parts.to_string()])
            }
        }
    }

    /// Which descriptor parts the caller could rewrite: owner and group
    /// follow "write owner", the DACL follows "write DAC", and the SACL
    /// follows the system-security right.
    fn sd_rights_effective(&self, token: &SecurityToken, dn: &str) -> crate::Result<u32> {
        const OWNER: u32 = 0x1;
        const GROUP: u32 = 0x2;
        const DACL: u32 = 0x4;
        const SACL: u32 = 0x8;

        if token.is_system {
            return Ok(OWNER | GROUP | DACL | SACL);
        }
        let sd = self.store().security_descriptor(dn)?;
        let granted = |mask: AccessMask| check_access(sd.as_ref(), token, mask, None).is_ok();

        let mut parts = 0;
        if granted(AccessMask::new().with_write_owner(true)) {
            parts |= OWNER | GROUP;
        }
        if granted(AccessMask::new().with_write_dacl(true)) {
            parts |= DACL;
        }
        if granted(AccessMask::new().with_system_security(true)) {
            parts |= SACL;
        }
        Ok(parts)
    }
}
