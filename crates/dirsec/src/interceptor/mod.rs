//! The per-operation authorization policy layer.
//!
//! Maps each incoming directory operation onto the rights it requires,
//! builds the object-type tree for attribute-scoped checks, asks
//! [`check_access`] for a decision, and forwards granted operations to the
//! next pipeline layer. Denied operations produce a typed error and no
//! side effects. The interceptor keeps no state between operations.

mod modify;
mod search;

pub use search::ConstructedAttribute;

use dirsec_dtyp::{AccessMask, Guid, SID, SecurityDescriptor};

use crate::access_check::check_access;
use crate::error::Error;
use crate::object_tree::ObjectTree;
use crate::ops::{AddRequest, DeleteRequest, ExtendedRequest, Operation, RenameRequest};
use crate::schema::{SchemaCatalog, attrs};
use crate::store::{DirectoryStore, NextLayer};
use crate::token::SecurityToken;

/// Extended operations any authenticated caller may issue. Everything
/// else requires system or administrator identity.
const PERMITTED_EXTENDED_OIDS: &[&str] = &[
    // Sequence-number query: reads a monotonically increasing counter.
    "1.3.6.1.4.1.7165.4.4.3",
];

/// The authorization layer of the operation pipeline.
///
/// Generic over its collaborators: the schema catalog, the directory
/// store, and the next layer that executes granted operations.
pub struct AuthorizationInterceptor<S, D, N> {
    schema: S,
    store: D,
    next: N,
}

impl<S: SchemaCatalog, D: DirectoryStore, N: NextLayer> AuthorizationInterceptor<S, D, N> {
    pub fn new(schema: S, store: D, next: N) -> AuthorizationInterceptor<S, D, N> {
        AuthorizationInterceptor { schema, store, next }
    }

    pub(crate) fn schema(&self) -> &S {
        &self.schema
    }

    pub(crate) fn store(&self) -> &D {
        &self.store
    }

    pub(crate) fn next(&self) -> &N {
        &self.next
    }

    /// Authorizes creation of a new entry: "create child" for the entry's
    /// class, checked against the parent's descriptor.
    pub fn authorize_add(&self, token: &SecurityToken, request: AddRequest) -> crate::Result<()> {
        if token.is_system {
            return self.forward(Operation::Add(request));
        }
        // Creating a whole naming context is a higher-privilege operation
        // handled elsewhere; route it through unchanged.
        if self.store.is_naming_context_root(&request.dn)? {
            log::debug!("add of naming-context root {}, passing through", request.dn);
            return self.forward(Operation::Add(request));
        }

        let parent_dn = self
            .store
            .parent_dn(&request.dn)?
            .ok_or_else(|| Error::PolicyRefused(format!("{} has no parent entry", request.dn)))?;
        let class_guid = self.schema.class_guid(&request.object_class)?;

        let mut tree = ObjectTree::new(AccessMask::new());
        tree.insert(
            tree.root(),
            class_guid,
            AccessMask::new().with_create_child(true),
        );

        let parent_sd = self.store.security_descriptor(&parent_dn)?;
        self.check(
            parent_sd.as_ref(),
            token,
            AccessMask::new(),
            Some(&tree),
            "create child",
        )?;
        self.forward(Operation::Add(request))
    }

    /// Authorizes deletion: "delete" on the object itself, or failing
    /// that, "delete child" on the parent. Only one of the two is needed.
    pub fn authorize_delete(
        &self,
        token: &SecurityToken,
        request: DeleteRequest,
    ) -> crate::Result<()> {
        if token.is_system {
            return self.forward(Operation::Delete(request));
        }
        if self.store.is_naming_context_root(&request.dn)? {
            return Err(Error::PolicyRefused(format!(
                "cannot delete naming-context root {}",
                request.dn
            )));
        }

        let delete_self = AccessMask::new().with_delete(true);
        let object_sd = self.store.security_descriptor(&request.dn)?;
        if check_access(object_sd.as_ref(), token, delete_self, None).is_ok() {
            return self.forward(Operation::Delete(request));
        }

        let parent_dn = self
            .store
            .parent_dn(&request.dn)?
            .ok_or_else(|| Error::PolicyRefused(format!("{} has no parent entry", request.dn)))?;
        let class_guid = self.schema.class_guid(&self.store.object_class(&request.dn)?)?;
        let mut tree = ObjectTree::new(AccessMask::new());
        tree.insert(
            tree.root(),
            class_guid,
            AccessMask::new().with_delete_child(true),
        );
        let parent_sd = self.store.security_descriptor(&parent_dn)?;
        self.check(
            parent_sd.as_ref(),
            token,
            AccessMask::new(),
            Some(&tree),
            "delete",
        )?;
        self.forward(Operation::Delete(request))
    }

    /// Authorizes a rename or move: "write property" on the RDN and
    /// naming attributes, plus, for a cross-parent move, "create child" at
    /// the new parent and a delete-equivalent right at the source.
    pub fn authorize_rename(
        &self,
        token: &SecurityToken,
        request: RenameRequest,
    ) -> crate::Result<()> {
        if token.is_system {
            return self.forward(Operation::Rename(request));
        }

        let object_sd = self.store.security_descriptor(&request.dn)?;

        let mut tree = ObjectTree::new(AccessMask::new());
        self.require_write_property(&mut tree, &request.new_rdn_attribute)?;
        self.require_write_property(&mut tree, attrs::NAME)?;
        self.check(
            object_sd.as_ref(),
            token,
            AccessMask::new(),
            Some(&tree),
            "rename",
        )?;

        if let Some(new_parent_dn) = &request.new_parent_dn {
            self.check_move(token, &request, object_sd.as_ref(), new_parent_dn)?;
        }
        self.forward(Operation::Rename(request))
    }

    /// The extra rights a cross-parent move needs beyond the rename
    /// itself.
    fn check_move(
        &self,
        token: &SecurityToken,
        request: &RenameRequest,
        object_sd: Option<&SecurityDescriptor>,
        new_parent_dn: &str,
    ) -> crate::Result<()> {
        let class_guid = self.schema.class_guid(&self.store.object_class(&request.dn)?)?;

        let mut create_tree = ObjectTree::new(AccessMask::new());
        create_tree.insert(
            create_tree.root(),
            class_guid,
            AccessMask::new().with_create_child(true),
        );
        let new_parent_sd = self.store.security_descriptor(new_parent_dn)?;
        self.check(
            new_parent_sd.as_ref(),
            token,
            AccessMask::new(),
            Some(&create_tree),
            "move: create child at new parent",
        )?;

        // Delete-equivalent: "delete" on the object, or "delete child" on
        // the old parent.
        let delete_self = AccessMask::new().with_delete(true);
        if check_access(object_sd, token, delete_self, None).is_ok() {
            return Ok(());
        }
        let old_parent_dn = self
            .store
            .parent_dn(&request.dn)?
            .ok_or_else(|| Error::PolicyRefused(format!("{} has no parent entry", request.dn)))?;
        let mut delete_tree = ObjectTree::new(AccessMask::new());
        delete_tree.insert(
            delete_tree.root(),
            class_guid,
            AccessMask::new().with_delete_child(true),
        );
        let old_parent_sd = self.store.security_descriptor(&old_parent_dn)?;
        self.check(
            old_parent_sd.as_ref(),
            token,
            AccessMask::new(),
            Some(&delete_tree),
            "move: delete at old parent",
        )
    }

    /// Authorizes an extended operation. A small fixed allow-list passes
    /// through for any caller; everything else needs system or
    /// administrator identity.
    pub fn authorize_extended(
        &self,
        token: &SecurityToken,
        request: ExtendedRequest,
    ) -> crate::Result<()> {
        if PERMITTED_EXTENDED_OIDS.contains(&request.oid.as_str()) {
            return self.forward(Operation::Extended(request));
        }
        if token.is_system || token.is_member_of(&builtin_administrators()) {
            return self.forward(Operation::Extended(request));
        }
        log::debug!("extended operation {} refused for non-admin caller", request.oid);
        Err(Error::denied(format!(
            "extended operation {} requires administrative rights",
            request.oid
        )))
    }

    /// Adds a "write property" requirement for one attribute to `tree`,
    /// nested under the attribute's declared attribute set when the
    /// schema defines one.
    pub(crate) fn require_write_property(
        &self,
        tree: &mut ObjectTree,
        attribute: &str,
    ) -> crate::Result<()> {
        let schema = self.schema.attribute(attribute)?;
        let parent = match schema.attribute_set {
            Some(set) => tree.insert(tree.root(), set, AccessMask::new()),
            None => tree.root(),
        };
        tree.insert(
            parent,
            schema.guid,
            AccessMask::new().with_write_property(true),
        );
        Ok(())
    }

    /// Runs the access check and maps a shortfall onto a typed denial
    /// with a log line naming the operation.
    pub(crate) fn check(
        &self,
        descriptor: Option<&SecurityDescriptor>,
        token: &SecurityToken,
        requested: AccessMask,
        tree: Option<&ObjectTree>,
        what: &str,
    ) -> crate::Result<()> {
        match check_access(descriptor, token, requested, tree) {
            Ok(_) => Ok(()),
            Err(reason) => {
                log::debug!("{} denied: {}", what, reason);
                Err(Error::denied(format!("{}: {}", what, reason)))
            }
        }
    }

    /// Probes a control-access or validated-write right (`bit` scoped to
    /// the right's GUID) without surfacing an error.
    pub(crate) fn holds_scoped_right(
        &self,
        descriptor: Option<&SecurityDescriptor>,
        token: &SecurityToken,
        right: Guid,
        bit: AccessMask,
    ) -> bool {
        let mut tree = ObjectTree::new(AccessMask::new());
        tree.insert(tree.root(), right, bit);
        check_access(descriptor, token, AccessMask::new(), Some(&tree)).is_ok()
    }

    fn forward(&self, operation: Operation) -> crate::Result<()> {
        Ok(self.next.forward(operation)?)
    }
}

/// `S-1-5-32-544`, the builtin Administrators alias.
fn builtin_administrators() -> SID {
    SID {
        revision: 1,
        identifier_authority: 5,
        sub_authority: vec![32, 544],
    }
}
