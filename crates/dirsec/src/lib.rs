//! A security-descriptor based authorization engine for directory services.
//!
//! The engine gates every directory mutation and read behind an NT-style
//! access check over the target entry's security descriptor. It is
//! stateless: each decision is a pure function of the descriptor snapshot,
//! the schema snapshot, the caller's token and the requested rights, all
//! fetched from collaborator traits at decision time. It holds no locks,
//! owns no shared mutable state, and is safe to invoke concurrently.
//!
//! Entry points:
//! - [`AuthorizationInterceptor`] - per-operation policy layer: derives
//!   the rights each add/modify/delete/rename/extended operation needs,
//!   checks them, and forwards granted operations down the pipeline.
//! - [`check_access`] - the bare access-check algorithm, usable for
//!   ad-hoc rights probes.
//! - [`dirsec_dtyp::canonicalize_dacl`] - canonical DACL ordering, for any
//!   code that persists a descriptor.
#![forbid(unsafe_code)]

pub mod access_check;
pub mod error;
pub mod interceptor;
pub mod object_tree;
pub mod ops;
pub mod schema;
pub mod store;
pub mod token;

pub use access_check::{AccessDeniedReason, check_access};
pub use error::Error;
pub use interceptor::{AuthorizationInterceptor, ConstructedAttribute};
pub use object_tree::{NodeId, ObjectTree};
pub use ops::{
    AddRequest, AttributeChange, ChangeAction, DeleteRequest, ExtendedRequest, ModifyRequest,
    Operation, RenameRequest, SearchEntry,
};
pub use schema::{AttributeFlags, AttributeSchema, SchemaCatalog, SchemaError};
pub use store::{DirectoryStore, NextLayer, SpnIdentity, StoreError};
pub use token::SecurityToken;

pub use dirsec_dtyp::*;

/// Authorization result type.
pub type Result<T> = std::result::Result<T, crate::Error>;
