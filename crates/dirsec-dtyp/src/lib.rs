//! Common security data types.
//!
//! This crate holds the logical model of [MS-DTYP 2.4](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/cca27429-5689-4a16-b2b4-9325d93e4ba2>)
//! security structures, as used by the `dirsec` authorization engine:
//! security identifiers, object GUIDs, access masks, access-control entries
//! and lists, and security descriptors.
//!
//! No wire encoding is defined here; descriptors are logical values read
//! from, and handed back to, the surrounding directory store.
#![forbid(unsafe_code)]

pub mod guid;
pub mod sid;

pub mod security;

pub use guid::Guid;
pub use security::*;
pub use sid::SID;
