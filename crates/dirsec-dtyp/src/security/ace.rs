//! MS-DTYP 2.4.4: ACE

use modular_bitfield::prelude::*;

use crate::{Guid, SID};

use super::AccessMask;

/// A single access-control entry.
///
/// The entry's wire size is a presentation-layer concern and is never
/// stored; it is fully derivable from the trustee and the value variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ACE {
    pub ace_flags: AceFlags,
    pub value: AceValue,
}

impl ACE {
    /// A convenience constructor for a non-inherited plain ACE.
    pub fn plain(ace_type: AceType, access_mask: AccessMask, sid: SID) -> ACE {
        let inner = AccessAce { access_mask, sid };
        let value = match ace_type {
            AceType::AccessAllowed => AceValue::AccessAllowed(inner),
            AceType::AccessDenied => AceValue::AccessDenied(inner),
            AceType::SystemAudit => AceValue::SystemAudit(inner),
            AceType::SystemAlarm => AceValue::SystemAlarm(inner),
            _ => panic!("object ACE type requires an ObjectAce value"),
        };
        ACE {
            ace_flags: AceFlags::new(),
            value,
        }
    }

    /// The SID this entry applies to.
    pub fn trustee(&self) -> &SID {
        match &self.value {
            AceValue::AccessAllowed(a)
            | AceValue::AccessDenied(a)
            | AceValue::SystemAudit(a)
            | AceValue::SystemAlarm(a) => &a.sid,
            AceValue::AccessAllowedObject(o)
            | AceValue::AccessDeniedObject(o)
            | AceValue::SystemAuditObject(o)
            | AceValue::SystemAlarmObject(o) => &o.sid,
        }
    }

    pub fn access_mask(&self) -> AccessMask {
        match &self.value {
            AceValue::AccessAllowed(a)
            | AceValue::AccessDenied(a)
            | AceValue::SystemAudit(a)
            | AceValue::SystemAlarm(a) => a.access_mask,
            AceValue::AccessAllowedObject(o)
            | AceValue::AccessDeniedObject(o)
            | AceValue::SystemAuditObject(o)
            | AceValue::SystemAlarmObject(o) => o.access_mask,
        }
    }

    /// The attribute/class GUID this entry is restricted to, if any.
    pub fn object_type(&self) -> Option<Guid> {
        match &self.value {
            AceValue::AccessAllowedObject(o)
            | AceValue::AccessDeniedObject(o)
            | AceValue::SystemAuditObject(o)
            | AceValue::SystemAlarmObject(o) => o.object_type,
            _ => None,
        }
    }

    /// The child-class GUID inheritance of this entry is restricted to, if any.
    pub fn inherited_object_type(&self) -> Option<Guid> {
        match &self.value {
            AceValue::AccessAllowedObject(o)
            | AceValue::AccessDeniedObject(o)
            | AceValue::SystemAuditObject(o)
            | AceValue::SystemAlarmObject(o) => o.inherited_object_type,
            _ => None,
        }
    }

    pub fn is_access_allowed(&self) -> bool {
        matches!(
            self.value,
            AceValue::AccessAllowed(_) | AceValue::AccessAllowedObject(_)
        )
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(
            self.value,
            AceValue::AccessDenied(_) | AceValue::AccessDeniedObject(_)
        )
    }

    pub fn is_audit_or_alarm(&self) -> bool {
        matches!(
            self.value,
            AceValue::SystemAudit(_)
                | AceValue::SystemAlarm(_)
                | AceValue::SystemAuditObject(_)
                | AceValue::SystemAlarmObject(_)
        )
    }

    pub fn is_object_ace(&self) -> bool {
        self.value.get_type().is_object()
    }

    /// Whether this entry propagates to children of the object.
    pub fn is_inheritable(&self) -> bool {
        self.ace_flags.container_inherit() || self.ace_flags.object_inherit()
    }
}

/// The type-specific payload of an ACE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AceValue {
    AccessAllowed(AccessAce),
    AccessDenied(AccessAce),
    SystemAudit(AccessAce),
    SystemAlarm(AccessAce),
    AccessAllowedObject(ObjectAce),
    AccessDeniedObject(ObjectAce),
    SystemAuditObject(ObjectAce),
    SystemAlarmObject(ObjectAce),
}

impl AceValue {
    pub fn get_type(&self) -> AceType {
        match self {
            AceValue::AccessAllowed(_) => AceType::AccessAllowed,
            AceValue::AccessDenied(_) => AceType::AccessDenied,
            AceValue::SystemAudit(_) => AceType::SystemAudit,
            AceValue::SystemAlarm(_) => AceType::SystemAlarm,
            AceValue::AccessAllowedObject(_) => AceType::AccessAllowedObject,
            AceValue::AccessDeniedObject(_) => AceType::AccessDeniedObject,
            AceValue::SystemAuditObject(_) => AceType::SystemAuditObject,
            AceValue::SystemAlarmObject(_) => AceType::SystemAlarmObject,
        }
    }
}

/// Payload of a plain (non-object) ACE - [MS-DTYP 2.4.4.2](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/72e7c7ea-bc02-4c74-a619-818a16bf6adb>).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessAce {
    pub access_mask: AccessMask,
    pub sid: SID,
}

/// Payload of an object ACE - [MS-DTYP 2.4.4.3](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/c79a383c-2b3f-4655-abe7-dcbb7ce0cfbe>).
///
/// `object_type` restricts the entry to a specific attribute, attribute
/// set, class or control access right. `inherited_object_type` restricts
/// which child classes inherit the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAce {
    pub access_mask: AccessMask,
    pub object_type: Option<Guid>,
    pub inherited_object_type: Option<Guid>,
    pub sid: SID,
}

/// ACE type discriminants - [MS-DTYP 2.4.4.1](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/628ebb1d-c509-4ea0-a10f-77ef97ca4586>).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AceType {
    AccessAllowed = 0,
    AccessDenied = 1,
    SystemAudit = 2,
    SystemAlarm = 3,
    AccessAllowedObject = 5,
    AccessDeniedObject = 6,
    SystemAuditObject = 7,
    SystemAlarmObject = 8,
}

impl AceType {
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            AceType::AccessAllowedObject
                | AceType::AccessDeniedObject
                | AceType::SystemAuditObject
                | AceType::SystemAlarmObject
        )
    }
}

/// ACE header flags - [MS-DTYP 2.4.4.1](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/628ebb1d-c509-4ea0-a10f-77ef97ca4586>).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AceFlags {
    pub object_inherit: bool,
    pub container_inherit: bool,
    pub no_propagate_inherit: bool,
    pub inherit_only: bool,

    pub inherited: bool,
    #[skip]
    __: bool,
    pub successful_access: bool,
    pub failed_access: bool,
}
