//! MS-DTYP 2.4.3: ACCESS_MASK
//!
//! The directory-object layout of the mask: the low byte holds the
//! object-specific directory rights, bits 16..=20 the standard rights, and
//! the top nibble the generic rights that higher layers map onto specific
//! bits before evaluation.

use modular_bitfield::prelude::*;

/// A 32-bit access mask for directory objects.
///
/// See [MS-ADTS 5.1.3.2](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-adts/990fb975-ab31-4bc1-8b75-5da132cd4584>)
/// for the object-specific bits.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMask {
    /// Create child objects under this object (0x00000001).
    pub create_child: bool,
    /// Delete child objects of this object (0x00000002).
    pub delete_child: bool,
    /// Enumerate this object's children (0x00000004).
    pub list_children: bool,
    /// Perform a validated write to an attribute (0x00000008).
    pub self_write: bool,
    /// Read attribute values (0x00000010).
    pub read_property: bool,
    /// Write attribute values (0x00000020).
    pub write_property: bool,
    /// Delete the whole subtree rooted at this object (0x00000040).
    pub delete_tree: bool,
    /// List this object itself when list_children is withheld (0x00000080).
    pub list_object: bool,

    /// Perform a control access right / extended operation (0x00000100).
    pub control_access: bool,
    #[skip]
    __: B7,

    /// Standard right: delete this object (0x00010000).
    pub delete: bool,
    /// Standard right: read the security descriptor (0x00020000).
    pub read_control: bool,
    /// Standard right: modify the DACL (0x00040000).
    pub write_dacl: bool,
    /// Standard right: change the owner (0x00080000).
    pub write_owner: bool,
    /// Standard right: synchronize (0x00100000).
    pub synchronize: bool,
    #[skip]
    __: B3,

    /// Read the SACL (0x01000000).
    pub system_security: bool,
    /// Request the maximum rights the descriptor allows (0x02000000).
    pub maximum_allowed: bool,
    #[skip]
    __: B2,
    /// Generic all (0x10000000).
    pub generic_all: bool,
    /// Generic execute (0x20000000).
    pub generic_execute: bool,
    /// Generic write (0x40000000).
    pub generic_write: bool,
    /// Generic read (0x80000000).
    pub generic_read: bool,
}

impl AccessMask {
    /// The raw mask value.
    pub fn bits(&self) -> u32 {
        u32::from_le_bytes(self.into_bytes())
    }

    /// Builds a mask from a raw value.
    pub fn from_bits(bits: u32) -> AccessMask {
        AccessMask::from_bytes(bits.to_le_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.bits() == 0
    }

    /// Whether every bit of `other` is present in `self`.
    pub fn contains(&self, other: AccessMask) -> bool {
        self.bits() & other.bits() == other.bits()
    }

    /// Whether any bit of `other` is present in `self`.
    pub fn overlaps(&self, other: AccessMask) -> bool {
        self.bits() & other.bits() != 0
    }

    /// The bits of `self` not present in `other`.
    pub fn difference(&self, other: AccessMask) -> AccessMask {
        AccessMask::from_bits(self.bits() & !other.bits())
    }
}

impl std::ops::BitOr for AccessMask {
    type Output = AccessMask;

    fn bitor(self, rhs: AccessMask) -> AccessMask {
        AccessMask::from_bits(self.bits() | rhs.bits())
    }
}

impl std::ops::BitOrAssign for AccessMask {
    fn bitor_assign(&mut self, rhs: AccessMask) {
        *self = *self | rhs;
    }
}

impl std::ops::BitAnd for AccessMask {
    type Output = AccessMask;

    fn bitand(self, rhs: AccessMask) -> AccessMask {
        AccessMask::from_bits(self.bits() & rhs.bits())
    }
}
