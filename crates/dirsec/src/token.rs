//! Caller security tokens.

use dirsec_dtyp::SID;

/// The identity a directory operation runs under: the primary SID plus
/// group and alias memberships, and the system-principal flag that
/// bypasses descriptor evaluation entirely.
///
/// Tokens are produced upstream by the credential-validation layer and are
/// read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken {
    /// The requester's own SID, followed by group/alias SIDs.
    pub sids: Vec<SID>,
    /// Set for the local system principal only. An explicit, auditable
    /// bypass of all access checks.
    pub is_system: bool,
}

impl SecurityToken {
    pub fn new(sids: Vec<SID>) -> SecurityToken {
        SecurityToken {
            sids,
            is_system: false,
        }
    }

    pub fn system() -> SecurityToken {
        SecurityToken {
            sids: Vec::new(),
            is_system: true,
        }
    }

    /// The requester's primary SID.
    pub fn user_sid(&self) -> Option<&SID> {
        self.sids.first()
    }

    /// Whether the given SID appears anywhere in the token.
    pub fn is_member_of(&self, sid: &SID) -> bool {
        self.sids.iter().any(|s| s == sid)
    }
}
