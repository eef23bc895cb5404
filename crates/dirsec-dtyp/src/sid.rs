//! MS-DTYP 2.4.2: SID

use std::fmt;
use std::str::FromStr;

/// A security identifier.
///
/// Immutable after construction; equality is component-wise. The string
/// form is `S-1-<authority>-<sub1>-<sub2>-…`, as in
/// [MS-DTYP 2.4.2.1](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/c92a27b1-c772-4fa7-a432-15df5f1b66a1>).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SID {
    pub revision: u8,
    pub identifier_authority: u64,
    pub sub_authority: Vec<u32>,
}

impl SID {
    /// `S-1-1-0` -- the Everyone group.
    pub const S_EVERYONE: &'static str = "S-1-1-0";
    /// `S-1-5-18` -- the Local System principal.
    pub const S_SYSTEM: &'static str = "S-1-5-18";
    /// `S-1-5-11` -- Authenticated Users.
    pub const S_AUTHENTICATED_USERS: &'static str = "S-1-5-11";
    /// `S-1-5-32-544` -- the builtin Administrators alias.
    pub const S_BUILTIN_ADMINISTRATORS: &'static str = "S-1-5-32-544";

    /// Whether `self` is a prefix of `other` (strictly shorter, all
    /// components equal). Used for domain-membership tests: the domain SID
    /// is an ancestor of every SID issued within the domain.
    pub fn is_ancestor_of(&self, other: &SID) -> bool {
        self.revision == other.revision
            && self.identifier_authority == other.identifier_authority
            && self.sub_authority.len() < other.sub_authority.len()
            && other.sub_authority[..self.sub_authority.len()] == self.sub_authority[..]
    }

    /// The relative identifier: the final sub-authority, if any.
    pub fn rid(&self) -> Option<u32> {
        self.sub_authority.last().copied()
    }
}

impl fmt::Display for SID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision, self.identifier_authority)?;
        for sub in &self.sub_authority {
            write!(f, "-{}", sub)?;
        }
        Ok(())
    }
}

/// Error parsing a SID from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SID string: {0}")]
pub struct SidParseError(pub String);

impl FromStr for SID {
    type Err = SidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SidParseError(s.to_string());
        let mut parts = s.split('-');
        if parts.next() != Some("S") {
            return Err(bad());
        }
        let revision = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let identifier_authority = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let sub_authority = parts
            .map(|p| p.parse().map_err(|_| bad()))
            .collect::<Result<Vec<u32>, _>>()?;
        Ok(SID {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}
