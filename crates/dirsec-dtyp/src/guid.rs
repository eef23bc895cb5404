//! MS-DTYP 2.3.4: GUID

use std::fmt;
use std::str::FromStr;

/// A 128-bit object identifier.
///
/// Used to identify schema attributes, attribute sets, classes and control
/// access rights. Displayed and parsed in the canonical
/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const ZERO: Guid = Guid {
        data1: 0,
        data2: 0,
        data3: 0,
        data4: [0; 8],
    };

    /// Builds a GUID from its canonical string form, for use in constants.
    ///
    /// Panics on malformed input; only call with literal strings.
    pub const fn parse_const(s: &str) -> Guid {
        const fn hex(b: &[u8], start: usize, end: usize) -> u64 {
            let mut value = 0u64;
            let mut i = start;
            while i < end {
                let digit = match b[i] {
                    b'0'..=b'9' => b[i] - b'0',
                    b'a'..=b'f' => b[i] - b'a' + 10,
                    b'A'..=b'F' => b[i] - b'A' + 10,
                    _ => panic!("invalid hex digit in GUID literal"),
                };
                value = value * 16 + digit as u64;
                i += 1;
            }
            value
        }

        let b = s.as_bytes();
        if b.len() != 36 || b[8] != b'-' || b[13] != b'-' || b[18] != b'-' || b[23] != b'-' {
            panic!("invalid GUID literal");
        }
        let mut data4 = [0u8; 8];
        data4[0] = hex(b, 19, 21) as u8;
        data4[1] = hex(b, 21, 23) as u8;
        let mut i = 0;
        while i < 6 {
            data4[2 + i] = hex(b, 24 + i * 2, 26 + i * 2) as u8;
            i += 1;
        }
        Guid {
            data1: hex(b, 0, 8) as u32,
            data2: hex(b, 9, 13) as u16,
            data3: hex(b, 14, 18) as u16,
            data4,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7],
        )
    }
}

/// Error parsing a GUID from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid GUID string: {0}")]
pub struct GuidParseError(pub String);

impl FromStr for Guid {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GuidParseError(s.to_string());
        let b = s.as_bytes();
        if b.len() != 36 || b[8] != b'-' || b[13] != b'-' || b[18] != b'-' || b[23] != b'-' {
            return Err(bad());
        }
        // from_str_radix tolerates a leading sign, which is not hex.
        if b.iter().any(|&c| c != b'-' && !c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let part = |range: std::ops::Range<usize>| {
            u64::from_str_radix(&s[range], 16).map_err(|_| bad())
        };
        let mut data4 = [0u8; 8];
        data4[0] = part(19..21)? as u8;
        data4[1] = part(21..23)? as u8;
        for i in 0..6 {
            data4[2 + i] = part(24 + i * 2..26 + i * 2)? as u8;
        }
        Ok(Guid {
            data1: part(0..8)? as u32,
            data2: part(9..13)? as u16,
            data3: part(14..18)? as u16,
            data4,
        })
    }
}
