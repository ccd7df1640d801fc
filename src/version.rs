use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A recognized level format version.
///
/// The version fixes the size of the tile id space, which in turn sizes every
/// per-tile table in [`LevelInfo`](crate::info::LevelInfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum Version {
    /// The base format written by the 1.20 and 1.23 editors.
    #[default]
    Base = 0x202,
    /// The extended (TSF, 1.24) format.
    Extended = 0x203,
}

impl Version {
    /// Returns the raw value stored in the file header.
    #[inline]
    #[must_use]
    pub fn raw(self) -> u16 {
        self as u16
    }

    /// Returns the size of the tile id space for this version.
    #[inline]
    #[must_use]
    pub fn max_tiles(self) -> u16 {
        match self {
            Version::Base => 1024,
            Version::Extended => 4096,
        }
    }

    /// Returns whether this is the extended format.
    #[inline]
    #[must_use]
    pub fn is_extended(self) -> bool {
        self == Version::Extended
    }
}

impl TryFrom<u16> for Version {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x202 => Ok(Version::Base),
            0x203 => Ok(Version::Extended),
            v => Err(v),
        }
    }
}

impl From<Version> for u16 {
    fn from(version: Version) -> Self {
        version.raw()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Version::Base => write!(f, "1.23 (0x{:03X})", self.raw()),
            Version::Extended => write!(f, "TSF (0x{:03X})", self.raw()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn raw_values() {
        assert_eq!(Version::try_from(0x202), Ok(Version::Base));
        assert_eq!(Version::try_from(0x203), Ok(Version::Extended));
        assert_eq!(Version::try_from(0x204), Err(0x204));
        assert_eq!(Version::Base.max_tiles(), 1024);
        assert_eq!(Version::Extended.max_tiles(), 4096);
    }
}
