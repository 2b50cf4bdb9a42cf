use std::fmt;

use serde::Serialize;

/// First MediaWiki release answering revision queries with content slots.
pub const SLOT_REVISIONS_SINCE: MwVersion = MwVersion::new(1, 32, 0);

/// Server version detected from site info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MwVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl MwVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Pull the first `major[.minor[.patch]]` run out of free text.
    ///
    /// `"MediaWiki 1.35.0-wmf.3"` gives 1.35.0, `"MediaWiki 1.39"` gives 1.39.0.
    pub fn coerce(text: &str) -> Option<Self> {
        let start = text.find(|ch: char| ch.is_ascii_digit())?;
        let mut parts = text[start..]
            .split(|ch: char| !ch.is_ascii_digit() && ch != '.')
            .next()?
            .split('.')
            .take(3)
            .map_while(|part| part.parse::<u64>().ok());
        let major = parts.next()?;
        let minor = parts.next().unwrap_or(0);
        let patch = parts.next().unwrap_or(0);
        Some(Self::new(major, minor, patch))
    }

    pub fn supports_slot_revisions(&self) -> bool {
        *self >= SLOT_REVISIONS_SINCE
    }
}

impl fmt::Display for MwVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
