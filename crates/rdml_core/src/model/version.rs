//! Supported RDML format versions.
//!
//! # Invariants
//! - Only versions with a matching structural contract are listed.
//! - `FormatVersion::latest()` is the version written by `RdmlDocument::new()`.

use std::fmt::{Display, Formatter};

/// RDML `version` attribute value accepted at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatVersion {
    V1_0,
    V1_1,
    V1_2,
}

impl FormatVersion {
    /// All supported versions, oldest first.
    pub const ALL: [FormatVersion; 3] = [Self::V1_0, Self::V1_1, Self::V1_2];

    /// Returns the newest supported version.
    pub fn latest() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    /// Parses an attribute value such as `1.2`; the match is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1.0" => Some(Self::V1_0),
            "1.1" => Some(Self::V1_1),
            "1.2" => Some(Self::V1_2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
        }
    }
}

impl Display for FormatVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::FormatVersion;

    #[test]
    fn parse_accepts_supported_versions_only() {
        assert_eq!(FormatVersion::parse("1.0"), Some(FormatVersion::V1_0));
        assert_eq!(FormatVersion::parse(" 1.2 "), None);
        assert_eq!(FormatVersion::parse("1.3"), None);
        assert_eq!(FormatVersion::parse(""), None);
    }

    #[test]
    fn latest_is_1_2() {
        assert_eq!(FormatVersion::latest().as_str(), "1.2");
    }
}
