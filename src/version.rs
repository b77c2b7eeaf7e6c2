//! Server version parsing and vendor classification.
//!
//! The version probe returns two strings: the numeric version
//! (e.g. `10.1.22-MariaDB-1~trusty`) and the build/comment string
//! (e.g. `mariadb.org binary distribution`). The numeric part is encoded as a
//! comparable integer; vendor flags come from the comment string only.

use serde::{Deserialize, Serialize};

/// A parsed server version. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    /// The raw version string as reported by the server.
    pub raw: String,
    /// `major * 10000 + minor * 100 + patch`, e.g. "5.6.35" -> 50635.
    pub version_int: u32,
    pub is_mariadb: bool,
    pub is_percona: bool,
}

impl ServerVersion {
    /// Parse a version string and its accompanying comment/build string.
    ///
    /// Never fails: malformed input yields a version of 0 with both vendor
    /// flags false (assume vanilla distribution).
    pub fn parse(version: &str, version_comment: &str) -> Self {
        let comment = version_comment.to_ascii_lowercase();
        Self {
            raw: version.to_string(),
            version_int: version_to_int(version),
            is_mariadb: comment.contains("mariadb"),
            is_percona: comment.contains("percona"),
        }
    }

    /// Major version component, e.g. 100122 -> 10.
    pub fn major(&self) -> u32 {
        self.version_int / 10000
    }

    /// Whether the server is at least the given encoded version.
    pub fn at_least(&self, version_int: u32) -> bool {
        self.version_int >= version_int
    }
}

/// Encode a dotted version string as a comparable integer.
///
/// Each dot-separated component contributes its leading digit run; missing
/// components default to 0. `"5.0.5"` -> 50005, `"10.1.22-MariaDB-"` -> 100122,
/// unparseable input -> 0.
pub fn version_to_int(version: &str) -> u32 {
    let mut parts = version.split('.');
    let major = leading_number(parts.next().unwrap_or(""));
    let minor = leading_number(parts.next().unwrap_or(""));
    let patch = leading_number(parts.next().unwrap_or(""));
    major * 10000 + minor * 100 + patch
}

fn leading_number(component: &str) -> u32 {
    let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
