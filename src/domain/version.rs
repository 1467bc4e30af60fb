use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a manifest version string (e.g., "1.2.3" -> Version(1,2,3))
    ///
    /// Exactly three dot-separated non-negative integers are accepted. No
    /// prefix or pre-release suffix is tolerated.
    pub fn parse(version: &str) -> Result<Self> {
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseError::version(format!(
                "Invalid version format: '{}' - expected MAJOR.MINOR.PATCH",
                version
            )));
        }

        let component = |name: &str, part: &str| {
            part.parse::<u64>().map_err(|_| {
                ReleaseError::version(format!(
                    "Invalid {} version '{}' in '{}'",
                    name, part, version
                ))
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// Next patch release: major and minor are kept, patch is incremented
    ///
    /// # Returns
    /// * `Err(VersionFormat)` - If the patch component is already `u64::MAX`
    pub fn next_patch(&self) -> Result<Self> {
        let patch = self.patch.checked_add(1).ok_or_else(|| {
            ReleaseError::version(format!("Cannot bump patch of '{}': out of range", self))
        })?;

        Ok(Version {
            major: self.major,
            minor: self.minor,
            patch,
        })
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
