use crate::error::{ReleaseError, Result};

use super::Version;

pub const VERSION_PLACEHOLDER: &str = "{version}";
pub const BRANCH_PLACEHOLDER: &str = "{branch}";

/// Message/name template with a single placeholder
/// (e.g., "Release version: {version}", "Merge branch '{branch}'")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePattern {
    pub pattern: String,
}

impl MessagePattern {
    /// Create a new pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        MessagePattern {
            pattern: pattern.into(),
        }
    }

    /// Check that the pattern carries the given placeholder
    pub fn require(&self, placeholder: &str) -> Result<()> {
        if self.pattern.contains(placeholder) {
            Ok(())
        } else {
            Err(ReleaseError::config(format!(
                "Pattern '{}' must contain {} placeholder",
                self.pattern, placeholder
            )))
        }
    }

    /// Example: pattern="Release version: {version}", version=1.2.3 -> "Release version: 1.2.3"
    pub fn for_version(&self, version: &Version) -> String {
        self.pattern
            .replace(VERSION_PLACEHOLDER, &version.to_string())
    }

    /// Example: pattern="Merge branch '{branch}'", branch="release-1.2.3"
    /// -> "Merge branch 'release-1.2.3'"
    pub fn for_branch(&self, branch: &str) -> String {
        self.pattern.replace(BRANCH_PLACEHOLDER, branch)
    }

    /// Text before the first placeholder, the part every rendered message shares
    ///
    /// Example: "Merge release '{branch}'" -> "Merge release '"
    pub fn fixed_prefix(&self) -> &str {
        self.pattern
            .find('{')
            .map_or(self.pattern.as_str(), |end| &self.pattern[..end])
    }
}

/// The tag created for a release is the bare version string
pub fn release_tag(version: &Version) -> String {
    version.to_string()
}
