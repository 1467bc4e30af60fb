use super::{MessagePattern, Version};

/// The transient per-release branch (e.g., "release-1.2.3")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub name: String,
}

impl ReleaseBranch {
    /// Name the release branch for `version` using the configured pattern
    pub fn new(pattern: &MessagePattern, version: &Version) -> Self {
        ReleaseBranch {
            name: pattern.for_version(version),
        }
    }
}

impl AsRef<str> for ReleaseBranch {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_branch_name() {
        let branch = ReleaseBranch::new(
            &MessagePattern::new("release-{version}"),
            &Version::new(2, 3, 2),
        );
        assert_eq!(branch.name, "release-2.3.2");
    }

    #[test]
    fn test_custom_branch_pattern() {
        let branch = ReleaseBranch::new(
            &MessagePattern::new("release/v{version}"),
            &Version::new(0, 1, 0),
        );
        assert_eq!(branch.as_ref(), "release/v0.1.0");
    }
}
