use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::tag::{BRANCH_PLACEHOLDER, VERSION_PLACEHOLDER};
use crate::domain::MessagePattern;
use crate::error::{ReleaseError, Result};

/// Name of the project-local configuration file
pub const CONFIG_FILE_NAME: &str = "release-flow.toml";

/// Represents the complete configuration for git-release-flow.
///
/// Contains branch names, the push remote, project file locations and message templates.
/// Every section may be omitted and falls back to its defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub messages: MessagesConfig,
}

fn default_stable_branch() -> String {
    "master".to_string()
}

fn default_integration_branch() -> String {
    "develop".to_string()
}

fn default_release_branch() -> String {
    "release-{version}".to_string()
}

/// Long-lived branches and the transient release branch pattern.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    /// Branch holding released state
    #[serde(default = "default_stable_branch")]
    pub stable: String,

    /// Branch where ongoing work accumulates; releases are cut from here
    #[serde(default = "default_integration_branch")]
    pub integration: String,

    /// Pattern for the per-release branch, must contain `{version}`
    #[serde(default = "default_release_branch")]
    pub release: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            stable: default_stable_branch(),
            integration: default_integration_branch(),
            release: default_release_branch(),
        }
    }
}

fn default_remote_name() -> String {
    "origin".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_changelog() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_docker_manifest() -> PathBuf {
    PathBuf::from("package.docker.json")
}

/// Project files, relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_changelog")]
    pub changelog: PathBuf,

    #[serde(default = "default_docker_manifest")]
    pub docker_manifest: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            manifest: default_manifest(),
            changelog: default_changelog(),
            docker_manifest: default_docker_manifest(),
        }
    }
}

fn default_release_message() -> String {
    "Release version: {version}".to_string()
}

fn default_merge_message() -> String {
    "Merge branch '{branch}'".to_string()
}

/// Commit, merge and tag message templates.
///
/// The release message doubles as the marker used to find the previous
/// release commit, so changing it breaks the lookup for releases made
/// with the old template.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MessagesConfig {
    #[serde(default = "default_release_message")]
    pub release: String,

    #[serde(default = "default_merge_message")]
    pub merge: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        MessagesConfig {
            release: default_release_message(),
            merge: default_merge_message(),
        }
    }
}

impl ReleaseConfig {
    pub fn release_branch_pattern(&self) -> MessagePattern {
        MessagePattern::new(&self.branches.release)
    }

    pub fn release_message_pattern(&self) -> MessagePattern {
        MessagePattern::new(&self.messages.release)
    }

    pub fn merge_message_pattern(&self) -> MessagePattern {
        MessagePattern::new(&self.messages.merge)
    }

    /// Rejects templates that would produce the same name for every release.
    pub fn validate(&self) -> Result<()> {
        self.release_branch_pattern().require(VERSION_PLACEHOLDER)?;
        self.release_message_pattern().require(VERSION_PLACEHOLDER)?;
        self.merge_message_pattern().require(BRANCH_PLACEHOLDER)?;

        if self.branches.stable == self.branches.integration {
            return Err(ReleaseError::config(format!(
                "Stable and integration branches must differ (both are '{}')",
                self.branches.stable
            )));
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-flow.toml` in the project root
/// 3. `.release-flow.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(ReleaseConfig)` - Loaded (and validated) or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, project_root: &Path) -> Result<ReleaseConfig> {
    let local = project_root.join(CONFIG_FILE_NAME);

    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if local.exists() {
        local
    } else if let Some(user) = dirs::config_dir()
        .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
        .filter(|p| p.exists())
    {
        user
    } else {
        tracing::debug!("No configuration file found, using defaults");
        return Ok(ReleaseConfig::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let config: ReleaseConfig = toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse {}: {}", path.display(), e)))?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReleaseConfig::default();
        assert_eq!(config.branches.stable, "master");
        assert_eq!(config.branches.integration, "develop");
        assert_eq!(config.branches.release, "release-{version}");
        assert_eq!(config.remote.name, "origin");
        assert_eq!(config.files.manifest, PathBuf::from("package.json"));
        assert_eq!(config.files.changelog, PathBuf::from("CHANGELOG.md"));
        assert_eq!(
            config.files.docker_manifest,
            PathBuf::from("package.docker.json")
        );
        assert_eq!(config.messages.release, "Release version: {version}");
        assert_eq!(config.messages.merge, "Merge branch '{branch}'");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: ReleaseConfig = toml::from_str(
            r#"
[branches]
stable = "main"
"#,
        )
        .unwrap();
        assert_eq!(config.branches.stable, "main");
        assert_eq!(config.branches.integration, "develop");
        assert_eq!(config.remote, RemoteConfig::default());
    }

    #[test]
    fn test_validate_rejects_pattern_without_placeholder() {
        let mut config = ReleaseConfig::default();
        config.branches.release = "release".to_string();
        assert!(config.validate().is_err());

        let mut config = ReleaseConfig::default();
        config.messages.merge = "Merge release".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{branch}"));
    }

    #[test]
    fn test_validate_rejects_same_branches() {
        let mut config = ReleaseConfig::default();
        config.branches.integration = "master".to_string();
        assert!(config.validate().is_err());
    }
}
