//! Release workflow orchestration
//!
//! This module holds the two actions the binary exposes: cutting a release from
//! the integration branch, and exporting the container dependency manifest.
//! Both take their inputs explicitly so they can run without clap and against
//! any [VersionControl] implementation.

use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::changelog;
use crate::config::ReleaseConfig;
use crate::domain::{release_tag, CommitLine, ReleaseBranch, Version};
use crate::error::Result;
use crate::git::VersionControl;
use crate::history::CommitHistorian;
use crate::manifest::{self, DockerManifest};

/// Arguments for the release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Project root; configured file paths are relative to it
    pub project_root: PathBuf,

    /// Date written into the changelog section
    pub release_date: NaiveDate,

    /// Preview mode - read only, nothing is written, committed or pushed
    pub dry_run: bool,
}

/// Result of a successful release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub previous_version: Version,

    pub version: Version,

    /// The transient release branch (already deleted unless dry run)
    pub branch: String,

    /// The tag that was created
    pub tag: String,

    /// Changelog lines in the new section
    pub changelog: Vec<CommitLine>,

    pub dry_run: bool,
}

/// Steps of a release, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStep {
    ReadVersion,
    CreateReleaseBranch,
    UpdateVersionArtifacts,
    CommitChanges,
    MergeToStable,
    TagRelease,
    PushStable,
    MergeToIntegration,
    CleanupBranch,
}

impl ReleaseStep {
    pub const ALL: [ReleaseStep; 9] = [
        ReleaseStep::ReadVersion,
        ReleaseStep::CreateReleaseBranch,
        ReleaseStep::UpdateVersionArtifacts,
        ReleaseStep::CommitChanges,
        ReleaseStep::MergeToStable,
        ReleaseStep::TagRelease,
        ReleaseStep::PushStable,
        ReleaseStep::MergeToIntegration,
        ReleaseStep::CleanupBranch,
    ];

    /// 1-based position in the release sequence
    pub fn number(self) -> usize {
        ReleaseStep::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }
}

impl fmt::Display for ReleaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseStep::ReadVersion => "Get version",
            ReleaseStep::CreateReleaseBranch => "Create release branch",
            ReleaseStep::UpdateVersionArtifacts => "Update version artifacts",
            ReleaseStep::CommitChanges => "Commit changes",
            ReleaseStep::MergeToStable => "Merge into stable branch",
            ReleaseStep::TagRelease => "Tag release",
            ReleaseStep::PushStable => "Push stable branch",
            ReleaseStep::MergeToIntegration => "Merge into integration branch",
            ReleaseStep::CleanupBranch => "Delete release branch",
        };
        f.write_str(name)
    }
}

fn enter(step: ReleaseStep) {
    tracing::info!("Step {}/{}: {}", step.number(), ReleaseStep::ALL.len(), step);
}

/// Main release workflow
///
/// Orchestrates the whole release:
/// 1. Read the manifest version and bump its patch component
/// 2. Create the release branch from the integration branch
/// 3. Write the new version and prepend the changelog section
/// 4. Commit manifest and changelog
/// 5. Merge the release branch into the stable branch
/// 6. Tag the release
/// 7. Push the stable branch with tags
/// 8. Merge the release branch back into the integration branch and push it
/// 9. Delete the release branch
///
/// Stops at the first failing step. Nothing already done is undone.
pub fn run_release_workflow<V: VersionControl>(
    vcs: &V,
    config: &ReleaseConfig,
    args: &ReleaseWorkflowArgs,
) -> Result<ReleaseOutcome> {
    let manifest_path = args.project_root.join(&config.files.manifest);
    let changelog_path = args.project_root.join(&config.files.changelog);
    let release_pattern = config.release_message_pattern();
    let stable = config.branches.stable.as_str();
    let integration = config.branches.integration.as_str();
    let remote = config.remote.name.as_str();

    enter(ReleaseStep::ReadVersion);
    let previous_version = manifest::read_version(&manifest_path)?;
    let version = previous_version.next_patch()?;
    let branch = ReleaseBranch::new(&config.release_branch_pattern(), &version);
    let tag = release_tag(&version);
    let release_message = release_pattern.for_version(&version);
    let merge_message = config.merge_message_pattern().for_branch(&branch.name);
    tracing::info!("Releasing {} -> {}", previous_version, version);

    let historian =
        CommitHistorian::new(vcs).with_merge_pattern(&config.merge_message_pattern());
    let marker = release_pattern.for_version(&previous_version);

    if args.dry_run {
        let last_release = historian.find_last_release_commit(&marker)?;
        let changelog = historian.collect_messages_since(&last_release)?;
        tracing::info!(
            "Dry run: would create branch '{}' from '{}', merge it into '{}' and '{}', tag '{}' and push to '{}'",
            branch.name,
            integration,
            stable,
            integration,
            tag,
            remote
        );
        tracing::info!(
            "Dry run: changelog section\n{}",
            changelog::release_section(&version, args.release_date, &changelog)
        );
        return Ok(ReleaseOutcome {
            previous_version,
            version,
            branch: branch.name,
            tag,
            changelog,
            dry_run: true,
        });
    }

    enter(ReleaseStep::CreateReleaseBranch);
    vcs.checkout(integration)?;
    vcs.create_branch(&branch.name)?;

    enter(ReleaseStep::UpdateVersionArtifacts);
    manifest::write_version(&manifest_path, &version)?;
    let last_release = historian.find_last_release_commit(&marker)?;
    let changelog = historian.collect_messages_since(&last_release)?;
    changelog::prepend_release_section(&changelog_path, &version, args.release_date, &changelog)?;

    enter(ReleaseStep::CommitChanges);
    vcs.add(&[
        config.files.manifest.as_path(),
        config.files.changelog.as_path(),
    ])?;
    vcs.commit(&release_message)?;

    enter(ReleaseStep::MergeToStable);
    vcs.checkout(stable)?;
    vcs.pull()?;
    vcs.merge_no_ff(&branch.name, &merge_message)?;

    enter(ReleaseStep::TagRelease);
    vcs.create_annotated_tag(&tag, &release_message)?;

    enter(ReleaseStep::PushStable);
    vcs.push(remote, stable, true)?;

    enter(ReleaseStep::MergeToIntegration);
    vcs.checkout(integration)?;
    vcs.merge_no_ff(&branch.name, &merge_message)?;
    vcs.push(remote, integration, false)?;

    enter(ReleaseStep::CleanupBranch);
    vcs.delete_branch(&branch.name)?;

    tracing::info!("Released: {}", version);
    Ok(ReleaseOutcome {
        previous_version,
        version,
        branch: branch.name,
        tag,
        changelog,
        dry_run: false,
    })
}

/// Write the container-build dependency manifest next to the project manifest.
pub fn run_docker_export(config: &ReleaseConfig, project_root: &Path) -> Result<DockerManifest> {
    tracing::info!("Generate package dependencies for Docker");
    let source = project_root.join(&config.files.manifest);
    let dest = project_root.join(&config.files.docker_manifest);

    let subset = manifest::export_docker_subset(&source, &dest)?;
    tracing::info!("Wrote {}", dest.display());
    Ok(subset)
}
