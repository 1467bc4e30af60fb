//! Version-control abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations a
//! release needs, so the release sequence can run against a real repository
//! or against a scripted in-memory fake.
//!
//! # Overview
//!
//! The primary abstraction is the [VersionControl] trait. The concrete
//! implementations are:
//!
//! - [system::SystemGit]: runs the `git` binary in the project root
//! - [mock::MockRepository]: an in-memory repository that records every call
//!
//! # Usage
//!
//! Release code depends on the [VersionControl] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use git_release_flow::git::VersionControl;
//! # fn example<V: VersionControl>(vcs: &V) -> git_release_flow::Result<()> {
//! vcs.checkout("develop")?;
//! vcs.create_branch("release-1.0.1")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod system;

pub use mock::{GitCall, GitOp, MockRepository};
pub use system::SystemGit;

use crate::error::Result;
use std::path::Path;

/// Commit information returned by log queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The abbreviated commit hash
    pub short_hash: String,
    /// First line of the commit message
    pub subject: String,
}

/// Logical git operations used by a release.
///
/// Every method blocks until the operation completes. Any failure reported by
/// the underlying tool is returned as
/// [ReleaseError::ExternalTool](crate::error::ReleaseError::ExternalTool) and
/// callers stop at the first one; nothing is rolled back.
///
/// ## Implementations
///
/// - [SystemGit](system::SystemGit): real `git` process invocation
/// - [MockRepository](mock::MockRepository): test double with scripted failures
pub trait VersionControl: Send + Sync {
    /// Switch the working tree to an existing branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create `branch` from the current HEAD and switch to it
    fn create_branch(&self, branch: &str) -> Result<()>;

    /// Full hashes of commits reachable from HEAD whose message contains
    /// `text` (fixed string, not a pattern), newest first
    fn find_commits_matching(&self, text: &str) -> Result<Vec<String>>;

    /// Commits in the half-open range `(revision, HEAD]`, newest first
    fn commits_since(&self, revision: &str) -> Result<Vec<CommitInfo>>;

    /// Stage the given paths, relative to the repository root
    fn add(&self, paths: &[&Path]) -> Result<()>;

    /// Commit the staged changes
    fn commit(&self, message: &str) -> Result<()>;

    /// Pull the current branch from its upstream
    fn pull(&self) -> Result<()>;

    /// Merge `branch` into the current branch, always creating a merge commit
    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<()>;

    /// Create an annotated tag at HEAD
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push `branch` to `remote`, optionally together with all tags
    fn push(&self, remote: &str, branch: &str, include_tags: bool) -> Result<()>;

    /// Delete a local branch that has been merged
    fn delete_branch(&self, branch: &str) -> Result<()>;
}
