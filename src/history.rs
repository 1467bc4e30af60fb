use crate::domain::{filter_and_sort, CommitLine, MessagePattern};
use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;

/// Reads release history out of the commit log
pub struct CommitHistorian<'a, V: VersionControl> {
    vcs: &'a V,
    release_merge: Option<String>,
}

impl<'a, V: VersionControl> CommitHistorian<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        CommitHistorian {
            vcs,
            release_merge: None,
        }
    }

    /// Also leave out merge commits produced by earlier releases with `pattern`
    pub fn with_merge_pattern(mut self, pattern: &MessagePattern) -> Self {
        self.release_merge = Some(pattern.fixed_prefix().to_string());
        self
    }

    /// Full hash of the most recent commit whose message contains `marker`.
    ///
    /// # Returns
    /// * `Ok(String)` - The revision of the newest match
    /// * `Err(NoMatchingCommit)` - If no commit message contains the marker
    pub fn find_last_release_commit(&self, marker: &str) -> Result<String> {
        let revision = self
            .vcs
            .find_commits_matching(marker)?
            .into_iter()
            .next()
            .ok_or_else(|| ReleaseError::NoMatchingCommit {
                marker: marker.to_string(),
            })?;

        tracing::debug!(marker, revision = %revision, "Found last release commit");
        Ok(revision)
    }

    /// Changelog lines for every commit after `revision` up to HEAD,
    /// merge commits excluded, sorted lexicographically.
    pub fn collect_messages_since(&self, revision: &str) -> Result<Vec<CommitLine>> {
        let commits = self.vcs.commits_since(revision)?;
        let total = commits.len();

        let lines = filter_and_sort(
            commits
                .iter()
                .map(|c| CommitLine::new(&c.subject, &c.short_hash)),
            self.release_merge.as_deref(),
        );

        tracing::debug!(
            total,
            kept = lines.len(),
            "Collected commit messages since {}",
            revision
        );
        Ok(lines)
    }
}
