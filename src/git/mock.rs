use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, VersionControl};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Kind of a recorded git call, used to script failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GitOp {
    Checkout,
    CreateBranch,
    FindCommits,
    CommitsSince,
    Add,
    Commit,
    Pull,
    Merge,
    Tag,
    Push,
    DeleteBranch,
}

/// A git call as received by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Checkout(String),
    CreateBranch(String),
    FindCommits(String),
    CommitsSince(String),
    Add(Vec<String>),
    Commit(String),
    Pull,
    Merge { branch: String, message: String },
    Tag { name: String, message: String },
    Push {
        remote: String,
        branch: String,
        tags: bool,
    },
    DeleteBranch(String),
}

impl GitCall {
    pub fn op(&self) -> GitOp {
        match self {
            GitCall::Checkout(_) => GitOp::Checkout,
            GitCall::CreateBranch(_) => GitOp::CreateBranch,
            GitCall::FindCommits(_) => GitOp::FindCommits,
            GitCall::CommitsSince(_) => GitOp::CommitsSince,
            GitCall::Add(_) => GitOp::Add,
            GitCall::Commit(_) => GitOp::Commit,
            GitCall::Pull => GitOp::Pull,
            GitCall::Merge { .. } => GitOp::Merge,
            GitCall::Tag { .. } => GitOp::Tag,
            GitCall::Push { .. } => GitOp::Push,
            GitCall::DeleteBranch(_) => GitOp::DeleteBranch,
        }
    }

    /// True for calls that change repository or remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self.op(),
            GitOp::FindCommits | GitOp::CommitsSince
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    current: String,
    /// Linear history per branch, oldest first
    branches: BTreeMap<String, Vec<CommitInfo>>,
    /// Tag name -> (commit hash, annotation)
    tags: BTreeMap<String, (String, String)>,
    staged: Vec<String>,
    pushed: Vec<(String, String)>,
    pushed_tags: BTreeSet<String>,
    calls: Vec<GitCall>,
    failing: BTreeSet<GitOp>,
    next_id: u32,
}

impl MockState {
    fn head_history(&self) -> &[CommitInfo] {
        self.branches
            .get(&self.current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn new_commit(&mut self, subject: &str) -> CommitInfo {
        self.next_id += 1;
        let hash = format!(
            "{:08x}{:032x}",
            self.next_id.wrapping_mul(2_654_435_761),
            self.next_id
        );
        CommitInfo {
            short_hash: hash[..7].to_string(),
            hash,
            subject: subject.to_string(),
        }
    }
}

/// In-memory repository for testing without actual git operations.
///
/// Branches are modelled as linear histories; a merge appends the commits the
/// target branch is missing followed by a merge commit. Every call is
/// recorded, and any operation kind can be scripted to fail.
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a repository with a single empty branch checked out
    pub fn new(initial_branch: &str) -> Self {
        let mut state = MockState {
            current: initial_branch.to_string(),
            ..MockState::default()
        };
        state.branches.insert(initial_branch.to_string(), Vec::new());

        MockRepository {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // Poisoned only after an assertion already failed.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a commit to `branch`, creating the branch if needed. Returns its full hash.
    pub fn add_commit(&self, branch: &str, subject: &str) -> String {
        let mut state = self.lock();
        let commit = state.new_commit(subject);
        let hash = commit.hash.clone();
        state
            .branches
            .entry(branch.to_string())
            .or_default()
            .push(commit);
        hash
    }

    /// Create `branch` as a copy of `from`
    pub fn fork_branch(&self, from: &str, branch: &str) {
        let mut state = self.lock();
        let history = state.branches.get(from).cloned().unwrap_or_default();
        state.branches.insert(branch.to_string(), history);
    }

    /// Make every future call of kind `op` fail
    pub fn fail_on(&self, op: GitOp) {
        self.lock().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.lock().calls.clone()
    }

    pub fn current_branch(&self) -> String {
        self.lock().current.clone()
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.lock().branches.contains_key(branch)
    }

    pub fn history(&self, branch: &str) -> Vec<CommitInfo> {
        self.lock().branches.get(branch).cloned().unwrap_or_default()
    }

    /// Annotation of `tag`, if it exists
    pub fn tag_message(&self, tag: &str) -> Option<String> {
        self.lock().tags.get(tag).map(|(_, message)| message.clone())
    }

    /// Commit hash `tag` points to, if it exists
    pub fn tag_target(&self, tag: &str) -> Option<String> {
        self.lock().tags.get(tag).map(|(hash, _)| hash.clone())
    }

    /// Branches pushed so far, as (remote, branch)
    pub fn pushed(&self) -> Vec<(String, String)> {
        self.lock().pushed.clone()
    }

    pub fn tag_pushed(&self, tag: &str) -> bool {
        self.lock().pushed_tags.contains(tag)
    }

    /// Record `call` and return the locked state, or the scripted failure
    fn record(&self, call: GitCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        let op = call.op();
        let command = format!("{:?}", call);
        state.calls.push(call);

        if state.failing.contains(&op) {
            return Err(mock_failure(command, "scripted failure"));
        }
        Ok(state)
    }
}

fn mock_failure(command: String, stderr: impl Into<String>) -> ReleaseError {
    ReleaseError::ExternalTool {
        command,
        code: Some(1),
        stderr: stderr.into(),
    }
}

impl VersionControl for MockRepository {
    fn checkout(&self, branch: &str) -> Result<()> {
        let mut state = self.record(GitCall::Checkout(branch.to_string()))?;
        if !state.branches.contains_key(branch) {
            return Err(mock_failure(
                format!("checkout {}", branch),
                format!("pathspec '{}' did not match any known branch", branch),
            ));
        }
        state.current = branch.to_string();
        Ok(())
    }

    fn create_branch(&self, branch: &str) -> Result<()> {
        let mut state = self.record(GitCall::CreateBranch(branch.to_string()))?;
        if state.branches.contains_key(branch) {
            return Err(mock_failure(
                format!("checkout -b {}", branch),
                format!("a branch named '{}' already exists", branch),
            ));
        }
        let history = state.head_history().to_vec();
        state.branches.insert(branch.to_string(), history);
        state.current = branch.to_string();
        Ok(())
    }

    fn find_commits_matching(&self, text: &str) -> Result<Vec<String>> {
        let state = self.record(GitCall::FindCommits(text.to_string()))?;
        Ok(state
            .head_history()
            .iter()
            .rev()
            .filter(|c| c.subject.contains(text))
            .map(|c| c.hash.clone())
            .collect())
    }

    fn commits_since(&self, revision: &str) -> Result<Vec<CommitInfo>> {
        let state = self.record(GitCall::CommitsSince(revision.to_string()))?;
        let history = state.head_history();
        let start = history
            .iter()
            .position(|c| c.hash == revision)
            .ok_or_else(|| {
                mock_failure(
                    format!("log {}..HEAD", revision),
                    format!("bad revision '{}'", revision),
                )
            })?;

        Ok(history[start + 1..].iter().rev().cloned().collect())
    }

    fn add(&self, paths: &[&Path]) -> Result<()> {
        let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let mut state = self.record(GitCall::Add(names.clone()))?;
        state.staged.extend(names);
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut state = self.record(GitCall::Commit(message.to_string()))?;
        if state.staged.is_empty() {
            return Err(mock_failure(
                format!("commit -m {}", message),
                "nothing added to commit",
            ));
        }
        state.staged.clear();

        let commit = state.new_commit(message);
        let current = state.current.clone();
        state.branches.entry(current).or_default().push(commit);
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        self.record(GitCall::Pull).map(drop)
    }

    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<()> {
        let mut state = self.record(GitCall::Merge {
            branch: branch.to_string(),
            message: message.to_string(),
        })?;
        let incoming = state.branches.get(branch).cloned().ok_or_else(|| {
            mock_failure(
                format!("merge {}", branch),
                format!("'{}' - not something we can merge", branch),
            )
        })?;

        let merge_commit = state.new_commit(message);
        let current = state.current.clone();
        let target = state.branches.entry(current).or_default();
        let missing: Vec<CommitInfo> = incoming
            .into_iter()
            .filter(|c| !target.iter().any(|t| t.hash == c.hash))
            .collect();
        target.extend(missing);
        target.push(merge_commit);
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = self.record(GitCall::Tag {
            name: name.to_string(),
            message: message.to_string(),
        })?;
        if state.tags.contains_key(name) {
            return Err(mock_failure(
                format!("tag -a {}", name),
                format!("tag '{}' already exists", name),
            ));
        }
        let head = state
            .head_history()
            .last()
            .map(|c| c.hash.clone())
            .unwrap_or_default();
        state
            .tags
            .insert(name.to_string(), (head, message.to_string()));
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, include_tags: bool) -> Result<()> {
        let mut state = self.record(GitCall::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
            tags: include_tags,
        })?;
        state.pushed.push((remote.to_string(), branch.to_string()));
        if include_tags {
            let tags: Vec<String> = state.tags.keys().cloned().collect();
            state.pushed_tags.extend(tags);
        }
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        let mut state = self.record(GitCall::DeleteBranch(branch.to_string()))?;
        if state.current == branch {
            return Err(mock_failure(
                format!("branch -d {}", branch),
                format!("cannot delete branch '{}' checked out", branch),
            ));
        }
        if state.branches.remove(branch).is_none() {
            return Err(mock_failure(
                format!("branch -d {}", branch),
                format!("branch '{}' not found", branch),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_basic() {
        let repo = MockRepository::new("develop");
        let hash = repo.add_commit("develop", "test commit");

        assert_eq!(repo.current_branch(), "develop");
        assert_eq!(repo.history("develop").len(), 1);
        assert_eq!(repo.history("develop")[0].hash, hash);
        assert_eq!(repo.history("develop")[0].short_hash, &hash[..7]);
    }

    #[test]
    fn test_mock_hashes_are_distinct() {
        let repo = MockRepository::new("develop");
        let a = repo.add_commit("develop", "a");
        let b = repo.add_commit("develop", "b");
        assert_ne!(a[..7], b[..7]);
    }

    #[test]
    fn test_mock_find_commits_newest_first() {
        let repo = MockRepository::new("develop");
        let old = repo.add_commit("develop", "Release version: 1.0.0");
        repo.add_commit("develop", "unrelated");
        let new = repo.add_commit("develop", "Release version: 1.0.0 (again)");

        let found = repo.find_commits_matching("Release version: 1.0.0").unwrap();
        assert_eq!(found, vec![new, old]);
    }

    #[test]
    fn test_mock_commits_since() {
        let repo = MockRepository::new("develop");
        let base = repo.add_commit("develop", "base");
        repo.add_commit("develop", "first");
        repo.add_commit("develop", "second");

        let subjects: Vec<String> = repo
            .commits_since(&base)
            .unwrap()
            .into_iter()
            .map(|c| c.subject)
            .collect();
        assert_eq!(subjects, vec!["second", "first"]);
        assert!(repo.commits_since("unknown").is_err());
    }

    #[test]
    fn test_mock_branch_lifecycle() {
        let repo = MockRepository::new("develop");
        repo.add_commit("develop", "base");
        repo.fork_branch("develop", "master");

        repo.create_branch("release-1.0.1").unwrap();
        assert!(repo.create_branch("release-1.0.1").is_err());
        repo.add(&[Path::new("package.json")]).unwrap();
        repo.commit("Release version: 1.0.1").unwrap();

        repo.checkout("master").unwrap();
        repo.merge_no_ff("release-1.0.1", "Merge branch 'release-1.0.1'")
            .unwrap();
        let subjects: Vec<String> = repo
            .history("master")
            .into_iter()
            .map(|c| c.subject)
            .collect();
        assert_eq!(
            subjects,
            vec![
                "base",
                "Release version: 1.0.1",
                "Merge branch 'release-1.0.1'"
            ]
        );

        repo.delete_branch("release-1.0.1").unwrap();
        assert!(!repo.has_branch("release-1.0.1"));
        assert!(repo.delete_branch("master").is_err());
    }

    #[test]
    fn test_mock_commit_requires_staged_files() {
        let repo = MockRepository::new("develop");
        assert!(repo.commit("empty").is_err());
    }

    #[test]
    fn test_mock_tags_and_push() {
        let repo = MockRepository::new("master");
        let head = repo.add_commit("master", "base");

        repo.create_annotated_tag("1.0.0", "Release version: 1.0.0")
            .unwrap();
        assert!(repo.create_annotated_tag("1.0.0", "again").is_err());
        assert_eq!(
            repo.tag_message("1.0.0").as_deref(),
            Some("Release version: 1.0.0")
        );
        assert_eq!(repo.tag_target("1.0.0"), Some(head));
        assert!(!repo.tag_pushed("1.0.0"));

        repo.push("origin", "master", true).unwrap();
        assert!(repo.tag_pushed("1.0.0"));
        assert_eq!(
            repo.pushed(),
            vec![("origin".to_string(), "master".to_string())]
        );
    }

    #[test]
    fn test_mock_scripted_failure_is_recorded() {
        let repo = MockRepository::new("develop");
        repo.fail_on(GitOp::Pull);

        let err = repo.pull().unwrap_err();
        assert!(matches!(err, ReleaseError::ExternalTool { .. }));
        assert_eq!(repo.calls(), vec![GitCall::Pull]);
    }

    #[test]
    fn test_mock_checkout_unknown_branch() {
        let repo = MockRepository::new("develop");
        assert!(repo.checkout("master").is_err());
        assert_eq!(repo.current_branch(), "develop");
    }
}
