use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, VersionControl};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Field separator for log formats; never appears in a subject line
const FIELD_SEP: char = '\u{1f}';

/// Git backend running the system `git` binary.
///
/// Using the binary means the user's SSH keys, credential helpers and hooks all
/// apply exactly as they would on the command line.
pub struct SystemGit {
    dir: PathBuf,
}

impl SystemGit {
    /// Operate on the repository containing `path`.
    ///
    /// Commands run with `path` as working directory, so paths passed to
    /// [VersionControl::add] are relative to it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let git = SystemGit {
            dir: path.as_ref().to_path_buf(),
        };
        git.run(["rev-parse", "--is-inside-work-tree"])?;
        Ok(git)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run git with `args`, returning stdout. Non-zero exit is an error.
    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        tracing::debug!(command = %command, "Running");

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.dir)
            .output()
            .map_err(|e| ReleaseError::ExternalTool {
                command: command.clone(),
                code: None,
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ReleaseError::ExternalTool {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_log_line(line: &str) -> Option<CommitInfo> {
    let mut fields = line.splitn(3, FIELD_SEP);
    let hash = fields.next()?;
    let short_hash = fields.next()?;
    let subject = fields.next()?;

    Some(CommitInfo {
        hash: hash.to_string(),
        short_hash: short_hash.to_string(),
        subject: subject.to_string(),
    })
}

impl VersionControl for SystemGit {
    fn checkout(&self, branch: &str) -> Result<()> {
        self.run(["checkout", branch]).map(drop)
    }

    fn create_branch(&self, branch: &str) -> Result<()> {
        self.run(["checkout", "-b", branch]).map(drop)
    }

    fn find_commits_matching(&self, text: &str) -> Result<Vec<String>> {
        let grep = format!("--grep={}", text);
        let stdout = self.run([
            "log",
            "--fixed-strings",
            grep.as_str(),
            "--pretty=format:%H",
        ])?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn commits_since(&self, revision: &str) -> Result<Vec<CommitInfo>> {
        let range = format!("{}..HEAD", revision);
        let stdout = self.run([
            "log",
            range.as_str(),
            "--pretty=format:%H%x1f%h%x1f%s",
        ])?;

        Ok(stdout.lines().filter_map(parse_log_line).collect())
    }

    fn add(&self, paths: &[&Path]) -> Result<()> {
        let mut args: Vec<OsString> = vec!["add".into(), "--".into()];
        args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
        self.run(args).map(drop)
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run(["commit", "-m", message]).map(drop)
    }

    fn pull(&self) -> Result<()> {
        self.run(["pull"]).map(drop)
    }

    fn merge_no_ff(&self, branch: &str, message: &str) -> Result<()> {
        self.run(["merge", "--no-ff", "--no-edit", "-m", message, branch])
            .map(drop)
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.run(["tag", "-a", name, "-m", message]).map(drop)
    }

    fn push(&self, remote: &str, branch: &str, include_tags: bool) -> Result<()> {
        let mut args = vec!["push", remote, branch];
        if include_tags {
            args.push("--tags");
        }
        self.run(args).map(drop)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run(["branch", "-d", branch]).map(drop)
    }
}
