use std::fmt;

/// Subjects containing this text are merge noise and never reach the changelog
pub const MERGE_SUBJECT_MARKER: &str = "Merge branch";

/// One changelog entry, rendered as `- <subject> (<short-hash>)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CommitLine(String);

impl CommitLine {
    pub fn new(subject: &str, short_hash: &str) -> Self {
        CommitLine(format!("- {} ({})", subject, short_hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_merge(&self) -> bool {
        self.mentions(MERGE_SUBJECT_MARKER)
    }

    /// Whether the rendered line contains `text`; empty text never matches
    pub fn mentions(&self, text: &str) -> bool {
        !text.is_empty() && self.0.contains(text)
    }
}

impl fmt::Display for CommitLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitLine {
    fn from(line: &str) -> Self {
        CommitLine(line.to_string())
    }
}

/// Drops merge lines and sorts the rest lexicographically.
///
/// Besides git's own `Merge branch` subjects, lines containing `release_merge`
/// (the fixed part of the configured merge message) are dropped too.
/// Sorting makes the changelog independent of the order branches were merged in.
pub fn filter_and_sort(
    lines: impl IntoIterator<Item = CommitLine>,
    release_merge: Option<&str>,
) -> Vec<CommitLine> {
    let mut kept: Vec<CommitLine> = lines
        .into_iter()
        .filter(|l| !l.is_merge() && !release_merge.is_some_and(|m| l.mentions(m)))
        .collect();
    kept.sort();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_line_format() {
        let line = CommitLine::new("Add login", "a1b2c3d");
        assert_eq!(line.as_str(), "- Add login (a1b2c3d)");
        assert_eq!(line.to_string(), "- Add login (a1b2c3d)");
    }

    #[test]
    fn test_filter_and_sort() {
        let lines = vec![
            CommitLine::from("- Add X (a1)"),
            CommitLine::from("- Merge branch 'foo' (b2)"),
            CommitLine::from("- Fix Y (c3)"),
        ];

        let result = filter_and_sort(lines, None);
        assert_eq!(
            result,
            vec![CommitLine::from("- Add X (a1)"), CommitLine::from("- Fix Y (c3)")]
        );
    }

    #[test]
    fn test_sort_is_lexicographic_not_chronological() {
        let newest_first = vec![
            CommitLine::new("fix: typo", "9f9f9f9"),
            CommitLine::new("docs: readme", "1111111"),
            CommitLine::new("Update deps", "5555555"),
        ];

        let result: Vec<String> = filter_and_sort(newest_first, None)
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(
            result,
            vec![
                "- Update deps (5555555)",
                "- docs: readme (1111111)",
                "- fix: typo (9f9f9f9)",
            ]
        );
    }

    #[test]
    fn test_merge_marker_anywhere_in_subject() {
        let lines = vec![
            CommitLine::new("Revert \"Merge branch 'x'\"", "aaaaaaa"),
            CommitLine::new("merge branch lowercase is kept", "bbbbbbb"),
        ];

        let result = filter_and_sort(lines, None);
        assert_eq!(result.len(), 1);
        assert!(result[0].as_str().starts_with("- merge branch"));
    }

    #[test]
    fn test_filter_drops_configured_release_merges() {
        let lines = vec![
            CommitLine::new("Add X", "daa66d1"),
            CommitLine::new("Merge release 'release-1.0.1'", "3c6ef36"),
        ];

        let result = filter_and_sort(lines, Some("Merge release '"));
        assert_eq!(result, vec![CommitLine::new("Add X", "daa66d1")]);
    }

    #[test]
    fn test_empty_release_merge_keeps_everything() {
        let lines = vec![CommitLine::new("Add X", "daa66d1")];
        assert_eq!(filter_and_sort(lines, Some("")).len(), 1);
    }

    #[test]
    fn test_filter_empty() {
        assert!(filter_and_sort(Vec::new(), None).is_empty());
    }
}
