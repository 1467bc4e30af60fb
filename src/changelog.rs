use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::{CommitLine, Version};
use crate::error::{ReleaseError, Result};

/// Render a release section: version heading, date sub-heading, one line per commit.
pub fn release_section(version: &Version, date: NaiveDate, messages: &[CommitLine]) -> String {
    let lines: Vec<&str> = messages.iter().map(CommitLine::as_str).collect();
    format!(
        "## {}\n###### {}\n{}",
        version,
        date.format("%Y-%m-%d"),
        lines.join("\n")
    )
}

/// Insert a new release section at the top of the changelog at `path`.
///
/// The previous content follows the new section after a blank line, byte for byte.
/// A missing changelog is treated as empty.
pub fn prepend_release_section(
    path: impl AsRef<Path>,
    version: &Version,
    date: NaiveDate,
    messages: &[CommitLine],
) -> Result<()> {
    let path = path.as_ref();
    let changelog_err = |source| ReleaseError::Changelog {
        path: path.to_path_buf(),
        source,
    };

    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Changelog not found, creating it");
            String::new()
        }
        Err(e) => return Err(changelog_err(e)),
    };

    let section = release_section(version, date, messages);
    fs::write(path, format!("{}\n\n{}", section, existing)).map_err(changelog_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_release_section_format() {
        let messages = vec![
            CommitLine::from("- Add X (a1)"),
            CommitLine::from("- Fix Y (c3)"),
        ];
        assert_eq!(
            release_section(&Version::new(1, 2, 3), date(), &messages),
            "## 1.2.3\n###### 2024-03-09\n- Add X (a1)\n- Fix Y (c3)"
        );
    }

    #[test]
    fn test_prepend_preserves_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let original = "## 1.0.0\n###### 2024-01-01\n- Initial (0000000)\n";
        fs::write(&path, original).unwrap();

        prepend_release_section(
            &path,
            &Version::new(1, 0, 1),
            date(),
            &[CommitLine::from("- Fix Y (c3)")],
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("## 1.0.1\n###### 2024-03-09\n- Fix Y (c3)\n\n{}", original)
        );
    }

    #[test]
    fn test_prepend_order_matters() {
        let dir = TempDir::new().unwrap();
        let a_then_b = dir.path().join("ab.md");
        let b_then_a = dir.path().join("ba.md");
        let original = "previous history\n";
        fs::write(&a_then_b, original).unwrap();
        fs::write(&b_then_a, original).unwrap();

        let a = Version::new(1, 0, 1);
        let b = Version::new(1, 0, 2);
        prepend_release_section(&a_then_b, &a, date(), &[]).unwrap();
        prepend_release_section(&a_then_b, &b, date(), &[]).unwrap();
        prepend_release_section(&b_then_a, &b, date(), &[]).unwrap();
        prepend_release_section(&b_then_a, &a, date(), &[]).unwrap();

        let ab = fs::read_to_string(&a_then_b).unwrap();
        let ba = fs::read_to_string(&b_then_a).unwrap();
        assert_ne!(ab, ba);
        assert!(ab.starts_with("## 1.0.2"));
        assert!(ba.starts_with("## 1.0.1"));
        assert!(ab.ends_with(original));
        assert!(ba.ends_with(original));
    }

    #[test]
    fn test_prepend_creates_missing_changelog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");

        prepend_release_section(&path, &Version::new(0, 1, 0), date(), &[]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## 0.1.0\n###### 2024-03-09\n\n\n"
        );
    }
}
