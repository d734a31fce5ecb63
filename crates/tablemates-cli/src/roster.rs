//! Roster file parsing.
//!
//! One member name per line. Surrounding whitespace is trimmed; blank lines
//! and lines starting with `#` are skipped. A name may appear only once.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tablemates_core::Member;

/// Parse roster text into members, in file order.
///
/// # Errors
///
/// Returns an error naming both lines if a member is listed twice.
pub fn parse_roster(content: &str) -> Result<Vec<Member>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut members = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        let line_no = index + 1;
        if let Some(first) = seen.insert(name, line_no) {
            bail!("duplicate member `{name}` on lines {first} and {line_no}");
        }
        members.push(Member::from(name));
    }
    Ok(members)
}

/// Read and parse a roster file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lists a member twice.
pub fn load_roster(path: &Path) -> Result<Vec<Member>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster {}", path.display()))?;
    parse_roster(&content).with_context(|| format!("Invalid roster {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(content: &str) -> Vec<String> {
        parse_roster(content)
            .expect("valid roster")
            .iter()
            .map(|m| m.as_str().to_string())
            .collect()
    }

    #[test]
    fn skips_blanks_and_comments() {
        assert_eq!(
            names("# spring cohort\nAda\n\n  Grace  \n\t\n# left\nLinus\n"),
            ["Ada", "Grace", "Linus"]
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        assert_eq!(names("Ada\r\nGrace\r\n"), ["Ada", "Grace"]);
    }

    #[test]
    fn empty_file_gives_empty_roster() {
        assert!(names("").is_empty());
        assert!(names("\n# nobody yet\n").is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected_with_both_lines() {
        let err = parse_roster("Ada\nGrace\n  Ada\n").unwrap_err();
        assert_eq!(err.to_string(), "duplicate member `Ada` on lines 1 and 3");
    }

    #[test]
    fn duplicate_in_file_reports_path() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("roster.txt");
        std::fs::write(&path, "Ada\nAda\n").expect("write");

        let err = load_roster(&path).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("roster.txt"), "{rendered}");
        assert!(rendered.contains("duplicate member `Ada`"), "{rendered}");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_roster(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.txt"));
    }
}
