// src/explorer/findings.rs
// Pulls discrete findings out of free-text model analysis.

use chrono::Utc;

use super::types::Finding;

/// A line is a finding iff, after trimming, it starts with a `- ` or `* `
/// marker; the finding text is the remainder. Unmarked lines are ignored,
/// so marker-free analysis yields zero findings, which is a valid outcome.
/// Order is preserved and duplicates are kept.
pub fn extract(analysis: &str) -> Vec<Finding> {
    let now = Utc::now();
    analysis
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let text = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))?;
            Some(Finding {
                finding: text.to_string(),
                timestamp: now,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_markers_in_order() {
        let findings = extract("- a\n* b\nc");
        let texts: Vec<&str> = findings.iter().map(|f| f.finding.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_extract_trims_surrounding_whitespace() {
        let findings = extract("   - indented finding  \n\t* tabbed finding");
        assert_eq!(findings[0].finding, "indented finding");
        assert_eq!(findings[1].finding, "tabbed finding");
    }

    #[test]
    fn test_no_markers_yields_empty() {
        assert!(extract("prose only\nmore prose").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_duplicates_not_deduplicated() {
        let findings = extract("- same\n- same");
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_bare_marker_without_space_ignored() {
        assert!(extract("-no space\n*also none").is_empty());
    }
}
