//! Best-effort JIRA issue key extraction from PR titles/bodies and commit
//! messages (SPEC_FULL §4.2 "JIRA linkage (supplemental)"). A PR with no
//! recognizable tokens simply has an empty link set, never an error.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ISSUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Z0-9]{1,9}-[0-9]+\b").expect("static regex"));

pub fn extract(text: &str) -> HashSet<String> {
    ISSUE_KEY.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

pub fn extract_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    texts.into_iter().flat_map(extract).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_conventional_issue_keys() {
        let found = extract("Fixes PROJ-123 and also touches ABC-4 but not lowercase-12");
        assert_eq!(found, HashSet::from(["PROJ-123".to_string(), "ABC-4".to_string()]));
    }

    #[test]
    fn empty_when_no_tokens_present() {
        assert!(extract("just a regular commit message").is_empty());
    }
}
