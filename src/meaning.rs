//! Cleanup of raw dictionary text into short meanings.
//!
//! Each result element reads like `"noun (formal) an act (of doing) something"`.
//! The leading token is the part of speech and parenthesised text is
//! annotation; both are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+\s+").expect("valid regex"));
static INNER_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^()]*\)").expect("valid regex"));
static STRAY_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[()]").expect("valid regex"));

/// Clean a single raw meaning. May return an empty string.
pub fn clean_meaning(raw: &str) -> String {
    let mut text = LEADING_TOKEN.replace(raw.trim(), "").into_owned();

    // Innermost groups first, until nested groups are gone.
    while INNER_PARENS.is_match(&text) {
        text = INNER_PARENS.replace_all(&text, "").into_owned();
    }

    STRAY_PARENS.replace_all(&text, "").trim().to_string()
}

/// Clean every raw text, drop the empty ones, keep the first `limit`.
pub fn extract_meanings<S: AsRef<str>>(raws: &[S], limit: usize) -> Vec<String> {
    raws.iter()
        .map(|raw| clean_meaning(raw.as_ref()))
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_part_of_speech() {
        assert_eq!(clean_meaning("명사 사과"), "사과");
    }

    #[test]
    fn keeps_single_token() {
        // No whitespace after the first token, so nothing is treated as a tag.
        assert_eq!(clean_meaning("사과"), "사과");
    }

    #[test]
    fn trims_before_stripping() {
        assert_eq!(clean_meaning("  \n동사\n\t  달리다  "), "달리다");
    }

    #[test]
    fn removes_parenthesised_annotation() {
        assert_eq!(clean_meaning("명사 (과일) 사과"), "사과");
        assert_eq!(clean_meaning("동사 달리다(빠르게) 뛰다"), "달리다 뛰다");
    }

    #[test]
    fn removes_nested_parentheses() {
        assert_eq!(clean_meaning("명사 사과 (나무 (열매))"), "사과");
        assert_eq!(clean_meaning("명사 a((b)c)d"), "ad");
    }

    #[test]
    fn removes_unbalanced_parentheses() {
        assert_eq!(clean_meaning("명사 사과 (열매"), "사과 열매");
        assert_eq!(clean_meaning("명사 사과) 열매"), "사과 열매");
    }

    #[test]
    fn annotation_only_becomes_empty() {
        assert_eq!(clean_meaning("명사 (참고)"), "");
        assert_eq!(clean_meaning(""), "");
        assert_eq!(clean_meaning("   "), "");
    }

    #[test]
    fn extract_drops_empty_and_limits() {
        let raws = [
            "명사 (참고)",
            "명사 사과",
            "명사 능금",
            "",
            "명사 사과나무",
            "명사 애플",
        ];
        assert_eq!(
            extract_meanings(&raws, 3),
            vec!["사과", "능금", "사과나무"]
        );
    }

    #[test]
    fn extract_with_fewer_than_limit() {
        let raws = vec!["부사 빨리".to_string()];
        assert_eq!(extract_meanings(&raws, 3), vec!["빨리"]);
    }

    #[test]
    fn extract_with_zero_limit() {
        assert!(extract_meanings(&["명사 사과"], 0).is_empty());
    }
}
