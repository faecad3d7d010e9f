//! Plain-text export parsing
//!
//! Turns a pasted export (one card per line) into term pairs. Each line is
//! split on the first tab, else the first run of two or more whitespace
//! characters, else the first `" - "`.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TermPair;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

const DASH_SEPARATOR: &str = " - ";

/// Split one line into a term pair, or `None` if it can't be parsed
pub fn split_line(line: &str) -> Option<TermPair> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    // A tab is authoritative: an empty side rejects the line outright
    if let Some((left, right)) = trimmed.split_once('\t') {
        return TermPair::new(left, right);
    }

    if let Some(run) = WHITESPACE_RUN.find(trimmed) {
        if let Some(pair) = TermPair::new(&trimmed[..run.start()], &trimmed[run.end()..]) {
            return Some(pair);
        }
    }

    if let Some((left, right)) = trimmed.split_once(DASH_SEPARATOR) {
        return TermPair::new(left, right);
    }

    None
}

/// Parse a whole export, dropping lines that don't split
pub fn parse_export(text: &str) -> Vec<TermPair> {
    text.lines().filter_map(split_line).collect()
}

/// Number of pairs [`parse_export`] would return, without allocating them
pub fn parse_count(text: &str) -> usize {
    text.lines().filter(|line| split_line(line).is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(word: &str, definition: &str) -> TermPair {
        TermPair {
            word: word.to_string(),
            definition: definition.to_string(),
        }
    }

    #[test]
    fn test_split_on_tab() {
        assert_eq!(split_line("foo\tbar"), Some(pair("foo", "bar")));
        // Only the first tab splits
        assert_eq!(split_line("a\tb\tc"), Some(pair("a", "b\tc")));
    }

    #[test]
    fn test_tab_with_empty_side_is_rejected() {
        assert_eq!(split_line("foo\t"), None);
        assert_eq!(split_line("\tbar"), None);
        assert_eq!(split_line("foo - \t"), None);
    }

    #[test]
    fn test_split_on_whitespace_run() {
        assert_eq!(split_line("foo   bar baz"), Some(pair("foo", "bar baz")));
        assert_eq!(split_line("  padded  line  "), Some(pair("padded", "line")));
    }

    #[test]
    fn test_split_on_dash() {
        assert_eq!(split_line("foo - bar"), Some(pair("foo", "bar")));
        assert_eq!(split_line("x-ray - a kind - of light"), Some(pair("x-ray", "a kind - of light")));
    }

    #[test]
    fn test_unparsable_lines() {
        assert_eq!(split_line("   "), None);
        assert_eq!(split_line(""), None);
        assert_eq!(split_line("single"), None);
        assert_eq!(split_line("foo-bar"), None);
    }

    #[test]
    fn test_parse_export_mixed_line_endings() {
        let text = "one\tuno\r\ntwo  dos\n\nnoise\nthree - tres\r\n";
        assert_eq!(
            parse_export(text),
            vec![pair("one", "uno"), pair("two", "dos"), pair("three", "tres")]
        );
    }

    #[test]
    fn test_parse_count_agrees_with_parse_export() {
        let inputs = [
            "",
            "\n\n",
            "a\tb\nc\t\nd  e\nf - g\nh\n",
            "x\ty\r\nz - w\r\n   \r\n",
            "tab\tonly\tonce\nspaces  and - dash",
        ];
        for text in inputs {
            assert_eq!(parse_count(text), parse_export(text).len(), "input {text:?}");
        }
    }

    #[test]
    fn test_parse_export_is_stable_when_reserialized() {
        let text = "cat\tgato\ndog   perro grande\nbird - pajaro\nskip me\n";
        let first = parse_export(text);
        let reserialized = first
            .iter()
            .map(|p| format!("{}\t{}", p.word, p.definition))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_export(&reserialized), first);
    }
}
