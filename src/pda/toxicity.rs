//! Toxic-content scan of bracketed text.
//!
//! Only outermost bracket pairs yield content: the text between an opener and
//! the matching closer that empties the stack. Nested pairs are part of that
//! content and are not checked on their own.

use tracing::debug;

use super::balanced::is_balanced;
use super::stack::{is_closer, is_opener, opener_for};
use crate::approximate::find_matches;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToxicityScan {
    /// Result of the balanced-bracket check over the whole input.
    pub balanced: bool,
    /// One `Found '<pattern>' in: <content>` line per flagged bracket pair.
    pub findings: Vec<String>,
}

/// Check every outermost bracket pair against `patterns`. For each pair the
/// first pattern that is contained (case-insensitively) in the content, or
/// approximately matches one of its words within `max_edits`, is reported.
pub fn scan_toxicity<S: AsRef<str>>(input: &str, patterns: &[S], max_edits: usize) -> ToxicityScan {
    let mut findings = Vec::new();
    let mut stack: Vec<(usize, u8)> = Vec::new();

    for (i, b) in input.bytes().enumerate() {
        if is_opener(b) {
            stack.push((i, b));
            continue;
        }
        if !is_closer(b) {
            continue;
        }
        // Closers that do not match the top are ignored
        let Some(&(open_at, open)) = stack.last() else {
            continue;
        };
        if Some(open) != opener_for(b) {
            continue;
        }
        stack.pop();
        if !stack.is_empty() {
            continue;
        }

        let Some(content) = input.get(open_at + 1..i) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        if let Some(pattern) = first_hit(content, patterns, max_edits) {
            debug!(pattern, content, "toxic content in brackets");
            findings.push(format!("Found '{}' in: {}", pattern, content));
        }
    }

    ToxicityScan {
        balanced: is_balanced(input),
        findings,
    }
}

fn first_hit<'p, S: AsRef<str>>(content: &str, patterns: &'p [S], max_edits: usize) -> Option<&'p str> {
    let lowered = content.to_ascii_lowercase();
    patterns
        .iter()
        .map(AsRef::as_ref)
        // An empty pattern is contained in everything
        .filter(|pattern| !pattern.is_empty())
        .find(|pattern| {
            lowered.contains(&pattern.to_ascii_lowercase())
                || !find_matches(content, pattern, max_edits).is_empty()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_word_in_brackets() {
        let scan = scan_toxicity("hello (you idiot) bye", &["idiot"], 1);
        assert!(scan.balanced);
        assert_eq!(scan.findings, vec!["Found 'idiot' in: you idiot".to_string()]);
    }

    #[test]
    fn test_text_outside_brackets_is_ignored() {
        let scan = scan_toxicity("idiot (nice)", &["idiot"], 1);
        assert!(scan.findings.is_empty());
    }

    #[test]
    fn test_approximate_hit_with_leetspeak() {
        let scan = scan_toxicity("[st00pid]", &["stupid"], 2);
        assert_eq!(scan.findings, vec!["Found 'stupid' in: st00pid".to_string()]);
    }

    #[test]
    fn test_first_pattern_wins() {
        let scan = scan_toxicity("{dumb idiot}", &["idiot", "dumb"], 0);
        assert_eq!(scan.findings, vec!["Found 'idiot' in: dumb idiot".to_string()]);
    }

    #[test]
    fn test_case_insensitive_containment() {
        let scan = scan_toxicity("<TRASHTALK>", &["trash"], 0);
        assert_eq!(scan.findings.len(), 1);
    }

    #[test]
    fn test_nested_pairs_yield_outer_content_only() {
        let scan = scan_toxicity("(a [dumb] b)", &["dumb"], 0);
        assert_eq!(scan.findings, vec!["Found 'dumb' in: a [dumb] b".to_string()]);
    }

    #[test]
    fn test_unbalanced_still_scanned() {
        let scan = scan_toxicity("(idiot) (", &["idiot"], 0);
        assert!(!scan.balanced);
        assert_eq!(scan.findings.len(), 1);

        // Mismatched closer is skipped, the real closer completes the pair
        let scan = scan_toxicity("(hate]) ok", &["hate"], 0);
        assert!(!scan.balanced);
        assert_eq!(scan.findings, vec!["Found 'hate' in: hate]".to_string()]);
    }

    #[test]
    fn test_empty_pattern_never_hits() {
        let scan = scan_toxicity("[nice day]", &["", "idiot"], 2);
        assert!(scan.findings.is_empty());

        let scan = scan_toxicity("(you idiot)", &["", "idiot"], 0);
        assert_eq!(scan.findings, vec!["Found 'idiot' in: you idiot".to_string()]);
    }

    #[test]
    fn test_empty_brackets_and_clean_text() {
        let scan = scan_toxicity("() [nice day]", &["idiot", "dumb"], 1);
        assert!(scan.balanced);
        assert!(scan.findings.is_empty());
    }
}
