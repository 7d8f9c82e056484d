//! Approximate word matching for noisy chat text.
//!
//! A message is normalized once (leetspeak folded, punctuation stripped),
//! split on whitespace, and every word is scored against a pattern. A pattern
//! that parses as a regex and fully matches the word is an exact hit; otherwise
//! the word matches when its Levenshtein distance to the pattern is within the
//! allowed number of edits.

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::config::{EngineConfig, DEFAULT_LEXICON, DEFAULT_MAX_EDITS};

/// One word of a message that matched a pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    original: String,
    matched_pattern: String,
    distance: usize,
    similarity: f64,
}

impl MatchResult {
    pub fn new(
        original: impl Into<String>,
        matched_pattern: impl Into<String>,
        distance: usize,
        similarity: f64,
    ) -> Self {
        Self {
            original: original.into(),
            matched_pattern: matched_pattern.into(),
            distance,
            similarity,
        }
    }

    /// The normalized word that matched.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn matched_pattern(&self) -> &str {
        &self.matched_pattern
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Percentage in `[0, 100]`.
    pub fn similarity(&self) -> f64 {
        self.similarity
    }
}

fn leet(c: char) -> Option<char> {
    match c {
        '1' => Some('i'),
        '0' => Some('o'),
        '3' => Some('e'),
        '4' => Some('a'),
        '5' => Some('s'),
        '7' => Some('t'),
        '@' => Some('a'),
        '$' => Some('s'),
        '!' => Some('i'),
        _ => None,
    }
}

/// Fold leetspeak substitutions, then drop everything that is neither ASCII
/// alphanumeric nor whitespace. Idempotent.
pub fn normalize(message: &str) -> String {
    message
        .chars()
        .map(|c| leet(c.to_ascii_lowercase()).unwrap_or(c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Whitespace-separated words of already normalized text.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Case-insensitive Levenshtein distance with unit costs, over bytes.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<u8> = a.bytes().map(|c| c.to_ascii_lowercase()).collect();
    let b: Vec<u8> = b.bytes().map(|c| c.to_ascii_lowercase()).collect();
    let (m, n) = (a.len(), b.len());

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// `(1 - d / max(len)) * 100`, or 100 when both strings are empty.
pub fn similarity(word: &str, pattern: &str, distance: usize) -> f64 {
    let longest = word.len().max(pattern.len());
    if longest == 0 {
        return 100.0;
    }
    (1.0 - distance as f64 / longest as f64) * 100.0
}

/// Anchored, case-insensitive regex for `pattern`, if it parses.
pub fn fast_path(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(&format!("^(?:{})$", pattern))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Every word of `message` matching `pattern` within `max_edits`, in message
/// order. Duplicated words produce duplicated results.
pub fn find_matches(message: &str, pattern: &str, max_edits: usize) -> Vec<MatchResult> {
    let normalized = normalize(message);
    let regex = fast_path(pattern);
    match_words(&normalized, pattern, regex.as_ref(), max_edits)
}

fn match_words(
    normalized: &str,
    pattern: &str,
    regex: Option<&Regex>,
    max_edits: usize,
) -> Vec<MatchResult> {
    let mut results = Vec::new();

    for word in tokenize(normalized) {
        if regex.is_some_and(|re| re.is_match(word)) {
            trace!(word, pattern, "regex fast path hit");
            results.push(MatchResult::new(word, pattern, 0, 100.0));
            continue;
        }

        let distance = levenshtein(word, pattern);
        if distance <= max_edits {
            let score = similarity(word, pattern, distance);
            trace!(word, pattern, distance, similarity = score, "approximate match");
            results.push(MatchResult::new(word, pattern, distance, score));
        } else {
            trace!(word, pattern, distance, "no match");
        }
    }

    results
}

/// Matcher bound to a lexicon of patterns.
#[derive(Clone, Debug)]
pub struct ApproximateMatcher {
    lexicon: Vec<String>,
    max_edits: usize,
}

impl Default for ApproximateMatcher {
    fn default() -> Self {
        Self {
            lexicon: DEFAULT_LEXICON.iter().map(|w| w.to_string()).collect(),
            max_edits: DEFAULT_MAX_EDITS,
        }
    }
}

impl ApproximateMatcher {
    pub fn new<I, S>(lexicon: I, max_edits: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lexicon: lexicon.into_iter().map(Into::into).collect(),
            max_edits,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.lexicon.iter().cloned(), config.max_edits)
    }

    pub fn lexicon(&self) -> &[String] {
        &self.lexicon
    }

    pub fn max_edits(&self) -> usize {
        self.max_edits
    }

    /// Matches of one pattern within this matcher's edit limit.
    pub fn find_matches(&self, message: &str, pattern: &str) -> Vec<MatchResult> {
        find_matches(message, pattern, self.max_edits)
    }

    /// Matches of every lexicon entry, grouped in lexicon order. The message is
    /// normalized once.
    pub fn find_all(&self, message: &str) -> Vec<MatchResult> {
        let normalized = normalize(message);
        self.lexicon
            .iter()
            .flat_map(|pattern| {
                let regex = fast_path(pattern);
                match_words(&normalized, pattern, regex.as_ref(), self.max_edits)
            })
            .collect()
    }
}
