//! Substring scanning over any whole-string acceptor.

use super::dfa::Dfa;
use super::nfa::Nfa;
use crate::config::EngineConfig;

/// Anything that decides whether a complete input string is in its language.
pub trait Acceptor {
    fn accepts(&self, input: &str) -> bool;
}

impl Acceptor for Nfa {
    fn accepts(&self, input: &str) -> bool {
        self.simulate(input)
    }
}

impl Acceptor for Dfa {
    fn accepts(&self, input: &str) -> bool {
        self.simulate(input)
    }
}

impl<A: Acceptor + ?Sized> Acceptor for &A {
    fn accepts(&self, input: &str) -> bool {
        (**self).accepts(input)
    }
}

/// Every non-empty `(start, end)` byte span of the ASCII-lower-cased
/// `message` whose substring the acceptor accepts, ordered by start then end.
///
/// `window` caps the span length in bytes. Spans that would split a multi-byte
/// character are skipped.
pub fn scan_substrings<A: Acceptor + ?Sized>(
    acceptor: &A,
    message: &str,
    window: Option<usize>,
) -> Vec<(usize, usize)> {
    let lowered = message.to_ascii_lowercase();
    let len = lowered.len();
    let mut spans = Vec::new();

    for start in 0..len {
        if !lowered.is_char_boundary(start) {
            continue;
        }
        let last = match window {
            Some(w) => len.min(start.saturating_add(w)),
            None => len,
        };
        for end in start + 1..=last {
            let Some(candidate) = lowered.get(start..end) else {
                continue;
            };
            if acceptor.accepts(candidate) {
                spans.push((start, end));
            }
        }
    }

    spans
}

/// [`scan_substrings`] with the window taken from `config.scan_window`.
pub fn scan_with_config<A: Acceptor + ?Sized>(
    acceptor: &A,
    message: &str,
    config: &EngineConfig,
) -> Vec<(usize, usize)> {
    scan_substrings(acceptor, message, config.scan_window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regexp::compile_regex;

    #[test]
    fn test_scan_finds_embedded_word() {
        let nfa = compile_regex("idiot");
        let spans = scan_substrings(&nfa, "You IDIOT!", None);
        assert_eq!(spans, vec![(4, 9)]);
    }

    #[test]
    fn test_scan_nfa_and_dfa_agree() {
        let nfa = compile_regex("d(u|0)mb+");
        let dfa = Dfa::from_nfa(&nfa);
        let message = "so dumb, d0mbbb and dumbest";
        assert_eq!(
            scan_substrings(&nfa, message, None),
            scan_substrings(&dfa, message, None)
        );
        assert!(!scan_substrings(&dfa, message, None).is_empty());
    }

    #[test]
    fn test_scan_window_limits_span_length() {
        let nfa = compile_regex("a+");
        let all = scan_substrings(&nfa, "aaaa", None);
        assert_eq!(all.len(), 10);

        let short = scan_substrings(&nfa, "aaaa", Some(2));
        assert_eq!(short.len(), 7);
        assert!(short.iter().all(|(s, e)| e - s <= 2));
    }

    #[test]
    fn test_scan_window_from_config() {
        let nfa = compile_regex("a+");
        let config = EngineConfig::from_toml_str("scan_window = 2").unwrap();
        let spans = scan_with_config(&nfa, "aaaa", &config);
        assert_eq!(spans, scan_substrings(&nfa, "aaaa", Some(2)));
        assert_eq!(spans.len(), 7);

        let unlimited = scan_with_config(&nfa, "aaaa", &EngineConfig::default());
        assert_eq!(unlimited.len(), 10);
    }

    #[test]
    fn test_scan_skips_split_characters() {
        let nfa = compile_regex(".");
        // 'é' is two bytes; only the ASCII bytes form single-byte spans
        let spans = scan_substrings(&nfa, "aéb", None);
        assert_eq!(spans, vec![(0, 1), (3, 4)]);
    }

    #[test]
    fn test_scan_empty_message() {
        let nfa = compile_regex("");
        assert!(scan_substrings(&nfa, "", None).is_empty());
    }
}
