//! Raw query parsing into plus/minus term sets.

use ahash::AHashSet;

use crate::analysis::{has_control_bytes, split_words};
use crate::error::{Result, SagittaError};

/// A parsed query: terms that score and terms that exclude.
///
/// Minus terms are stored with their leading `-` already stripped. The
/// slices borrow from the raw query string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Query<'a> {
    pub(crate) plus_words: Vec<&'a str>,
    pub(crate) minus_words: Vec<&'a str>,
}

/// Whether parsing collapses repeated terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseMode {
    /// Plus and minus terms each become sorted unique sequences.
    Deduplicate,
    /// Multiplicity and order are preserved.
    Raw,
}

/// Structural checks on the raw query, applied before tokenization.
fn validate_raw(raw_query: &str) -> Result<()> {
    if raw_query.contains("--") {
        return Err(SagittaError::invalid_query("contains \"--\""));
    }
    let last = raw_query.bytes().rev().find(|&b| b != b' ');
    if last == Some(b'-') {
        return Err(SagittaError::invalid_query("ends with '-'"));
    }
    Ok(())
}

/// Parse `raw_query` against a stop-word set.
///
/// Stop words are dropped before classification, so a token equal to a stop
/// word never becomes a plus term, while a minus token such as `-cat` is
/// matched against the stop words including its `-` prefix, exactly like a
/// document token would be.
pub(crate) fn parse<'a>(
    raw_query: &'a str,
    stop_words: &AHashSet<String>,
    mode: ParseMode,
) -> Result<Query<'a>> {
    validate_raw(raw_query)?;

    let mut query = Query::default();
    for word in split_words(raw_query) {
        if has_control_bytes(word) {
            return Err(SagittaError::invalid_word(word));
        }
        if stop_words.contains(word) {
            continue;
        }
        match word.strip_prefix('-') {
            Some(minus_word) if !minus_word.is_empty() => query.minus_words.push(minus_word),
            Some(_) => {}
            None => query.plus_words.push(word),
        }
    }

    if mode == ParseMode::Deduplicate {
        for words in [&mut query.plus_words, &mut query.minus_words] {
            words.sort_unstable();
            words.dedup();
        }
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_words(words: &[&str]) -> AHashSet<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn test_parse_classifies_terms() {
        let stop = stop_words(&[]);
        let query = parse("fluffy -collar cat", &stop, ParseMode::Deduplicate).unwrap();

        assert_eq!(query.plus_words, vec!["cat", "fluffy"]);
        assert_eq!(query.minus_words, vec!["collar"]);
    }

    #[test]
    fn test_parse_deduplicates_and_sorts() {
        let stop = stop_words(&[]);
        let query = parse("tail cat tail -dog -dog", &stop, ParseMode::Deduplicate).unwrap();

        assert_eq!(query.plus_words, vec!["cat", "tail"]);
        assert_eq!(query.minus_words, vec!["dog"]);
    }

    #[test]
    fn test_parse_raw_preserves_order_and_multiplicity() {
        let stop = stop_words(&[]);
        let query = parse("tail cat tail", &stop, ParseMode::Raw).unwrap();

        assert_eq!(query.plus_words, vec!["tail", "cat", "tail"]);
    }

    #[test]
    fn test_parse_drops_stop_words() {
        let stop = stop_words(&["in", "on"]);
        let query = parse("in cat on", &stop, ParseMode::Deduplicate).unwrap();

        assert_eq!(query.plus_words, vec!["cat"]);
        assert!(query.minus_words.is_empty());
    }

    #[test]
    fn test_parse_rejects_double_minus() {
        let stop = stop_words(&[]);
        let result = parse("cat --dog", &stop, ParseMode::Deduplicate);

        assert_eq!(
            result,
            Err(SagittaError::invalid_query("contains \"--\""))
        );
    }

    #[test]
    fn test_parse_rejects_trailing_minus() {
        let stop = stop_words(&[]);

        assert!(parse("cat -", &stop, ParseMode::Deduplicate).is_err());
        // Trailing spaces do not hide the dangling minus.
        assert!(parse("cat-  ", &stop, ParseMode::Deduplicate).is_err());
    }

    #[test]
    fn test_parse_rejects_control_bytes_per_word() {
        let stop = stop_words(&[]);
        let result = parse("cat bro\u{1}ken", &stop, ParseMode::Deduplicate);

        assert_eq!(result, Err(SagittaError::invalid_word("bro\u{1}ken")));
    }

    #[test]
    fn test_parse_empty_query() {
        let stop = stop_words(&[]);
        let query = parse("   ", &stop, ParseMode::Deduplicate).unwrap();

        assert!(query.plus_words.is_empty());
        assert!(query.minus_words.is_empty());
    }
}
