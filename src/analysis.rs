//! Text analysis: whitespace tokenization.
//!
//! Documents and queries are split on exactly the ASCII space byte; runs of
//! spaces produce no empty tokens. Terms are otherwise opaque byte
//! sequences, so no normalization happens here.

/// Split `text` into its non-empty maximal runs of non-space bytes.
///
/// The returned iterator is lazy and yields slices borrowed from `text`,
/// in left-to-right order.
pub fn split_words(text: &str) -> SplitWords<'_> {
    SplitWords { rest: text }
}

/// Lazy whitespace splitter returned by [`split_words`].
#[derive(Debug, Clone)]
pub struct SplitWords<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitWords<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.rest.as_bytes();
        let start = bytes.iter().position(|&b| b != b' ')?;
        let len = bytes[start..]
            .iter()
            .position(|&b| b == b' ')
            .unwrap_or(bytes.len() - start);
        let word = &self.rest[start..start + len];
        self.rest = &self.rest[start + len..];
        Some(word)
    }
}

/// Whether `text` contains a byte in the forbidden `[0x00, 0x20)` range.
pub fn has_control_bytes(text: &str) -> bool {
    text.bytes().any(|b| b < 0x20)
}
