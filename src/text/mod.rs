//! Text normalization and tokenization.
//!
//! Every string that enters the crate from a dataset, a prediction file, or an LLM
//! response goes through [`sanitize_text`] first. The tokenizers here feed the
//! metric implementations in [`crate::metrics`]:
//!
//! | Tokenizer | Used by |
//! |-----------|---------|
//! | [`simple_tokenize`] | exact-match / token F1 |
//! | [`rouge_tokenize`] | ROUGE-1/2/L |
//! | [`word_tokenize`] | BLEU |
//! | whitespace split + [`porter_stem`] | METEOR |

mod stemmer;
mod tokenize;

pub use stemmer::porter_stem;
pub use tokenize::{rouge_tokenize, simple_tokenize, word_tokenize};

/// Code point ranges stripped before ASCII conversion (emoji, pictographs, dingbats,
/// enclosed characters, regional indicators).
const STRIPPED_RANGES: &[(char, char)] = &[
    ('\u{1F600}', '\u{1F64F}'),
    ('\u{1F300}', '\u{1F5FF}'),
    ('\u{1F680}', '\u{1F6FF}'),
    ('\u{1F1E0}', '\u{1F1FF}'),
    ('\u{2702}', '\u{27B0}'),
    ('\u{24C2}', '\u{1F251}'),
];

/// Replacement for any non-ASCII character that survives stripping.
const REPLACEMENT: char = '?';

fn is_stripped(c: char) -> bool {
    STRIPPED_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&c))
}

/// Sanitizes text to plain ASCII.
///
/// Emoji and related symbol ranges are removed outright. Any other non-ASCII
/// character is replaced by `?`, one per code point.
///
/// # Examples
///
/// ```rust
/// use amem::sanitize_text;
///
/// assert_eq!(sanitize_text("Great job! \u{1F600}"), "Great job! ");
/// assert_eq!(sanitize_text("caf\u{e9}"), "caf?");
/// ```
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if !is_stripped(c) {
            out.push(REPLACEMENT);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_ascii() {
        let input = "Caroline went to the LGBTQ support group on 7 May 2023.";
        assert_eq!(sanitize_text(input), input);
    }

    #[test]
    fn test_sanitize_removes_emoji() {
        assert_eq!(sanitize_text("so proud \u{1F600}\u{1F680}!"), "so proud !");
        assert_eq!(sanitize_text("\u{2705} done"), " done");
        assert_eq!(sanitize_text("flag \u{1F1FA}\u{1F1F8}"), "flag ");
    }

    #[test]
    fn test_sanitize_replaces_other_non_ascii() {
        assert_eq!(sanitize_text("na\u{ef}ve r\u{e9}sum\u{e9}"), "na?ve r?sum?");
        assert_eq!(sanitize_text("\u{2014}"), "?");
    }

    #[test]
    fn test_sanitize_strips_wide_enclosed_range() {
        // CJK falls inside U+24C2..U+1F251 and is removed rather than replaced.
        assert_eq!(sanitize_text("hi \u{4F60}\u{597D}"), "hi ");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_text("M\u{fc}nchen \u{1F37A} trip");
        assert_eq!(sanitize_text(&once), once);
        assert!(once.is_ascii());
    }
}
