//! Tokenizers for the QA metrics.
// Static regex patterns always compile.
#![allow(clippy::expect_used)]

use super::porter_stem;
use regex::Regex;
use std::sync::LazyLock;

/// Anything outside lowercase ASCII letters and digits separates ROUGE tokens.
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex: non-alphanumeric run"));

/// Clitics split off the end of a word, longest first.
const CLITICS: &[&str] = &["n't", "'ll", "'re", "'ve", "'s", "'d", "'m"];

/// Minimum token length for stemming in ROUGE.
const ROUGE_STEM_MIN_LEN: usize = 4;

/// Lowercases, turns `. , ! ?` into spaces and splits on whitespace.
///
/// This is the tokenizer behind exact-match style token F1.
#[must_use]
pub fn simple_tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['.', ',', '!', '?'], " ")
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Tokenizes for ROUGE scoring.
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a space,
/// and optionally Porter-stems tokens longer than three characters.
#[must_use]
pub fn rouge_tokenize(text: &str, stem: bool) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(|token| {
            if stem && token.len() >= ROUGE_STEM_MIN_LEN {
                porter_stem(token)
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// Treebank-style word tokenizer used for BLEU.
///
/// Splits on whitespace, peels leading and trailing punctuation into separate
/// tokens, and separates English clitics (`can't` becomes `ca`, `n't`).
#[must_use]
pub fn word_tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in text.split_whitespace() {
        split_chunk(chunk, &mut tokens);
    }
    tokens
}

fn split_chunk(chunk: &str, tokens: &mut Vec<String>) {
    let is_punct = |c: char| c.is_ascii_punctuation() && c != '\'';

    let core_start = chunk.find(|c: char| !is_punct(c)).unwrap_or(chunk.len());
    let leading = &chunk[..core_start];
    let rest = &chunk[core_start..];
    let core_end = rest
        .rfind(|c: char| !is_punct(c))
        .map_or(0, |i| i + rest[i..].chars().next().map_or(1, char::len_utf8));
    let core = &rest[..core_end];
    let trailing = &rest[core_end..];

    tokens.extend(leading.chars().map(String::from));
    if !core.is_empty() {
        split_clitic(core, tokens);
    }
    tokens.extend(trailing.chars().map(String::from));
}

fn split_clitic(word: &str, tokens: &mut Vec<String>) {
    let lowered = word.to_ascii_lowercase();
    for clitic in CLITICS {
        if lowered.len() > clitic.len() && lowered.ends_with(clitic) {
            let split = word.len() - clitic.len();
            tokens.push(word[..split].to_string());
            tokens.push(word[split..].to_string());
            return;
        }
    }
    tokens.push(word.to_string());
}
