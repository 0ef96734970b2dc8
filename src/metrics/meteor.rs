//! METEOR with exact and Porter-stem alignment stages.

use crate::text::porter_stem;

const ALPHA: f64 = 0.9;
const BETA: f64 = 3.0;
const GAMMA: f64 = 0.5;

/// Word position paired with the word (or its stem).
type Enumerated = Vec<(usize, String)>;

/// Aligns equal words, scanning both lists from the end. Matched entries are
/// removed from both lists; returns `(hypothesis index, reference index)` pairs.
fn match_enums(hypothesis: &mut Enumerated, reference: &mut Enumerated) -> Vec<(usize, usize)> {
    let mut matches = Vec::new();
    for i in (0..hypothesis.len()).rev() {
        if let Some(j) = (0..reference.len())
            .rev()
            .find(|&j| hypothesis[i].1 == reference[j].1)
        {
            matches.push((hypothesis[i].0, reference[j].0));
            hypothesis.remove(i);
            reference.remove(j);
        }
    }
    matches
}

fn stemmed(words: &Enumerated) -> Enumerated {
    words
        .iter()
        .map(|(i, word)| (*i, porter_stem(word)))
        .collect()
}

/// Aligns hypothesis and reference words; result is sorted by hypothesis index.
fn align(hypothesis: &[String], reference: &[String]) -> Vec<(usize, usize)> {
    let mut hyp: Enumerated = hypothesis.iter().cloned().enumerate().collect();
    let mut refs: Enumerated = reference.iter().cloned().enumerate().collect();

    let mut matches = match_enums(&mut hyp, &mut refs);

    let mut hyp_stems = stemmed(&hyp);
    let mut ref_stems = stemmed(&refs);
    matches.extend(match_enums(&mut hyp_stems, &mut ref_stems));

    matches.sort_by_key(|&(h, _)| h);
    matches
}

/// Number of runs where both hypothesis and reference indices advance by one.
fn count_chunks(matches: &[(usize, usize)]) -> usize {
    if matches.is_empty() {
        return 0;
    }
    1 + matches
        .windows(2)
        .filter(|pair| !(pair[1].0 == pair[0].0 + 1 && pair[1].1 == pair[0].1 + 1))
        .count()
}

/// METEOR score of `hypothesis` against `reference`.
///
/// Both are lowercased and split on whitespace. Returns 0 when nothing aligns.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn meteor_score(reference: &str, hypothesis: &str) -> f64 {
    let hyp: Vec<String> = hypothesis
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    let refs: Vec<String> = reference
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let matches = align(&hyp, &refs);
    let m = matches.len() as f64;
    if matches.is_empty() {
        return 0.0;
    }

    let precision = m / hyp.len() as f64;
    let recall = m / refs.len() as f64;
    let fmean = precision * recall / (ALPHA * precision + (1.0 - ALPHA) * recall);
    let fragmentation = count_chunks(&matches) as f64 / m;
    let penalty = GAMMA * fragmentation.powf(BETA);
    (1.0 - penalty) * fmean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let score = meteor_score("the cat sat on the mat", "the cat sat on the mat");
        assert!((score - (1.0 - 0.5 / 216.0)).abs() < 1e-12);
    }

    #[test]
    fn test_case_insensitive() {
        let score = meteor_score("Paris", "paris");
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_match() {
        assert!(meteor_score("London", "Paris").abs() < f64::EPSILON);
        assert!(meteor_score("", "Paris").abs() < f64::EPSILON);
    }

    #[test]
    fn test_stem_stage_matches() {
        // "painting" and "painted" share the stem "paint".
        let score = meteor_score("painting", "painted");
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fragmentation() {
        let aligned = align(
            &["b".to_string(), "a".to_string()],
            &["a".to_string(), "b".to_string()],
        );
        assert_eq!(aligned, vec![(0, 1), (1, 0)]);
        assert_eq!(count_chunks(&aligned), 2);
    }

    #[test]
    fn test_repeated_words_align_from_end() {
        let aligned = align(
            &["the".to_string(), "the".to_string()],
            &["the".to_string()],
        );
        assert_eq!(aligned, vec![(1, 0)]);
    }
}
