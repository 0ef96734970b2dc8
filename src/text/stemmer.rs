//! Porter suffix-stripping stemmer.
//!
//! Implements the algorithm from M.F. Porter, "An algorithm for suffix stripping"
//! (1980), in the form of the author's reference implementation (including the
//! `bli -> ble` and `logi -> log` step 2 rules).
//!
//! The stemmer works on ASCII bytes. `k` is the index of the last byte of the
//! current word and `j` marks the end of the stem once a suffix has matched; both
//! are signed because `j` becomes `-1` when the whole word is the suffix.

/// Stems a single lowercase word.
///
/// Words of two characters or fewer, and words containing non-ASCII characters,
/// are returned unchanged.
///
/// # Examples
///
/// ```rust
/// use amem::text::porter_stem;
///
/// assert_eq!(porter_stem("running"), "run");
/// assert_eq!(porter_stem("relational"), "relat");
/// ```
#[must_use]
pub fn porter_stem(word: &str) -> String {
    if word.len() <= 2 || !word.is_ascii() {
        return word.to_string();
    }

    let mut stemmer = Stemmer::new(word.as_bytes());
    stemmer.step1ab();
    if stemmer.k > 0 {
        stemmer.step1c();
        stemmer.step2();
        stemmer.step3();
        stemmer.step4();
        stemmer.step5();
    }
    stemmer.finish()
}

struct Stemmer {
    b: Vec<u8>,
    k: isize,
    j: isize,
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
impl Stemmer {
    fn new(word: &[u8]) -> Self {
        Self {
            b: word.to_vec(),
            k: word.len() as isize - 1,
            j: 0,
        }
    }

    fn at(&self, i: isize) -> u8 {
        self.b[i as usize]
    }

    fn finish(mut self) -> String {
        self.b.truncate((self.k + 1) as usize);
        String::from_utf8_lossy(&self.b).into_owned()
    }

    /// True when `b[i]` is a consonant. `y` is a consonant at the start of a word
    /// or after a vowel.
    fn cons(&self, i: isize) -> bool {
        match self.at(i) {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of consonant-vowel sequences in `b[0..=j]`.
    fn m(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i > self.j {
                return n;
            }
            if !self.cons(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i > self.j {
                    return n;
                }
                if self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i > self.j {
                    return n;
                }
                if !self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..=self.j).any(|i| !self.cons(i))
    }

    fn double_consonant(&self, j: isize) -> bool {
        j >= 1 && self.at(j) == self.at(j - 1) && self.cons(j)
    }

    /// consonant-vowel-consonant ending at `i`, where the last consonant is not
    /// `w`, `x` or `y`.
    fn cvc(&self, i: isize) -> bool {
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.at(i), b'w' | b'x' | b'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let len = suffix.len() as isize;
        if len > self.k + 1 {
            return false;
        }
        let start = (self.k - len + 1) as usize;
        if &self.b[start..=self.k as usize] != suffix.as_bytes() {
            return false;
        }
        self.j = self.k - len;
        true
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate((self.j + 1) as usize);
        self.b.extend_from_slice(replacement.as_bytes());
        self.k = self.j + replacement.len() as isize;
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.m() > 0 {
            self.set_to(replacement);
        }
    }

    /// Plurals and `-ed` / `-ing`.
    fn step1ab(&mut self) {
        if self.at(self.k) == b's' {
            if self.ends("sses") {
                self.k -= 2;
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.at(self.k - 1) != b's' {
                self.k -= 1;
            }
        }

        if self.ends("eed") {
            if self.m() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.k) {
                self.k -= 1;
                if matches!(self.at(self.k), b'l' | b's' | b'z') {
                    self.k += 1;
                }
            } else if self.m() == 1 && self.cvc(self.k) {
                self.set_to("e");
            }
        }
    }

    /// Terminal `y` to `i` when there is another vowel in the stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let k = self.k as usize;
            self.b[k] = b'i';
        }
    }

    fn apply_rules(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    /// Double suffixes to single ones.
    fn step2(&mut self) {
        let rules: &[(&str, &str)] = match self.at(self.k - 1) {
            b'a' => &[("ational", "ate"), ("tional", "tion")],
            b'c' => &[("enci", "ence"), ("anci", "ance")],
            b'e' => &[("izer", "ize")],
            b'l' => &[
                ("bli", "ble"),
                ("alli", "al"),
                ("entli", "ent"),
                ("eli", "e"),
                ("ousli", "ous"),
            ],
            b'o' => &[("ization", "ize"), ("ation", "ate"), ("ator", "ate")],
            b's' => &[
                ("alism", "al"),
                ("iveness", "ive"),
                ("fulness", "ful"),
                ("ousness", "ous"),
            ],
            b't' => &[("aliti", "al"), ("iviti", "ive"), ("biliti", "ble")],
            b'g' => &[("logi", "log")],
            _ => &[],
        };
        self.apply_rules(rules);
    }

    /// `-ic-`, `-full`, `-ness` and similar.
    fn step3(&mut self) {
        let rules: &[(&str, &str)] = match self.at(self.k) {
            b'e' => &[("icate", "ic"), ("ative", ""), ("alize", "al")],
            b'i' => &[("iciti", "ic")],
            b'l' => &[("ical", "ic"), ("ful", "")],
            b's' => &[("ness", "")],
            _ => &[],
        };
        self.apply_rules(rules);
    }

    /// `-ant`, `-ence` and similar, in context `<c>vcvc<v>`.
    fn step4(&mut self) {
        let matched = match self.at(self.k - 1) {
            b'a' => self.ends("al"),
            b'c' => self.ends("ance") || self.ends("ence"),
            b'e' => self.ends("er"),
            b'i' => self.ends("ic"),
            b'l' => self.ends("able") || self.ends("ible"),
            b'n' => {
                self.ends("ant") || self.ends("ement") || self.ends("ment") || self.ends("ent")
            },
            b'o' => {
                (self.ends("ion") && self.j >= 0 && matches!(self.at(self.j), b's' | b't'))
                    || self.ends("ou")
            },
            b's' => self.ends("ism"),
            b't' => self.ends("ate") || self.ends("iti"),
            b'u' => self.ends("ous"),
            b'v' => self.ends("ive"),
            b'z' => self.ends("ize"),
            _ => false,
        };
        if matched && self.m() > 1 {
            self.k = self.j;
        }
    }

    /// Final `-e` and `-ll`.
    fn step5(&mut self) {
        self.j = self.k;
        if self.at(self.k) == b'e' {
            let a = self.m();
            if a > 1 || (a == 1 && !self.cvc(self.k - 1)) {
                self.k -= 1;
            }
        }
        if self.at(self.k) == b'l' && self.double_consonant(self.k) && self.m() > 1 {
            self.k -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("caresses", "caress")]
    #[test_case("ponies", "poni")]
    #[test_case("ties", "ti")]
    #[test_case("caress", "caress")]
    #[test_case("cats", "cat")]
    #[test_case("feed", "feed")]
    #[test_case("agreed", "agre")]
    #[test_case("plastered", "plaster")]
    #[test_case("motoring", "motor")]
    #[test_case("sing", "sing")]
    #[test_case("hopping", "hop")]
    #[test_case("filing", "file")]
    #[test_case("happy", "happi")]
    #[test_case("relational", "relat")]
    #[test_case("generalization", "gener")]
    #[test_case("running", "run")]
    #[test_case("hopeful", "hope")]
    #[test_case("controll", "control")]
    fn test_porter_stem(word: &str, expected: &str) {
        assert_eq!(porter_stem(word), expected);
    }

    #[test]
    fn test_short_words_unchanged() {
        assert_eq!(porter_stem("is"), "is");
        assert_eq!(porter_stem("a"), "a");
        assert_eq!(porter_stem(""), "");
    }

    #[test]
    fn test_non_ascii_unchanged() {
        assert_eq!(porter_stem("caf\u{e9}s"), "caf\u{e9}s");
    }

    #[test]
    fn test_digits_do_not_panic() {
        assert_eq!(porter_stem("2023"), "2023");
        assert_eq!(porter_stem("1990s"), "1990");
    }
}
