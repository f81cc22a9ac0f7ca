// src/score.rs
//! Typing-load scoring and difficulty bands.
//!
//! Punctuation is not typed in the target game, so every score works on the
//! text with non-word, non-space characters removed.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::sanitize::normalize_ws;

static NON_TYPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static regex"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("static regex"));

/// Text as typed: punctuation stripped, whitespace collapsed, trimmed.
pub fn normalize_typed(text: &str) -> String {
    normalize_ws(&NON_TYPED.replace_all(text, ""))
}

/// `(typed_chars, words)` of a text.
pub fn score_text(text: &str) -> (usize, usize) {
    let typed = normalize_typed(text);
    (typed.chars().count(), WORD.find_iter(&typed).count())
}

pub fn words_of(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

/// Tertile cut points, inclusive method: the data is treated as the whole
/// population, so the cuts never leave `[min, max]`.
/// `None` for empty input; one value yields that value twice.
pub fn quantiles3(sorted: &[usize]) -> Option<(f64, f64)> {
    match sorted {
        [] => None,
        [only] => Some((*only as f64, *only as f64)),
        _ => {
            let m = sorted.len() - 1;
            let cut = |i: usize| {
                let j = i * m / 3;
                let delta = (i * m - j * 3) as f64;
                (sorted[j] as f64 * (3.0 - delta) + sorted[j + 1] as f64 * delta) / 3.0
            };
            Some((cut(1), cut(2)))
        }
    }
}

/* ---------------- Bands ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandRange {
    pub name: &'static str,
    /// Inclusive `(min, max)` of typed characters.
    pub chars: (usize, usize),
    /// Inclusive `(min, max)` of words.
    pub words: (usize, usize),
}

impl BandRange {
    pub fn contains(&self, typed_chars: usize, words: usize) -> bool {
        (self.chars.0..=self.chars.1).contains(&typed_chars)
            && (self.words.0..=self.words.1).contains(&words)
    }
}

/// Bands cut at the baseline's tertiles. The hard band is open a little past
/// the baseline maximum. `None` when `paragraphs` is empty.
pub fn baseline_bands(paragraphs: &[String]) -> Option<[BandRange; 3]> {
    let (mut chars, mut words): (Vec<usize>, Vec<usize>) =
        paragraphs.iter().map(|p| score_text(p)).unzip();
    chars.sort_unstable();
    words.sort_unstable();

    let (c1, c2) = quantiles3(&chars)?;
    let (w1, w2) = quantiles3(&words)?;
    let (c1, c2, w1, w2) = (c1 as usize, c2 as usize, w1 as usize, w2 as usize);
    let (cmin, cmax) = (chars[0], chars[chars.len() - 1]);
    let (wmin, wmax) = (words[0], words[words.len() - 1]);

    Some([
        BandRange { name: "easy", chars: (cmin, c1), words: (wmin, w1) },
        BandRange { name: "medium", chars: (c1 + 1, c2), words: (w1 + 1, w2) },
        BandRange { name: "hard", chars: (c2 + 1, cmax + 80), words: (w2 + 1, wmax + 20) },
    ])
}

/// Fixed bands used when no baseline file is given.
pub fn default_bands() -> [BandRange; 3] {
    [
        BandRange { name: "easy", chars: (1, 220), words: (1, 45) },
        BandRange { name: "medium", chars: (221, 420), words: (46, 85) },
        BandRange { name: "hard", chars: (421, 800), words: (86, 160) },
    ]
}
