use unicode_normalization::UnicodeNormalization;

const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Folds a guess for comparison: lowercase, canonical decomposition, combining
/// diacritics removed, surrounding whitespace trimmed.
///
/// Letters that are distinct code points rather than decomposable accents
/// (`ø`, `æ`) are kept as-is.
pub fn normalize_guess(raw: &str) -> String {
    raw.to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn guesses_match(a: &str, b: &str) -> bool {
    normalize_guess(a) == normalize_guess(b)
}
