use std::cmp::Ordering;

/// Letters in Turkish alphabetical order, with q, w and x slotted in where
/// Turkish collation places them.
const TURKISH_ALPHABET: [char; 32] = [
    'a', 'b', 'c', 'ç', 'd', 'e', 'f', 'g', 'ğ', 'h', 'ı', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'ö', 'p', 'q', 'r', 's', 'ş', 't', 'u', 'ü', 'v', 'w', 'x', 'y', 'z',
];

/// Lowercases text for case-insensitive matching.
///
/// `İ` folds to a plain `i` so that "MİKRO" and "mikro" match.
pub fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        if c == 'İ' {
            folded.push('i');
        } else {
            folded.extend(c.to_lowercase());
        }
    }
    folded
}

// Turkish lowercase of a single char: I -> ı, İ -> i.
fn turkish_lower(c: char) -> char {
    match c {
        'I' => 'ı',
        'İ' => 'i',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

/// Primary collation weight: punctuation and spaces, then digits, then
/// letters of the alphabet, then everything else by code point.
fn primary_weight(c: char) -> (u8, u32) {
    let lower = turkish_lower(c);
    if let Some(pos) = TURKISH_ALPHABET.iter().position(|&l| l == lower) {
        return (2, pos as u32);
    }
    if let Some(digit) = lower.to_digit(10) {
        return (1, digit);
    }
    if lower.is_whitespace() || lower.is_ascii_punctuation() {
        return (0, lower as u32);
    }
    (3, lower as u32)
}

// Lowercase sorts before uppercase on otherwise equal text.
fn case_weight(c: char) -> u8 {
    u8::from(c.is_uppercase())
}

/// Compares two titles the way a Turkish-locale collator does.
///
/// Letters are ordered by the Turkish alphabet (`c < ç < d`, `ı < i`)
/// ignoring case; only when that ties does case decide, lowercase first.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight));
    if primary != Ordering::Equal {
        return primary;
    }

    a.chars().map(case_weight).cmp(b.chars().map(case_weight))
}
