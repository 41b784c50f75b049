//! Text normalization at the service boundary.
//!
//! Lyrics arrive as free text; the engine works on tokens. These helpers
//! split text into lines and words and reduce a raw word to its token form:
//! NFC, lowercase, surrounding punctuation removed. Internal apostrophes and
//! hyphens survive (`don't`, `x-ray`); a trailing one is outer punctuation,
//! so `runnin'` becomes `runnin`.

use unicode_normalization::UnicodeNormalization;

/// NFC-normalize and trim whitespace.
pub fn normalize(s: &str) -> String {
    s.nfc().collect::<String>().trim().to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Reduce a raw word to a token, or `None` if nothing pronounceable remains.
pub fn normalize_token(raw: &str, strip_affixes: bool) -> Option<String> {
    let lowered = normalize(raw).to_lowercase();
    let trimmed = lowered.trim_matches(|c: char| !is_word_char(c));
    if trimmed.is_empty() {
        return None;
    }
    let token = if strip_affixes {
        strip(trimmed)
    } else {
        trimmed.to_string()
    };
    if token.chars().any(is_word_char) {
        Some(token)
    } else {
        None
    }
}

fn strip(token: &str) -> String {
    if let Some(stem) = token.strip_suffix("'s").or_else(|| token.strip_suffix("’s")) {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    if let Some(stem) = token.strip_suffix("ies") {
        if stem.chars().count() >= 2 {
            return format!("{}y", stem);
        }
    }
    if let Some(stem) = token.strip_suffix('s') {
        let prev = stem.chars().last();
        let consonant = matches!(prev, Some(c) if c.is_alphabetic() && !"aeiousy".contains(c));
        if consonant && stem.chars().count() >= 2 {
            return stem.to_string();
        }
    }
    token.to_string()
}

/// Split text into lines on `\n`, dropping a trailing `\r`.
pub fn tokenize_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(|l| l.trim_end_matches('\r')).collect()
}

/// Split a line into raw words on whitespace and commas.
pub fn tokenize_words(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect()
}

/// The last word of `line` that normalizes to a token.
pub fn last_token(line: &str, strip_affixes: bool) -> Option<String> {
    tokenize_words(line)
        .into_iter()
        .rev()
        .find_map(|w| normalize_token(w, strip_affixes))
}
