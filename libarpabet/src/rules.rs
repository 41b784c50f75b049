// libarpabet/src/rules.rs
//
// Letter-to-sound fallback for words the dictionary lacks.
//
// Greedy left-to-right grapheme matching: multi-letter units (trigraphs,
// consonant digraphs, vowel teams, r-coloured vowels) are tried before
// single letters. The output is a rough guess, good enough to place slang
// and misspellings near their real rhymes; it is tagged `Inferred` so
// callers can tell it apart from dictionary pronunciations.

use librhyme_core::{PronunciationSource, RawPronunciation, Stress, TranscriptionSource};

use crate::inventory::Arpabet;

const TEAMS: &[(&[u8], &[&str])] = &[
    (b"ck", &["K"]),
    (b"sh", &["SH"]),
    (b"ch", &["CH"]),
    (b"th", &["TH"]),
    (b"ph", &["F"]),
    (b"ng", &["NG"]),
    (b"qu", &["K", "W"]),
    (b"wh", &["W"]),
    (b"ee", &["IY"]),
    (b"ea", &["IY"]),
    (b"oo", &["UW"]),
    (b"ou", &["AW"]),
    (b"ow", &["OW"]),
    (b"ai", &["EY"]),
    (b"ay", &["EY"]),
    (b"oi", &["OY"]),
    (b"oy", &["OY"]),
    (b"au", &["AO"]),
    (b"aw", &["AO"]),
];

const R_COLOURED: &[(u8, &[&str])] = &[
    (b'a', &["AA", "R"]),
    (b'o', &["AO", "R"]),
    (b'e', &["ER"]),
    (b'i', &["ER"]),
    (b'u', &["ER"]),
];

fn is_vowel_letter(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn softens(next: Option<u8>) -> bool {
    matches!(next, Some(b'e' | b'i' | b'y'))
}

fn short_vowel(c: u8) -> &'static str {
    match c {
        b'a' => "AE",
        b'e' => "EH",
        b'i' => "IH",
        b'o' => "AA",
        _ => "AH",
    }
}

fn long_vowel(c: u8) -> &'static str {
    match c {
        b'a' => "EY",
        b'e' => "IY",
        b'i' => "AY",
        b'o' => "OW",
        _ => "UW",
    }
}

fn consonant(w: &[u8], i: usize) -> &'static [&'static str] {
    let next = w.get(i + 1).copied();
    match w[i] {
        b'b' => &["B"],
        b'c' if softens(next) => &["S"],
        b'c' => &["K"],
        b'd' => &["D"],
        b'f' => &["F"],
        b'g' if i > 0 && softens(next) => &["JH"],
        b'g' => &["G"],
        b'h' => &["HH"],
        b'j' => &["JH"],
        b'k' | b'q' => &["K"],
        b'l' => &["L"],
        b'm' => &["M"],
        b'n' => &["N"],
        b'p' => &["P"],
        b'r' => &["R"],
        b's' => &["S"],
        b't' => &["T"],
        b'v' => &["V"],
        b'w' => &["W"],
        b'x' if i == 0 => &["Z"],
        b'x' => &["K", "S"],
        b'z' => &["Z"],
        _ => &[],
    }
}

/// Spell out a word as unstressed ARPABET symbols.
pub fn spell_out(word: &str) -> Vec<&'static str> {
    let w: Vec<u8> = word
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_lowercase())
        .collect();
    let n = w.len();
    let vowel_letters = w.iter().filter(|c| is_vowel_letter(**c)).count();
    let mut out: Vec<&'static str> = Vec::with_capacity(n);
    let mut i = 0;

    while i < n {
        let rest = &w[i..];
        let c = w[i];
        let next = w.get(i + 1).copied();

        if rest == b"tion" || rest == b"sion" {
            out.extend(["SH", "AH", "N"]);
            break;
        }
        if rest.starts_with(b"igh") {
            out.push("AY");
            i += 3;
            continue;
        }
        if rest.starts_with(b"tch") {
            out.push("CH");
            i += 3;
            continue;
        }
        if i == 0 && (rest.starts_with(b"kn") || rest.starts_with(b"wr")) {
            out.push(if c == b'k' { "N" } else { "R" });
            i += 2;
            continue;
        }
        if let Some((team, phones)) = TEAMS.iter().find(|(team, _)| rest.starts_with(team)) {
            out.extend_from_slice(phones);
            i += team.len();
            continue;
        }
        if next == Some(b'r') && !w.get(i + 2).copied().is_some_and(is_vowel_letter) {
            if let Some((_, phones)) = R_COLOURED.iter().find(|(v, _)| *v == c) {
                out.extend_from_slice(phones);
                i += 2;
                continue;
            }
        }

        if is_vowel_letter(c) {
            if c == b'e' && i == n - 1 {
                // silent unless it is the only vowel ("be", "he")
                if vowel_letters == 1 {
                    out.push("IY");
                }
                i += 1;
                continue;
            }
            let magic_e = i + 2 == n - 1
                && w[n - 1] == b'e'
                && !is_vowel_letter(w[i + 1])
                && !matches!(w[i + 1], b'w' | b'x' | b'y');
            out.push(if magic_e { long_vowel(c) } else { short_vowel(c) });
            i += 1;
            continue;
        }

        if c == b'y' {
            let sym = if i == 0 {
                "Y"
            } else if i == n - 1 {
                if vowel_letters == 0 {
                    "AY"
                } else {
                    "IY"
                }
            } else if next.is_some_and(is_vowel_letter) {
                "Y"
            } else {
                "IH"
            };
            out.push(sym);
            i += 1;
            continue;
        }

        if i > 0 && w[i - 1] == c {
            i += 1;
            continue;
        }
        out.extend_from_slice(consonant(&w, i));
        i += 1;
    }
    out
}

/// Index of the vowel that takes primary stress.
fn stressed_vowel(word: &str, vowels: &[usize]) -> Option<usize> {
    let suffix_stress = word.ends_with("tion") || word.ends_with("sion") || word.ends_with("ic");
    match vowels.len() {
        0 => None,
        n if suffix_stress && n >= 2 => Some(vowels[n - 2]),
        _ => Some(vowels[0]),
    }
}

/// Infer a pronunciation, or `None` when the word has no ASCII letter.
pub fn infer(word: &str) -> Option<RawPronunciation> {
    let word = word.trim().to_ascii_lowercase();
    if !word.bytes().any(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let phones = spell_out(&word);
    if phones.is_empty() {
        return None;
    }
    let vowels: Vec<usize> = phones
        .iter()
        .enumerate()
        .filter(|(_, p)| Arpabet::is_vowel(p))
        .map(|(i, _)| i)
        .collect();
    let primary = stressed_vowel(&word, &vowels);
    let stress = (0..phones.len())
        .map(|i| if Some(i) == primary { Stress::Primary } else { Stress::None })
        .collect();
    Some(RawPronunciation::new(
        phones.into_iter().map(str::to_string).collect(),
        stress,
    ))
}

/// Rule-based pronunciation source.
#[derive(Debug, Clone, Copy, Default)]
pub struct LetterToSound;

impl PronunciationSource for LetterToSound {
    fn source_kind(&self) -> TranscriptionSource {
        TranscriptionSource::Inferred
    }

    fn pronunciations(&self, token: &str) -> Vec<RawPronunciation> {
        infer(token).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(word: &str) -> String {
        let raw = infer(word).unwrap();
        raw.symbols
            .iter()
            .zip(raw.stress.iter())
            .map(|(s, st)| {
                if Arpabet::is_vowel(s) {
                    format!("{}{}", s, st.digit())
                } else {
                    s.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_vowels_and_consonants() {
        assert_eq!(show("cat"), "K AE1 T");
        assert_eq!(show("zat"), "Z AE1 T");
        assert_eq!(show("box"), "B AA1 K S");
        assert_eq!(show("butter"), "B AH1 T ER0");
    }

    #[test]
    fn digraphs_and_teams() {
        assert_eq!(show("night"), "N AY1 T");
        assert_eq!(show("knight"), "N AY1 T");
        assert_eq!(show("queen"), "K W IY1 N");
        assert_eq!(show("yeet"), "Y IY1 T");
        assert_eq!(show("shawty"), "SH AO1 T IY0");
    }

    #[test]
    fn magic_e_and_silent_e() {
        assert_eq!(show("time"), "T AY1 M");
        assert_eq!(show("flame"), "F L EY1 M");
        assert_eq!(show("be"), "B IY1");
        assert_eq!(show("drizzle"), "D R IH1 Z L");
    }

    #[test]
    fn final_y() {
        assert_eq!(show("my"), "M AY1");
        assert_eq!(show("city"), "S IH1 T IY0");
    }

    #[test]
    fn r_coloured_vowels() {
        assert_eq!(show("car"), "K AA1 R");
        assert_eq!(show("bird"), "B ER1 D");
    }

    #[test]
    fn suffix_stress() {
        assert_eq!(show("nation"), "N AE1 SH AH0 N");
        assert_eq!(show("music"), "M AH1 S IH0 K");
        assert_eq!(show("basic"), "B AE1 S IH0 K");
    }

    #[test]
    fn dropped_g_slang() {
        assert_eq!(show("runnin'"), "R AH1 N IH0 N");
        assert_eq!(show("runnin"), show("runnin'"));
    }

    #[test]
    fn refuses_non_alphabetic() {
        assert!(infer("1234").is_none());
        assert!(infer("").is_none());
        assert!(LetterToSound.pronunciations("...").is_empty());
        assert_eq!(LetterToSound.pronunciations("skrrt").len(), 1);
    }
}
