// libarpabet/src/inventory.rs
//
// The 39-phoneme ARPABET inventory used by the CMU pronouncing dictionary.
// Articulatory features drive the similarity scorer; the IPA table is for
// display only.

use librhyme_core::{
    Backness, Features, Height, Manner, PhoneSet, Place, RawPronunciation, Stress, Transcription,
};

const fn vowel(height: Height, backness: Backness, rounded: bool, diphthong: bool) -> Features {
    Features::Vowel {
        height,
        backness,
        rounded,
        rhotic: false,
        diphthong,
    }
}

const fn cons(place: Place, manner: Manner, voiced: bool) -> Features {
    Features::Consonant {
        place,
        manner,
        voiced,
    }
}

/// Symbol -> articulatory features.
static FEATURES: phf::Map<&'static str, Features> = phf::phf_map! {
    // Monophthongs
    "IY" => vowel(Height::High, Backness::Front, false, false),
    "IH" => vowel(Height::HighMid, Backness::Front, false, false),
    "EH" => vowel(Height::LowMid, Backness::Front, false, false),
    "AE" => vowel(Height::Low, Backness::Front, false, false),
    "AH" => vowel(Height::Mid, Backness::Central, false, false),
    "AA" => vowel(Height::Low, Backness::Back, false, false),
    "AO" => vowel(Height::LowMid, Backness::Back, true, false),
    "UH" => vowel(Height::HighMid, Backness::Back, true, false),
    "UW" => vowel(Height::High, Backness::Back, true, false),
    "ER" => Features::Vowel {
        height: Height::Mid,
        backness: Backness::Central,
        rounded: false,
        rhotic: true,
        diphthong: false,
    },
    // Diphthongs, placed at their onset
    "EY" => vowel(Height::Mid, Backness::Front, false, true),
    "AY" => vowel(Height::Low, Backness::Central, false, true),
    "AW" => vowel(Height::Low, Backness::Central, true, true),
    "OW" => vowel(Height::Mid, Backness::Back, true, true),
    "OY" => vowel(Height::LowMid, Backness::Back, true, true),
    // Stops
    "P" => cons(Place::Bilabial, Manner::Stop, false),
    "B" => cons(Place::Bilabial, Manner::Stop, true),
    "T" => cons(Place::Alveolar, Manner::Stop, false),
    "D" => cons(Place::Alveolar, Manner::Stop, true),
    "K" => cons(Place::Velar, Manner::Stop, false),
    "G" => cons(Place::Velar, Manner::Stop, true),
    // Affricates
    "CH" => cons(Place::Postalveolar, Manner::Affricate, false),
    "JH" => cons(Place::Postalveolar, Manner::Affricate, true),
    // Fricatives
    "F" => cons(Place::Labiodental, Manner::Fricative, false),
    "V" => cons(Place::Labiodental, Manner::Fricative, true),
    "TH" => cons(Place::Dental, Manner::Fricative, false),
    "DH" => cons(Place::Dental, Manner::Fricative, true),
    "S" => cons(Place::Alveolar, Manner::Fricative, false),
    "Z" => cons(Place::Alveolar, Manner::Fricative, true),
    "SH" => cons(Place::Postalveolar, Manner::Fricative, false),
    "ZH" => cons(Place::Postalveolar, Manner::Fricative, true),
    "HH" => cons(Place::Glottal, Manner::Fricative, false),
    // Nasals
    "M" => cons(Place::Bilabial, Manner::Nasal, true),
    "N" => cons(Place::Alveolar, Manner::Nasal, true),
    "NG" => cons(Place::Velar, Manner::Nasal, true),
    // Approximants
    "L" => cons(Place::Alveolar, Manner::Liquid, true),
    "R" => cons(Place::Postalveolar, Manner::Liquid, true),
    "W" => cons(Place::Bilabial, Manner::Glide, true),
    "Y" => cons(Place::Palatal, Manner::Glide, true),
};

/// Symbol -> IPA (stressed or consonant form).
static IPA: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "AA" => "ɑ", "AE" => "æ", "AH" => "ʌ", "AO" => "ɔ", "AW" => "aʊ",
    "AY" => "aɪ", "EH" => "ɛ", "ER" => "ɝ", "EY" => "eɪ", "IH" => "ɪ",
    "IY" => "i", "OW" => "oʊ", "OY" => "ɔɪ", "UH" => "ʊ", "UW" => "u",
    "B" => "b", "CH" => "tʃ", "D" => "d", "DH" => "ð", "F" => "f",
    "G" => "ɡ", "HH" => "h", "JH" => "dʒ", "K" => "k", "L" => "l",
    "M" => "m", "N" => "n", "NG" => "ŋ", "P" => "p", "R" => "ɹ",
    "S" => "s", "SH" => "ʃ", "T" => "t", "TH" => "θ", "V" => "v",
    "W" => "w", "Y" => "j", "Z" => "z", "ZH" => "ʒ",
};

/// The ARPABET phone set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arpabet;

impl Arpabet {
    /// All symbols, sorted.
    pub fn symbols() -> Vec<&'static str> {
        let mut out: Vec<&'static str> = FEATURES.keys().copied().collect();
        out.sort_unstable();
        out
    }

    pub fn contains(symbol: &str) -> bool {
        FEATURES.contains_key(symbol)
    }

    pub fn is_vowel(symbol: &str) -> bool {
        matches!(FEATURES.get(symbol), Some(Features::Vowel { .. }))
    }
}

impl PhoneSet for Arpabet {
    fn name(&self) -> &str {
        "arpabet"
    }

    fn features(&self, symbol: &str) -> Option<Features> {
        FEATURES.get(symbol).copied()
    }
}

/// Split `AE1` into (`AE`, Primary). Consonants carry no digit.
pub fn parse_phone(token: &str) -> Option<(&'static str, Stress)> {
    let token = token.trim();
    let (base, stress) = match token.chars().last() {
        Some(d) if d.is_ascii_digit() => (&token[..token.len() - 1], Stress::from_digit(d)?),
        Some(_) => (token, Stress::None),
        None => return None,
    };
    let upper = base.to_ascii_uppercase();
    let (symbol, _) = FEATURES.get_entry(upper.as_str())?;
    Some((*symbol, stress))
}

/// Parse a space-separated pronunciation such as `K AE1 T`.
pub fn parse_pronunciation(s: &str) -> Option<RawPronunciation> {
    let mut symbols = Vec::new();
    let mut stress = Vec::new();
    for tok in s.split_whitespace() {
        let (sym, st) = parse_phone(tok)?;
        symbols.push(sym.to_string());
        stress.push(st);
    }
    let raw = RawPronunciation::new(symbols, stress);
    if raw.is_valid() {
        Some(raw)
    } else {
        None
    }
}

/// Render a transcription as IPA, with `ˈ`/`ˌ` before stressed syllables.
pub fn to_ipa(t: &Transcription) -> String {
    let phonemes = t.phonemes();
    let mut out = String::new();
    let mut current: Option<u16> = None;
    for p in phonemes.iter() {
        if current != Some(p.syllable) {
            current = Some(p.syllable);
            let nucleus = phonemes
                .iter()
                .find(|q| q.syllable == p.syllable && q.is_vowel())
                .map(|q| q.stress);
            match nucleus {
                Some(Stress::Primary) => out.push('ˈ'),
                Some(Stress::Secondary) => out.push('ˌ'),
                _ => {}
            }
        }
        let ipa = match (p.symbol.as_str(), p.stress) {
            ("AH", Stress::None) => "ə",
            ("ER", Stress::None) => "ɚ",
            (sym, _) => IPA.get(sym).copied().unwrap_or("?"),
        };
        out.push_str(ipa);
    }
    out
}
