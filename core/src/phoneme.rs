//! Phoneme and transcription types.
//!
//! The core is inventory-agnostic: a language crate supplies a [`PhoneSet`]
//! that knows which symbols exist and what their articulatory features are.
//! Everything downstream (syllabification, rhyme keys, similarity) works on
//! the [`Features`] returned by that table.
//!
//! Public API:
//! - `Stress`, `PhoneClass`, `Phoneme`, `Transcription`, `TranscriptionSource`
//! - `RawPronunciation`: what a pronunciation source hands to the transcriber
//! - `PhoneSet` + `Features`: the inventory abstraction

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RhymeError};

/// Lexical stress carried by a phoneme. Consonants are always `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stress {
    None,
    Primary,
    Secondary,
}

impl Stress {
    /// ARPABET-style digit (0 unstressed, 1 primary, 2 secondary).
    pub fn digit(self) -> char {
        match self {
            Stress::None => '0',
            Stress::Primary => '1',
            Stress::Secondary => '2',
        }
    }

    pub fn from_digit(d: char) -> Option<Self> {
        match d {
            '0' => Some(Stress::None),
            '1' => Some(Stress::Primary),
            '2' => Some(Stress::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhoneClass {
    Vowel,
    Consonant,
}

/// Vowel height, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Height {
    Low,
    LowMid,
    Mid,
    HighMid,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backness {
    Front,
    Central,
    Back,
}

/// Place of articulation, ordered front to back of the vocal tract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Place {
    Bilabial,
    Labiodental,
    Dental,
    Alveolar,
    Postalveolar,
    Palatal,
    Velar,
    Glottal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Manner {
    Stop,
    Affricate,
    Fricative,
    Nasal,
    Liquid,
    Glide,
}

/// Articulatory features of a single phoneme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Features {
    Vowel {
        height: Height,
        backness: Backness,
        rounded: bool,
        rhotic: bool,
        diphthong: bool,
    },
    Consonant {
        place: Place,
        manner: Manner,
        voiced: bool,
    },
}

impl Features {
    pub fn class(&self) -> PhoneClass {
        match self {
            Features::Vowel { .. } => PhoneClass::Vowel,
            Features::Consonant { .. } => PhoneClass::Consonant,
        }
    }
}

/// A closed phoneme alphabet with a feature table.
pub trait PhoneSet: Send + Sync {
    /// Short name of the inventory (e.g. "arpabet").
    fn name(&self) -> &str;

    /// Features for a bare symbol (no stress digit), or `None` if the symbol
    /// is not part of this inventory.
    fn features(&self, symbol: &str) -> Option<Features>;

    fn class(&self, symbol: &str) -> Option<PhoneClass> {
        self.features(symbol).map(|f| f.class())
    }
}

/// One phoneme within a transcription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phoneme {
    pub symbol: String,
    pub class: PhoneClass,
    pub stress: Stress,
    /// 0-based syllable index within the word.
    pub syllable: u16,
}

impl Phoneme {
    pub fn new<S: Into<String>>(
        symbol: S,
        class: PhoneClass,
        stress: Stress,
        syllable: u16,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            class,
            stress,
            syllable,
        }
    }

    pub fn is_vowel(&self) -> bool {
        self.class == PhoneClass::Vowel
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_vowel() {
            write!(f, "{}{}", self.symbol, self.stress.digit())
        } else {
            write!(f, "{}", self.symbol)
        }
    }
}

/// Where a transcription came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TranscriptionSource {
    /// Authoritative pronunciation from a lexicon.
    Dictionary,
    /// Best-effort letter-to-sound inference.
    Inferred,
}

/// A non-empty phoneme sequence for one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transcription {
    phonemes: Vec<Phoneme>,
    source: TranscriptionSource,
}

impl Transcription {
    /// Build a transcription. Rejects empty phoneme sequences: an unknown
    /// word has no transcriptions at all, never an empty one.
    pub fn new(phonemes: Vec<Phoneme>, source: TranscriptionSource) -> Result<Self> {
        if phonemes.is_empty() {
            return Err(RhymeError::InvalidInput(
                "transcription must contain at least one phoneme".to_string(),
            ));
        }
        Ok(Self { phonemes, source })
    }

    pub fn phonemes(&self) -> &[Phoneme] {
        &self.phonemes
    }

    pub fn source(&self) -> TranscriptionSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }

    pub fn syllable_count(&self) -> usize {
        self.phonemes.iter().filter(|p| p.is_vowel()).count()
    }

    pub fn last(&self) -> &Phoneme {
        // non-empty by construction
        &self.phonemes[self.phonemes.len() - 1]
    }
}

impl fmt::Display for Transcription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.phonemes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

/// A pronunciation as supplied by a lexicon or rule engine: bare symbols
/// plus a parallel stress pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawPronunciation {
    pub symbols: Vec<String>,
    pub stress: Vec<Stress>,
}

impl RawPronunciation {
    pub fn new(symbols: Vec<String>, stress: Vec<Stress>) -> Self {
        Self { symbols, stress }
    }

    /// Convenience for building from `(symbol, stress)` pairs.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, Stress)]) -> Self {
        Self {
            symbols: pairs.iter().map(|(s, _)| s.as_ref().to_string()).collect(),
            stress: pairs.iter().map(|(_, st)| *st).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Well-formed: non-empty and the stress pattern lines up with the symbols.
    pub fn is_valid(&self) -> bool {
        !self.symbols.is_empty() && self.symbols.len() == self.stress.len()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcription_is_rejected() {
        let err = Transcription::new(vec![], TranscriptionSource::Dictionary).unwrap_err();
        assert!(matches!(err, RhymeError::InvalidInput(_)));
    }

    #[test]
    fn display_uses_stress_digits_on_vowels_only() {
        let t = Transcription::new(
            vec![
                Phoneme::new("K", PhoneClass::Consonant, Stress::None, 0),
                Phoneme::new("AE", PhoneClass::Vowel, Stress::Primary, 0),
                Phoneme::new("T", PhoneClass::Consonant, Stress::None, 0),
            ],
            TranscriptionSource::Dictionary,
        )
        .unwrap();
        assert_eq!(t.to_string(), "K AE1 T");
        assert_eq!(t.syllable_count(), 1);
        assert_eq!(t.last().symbol, "T");
    }

    #[test]
    fn raw_pronunciation_validity() {
        let ok = RawPronunciation::from_pairs(&[("K", Stress::None), ("AE", Stress::Primary)]);
        assert!(ok.is_valid());
        let bad = RawPronunciation::new(vec!["K".into()], vec![]);
        assert!(!bad.is_valid());
    }
}
