//! Rhyme-region extraction.
//!
//! A word's rhyming region runs from the vowel nucleus of its last
//! primary-stressed syllable to the end of the word. `normalize` cuts that
//! region out of a transcription, filters stress according to the active
//! configuration, and returns it as a [`RhymeKey`]. Two transcriptions with
//! equal keys are perfect rhymes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::phoneme::{PhoneClass, Phoneme, Stress, Transcription};

/// Which stress marks take part in key equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StressSensitivity {
    /// Stress is dropped entirely.
    #[default]
    Ignore,
    /// Only primary stress is kept; secondary collapses to none.
    PrimaryOnly,
    /// Primary and secondary stress are both kept.
    Full,
}

impl StressSensitivity {
    fn filter(self, stress: Stress) -> Stress {
        match (self, stress) {
            (StressSensitivity::Ignore, _) => Stress::None,
            (StressSensitivity::PrimaryOnly, Stress::Primary) => Stress::Primary,
            (StressSensitivity::PrimaryOnly, _) => Stress::None,
            (StressSensitivity::Full, s) => s,
        }
    }
}

/// How many trailing syllables must fall inside the rhyming region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SyllableWindow {
    /// Masculine rhyme: anchored on the final stressed syllable.
    #[default]
    Single,
    /// Feminine rhyme: at least the last two syllables participate.
    Double,
}

impl SyllableWindow {
    pub fn syllables(self) -> usize {
        match self {
            SyllableWindow::Single => 1,
            SyllableWindow::Double => 2,
        }
    }
}

impl TryFrom<u8> for SyllableWindow {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(SyllableWindow::Single),
            2 => Ok(SyllableWindow::Double),
            other => Err(format!("syllable_window must be 1 or 2, got {}", other)),
        }
    }
}

impl From<SyllableWindow> for u8 {
    fn from(w: SyllableWindow) -> u8 {
        w.syllables() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub stress_sensitivity: StressSensitivity,
    pub syllable_window: SyllableWindow,
}

/// One phoneme of a rhyme key, with stress already filtered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyPhone {
    pub symbol: String,
    pub class: PhoneClass,
    pub stress: Stress,
}

/// Canonical form of a rhyming region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RhymeKey {
    phones: Vec<KeyPhone>,
    /// Whether stress digits were retained (controls `Display` only).
    stressed: bool,
}

impl RhymeKey {
    pub fn phones(&self) -> &[KeyPhone] {
        &self.phones
    }

    pub fn len(&self) -> usize {
        self.phones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
    }

    /// Final symbol of the region, used as the coarse nearest-neighbour filter.
    pub fn final_symbol(&self) -> Option<&str> {
        self.phones.last().map(|p| p.symbol.as_str())
    }
}

impl fmt::Display for RhymeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.phones.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&p.symbol)?;
            if self.stressed && p.class == PhoneClass::Vowel {
                write!(f, "{}", p.stress.digit())?;
            }
        }
        Ok(())
    }
}

/// Onset / nucleus / coda grouping of one syllable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable<'a> {
    pub onset: Vec<&'a Phoneme>,
    pub nucleus: Option<&'a Phoneme>,
    pub coda: Vec<&'a Phoneme>,
}

/// Group a transcription's phonemes by their syllable index.
pub fn syllabify(t: &Transcription) -> Vec<Syllable<'_>> {
    let mut out: Vec<Syllable<'_>> = Vec::new();
    for p in t.phonemes() {
        let idx = p.syllable as usize;
        while out.len() <= idx {
            out.push(Syllable {
                onset: Vec::new(),
                nucleus: None,
                coda: Vec::new(),
            });
        }
        let syl = &mut out[idx];
        if p.is_vowel() && syl.nucleus.is_none() {
            syl.nucleus = Some(p);
        } else if syl.nucleus.is_none() {
            syl.onset.push(p);
        } else {
            syl.coda.push(p);
        }
    }
    out
}

/// Index of the first phoneme of the rhyming region.
fn region_start(t: &Transcription, window: SyllableWindow) -> usize {
    let phonemes = t.phonemes();
    let nuclei: Vec<usize> = phonemes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_vowel())
        .map(|(i, _)| i)
        .collect();

    let Some(&last_nucleus) = nuclei.last() else {
        // No vowel at all (e.g. "hmm"): the final phoneme stands in.
        return phonemes.len() - 1;
    };

    let anchor = nuclei
        .iter()
        .rev()
        .copied()
        .find(|&i| phonemes[i].stress == Stress::Primary)
        .unwrap_or(last_nucleus);

    let wanted = window.syllables().min(nuclei.len());
    let window_start = nuclei[nuclei.len() - wanted];
    anchor.min(window_start)
}

/// Derive the rhyme key of a transcription.
pub fn normalize(t: &Transcription, config: &NormalizerConfig) -> RhymeKey {
    let start = region_start(t, config.syllable_window);
    let phones = t.phonemes()[start..]
        .iter()
        .map(|p| KeyPhone {
            symbol: p.symbol.clone(),
            class: p.class,
            stress: config.stress_sensitivity.filter(p.stress),
        })
        .collect();
    RhymeKey {
        phones,
        stressed: config.stress_sensitivity != StressSensitivity::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::TranscriptionSource;

    fn t(spec: &str) -> Transcription {
        // "K AE1 T|0 0 0" style: symbols with digits, syllable indices after '|'
        let (syms, syls) = spec.split_once('|').unwrap();
        let sy: Vec<u16> = syls.split_whitespace().map(|s| s.parse().unwrap()).collect();
        let phonemes = syms
            .split_whitespace()
            .zip(sy)
            .map(|(tok, syl)| match tok.chars().last().and_then(Stress::from_digit) {
                Some(st) => Phoneme::new(&tok[..tok.len() - 1], PhoneClass::Vowel, st, syl),
                None => Phoneme::new(tok, PhoneClass::Consonant, Stress::None, syl),
            })
            .collect();
        Transcription::new(phonemes, TranscriptionSource::Dictionary).unwrap()
    }

    #[test]
    fn masculine_region_from_last_primary_stress() {
        let cfg = NormalizerConfig::default();
        assert_eq!(normalize(&t("K AE1 T|0 0 0"), &cfg).to_string(), "AE T");
        // water: W AO1 . T ER0 -> region spans both syllables
        assert_eq!(normalize(&t("W AO1 T ER0|0 0 1 1"), &cfg).to_string(), "AO T ER");
    }

    #[test]
    fn feminine_window_pulls_region_back() {
        let cfg = NormalizerConfig {
            syllable_window: SyllableWindow::Double,
            ..Default::default()
        };
        // recall: R IH0 . K AO1 L
        assert_eq!(
            normalize(&t("R IH0 K AO1 L|0 0 1 1 1"), &cfg).to_string(),
            "IH K AO L"
        );
        // a single syllable cannot widen further
        assert_eq!(normalize(&t("K AE1 T|0 0 0"), &cfg).to_string(), "AE T");
    }

    #[test]
    fn unstressed_words_anchor_on_last_vowel() {
        let cfg = NormalizerConfig::default();
        assert_eq!(normalize(&t("DH AH0|0 0"), &cfg).to_string(), "AH");
        assert_eq!(normalize(&t("HH M|0 0"), &cfg).to_string(), "M");
    }

    #[test]
    fn stress_sensitivity_filters_marks() {
        // overtime: OW1 . V ER0 . T AY2 M
        let word = t("OW1 V ER0 T AY2 M|0 1 1 2 2 2");
        let full = NormalizerConfig {
            stress_sensitivity: StressSensitivity::Full,
            ..Default::default()
        };
        let primary = NormalizerConfig {
            stress_sensitivity: StressSensitivity::PrimaryOnly,
            ..Default::default()
        };
        assert_eq!(normalize(&word, &full).to_string(), "OW1 V ER0 T AY2 M");
        assert_eq!(normalize(&word, &primary).to_string(), "OW1 V ER0 T AY0 M");
        assert_eq!(
            normalize(&word, &NormalizerConfig::default()).to_string(),
            "OW V ER T AY M"
        );
    }

    #[test]
    fn normalize_is_deterministic() {
        let cfg = NormalizerConfig::default();
        let word = t("M AY1 N D|0 0 0 0");
        assert_eq!(normalize(&word, &cfg), normalize(&word, &cfg));
        assert_eq!(normalize(&word, &cfg).final_symbol(), Some("D"));
    }

    #[test]
    fn syllabify_groups_onset_nucleus_coda() {
        let word = t("W AO1 T ER0|0 0 1 1");
        let syls = syllabify(&word);
        assert_eq!(syls.len(), 2);
        assert_eq!(syls[0].onset[0].symbol, "W");
        assert_eq!(syls[0].nucleus.map(|p| p.symbol.as_str()), Some("AO"));
        assert_eq!(syls[1].onset[0].symbol, "T");
        assert!(syls[1].coda.is_empty());
    }

    #[test]
    fn syllable_window_toml_values() {
        #[derive(Deserialize)]
        struct W {
            w: SyllableWindow,
        }
        let ok: W = toml::from_str("w = 2").unwrap();
        assert_eq!(ok.w, SyllableWindow::Double);
        assert!(toml::from_str::<W>("w = 3").is_err());
    }
}
