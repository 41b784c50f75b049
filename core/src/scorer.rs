//! Graded rhyme similarity.
//!
//! Two rhyme keys are aligned with a weighted Levenshtein distance whose
//! substitution cost comes from articulatory feature distance, so a slant
//! rhyme like "time"/"mind" scores well above "time"/"dog" while neither
//! reaches the 1.0 reserved for identical keys.
//!
//! Score = 1 − cost / (indel_cost × max(len_a, len_b)), clamped to [0, 1].

use std::sync::Arc;

use crate::error::{Result, RhymeError};
use crate::normalizer::{KeyPhone, RhymeKey};
use crate::phoneme::{Backness, Features, Height, Manner, PhoneSet, Place, Transcription};

/// Upper bound for any same-class substitution; only a vowel/consonant swap
/// costs as much as an insertion.
const MAX_SAME_CLASS_COST: f32 = 0.9;
/// Lower bound for a substitution between distinct symbols.
const MIN_SUBSTITUTION_COST: f32 = 0.1;

fn height_rank(h: Height) -> f32 {
    match h {
        Height::Low => 0.0,
        Height::LowMid => 1.0,
        Height::Mid => 2.0,
        Height::HighMid => 3.0,
        Height::High => 4.0,
    }
}

fn backness_rank(b: Backness) -> f32 {
    match b {
        Backness::Front => 0.0,
        Backness::Central => 1.0,
        Backness::Back => 2.0,
    }
}

fn place_rank(p: Place) -> f32 {
    match p {
        Place::Bilabial => 0.0,
        Place::Labiodental => 1.0,
        Place::Dental => 2.0,
        Place::Alveolar => 3.0,
        Place::Postalveolar => 4.0,
        Place::Palatal => 5.0,
        Place::Velar => 6.0,
        Place::Glottal => 7.0,
    }
}

fn manner_cost(a: Manner, b: Manner) -> f32 {
    use Manner::*;
    if a == b {
        return 0.0;
    }
    match (a, b) {
        (Stop, Affricate) | (Affricate, Stop) => 0.15,
        (Affricate, Fricative) | (Fricative, Affricate) => 0.15,
        (Stop, Nasal) | (Nasal, Stop) => 0.2,
        (Liquid, Glide) | (Glide, Liquid) => 0.15,
        _ => 0.3,
    }
}

fn flag(a: bool, b: bool, cost: f32) -> f32 {
    if a != b {
        cost
    } else {
        0.0
    }
}

/// Substitution cost between two feature bundles, in [0, 1].
pub fn feature_distance(a: &Features, b: &Features) -> f32 {
    match (a, b) {
        (
            Features::Vowel {
                height: ha,
                backness: ba,
                rounded: ra,
                rhotic: rha,
                diphthong: da,
            },
            Features::Vowel {
                height: hb,
                backness: bb,
                rounded: rb,
                rhotic: rhb,
                diphthong: db,
            },
        ) => {
            let h = (height_rank(*ha) - height_rank(*hb)).abs() / 4.0;
            let bk = (backness_rank(*ba) - backness_rank(*bb)).abs() / 2.0;
            let d = 0.35 * h
                + 0.35 * bk
                + flag(*ra, *rb, 0.1)
                + flag(*rha, *rhb, 0.1)
                + flag(*da, *db, 0.1);
            d.min(MAX_SAME_CLASS_COST)
        }
        (
            Features::Consonant {
                place: pa,
                manner: ma,
                voiced: va,
            },
            Features::Consonant {
                place: pb,
                manner: mb,
                voiced: vb,
            },
        ) => {
            let p = (place_rank(*pa) - place_rank(*pb)).abs() / 7.0;
            let d = 0.35 * p + manner_cost(*ma, *mb) + flag(*va, *vb, 0.15);
            d.min(MAX_SAME_CLASS_COST)
        }
        _ => 1.0,
    }
}

/// Feature-weighted alignment scorer.
#[derive(Clone)]
pub struct Scorer {
    phones: Arc<dyn PhoneSet>,
    indel_cost: f32,
    stress_mismatch_cost: f32,
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer")
            .field("phones", &self.phones.name())
            .field("indel_cost", &self.indel_cost)
            .field("stress_mismatch_cost", &self.stress_mismatch_cost)
            .finish()
    }
}

impl Scorer {
    pub fn new(phones: Arc<dyn PhoneSet>, indel_cost: f32, stress_mismatch_cost: f32) -> Self {
        Self {
            phones,
            // a zero indel cost would make every score 1.0 or undefined
            indel_cost: indel_cost.max(f32::EPSILON),
            // differing keys must never reach 1.0
            stress_mismatch_cost: stress_mismatch_cost.clamp(MIN_SUBSTITUTION_COST, 1.0),
        }
    }

    pub fn phones(&self) -> &Arc<dyn PhoneSet> {
        &self.phones
    }

    /// Cost of replacing `a` with `b`.
    fn substitution_cost(&self, a: &KeyPhone, b: &KeyPhone) -> f32 {
        if a.symbol == b.symbol {
            return if a.stress == b.stress {
                0.0
            } else {
                self.stress_mismatch_cost * self.indel_cost
            };
        }
        let raw = match (self.phones.features(&a.symbol), self.phones.features(&b.symbol)) {
            (Some(fa), Some(fb)) => feature_distance(&fa, &fb).max(MIN_SUBSTITUTION_COST),
            _ if a.class != b.class => 1.0,
            _ => MAX_SAME_CLASS_COST,
        };
        raw * self.indel_cost
    }

    fn alignment_cost(&self, a: &[KeyPhone], b: &[KeyPhone]) -> f32 {
        let n = a.len();
        let m = b.len();
        let mut prev: Vec<f32> = (0..=m).map(|j| j as f32 * self.indel_cost).collect();
        let mut cur = vec![0.0_f32; m + 1];
        for i in 1..=n {
            cur[0] = i as f32 * self.indel_cost;
            for j in 1..=m {
                let del = prev[j] + self.indel_cost;
                let ins = cur[j - 1] + self.indel_cost;
                let sub = prev[j - 1] + self.substitution_cost(&a[i - 1], &b[j - 1]);
                cur[j] = del.min(ins).min(sub);
            }
            std::mem::swap(&mut prev, &mut cur);
        }
        prev[m]
    }

    fn similarity(&self, a: &[KeyPhone], b: &[KeyPhone]) -> f32 {
        let longest = a.len().max(b.len()) as f32;
        let cost = self.alignment_cost(a, b);
        (1.0 - cost / (self.indel_cost * longest)).clamp(0.0, 1.0)
    }

    /// Similarity of two rhyme keys; empty keys are rejected.
    pub fn try_score_keys(&self, a: &RhymeKey, b: &RhymeKey) -> Result<f32> {
        if a.is_empty() || b.is_empty() {
            return Err(RhymeError::InvalidInput(
                "cannot score an empty rhyme key".to_string(),
            ));
        }
        if a == b {
            return Ok(1.0);
        }
        Ok(self.similarity(a.phones(), b.phones()))
    }

    /// Similarity of two rhyme keys. Keys produced by `normalize` are never
    /// empty; an empty key scores 0.0.
    pub fn score_keys(&self, a: &RhymeKey, b: &RhymeKey) -> f32 {
        self.try_score_keys(a, b).unwrap_or(0.0)
    }

    /// Whole-word similarity, stress included, for finer ranking.
    pub fn score_transcriptions(&self, a: &Transcription, b: &Transcription) -> f32 {
        let to_units = |t: &Transcription| -> Vec<KeyPhone> {
            t.phonemes()
                .iter()
                .map(|p| KeyPhone {
                    symbol: p.symbol.clone(),
                    class: p.class,
                    stress: p.stress,
                })
                .collect()
        };
        let ua = to_units(a);
        let ub = to_units(b);
        if ua == ub {
            return 1.0;
        }
        self.similarity(&ua, &ub)
    }
}
