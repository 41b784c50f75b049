//! Ranked rhyme candidates.
//!
//! This module provides:
//! - `RhymeMatch`: a candidate token with its similarity score
//! - `rank`: the deterministic ordering used everywhere results are listed

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single rhyme candidate.
///
/// `score` is in [0, 1]; 1.0 means the candidate shares the query's rhyme key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhymeMatch {
    pub token: String,
    pub score: f32,
    /// Phoneme count of the candidate's transcription (ranking tie-break).
    pub length: usize,
}

impl RhymeMatch {
    pub fn new<T: Into<String>>(token: T, score: f32, length: usize) -> Self {
        RhymeMatch {
            token: token.into(),
            score,
            length,
        }
    }

    /// True when the candidate is a perfect rhyme (same rhyme key).
    pub fn is_perfect(&self) -> bool {
        self.score >= 1.0
    }
}

/// Ordering for candidates of a query whose transcription has `query_len`
/// phonemes: higher score first, then smaller length difference to the
/// query, then surface form ascending.
pub fn compare(a: &RhymeMatch, b: &RhymeMatch, query_len: usize) -> Ordering {
    match b.score.partial_cmp(&a.score) {
        Some(Ordering::Equal) | None => {
            let da = a.length.abs_diff(query_len);
            let db = b.length.abs_diff(query_len);
            da.cmp(&db).then_with(|| a.token.cmp(&b.token))
        }
        Some(ordering) => ordering,
    }
}

/// Sort candidates in place by [`compare`].
pub fn rank(candidates: &mut [RhymeMatch], query_len: usize) {
    candidates.sort_by(|a, b| compare(a, b, query_len));
}
