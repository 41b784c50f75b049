//! libarpabet crate root
//!
//! This crate provides the English-specific pieces of the rhyme engine: the
//! ARPABET phone set, a CMU pronouncing dictionary reader, letter-to-sound
//! fallback rules and a high-level `Engine` that composes them with the
//! shared `librhyme-core` service.
//!
//! Public API exported here:
//! - `Arpabet`, `parse_pronunciation` and `to_ipa` from `inventory`
//! - `load_cmudict` / `parse_cmudict` / `demo_lexicon` from `cmudict`
//! - `LetterToSound` from `rules`
//! - `Engine` from `engine`

pub mod cmudict;
pub mod config;
pub mod engine;
pub mod inventory;
pub mod rules;

// Convenience re-exports for common types used by callers.
pub use cmudict::{demo_lexicon, load_cmudict, parse_cmudict, ParseStats};
pub use config::ArpabetConfig;
pub use engine::Engine;
pub use inventory::{parse_phone, parse_pronunciation, to_ipa, Arpabet};
pub use rules::LetterToSound;

pub use librhyme_core::{
    Detection, Generation, Lyrics, QueryStatus, RhymeMatch, RhymeScheme, Transcription,
    UnseenLog, UnseenRecord,
};
