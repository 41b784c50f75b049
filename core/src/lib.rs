//! librhyme-core
//!
//! Inventory-agnostic rhyme engine shared by language crates (libarpabet).
//!
//! Tokens are transcribed to phoneme sequences, reduced to canonical rhyme
//! keys, scored for graded similarity and indexed for rhyme generation.
//! Lexicons persist as FST + bincode, index snapshots as bincode, and the
//! unseen-token log optionally in redb.
//!
//! Public API:
//! - `Transcriber` - Layered, cached token -> transcriptions front end
//! - `Lexicon` - Token -> pronunciations dictionary (a `PronunciationSource`)
//! - `normalize` / `RhymeKey` - Rhyming region extraction
//! - `Scorer` - Feature-weighted similarity in [0, 1]
//! - `RhymeIndex` - Key buckets plus nearest-neighbour fallback
//! - `UnseenLog` - Out-of-vocabulary accounting
//! - `RhymeService` - detect / generate / scheme / lyric transcription
//! - `Config` - Configuration shared by all of the above
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod error;
pub use error::{Result, RhymeError};

pub mod phoneme;
pub use phoneme::{
    Backness, Features, Height, Manner, PhoneClass, PhoneSet, Phoneme, Place, RawPronunciation,
    Stress, Transcription, TranscriptionSource,
};

pub mod lexicon;
pub use lexicon::{Lexicon, PronunciationSource};

pub mod transcriber;
pub use transcriber::{build_transcription, preferred, Transcriber};

pub mod normalizer;
pub use normalizer::{
    normalize, syllabify, KeyPhone, NormalizerConfig, RhymeKey, StressSensitivity, Syllable,
    SyllableWindow,
};

pub mod scorer;
pub use scorer::{feature_distance, Scorer};

pub mod candidate;
pub use candidate::RhymeMatch;

pub mod index;
pub use index::{BuildOptions, IndexEntry, IndexStats, RhymeIndex};

pub mod unseen;
pub use unseen::{InMemoryUnseen, RedbUnseen, UnseenLog, UnseenRecord};

pub mod text;

pub mod lyrics;
pub use lyrics::{LyricLine, LyricToken, Lyrics};

pub mod service;
pub use service::{Detection, Generation, QueryStatus, RhymeScheme, RhymeService, SchemeLine};

/// Generic configuration for the rhyme engine.
///
/// Inventory-specific options (letter-to-sound rules, data directories)
/// belong in the language crate's config, which flattens this one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // Rhyme key derivation
    /// Which stress marks survive in rhyme keys
    pub stress_sensitivity: StressSensitivity,
    /// Minimum number of trailing syllables in the rhyming region (1 or 2)
    pub syllable_window: SyllableWindow,

    // Similarity scoring
    /// Cost of inserting or deleting one phoneme during alignment
    pub indel_cost: f32,
    /// Cost (as a fraction of indel_cost) of matching symbols whose retained stress differs
    pub stress_mismatch_cost: f32,

    // Index and generation
    /// Nearest-neighbour candidates scoring below this are dropped
    pub min_nearest_score: f32,
    /// Index letter-to-sound transcriptions of tokens missing from the lexicon
    pub index_inferred: bool,

    // Cache Management
    /// Maximum number of entries in the token -> transcriptions cache
    pub max_cache_size: usize,

    // Text analysis
    /// Minimum score for two line endings to share a scheme letter
    pub scheme_threshold: f32,
    /// Strip possessive and plural suffixes when normalizing tokens
    pub strip_affixes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Masculine rhymes, stress ignored
            stress_sensitivity: StressSensitivity::Ignore,
            syllable_window: SyllableWindow::Single,
            indel_cost: 1.0,
            stress_mismatch_cost: 0.25,
            min_nearest_score: 0.5,
            index_inferred: true,
            max_cache_size: 1000,
            scheme_threshold: 0.75,
            strip_affixes: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ========== Derived Component Settings ==========

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            stress_sensitivity: self.stress_sensitivity,
            syllable_window: self.syllable_window,
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            normalizer: self.normalizer_config(),
            index_inferred: self.index_inferred,
            min_nearest_score: self.min_nearest_score,
        }
    }

    /// Scorer over `phones` with this config's costs.
    pub fn scorer(&self, phones: Arc<dyn PhoneSet>) -> Scorer {
        Scorer::new(phones, self.indel_cost, self.stress_mismatch_cost)
    }

    // ========== Rhyme Key Settings ==========

    pub fn set_stress_sensitivity(&mut self, sensitivity: StressSensitivity) {
        self.stress_sensitivity = sensitivity;
    }

    pub fn get_stress_sensitivity(&self) -> StressSensitivity {
        self.stress_sensitivity
    }

    /// Toggle between masculine (1) and feminine (2) rhyme windows.
    pub fn toggle_feminine(&mut self) {
        self.syllable_window = match self.syllable_window {
            SyllableWindow::Single => SyllableWindow::Double,
            SyllableWindow::Double => SyllableWindow::Single,
        };
    }

    pub fn set_syllable_window(&mut self, window: SyllableWindow) {
        self.syllable_window = window;
    }

    pub fn get_syllable_window(&self) -> SyllableWindow {
        self.syllable_window
    }

    // ========== Threshold Configuration ==========

    /// Set the nearest-neighbour cutoff. Clamped to [0, 1].
    /// Default: 0.5
    pub fn set_min_nearest_score(&mut self, score: f32) {
        self.min_nearest_score = score.clamp(0.0, 1.0);
    }

    pub fn get_min_nearest_score(&self) -> f32 {
        self.min_nearest_score
    }

    /// Set the scheme grouping threshold. Clamped to [0, 1].
    /// Default: 0.75
    pub fn set_scheme_threshold(&mut self, score: f32) {
        self.scheme_threshold = score.clamp(0.0, 1.0);
    }

    pub fn get_scheme_threshold(&self) -> f32 {
        self.scheme_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = cfg.to_toml_string().unwrap();
        assert!(s.contains("stress_sensitivity = \"ignore\""));
        assert!(s.contains("syllable_window = 1"));
        assert_eq!(Config::from_toml_str(&s).unwrap(), cfg);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg =
            Config::from_toml_str("syllable_window = 2\nstress_sensitivity = \"primary-only\"\n")
                .unwrap();
        assert_eq!(cfg.syllable_window, SyllableWindow::Double);
        assert_eq!(cfg.stress_sensitivity, StressSensitivity::PrimaryOnly);
        assert_eq!(cfg.max_cache_size, 1000);
        assert!(Config::from_toml_str("syllable_window = 3").is_err());
    }

    #[test]
    fn setters_clamp() {
        let mut cfg = Config::default();
        cfg.set_min_nearest_score(1.5);
        assert_eq!(cfg.get_min_nearest_score(), 1.0);
        cfg.toggle_feminine();
        assert_eq!(cfg.get_syllable_window(), SyllableWindow::Double);
        assert_eq!(cfg.build_options().normalizer.syllable_window, SyllableWindow::Double);
    }

    #[test]
    fn toml_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("librhyme_config_{}.toml", std::process::id()));
        let mut cfg = Config::default();
        cfg.strip_affixes = true;
        cfg.save_toml(&path).unwrap();
        assert_eq!(Config::load_toml(&path).unwrap(), cfg);
        let _ = std::fs::remove_file(path);
    }
}
