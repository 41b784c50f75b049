//! English rhyme engine
//!
//! Wires the ARPABET inventory, a CMU-derived lexicon and the letter-to-sound
//! rules into a core `RhymeService` and builds its index.
//!
//! This is a thin wrapper; all detection, generation and indexing logic
//! lives in core.

use std::path::Path;
use std::sync::Arc;

use librhyme_core::{
    Detection, Generation, Lexicon, Lyrics, Result, RhymeIndex, RhymeScheme, RhymeService,
    Transcriber, Transcription, UnseenLog,
};

use crate::cmudict::demo_lexicon;
use crate::config::ArpabetConfig;
use crate::inventory::{to_ipa, Arpabet};
use crate::rules::LetterToSound;

/// Public engine for libarpabet.
///
/// The service is wrapped in Arc so clones share the transcription cache,
/// the unseen log and the installed index.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<RhymeService>,
    config: Arc<ArpabetConfig>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("inner", &self.inner).finish()
    }
}

/// Build an index over `vocabulary`, tag it with the lexicon fingerprint and
/// install it.
fn index_vocabulary<I, T>(inner: &RhymeService, vocabulary: I, fingerprint: u64)
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let index = RhymeIndex::build(
        vocabulary,
        inner.transcriber(),
        inner.scorer().clone(),
        inner.config().build_options(),
    )
    .with_lexicon_fingerprint(fingerprint);
    inner.install_index(index);
}

fn service(lexicon: Lexicon, config: &ArpabetConfig, unseen: UnseenLog) -> RhymeService {
    let mut transcriber = Transcriber::new(Arc::new(Arpabet), unseen, config.base.max_cache_size)
        .with_source(lexicon);
    if config.letter_to_sound {
        transcriber = transcriber.with_source(LetterToSound);
    }
    RhymeService::new(Arc::new(transcriber), config.base.clone())
}

impl Engine {
    /// Build an engine over `lexicon`, indexing its whole vocabulary.
    pub fn new(lexicon: Lexicon, config: ArpabetConfig) -> Self {
        Self::with_unseen(lexicon, config, UnseenLog::new_in_memory())
    }

    /// Like `new` but recording misses into `unseen`.
    pub fn with_unseen(lexicon: Lexicon, config: ArpabetConfig, unseen: UnseenLog) -> Self {
        let vocabulary = lexicon.words();
        Self::with_vocabulary(lexicon, config, unseen, vocabulary)
    }

    /// Build an engine whose index covers `vocabulary` instead of the
    /// lexicon's own word list. Words outside the lexicon are indexed
    /// through the letter-to-sound rules when both are enabled.
    pub fn with_vocabulary<I, T>(
        lexicon: Lexicon,
        config: ArpabetConfig,
        unseen: UnseenLog,
        vocabulary: I,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let fingerprint = lexicon.fingerprint();
        let inner = service(lexicon, &config, unseen);
        index_vocabulary(&inner, vocabulary, fingerprint);
        Self {
            inner: Arc::new(inner),
            config: Arc::new(config),
        }
    }

    /// Engine over the built-in sample lexicon.
    pub fn demo() -> Self {
        Self::new(demo_lexicon(), ArpabetConfig::default())
    }

    /// Load an engine from a directory containing runtime artifacts.
    ///
    /// Expected layout (data-dir):
    ///  - lexicon.fst + lexicon.bincode    (lexicon, required)
    ///  - index.bincode                    (index snapshot, rebuilt if missing)
    ///  - unseen.redb                      (persistent unseen-token log)
    pub fn from_data_dir<P: AsRef<Path>>(data_dir: P, config: ArpabetConfig) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let lexicon = Lexicon::load_from_fst_bincode(
            data_dir.join("lexicon.fst"),
            data_dir.join("lexicon.bincode"),
        )?;

        let unseen = match UnseenLog::open(data_dir.join("unseen.redb")) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(error = %e, "cannot open unseen.redb, counting misses in memory");
                UnseenLog::new_in_memory()
            }
        };

        let vocabulary = lexicon.words();
        let fingerprint = lexicon.fingerprint();
        let inner = service(lexicon, &config, unseen);

        let index_path = data_dir.join("index.bincode");
        let snapshot = if index_path.exists() {
            match RhymeIndex::load_bincode(&index_path, inner.scorer().clone()) {
                Ok(index) if index.options() != &config.base.build_options() => {
                    tracing::warn!("index.bincode was built with different settings, rebuilding");
                    None
                }
                Ok(index) if index.lexicon_fingerprint() != Some(fingerprint) => {
                    tracing::warn!("index.bincode was built from another lexicon, rebuilding");
                    None
                }
                Ok(index) => Some(index),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load index.bincode, rebuilding");
                    None
                }
            }
        } else {
            None
        };
        match snapshot {
            Some(index) => inner.install_index(index),
            None => index_vocabulary(&inner, vocabulary, fingerprint),
        }

        Ok(Self {
            inner: Arc::new(inner),
            config: Arc::new(config),
        })
    }

    /// Engine for a config: its data dir when set and loadable, otherwise
    /// the demo lexicon.
    pub fn from_config(config: ArpabetConfig) -> Self {
        if let Some(dir) = config.data_dir.clone() {
            match Self::from_data_dir(&dir, config.clone()) {
                Ok(engine) => return engine,
                Err(e) => tracing::warn!(
                    data_dir = %dir.display(),
                    error = %e,
                    "failed to load data dir, using demo lexicon"
                ),
            }
        }
        Self::new(demo_lexicon(), config)
    }

    /// Get a cloned Arc to the inner service.
    pub fn inner_arc(&self) -> Arc<RhymeService> {
        Arc::clone(&self.inner)
    }

    pub fn config(&self) -> &ArpabetConfig {
        &self.config
    }

    pub fn generate(&self, word: &str, count: usize) -> Generation {
        self.inner.generate(word, count)
    }

    pub fn detect(&self, line_a: &str, line_b: &str) -> Detection {
        self.inner.detect(line_a, line_b)
    }

    pub fn rhyme_scheme(&self, text: &str) -> RhymeScheme {
        self.inner.rhyme_scheme(text)
    }

    pub fn transcribe_text(&self, text: &str) -> Lyrics {
        self.inner.transcribe_text(text)
    }

    /// All transcriptions of a single word.
    pub fn transcribe(&self, word: &str) -> Result<Vec<Transcription>> {
        self.inner.transcriber().transcribe(&word.to_lowercase())
    }

    /// IPA renderings of a word's transcriptions.
    pub fn ipa(&self, word: &str) -> Result<Vec<String>> {
        Ok(self.transcribe(word)?.iter().map(to_ipa).collect())
    }

    pub fn unseen(&self) -> &UnseenLog {
        self.inner.transcriber().unseen()
    }

    /// Get cache statistics (hits, misses, hit rate)
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        let (hits, misses) = self.inner.transcriber().cache_stats();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    pub fn clear_cache(&self) {
        self.inner.transcriber().clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_engine_generates() {
        let engine = Engine::demo();
        let g = engine.generate("cat", 3);
        assert!(g.status.is_ok());
        assert!(g.rhymes.iter().all(|m| m.token != "cat"));
        assert_eq!(g.rhymes.len(), 3);
        assert_eq!(g.rhymes[0].score, 1.0);
    }

    #[test]
    fn missing_data_dir_falls_back_to_demo() {
        let config = ArpabetConfig {
            data_dir: Some(std::env::temp_dir().join("librhyme_no_such_dir")),
            ..Default::default()
        };
        let engine = Engine::from_config(config);
        assert!(engine.generate("time", 2).status.is_ok());
    }

    #[test]
    fn clones_share_cache() {
        let engine = Engine::demo();
        let clone = engine.clone();
        engine.clear_cache();
        let _ = engine.transcribe("cat").unwrap();
        let _ = clone.transcribe("cat").unwrap();
        let (hits, misses, rate) = engine.cache_stats();
        assert_eq!((hits, misses), (1, 1));
        assert!((rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ipa_for_dictionary_word() {
        let engine = Engine::demo();
        assert_eq!(engine.ipa("cat").unwrap(), vec!["ˈkæt".to_string()]);
    }
}
