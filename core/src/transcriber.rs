// core/src/transcriber.rs
//
// Token -> transcriptions. Pronunciation sources are layered in order
// (lexicon first, letter-to-sound rules after); the first source yielding a
// usable pronunciation wins. Results are cached per surface form, and total
// failures are reported to the unseen-token log.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Result, RhymeError};
use crate::lexicon::PronunciationSource;
use crate::phoneme::{
    PhoneClass, PhoneSet, Phoneme, RawPronunciation, Stress, Transcription, TranscriptionSource,
};
use crate::unseen::UnseenLog;

const DEFAULT_CACHE_SIZE: usize = 1000;

/// Turn a raw pronunciation into a transcription with syllable indices.
///
/// Returns `None` if the pronunciation is malformed or uses a symbol the
/// inventory does not know.
///
/// Syllables are assigned from the vowel nuclei: consonants before the first
/// vowel open syllable 0; of a consonant run between two vowels the last
/// consonant opens the next syllable and the rest close the previous one;
/// trailing consonants close the last syllable.
pub fn build_transcription(
    phones: &dyn PhoneSet,
    raw: &RawPronunciation,
    source: TranscriptionSource,
) -> Option<Transcription> {
    if !raw.is_valid() {
        return None;
    }

    let mut classes = Vec::with_capacity(raw.len());
    for sym in raw.symbols.iter() {
        classes.push(phones.class(sym)?);
    }

    let vowels: Vec<usize> = classes
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == PhoneClass::Vowel)
        .map(|(i, _)| i)
        .collect();

    let mut syllable_of = vec![0u16; raw.len()];
    for (n, &v) in vowels.iter().enumerate() {
        syllable_of[v] = n as u16;
        let run_end = vowels.get(n + 1).copied().unwrap_or(raw.len());
        for (i, s) in syllable_of.iter_mut().enumerate().take(run_end).skip(v + 1) {
            let opens_next = n + 1 < vowels.len() && i + 1 == run_end;
            *s = if opens_next { n as u16 + 1 } else { n as u16 };
        }
    }

    let phonemes = raw
        .symbols
        .iter()
        .zip(raw.stress.iter())
        .zip(classes)
        .zip(syllable_of)
        .map(|(((sym, stress), class), syl)| {
            let stress = if class == PhoneClass::Vowel {
                *stress
            } else {
                Stress::None
            };
            Phoneme::new(sym.clone(), class, stress, syl)
        })
        .collect();

    Transcription::new(phonemes, source).ok()
}

/// Pick the transcription used for generation: the first dictionary
/// pronunciation, otherwise the first inferred one.
pub fn preferred(transcriptions: &[Transcription]) -> Option<&Transcription> {
    transcriptions
        .iter()
        .find(|t| t.source() == TranscriptionSource::Dictionary)
        .or_else(|| transcriptions.first())
}

/// Layered, cached grapheme-to-phoneme front end.
pub struct Transcriber {
    phones: Arc<dyn PhoneSet>,
    sources: Vec<Box<dyn PronunciationSource>>,
    unseen: UnseenLog,
    cache: Mutex<LruCache<String, Arc<Vec<Transcription>>>>,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

impl std::fmt::Debug for Transcriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcriber")
            .field("phones", &self.phones.name())
            .field("sources", &self.sources.len())
            .field("unseen", &self.unseen)
            .finish()
    }
}

impl Transcriber {
    /// Create a transcriber over an inventory with no sources yet.
    pub fn new(phones: Arc<dyn PhoneSet>, unseen: UnseenLog, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            phones,
            sources: Vec::new(),
            unseen,
            cache: Mutex::new(LruCache::new(capacity)),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
        }
    }

    /// Append a pronunciation source; earlier sources take precedence.
    pub fn with_source<S: PronunciationSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push_source(&mut self, source: Box<dyn PronunciationSource>) {
        self.sources.push(source);
        self.clear_cache();
    }

    pub fn phones(&self) -> &Arc<dyn PhoneSet> {
        &self.phones
    }

    pub fn unseen(&self) -> &UnseenLog {
        &self.unseen
    }

    /// All transcriptions for `token`, possibly empty.
    ///
    /// Empty output means every source came up blank; the miss is recorded
    /// in the unseen log (once per call, so N failed calls count N).
    pub fn transcribe(&self, token: &str) -> Result<Vec<Transcription>> {
        let token = token.trim();
        if token.is_empty() {
            return Err(RhymeError::InvalidInput("empty token".to_string()));
        }

        let cached = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned();
        let result = match cached {
            Some(hit) => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                hit
            }
            None => {
                self.cache_misses.fetch_add(1, Ordering::Relaxed);
                let computed = Arc::new(self.lookup_sources(token));
                self.cache
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .put(token.to_string(), Arc::clone(&computed));
                computed
            }
        };

        if result.is_empty() {
            tracing::debug!(token, "no transcription");
            self.unseen.record(token);
        }
        Ok(result.as_ref().clone())
    }

    /// Like `transcribe`, but a miss is an error.
    pub fn require(&self, token: &str) -> Result<Vec<Transcription>> {
        let out = self.transcribe(token)?;
        if out.is_empty() {
            return Err(RhymeError::TranscriptionUnavailable(token.trim().to_string()));
        }
        Ok(out)
    }

    fn lookup_sources(&self, token: &str) -> Vec<Transcription> {
        for source in self.sources.iter() {
            let kind = source.source_kind();
            let mut out: Vec<Transcription> = Vec::new();
            for raw in source.pronunciations(token) {
                match build_transcription(self.phones.as_ref(), &raw, kind) {
                    Some(t) if !out.contains(&t) => out.push(t),
                    Some(_) => {}
                    None => tracing::warn!(
                        token,
                        symbols = ?raw.symbols,
                        "dropping pronunciation with symbols outside the inventory"
                    ),
                }
            }
            if !out.is_empty() {
                return out;
            }
        }
        Vec::new()
    }

    /// (hits, misses)
    pub fn cache_stats(&self) -> (usize, usize) {
        (
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
        )
    }

    /// Hit rate in percent, `None` before the first lookup.
    pub fn cache_hit_rate(&self) -> Option<f32> {
        let (hits, misses) = self.cache_stats();
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some((hits as f32 / total as f32) * 100.0)
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).cap().get()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }
}
