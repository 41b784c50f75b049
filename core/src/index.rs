//! Rhyme index over a fixed vocabulary.
//!
//! Tokens are grouped into buckets by rhyme key, so perfect rhymes are a
//! single hash lookup. When a bucket is empty or too small, `lookup_nearest`
//! scores the query against every entry that ends in the same phoneme (a
//! coarse filter that keeps the search well below the vocabulary size) and
//! returns the best slant rhymes.
//!
//! The index is immutable once built. Rebuilding means building a new index
//! and swapping it in; see `RhymeService::install_index`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::candidate::{self, RhymeMatch};
use crate::error::Result;
use crate::normalizer::{normalize, NormalizerConfig, RhymeKey};
use crate::phoneme::{Transcription, TranscriptionSource};
use crate::scorer::Scorer;
use crate::transcriber::Transcriber;

static EMPTY_BUCKET: BTreeSet<String> = BTreeSet::new();

/// One (token, rhyme key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub token: String,
    pub key: RhymeKey,
    /// Phoneme count of the transcription the key came from.
    pub length: usize,
    pub source: TranscriptionSource,
}

/// Which transcriptions of a vocabulary token get indexed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub normalizer: NormalizerConfig,
    /// Index letter-to-sound transcriptions for tokens with no dictionary entry.
    pub index_inferred: bool,
    /// Nearest-neighbour results scoring below this are dropped.
    pub min_nearest_score: f32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            index_inferred: true,
            min_nearest_score: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub tokens: usize,
    pub entries: usize,
    pub buckets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhymeIndex {
    options: BuildOptions,
    entries: Vec<IndexEntry>,
    buckets: AHashMap<RhymeKey, BTreeSet<String>>,
    /// final symbol of the rhyme key -> entry ids
    by_final: AHashMap<String, Vec<usize>>,
    /// token -> shortest indexed transcription length
    lengths: AHashMap<String, usize>,
    /// `Lexicon::fingerprint` of the dictionary the index was built from
    lexicon_fingerprint: Option<u64>,
    #[serde(skip)]
    scorer: Option<Scorer>,
}

impl RhymeIndex {
    /// Build from pre-computed transcriptions.
    ///
    /// Tokens with no transcriptions are skipped; a token with several
    /// pronunciations lands in every bucket one of them maps to.
    pub fn from_transcriptions<I, T>(items: I, scorer: Scorer, options: BuildOptions) -> Self
    where
        I: IntoIterator<Item = (T, Vec<Transcription>)>,
        T: Into<String>,
    {
        let mut index = RhymeIndex {
            options,
            entries: Vec::new(),
            buckets: AHashMap::new(),
            by_final: AHashMap::new(),
            lengths: AHashMap::new(),
            lexicon_fingerprint: None,
            scorer: Some(scorer),
        };

        for (token, transcriptions) in items.into_iter() {
            let token: String = token.into();
            let chosen = Self::indexable(&transcriptions, options.index_inferred);
            if chosen.is_empty() {
                continue;
            }
            for t in chosen {
                let key = normalize(t, &options.normalizer);
                let bucket = index.buckets.entry(key.clone()).or_default();
                if !bucket.insert(token.clone()) {
                    continue;
                }
                let length = index.lengths.entry(token.clone()).or_insert(t.len());
                *length = (*length).min(t.len());
                let id = index.entries.len();
                if let Some(last) = key.final_symbol() {
                    index.by_final.entry(last.to_string()).or_default().push(id);
                }
                index.entries.push(IndexEntry {
                    token: token.clone(),
                    key,
                    length: t.len(),
                    source: t.source(),
                });
            }
        }
        index
    }

    /// Transcribe and index a vocabulary.
    pub fn build<I, T>(
        vocabulary: I,
        transcriber: &Transcriber,
        scorer: Scorer,
        options: BuildOptions,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut items: Vec<(String, Vec<Transcription>)> = Vec::new();
        let mut skipped = 0usize;
        for word in vocabulary.into_iter() {
            let word = word.as_ref().trim();
            match transcriber.transcribe(word) {
                Ok(ts) if !ts.is_empty() => items.push((word.to_string(), ts)),
                Ok(_) => skipped += 1,
                Err(e) => {
                    tracing::debug!(token = word, error = %e, "skipping vocabulary token");
                    skipped += 1;
                }
            }
        }
        let index = Self::from_transcriptions(items, scorer, options);
        let stats = index.stats();
        tracing::info!(
            tokens = stats.tokens,
            entries = stats.entries,
            buckets = stats.buckets,
            skipped,
            "built rhyme index"
        );
        index
    }

    fn indexable(transcriptions: &[Transcription], index_inferred: bool) -> Vec<&Transcription> {
        let dictionary: Vec<&Transcription> = transcriptions
            .iter()
            .filter(|t| t.source() == TranscriptionSource::Dictionary)
            .collect();
        if !dictionary.is_empty() || !index_inferred {
            return dictionary;
        }
        transcriptions.iter().collect()
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Tag the index with the fingerprint of the lexicon behind it.
    pub fn with_lexicon_fingerprint(mut self, fingerprint: u64) -> Self {
        self.lexicon_fingerprint = Some(fingerprint);
        self
    }

    pub fn lexicon_fingerprint(&self) -> Option<u64> {
        self.lexicon_fingerprint
    }

    /// Rhyme key of a transcription under this index's configuration.
    pub fn key_for(&self, transcription: &Transcription) -> RhymeKey {
        normalize(transcription, &self.options.normalizer)
    }

    /// Tokens sharing exactly this key; empty when the key is unseen.
    pub fn lookup_exact(&self, key: &RhymeKey) -> &BTreeSet<String> {
        self.buckets.get(key).unwrap_or(&EMPTY_BUCKET)
    }

    /// Up to `k` best slant/perfect rhymes for `transcription`.
    pub fn lookup_nearest(&self, transcription: &Transcription, k: usize) -> Vec<RhymeMatch> {
        self.nearest(transcription, k, None)
    }

    /// Like `lookup_nearest` but never returns `exclude` itself.
    pub fn lookup_nearest_excluding(
        &self,
        transcription: &Transcription,
        k: usize,
        exclude: &str,
    ) -> Vec<RhymeMatch> {
        self.nearest(transcription, k, Some(exclude))
    }

    fn nearest(
        &self,
        transcription: &Transcription,
        k: usize,
        exclude: Option<&str>,
    ) -> Vec<RhymeMatch> {
        if k == 0 {
            return Vec::new();
        }
        let query = self.key_for(transcription);
        let Some(last) = query.final_symbol() else {
            return Vec::new();
        };
        let Some(ids) = self.by_final.get(last) else {
            return Vec::new();
        };

        let scorer = self.scorer.as_ref();
        let mut best: AHashMap<&str, RhymeMatch> = AHashMap::new();
        for &id in ids.iter() {
            let entry = &self.entries[id];
            if exclude == Some(entry.token.as_str()) {
                continue;
            }
            let score = match scorer {
                Some(s) => s.score_keys(&query, &entry.key),
                None if query == entry.key => 1.0,
                None => 0.0,
            };
            if score < self.options.min_nearest_score {
                continue;
            }
            let cand = RhymeMatch::new(entry.token.clone(), score, entry.length);
            match best.get(entry.token.as_str()) {
                Some(existing)
                    if candidate::compare(existing, &cand, transcription.len()).is_le() => {}
                _ => {
                    best.insert(entry.token.as_str(), cand);
                }
            }
        }

        let mut out: Vec<RhymeMatch> = best.into_values().collect();
        candidate::rank(&mut out, transcription.len());
        out.truncate(k);
        out
    }

    /// Phoneme count of a token's indexed transcription (shortest if several).
    pub fn length_of(&self, token: &str) -> Option<usize> {
        self.lengths.get(token).copied()
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.lengths.contains_key(token)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            tokens: self.lengths.len(),
            entries: self.entries.len(),
            buckets: self.buckets.len(),
        }
    }

    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a saved index. The scorer is not part of the snapshot, so the
    /// caller supplies the one queries should use.
    pub fn load_bincode<P: AsRef<Path>>(path: P, scorer: Scorer) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut index: RhymeIndex = bincode::deserialize_from(reader)?;
        index.scorer = Some(scorer);
        tracing::info!(tokens = index.lengths.len(), "loaded rhyme index");
        Ok(index)
    }

    /// Replace the scorer used by `lookup_nearest`.
    pub fn set_scorer(&mut self, scorer: Scorer) {
        self.scorer = Some(scorer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phoneme::test_phones::{raw, TestPhones};
    use crate::transcriber::build_transcription;
    use std::sync::Arc;

    fn t(p: &str) -> Transcription {
        build_transcription(&TestPhones, &raw(p), TranscriptionSource::Dictionary).unwrap()
    }

    fn scorer() -> Scorer {
        Scorer::new(Arc::new(TestPhones), 1.0, 0.25)
    }

    fn sample() -> RhymeIndex {
        let items = vec![
            ("cat", vec![t("K AE1 T")]),
            ("hat", vec![t("HH AE1 T")]),
            ("bat", vec![t("B AE1 T")]),
            ("dog", vec![t("D AO1 G")]),
            ("cut", vec![t("K AH1 T")]),
            ("time", vec![t("T AY1 M")]),
            ("mind", vec![t("M AY1 N D")]),
            ("nothing", Vec::new()),
        ];
        RhymeIndex::from_transcriptions(items, scorer(), BuildOptions::default())
    }

    #[test]
    fn buckets_hold_tokens_with_equal_keys() {
        let index = sample();
        let key = index.key_for(&t("K AE1 T"));
        let bucket: Vec<&str> = index.lookup_exact(&key).iter().map(|s| s.as_str()).collect();
        assert_eq!(bucket, vec!["bat", "cat", "hat"]);
        for token in index.lookup_exact(&key) {
            let entry = index.entries().iter().find(|e| &e.token == token).unwrap();
            assert_eq!(entry.key, key);
        }
    }

    #[test]
    fn unseen_key_gives_empty_bucket() {
        let index = sample();
        let key = index.key_for(&t("Z IY1"));
        assert!(index.lookup_exact(&key).is_empty());
    }

    #[test]
    fn stats_skip_untranscribed_tokens() {
        let stats = sample().stats();
        assert_eq!(stats.tokens, 7);
        assert_eq!(stats.entries, 7);
        assert!(stats.buckets < stats.entries);
    }

    #[test]
    fn nearest_is_sorted_and_excludes_query() {
        let index = sample();
        let res = index.lookup_nearest_excluding(&t("K AE1 T"), 10, "cat");
        assert!(res.iter().all(|m| m.token != "cat"));
        assert_eq!(res[0].score, 1.0);
        for pair in res.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // cut shares the final T but not the vowel
        let cut = res.iter().find(|m| m.token == "cut").unwrap();
        assert!(cut.score < 1.0);
        // dog ends in G and never enters the candidate set
        assert!(res.iter().all(|m| m.token != "dog"));
    }

    #[test]
    fn nearest_respects_k_and_threshold() {
        let index = sample();
        assert!(index.lookup_nearest(&t("K AE1 T"), 0).is_empty());
        assert_eq!(index.lookup_nearest(&t("K AE1 T"), 2).len(), 2);
        let strict = RhymeIndex::from_transcriptions(
            vec![("cut", vec![t("K AH1 T")]), ("bat", vec![t("B AE1 T")])],
            scorer(),
            BuildOptions {
                min_nearest_score: 0.99,
                ..Default::default()
            },
        );
        let res = strict.lookup_nearest(&t("K AE1 T"), 5);
        let tokens: Vec<&str> = res.iter().map(|m| m.token.as_str()).collect();
        assert_eq!(tokens, vec!["bat"]);
    }

    #[test]
    fn inferred_only_indexed_when_enabled() {
        let zat = raw("Z AE1 T");
        let inferred =
            build_transcription(&TestPhones, &zat, TranscriptionSource::Inferred).unwrap();
        let items = || vec![("zat", vec![inferred.clone()])];
        let with = RhymeIndex::from_transcriptions(items(), scorer(), BuildOptions::default());
        assert!(with.contains_token("zat"));
        let without = RhymeIndex::from_transcriptions(
            items(),
            scorer(),
            BuildOptions {
                index_inferred: false,
                ..Default::default()
            },
        );
        assert!(!without.contains_token("zat"));
    }

    #[test]
    fn bincode_snapshot_round_trip() {
        let index = sample().with_lexicon_fingerprint(42);
        let path = std::env::temp_dir()
            .join(format!("librhyme_index_{}.bincode", std::process::id()));
        index.save_bincode(&path).unwrap();
        let loaded = RhymeIndex::load_bincode(&path, scorer()).unwrap();
        assert_eq!(loaded.stats(), index.stats());
        assert_eq!(loaded.lexicon_fingerprint(), Some(42));
        assert_eq!(sample().lexicon_fingerprint(), None);
        assert_eq!(
            loaded.lookup_nearest(&t("T AY1 M"), 3),
            index.lookup_nearest(&t("T AY1 M"), 3)
        );
        let _ = std::fs::remove_file(path);
    }
}
