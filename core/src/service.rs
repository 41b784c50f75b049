// core/src/service.rs
//
// Query front end. The service owns a transcriber, a scorer and the current
// rhyme index, and answers detect / generate / scheme / lyric requests.
// Query methods never fail: recoverable problems come back as a
// `QueryStatus` alongside an empty or partial result.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::candidate::{self, RhymeMatch};
use crate::error::RhymeError;
use crate::index::{IndexStats, RhymeIndex};
use crate::lyrics::{LyricLine, LyricToken, Lyrics};
use crate::normalizer::{normalize, RhymeKey};
use crate::phoneme::Transcription;
use crate::scorer::Scorer;
use crate::text;
use crate::transcriber::{preferred, Transcriber};
use crate::Config;

/// Outcome of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStatus {
    Ok,
    /// The token has no transcription from any source.
    UnknownWord(String),
    InvalidInput(String),
    IndexNotBuilt,
}

impl QueryStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, QueryStatus::Ok)
    }
}

impl From<RhymeError> for QueryStatus {
    fn from(e: RhymeError) -> Self {
        match e {
            RhymeError::TranscriptionUnavailable(token) => QueryStatus::UnknownWord(token),
            RhymeError::IndexNotBuilt => QueryStatus::IndexNotBuilt,
            RhymeError::InvalidInput(msg) => QueryStatus::InvalidInput(msg),
            other => QueryStatus::InvalidInput(other.to_string()),
        }
    }
}

/// Result of comparing the endings of two lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub status: QueryStatus,
    /// Final token of the first line.
    pub left: Option<String>,
    /// Final token of the second line.
    pub right: Option<String>,
    /// Similarity of the two endings; `None` unless status is `Ok`.
    pub score: Option<f32>,
}

impl Detection {
    /// True when both endings were scored at or above `threshold`.
    pub fn rhymes(&self, threshold: f32) -> bool {
        self.score.is_some_and(|s| s >= threshold)
    }
}

/// Result of a rhyme generation query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub status: QueryStatus,
    /// Normalized query token (the raw input if it did not normalize).
    pub word: String,
    pub rhymes: Vec<RhymeMatch>,
}

impl Generation {
    fn failed(word: impl Into<String>, status: QueryStatus) -> Self {
        Generation {
            status,
            word: word.into(),
            rhymes: Vec::new(),
        }
    }
}

/// One line of a scheme analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeLine {
    /// 1-based line number in the source text.
    pub number: usize,
    pub ending: Option<String>,
    /// Scheme letter; `None` when the ending could not be transcribed.
    pub label: Option<String>,
}

/// Rhyme scheme of a text, one entry per non-blank line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RhymeScheme {
    pub lines: Vec<SchemeLine>,
}

impl RhymeScheme {
    /// Compact form such as `AABB`; unlabelled lines show as `-`.
    pub fn pattern(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.label.as_deref().unwrap_or("-"))
            .collect()
    }
}

/// A, B, ..., Z, then A1, B1, ...
fn scheme_label(n: usize) -> String {
    let letter = (b'A' + (n % 26) as u8) as char;
    match n / 26 {
        0 => letter.to_string(),
        round => format!("{}{}", letter, round),
    }
}

pub struct RhymeService {
    transcriber: Arc<Transcriber>,
    scorer: Scorer,
    config: Config,
    index: RwLock<Option<Arc<RhymeIndex>>>,
}

impl std::fmt::Debug for RhymeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhymeService")
            .field("transcriber", &self.transcriber)
            .field("config", &self.config)
            .field("index", &self.index().map(|i| i.stats()))
            .finish()
    }
}

impl RhymeService {
    pub fn new(transcriber: Arc<Transcriber>, config: Config) -> Self {
        let scorer = config.scorer(Arc::clone(transcriber.phones()));
        Self {
            transcriber,
            scorer,
            config,
            index: RwLock::new(None),
        }
    }

    pub fn transcriber(&self) -> &Arc<Transcriber> {
        &self.transcriber
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the installed index.
    pub fn index(&self) -> Option<Arc<RhymeIndex>> {
        self.index.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Build an index over `vocabulary` and install it, replacing any
    /// previous one.
    pub fn build_index<I, T>(&self, vocabulary: I) -> IndexStats
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let index = RhymeIndex::build(
            vocabulary,
            &self.transcriber,
            self.scorer.clone(),
            self.config.build_options(),
        );
        let stats = index.stats();
        self.install_index(index);
        stats
    }

    /// Swap in a prebuilt index. Queries already running keep the old one.
    pub fn install_index(&self, index: RhymeIndex) {
        *self.index.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(index));
    }

    fn token(&self, raw: &str) -> Option<String> {
        text::normalize_token(raw, self.config.strip_affixes)
    }

    fn transcriptions(&self, token: &str) -> Result<Vec<Transcription>, QueryStatus> {
        self.transcriber.require(token).map_err(QueryStatus::from)
    }

    fn keys(&self, transcriptions: &[Transcription]) -> Vec<RhymeKey> {
        let cfg = self.config.normalizer_config();
        transcriptions.iter().map(|t| normalize(t, &cfg)).collect()
    }

    fn best_score(&self, a: &[RhymeKey], b: &[RhymeKey]) -> f32 {
        let mut best = 0.0_f32;
        for ka in a {
            for kb in b {
                best = best.max(self.scorer.score_keys(ka, kb));
            }
        }
        best
    }

    /// Compare the final words of two lines.
    pub fn detect(&self, line_a: &str, line_b: &str) -> Detection {
        let left = text::last_token(line_a, self.config.strip_affixes);
        let right = text::last_token(line_b, self.config.strip_affixes);
        let failed = |status: QueryStatus| Detection {
            status,
            left: left.clone(),
            right: right.clone(),
            score: None,
        };

        let (Some(l), Some(r)) = (left.as_deref(), right.as_deref()) else {
            return failed(QueryStatus::InvalidInput(
                "line has no word to compare".to_string(),
            ));
        };

        let lt = match self.transcriptions(l) {
            Ok(t) => t,
            Err(status) => return failed(status),
        };
        let rt = match self.transcriptions(r) {
            Ok(t) => t,
            Err(status) => return failed(status),
        };

        let score = self.best_score(&self.keys(&lt), &self.keys(&rt));
        tracing::debug!(left = l, right = r, score, "detect");
        Detection {
            status: QueryStatus::Ok,
            left,
            right,
            score: Some(score),
        }
    }

    /// Up to `count` rhymes for `word`: perfect rhymes from its bucket
    /// first, then slant rhymes from the nearest-neighbour search.
    pub fn generate(&self, word: &str, count: usize) -> Generation {
        let Some(token) = self.token(word) else {
            return Generation::failed(word, QueryStatus::InvalidInput("empty word".to_string()));
        };
        let Some(index) = self.index() else {
            return Generation::failed(token, QueryStatus::IndexNotBuilt);
        };
        let transcriptions = match self.transcriptions(&token) {
            Ok(t) => t,
            Err(status) => return Generation::failed(token, status),
        };
        let Some(query) = preferred(&transcriptions) else {
            return Generation::failed(token.clone(), QueryStatus::UnknownWord(token));
        };
        if count == 0 {
            return Generation::failed(token, QueryStatus::Ok);
        }

        let key = index.key_for(query);
        let mut rhymes: Vec<RhymeMatch> = index
            .lookup_exact(&key)
            .iter()
            .filter(|t| **t != token)
            .map(|t| RhymeMatch::new(t.as_str(), 1.0, index.length_of(t).unwrap_or(0)))
            .collect();
        candidate::rank(&mut rhymes, query.len());

        if rhymes.len() < count {
            let wanted = count.saturating_add(rhymes.len());
            let extra = index.lookup_nearest_excluding(query, wanted, &token);
            for m in extra {
                if !rhymes.iter().any(|r| r.token == m.token) {
                    rhymes.push(m);
                }
            }
            candidate::rank(&mut rhymes, query.len());
        }
        rhymes.truncate(count);

        Generation {
            status: QueryStatus::Ok,
            word: token,
            rhymes,
        }
    }

    /// `generate` for many words in parallel; output order follows input.
    pub fn generate_batch<S: AsRef<str> + Sync>(
        &self,
        words: &[S],
        count: usize,
    ) -> Vec<Generation> {
        words.par_iter().map(|w| self.generate(w.as_ref(), count)).collect()
    }

    /// `detect` for many line pairs in parallel; output order follows input.
    pub fn detect_batch<S: AsRef<str> + Sync>(&self, pairs: &[(S, S)]) -> Vec<Detection> {
        pairs
            .par_iter()
            .map(|(a, b)| self.detect(a.as_ref(), b.as_ref()))
            .collect()
    }

    /// Label every non-blank line with a scheme letter.
    ///
    /// A line joins the earliest group whose first line's ending scores at
    /// least `scheme_threshold` against its own ending; otherwise it starts
    /// a new group.
    pub fn rhyme_scheme(&self, text_in: &str) -> RhymeScheme {
        let mut groups: Vec<(String, Vec<RhymeKey>)> = Vec::new();
        let mut scheme = RhymeScheme::default();

        for (i, line) in text::tokenize_lines(text_in).into_iter().enumerate() {
            if text::tokenize_words(line).is_empty() {
                continue;
            }
            let ending = text::last_token(line, self.config.strip_affixes);
            let keys = ending
                .as_deref()
                .and_then(|t| self.transcriber.transcribe(t).ok())
                .map(|ts| self.keys(&ts))
                .unwrap_or_default();

            let label = if keys.is_empty() {
                None
            } else {
                let found = groups
                    .iter()
                    .find(|(_, first)| {
                        self.best_score(first, &keys) >= self.config.scheme_threshold
                    })
                    .map(|(label, _)| label.clone());
                Some(found.unwrap_or_else(|| {
                    let label = scheme_label(groups.len());
                    groups.push((label.clone(), keys));
                    label
                }))
            };

            scheme.lines.push(SchemeLine {
                number: i + 1,
                ending,
                label,
            });
        }
        scheme
    }

    /// Transcribe every word of a text.
    pub fn transcribe_text(&self, text_in: &str) -> Lyrics {
        let mut lyrics = Lyrics::default();
        for (i, line) in text::tokenize_lines(text_in).into_iter().enumerate() {
            let mut tokens = Vec::new();
            for surface in text::tokenize_words(line) {
                let Some(token) = self.token(surface) else {
                    continue;
                };
                let ts = self.transcriber.transcribe(&token).unwrap_or_default();
                let best = preferred(&ts);
                tokens.push(LyricToken {
                    surface: surface.to_string(),
                    transcription: best.map(|t| t.to_string()),
                    source: best.map(|t| t.source()),
                    token,
                });
            }
            lyrics.push_line(LyricLine {
                number: i + 1,
                text: line.to_string(),
                tokens,
            });
        }
        tracing::info!(
            lines = lyrics.lines.len(),
            tokens = lyrics.total_tokens,
            failures = lyrics.failures.len(),
            "transcribed text"
        );
        lyrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::phoneme::test_phones::{raw, TestPhones};
    use crate::unseen::UnseenLog;

    fn lexicon() -> Lexicon {
        let mut lex = Lexicon::new();
        for (w, p) in [
            ("cat", "K AE1 T"),
            ("hat", "HH AE1 T"),
            ("bat", "B AE1 T"),
            ("dog", "D AO1 G"),
            ("time", "T AY1 M"),
            ("mind", "M AY1 N D"),
            ("rhyme", "R AY1 M"),
            ("line", "L AY1 N"),
            ("sat", "S AE1 T"),
        ] {
            lex.insert(w, raw(p));
        }
        lex
    }

    fn service() -> RhymeService {
        let transcriber = Transcriber::new(Arc::new(TestPhones), UnseenLog::new_in_memory(), 100)
            .with_source(lexicon());
        RhymeService::new(Arc::new(transcriber), Config::default())
    }

    fn indexed(words: &[&str]) -> RhymeService {
        let svc = service();
        svc.build_index(words.iter().copied());
        svc
    }

    #[test]
    fn generate_perfect_rhymes_exclude_query() {
        let svc = indexed(&["cat", "hat", "bat", "dog"]);
        let g = svc.generate("cat", 3);
        assert!(g.status.is_ok());
        let tokens: Vec<&str> = g.rhymes.iter().map(|m| m.token.as_str()).collect();
        assert_eq!(tokens, vec!["bat", "hat"]);
        assert!(g.rhymes.iter().all(|m| m.score == 1.0));
    }

    #[test]
    fn generate_accepts_unbounded_count() {
        let svc = indexed(&["cat", "hat", "bat", "sat", "dog"]);
        let g = svc.generate("cat", usize::MAX);
        assert!(g.status.is_ok());
        let tokens: Vec<&str> = g.rhymes.iter().map(|m| m.token.as_str()).collect();
        assert_eq!(tokens, vec!["bat", "hat", "sat"]);
    }

    #[test]
    fn generate_fills_with_slant_rhymes() {
        let svc = indexed(&["time", "rhyme", "mind", "line"]);
        let g = svc.generate("Time", 5);
        assert_eq!(g.word, "time");
        assert_eq!(g.rhymes[0].token, "rhyme");
        assert_eq!(g.rhymes[0].score, 1.0);
        for pair in g.rhymes.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(g.rhymes.iter().all(|m| m.token != "time"));
    }

    #[test]
    fn generate_status_taxonomy() {
        let svc = service();
        assert_eq!(svc.generate("cat", 3).status, QueryStatus::IndexNotBuilt);
        svc.build_index(["cat", "hat"]);
        assert!(matches!(svc.generate("  ", 3).status, QueryStatus::InvalidInput(_)));
        let unknown = svc.generate("zzyzx", 3);
        assert_eq!(unknown.status, QueryStatus::UnknownWord("zzyzx".to_string()));
        assert!(unknown.rhymes.is_empty());
        assert!(svc.generate("cat", 0).rhymes.is_empty());
    }

    #[test]
    fn detect_scores_line_endings() {
        let svc = service();
        let d = svc.detect("time after time", "on my mind");
        assert!(d.status.is_ok());
        assert_eq!(d.left.as_deref(), Some("time"));
        assert_eq!(d.right.as_deref(), Some("mind"));
        let score = d.score.unwrap();
        assert!(score > 0.4 && score < 1.0, "time/mind scored {}", score);

        let perfect = svc.detect("the cat", "a hat!");
        assert_eq!(perfect.score, Some(1.0));
        assert!(perfect.rhymes(0.9));
    }

    #[test]
    fn detect_reports_unknown_and_empty() {
        let svc = service();
        let d = svc.detect("the cat", "a blorp");
        assert_eq!(d.status, QueryStatus::UnknownWord("blorp".to_string()));
        assert_eq!(d.score, None);
        assert!(matches!(svc.detect("", "cat").status, QueryStatus::InvalidInput(_)));
        assert_eq!(svc.transcriber().unseen().count("blorp"), 1);
    }

    #[test]
    fn scheme_groups_line_endings() {
        let svc = service();
        let scheme = svc.rhyme_scheme("the cat\nin a hat\n\nout of time\nin my rhyme\nblorp\n");
        assert_eq!(scheme.pattern(), "AABB-");
        assert_eq!(scheme.lines[2].number, 4);
        assert_eq!(scheme.lines[4].label, None);
    }

    #[test]
    fn scheme_labels_wrap() {
        assert_eq!(scheme_label(0), "A");
        assert_eq!(scheme_label(25), "Z");
        assert_eq!(scheme_label(26), "A1");
    }

    #[test]
    fn transcribe_text_tracks_failures() {
        let svc = service();
        let lyrics = svc.transcribe_text("Cat, hat\nskrrt cat");
        assert_eq!(lyrics.lines.len(), 2);
        assert_eq!(lyrics.lines[1].number, 2);
        assert_eq!(lyrics.lines[0].tokens[0].transcription.as_deref(), Some("K AE1 T"));
        assert_eq!(lyrics.failures, vec!["skrrt".to_string()]);
        assert_eq!(lyrics.total_tokens, 4);
        assert_eq!(lyrics.transcribed_tokens, 3);
    }

    #[test]
    fn batch_matches_sequential() {
        let svc = indexed(&["cat", "hat", "bat", "time", "rhyme"]);
        let words = ["cat", "time", "nope"];
        let batch = svc.generate_batch(&words, 2);
        let seq: Vec<Generation> = words.iter().map(|w| svc.generate(w, 2)).collect();
        assert_eq!(batch, seq);

        let pairs = [("the cat", "a hat"), ("time", "rhyme")];
        let detections = svc.detect_batch(&pairs);
        assert_eq!(detections.len(), 2);
        assert!(detections.iter().all(|d| d.score == Some(1.0)));
    }

    #[test]
    fn rebuild_replaces_index() {
        let svc = indexed(&["cat", "hat"]);
        let before = svc.index().unwrap();
        svc.build_index(["cat", "bat"]);
        let after = svc.index().unwrap();
        assert!(before.contains_token("hat"));
        assert!(!after.contains_token("hat"));
        assert_eq!(svc.generate("cat", 3).rhymes[0].token, "bat");
    }
}
