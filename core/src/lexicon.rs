//! Pronunciation lexicon for librhyme-core
//!
//! This module provides an in-memory lexicon mapping a normalized token to
//! its known pronunciations (homograph variants kept in insertion order), and
//! a compact runtime form made of an `fst` key index plus a bincode payload
//! vector.
//!
//! Public API:
//! - `Lexicon`: insert/lookup API, bincode and fst+bincode (de)serialization
//! - `PronunciationSource`: the capability shared with letter-to-sound rules
//!
//! Notes:
//! - Keys are expected to be already normalized (lowercase, trimmed). The
//!   lexicon does not re-normalize on lookup.
//! - In-memory entries shadow the fst artifacts, so a host can patch a loaded
//!   dictionary with slang pronunciations without rebuilding the artifacts.

use fst::{Map, MapBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::phoneme::{RawPronunciation, TranscriptionSource};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(mut h: u64, bytes: &[u8]) -> u64 {
    for b in bytes {
        h ^= u64::from(*b);
        h = h.wrapping_mul(FNV_PRIME);
    }
    h
}

/// Anything that can answer "given a token, return pronunciations".
///
/// Both the lexicon and the letter-to-sound engine implement this, so the
/// transcriber can layer them in order without caring which is which.
pub trait PronunciationSource: Send + Sync {
    /// Whether results from this source are authoritative or inferred.
    fn source_kind(&self) -> TranscriptionSource;

    /// Zero or more pronunciations for `token`.
    fn pronunciations(&self, token: &str) -> Vec<RawPronunciation>;
}

/// Token → pronunciations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    map: HashMap<String, Vec<RawPronunciation>>,
    #[serde(skip)]
    fst_map: Option<Map<Vec<u8>>>,
    #[serde(skip)]
    payloads: Option<Vec<Vec<RawPronunciation>>>,
}

impl Lexicon {
    /// Create an empty lexicon.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            fst_map: None,
            payloads: None,
        }
    }

    /// Insert a pronunciation for a token.
    ///
    /// Identical pronunciations for the same token are stored once. Invalid
    /// pronunciations (empty, or stress pattern of the wrong length) are
    /// ignored and `false` is returned.
    pub fn insert<K: Into<String>>(&mut self, token: K, pron: RawPronunciation) -> bool {
        if !pron.is_valid() {
            return false;
        }
        let bucket = self.map.entry(token.into()).or_default();
        if bucket.contains(&pron) {
            return false;
        }
        bucket.push(pron);
        true
    }

    /// Lookup pronunciations for a token, in variant order.
    pub fn lookup(&self, token: &str) -> Vec<RawPronunciation> {
        if let Some(v) = self.map.get(token) {
            return v.clone();
        }

        if let (Some(map), Some(payloads)) = (&self.fst_map, &self.payloads) {
            if let Some(idx) = map.get(token) {
                if let Some(entries) = payloads.get(idx as usize) {
                    return entries.clone();
                }
            }
        }

        Vec::new()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.map.contains_key(token)
            || self
                .fst_map
                .as_ref()
                .map(|m| m.contains_key(token))
                .unwrap_or(false)
    }

    /// Remove every pronunciation of a token from the in-memory layer.
    /// Returns true if anything was removed.
    pub fn remove(&mut self, token: &str) -> bool {
        self.map.remove(token).is_some()
    }

    /// All tokens known to the lexicon, sorted and deduplicated.
    pub fn words(&self) -> Vec<String> {
        let mut out: Vec<String> = self.map.keys().cloned().collect();
        if let Some(map) = &self.fst_map {
            use fst::Streamer;
            let mut stream = map.stream();
            while let Some((k, _)) = stream.next() {
                if let Ok(s) = std::str::from_utf8(k) {
                    out.push(s.to_string());
                }
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        let fst_only = self
            .fst_map
            .as_ref()
            .map(|m| {
                use fst::Streamer;
                let mut n = 0usize;
                let mut stream = m.stream();
                while let Some((k, _)) = stream.next() {
                    if std::str::from_utf8(k).map_or(true, |s| !self.map.contains_key(s)) {
                        n += 1;
                    }
                }
                n
            })
            .unwrap_or(0);
        self.map.len() + fst_only
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content hash over every token and pronunciation, in sorted token
    /// order. A lexicon and its fst + bincode artifacts hash the same, so an
    /// index snapshot can tell whether it was built from this lexicon.
    pub fn fingerprint(&self) -> u64 {
        let mut h = FNV_OFFSET;
        for word in self.words() {
            h = fnv1a(h, word.as_bytes());
            h = fnv1a(h, b"\n");
            for pron in self.lookup(&word) {
                for (sym, stress) in pron.symbols.iter().zip(pron.stress.iter()) {
                    h = fnv1a(h, sym.as_bytes());
                    h = fnv1a(h, &[stress.digit() as u8]);
                }
                h = fnv1a(h, b";");
            }
        }
        h
    }

    /// Save the in-memory layer using bincode.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load a lexicon produced by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let lx: Self = bincode::deserialize_from(reader)?;
        Ok(lx)
    }

    /// Write the runtime artifacts: an fst mapping token → payload index and
    /// a bincode `Vec<Vec<RawPronunciation>>` in the same (sorted) order.
    pub fn write_fst_bincode<P: AsRef<Path>>(&self, fst_path: P, bincode_path: P) -> Result<()> {
        let words = self.words();
        let mut builder = MapBuilder::new(Vec::new())?;
        let mut payloads: Vec<Vec<RawPronunciation>> = Vec::with_capacity(words.len());
        for (i, w) in words.iter().enumerate() {
            builder.insert(w, i as u64)?;
            payloads.push(self.lookup(w));
        }
        let fst_bytes = builder.into_inner()?;
        let mut out = File::create(fst_path.as_ref())?;
        out.write_all(&fst_bytes)?;

        let writer = BufWriter::new(File::create(bincode_path.as_ref())?);
        bincode::serialize_into(writer, &payloads)?;
        tracing::info!(
            tokens = words.len(),
            fst = %fst_path.as_ref().display(),
            "wrote lexicon artifacts"
        );
        Ok(())
    }

    /// Load lexicon from fst + bincode artifacts written by `write_fst_bincode`.
    pub fn load_from_fst_bincode<P: AsRef<Path>>(fst_path: P, bincode_path: P) -> Result<Self> {
        let mut buf = Vec::new();
        File::open(fst_path.as_ref())?.read_to_end(&mut buf)?;
        let map = Map::new(buf)?;

        let reader = BufReader::new(File::open(bincode_path.as_ref())?);
        let payloads: Vec<Vec<RawPronunciation>> = bincode::deserialize_from(reader)?;

        tracing::info!(
            keys = map.len(),
            fst = %fst_path.as_ref().display(),
            "loaded lexicon artifacts"
        );
        Ok(Self {
            map: HashMap::new(),
            fst_map: Some(map),
            payloads: Some(payloads),
        })
    }
}

impl PronunciationSource for Lexicon {
    fn source_kind(&self) -> TranscriptionSource {
        TranscriptionSource::Dictionary
    }

    fn pronunciations(&self, token: &str) -> Vec<RawPronunciation> {
        self.lookup(token)
    }
}
