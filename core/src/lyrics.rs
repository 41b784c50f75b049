//! Transcribed lyrics.
//!
//! A `Lyrics` value is the result of running a whole text through the
//! transcriber: numbered lines, each word with its preferred transcription,
//! the words nothing could pronounce, and the coverage ratio. It serializes
//! to JSON for downstream analysis.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::phoneme::TranscriptionSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricToken {
    /// Word as it appeared in the line.
    pub surface: String,
    /// Normalized token that was transcribed.
    pub token: String,
    /// Preferred transcription, e.g. `K AE1 T`; `None` for a miss.
    pub transcription: Option<String>,
    pub source: Option<TranscriptionSource>,
}

impl LyricToken {
    pub fn is_transcribed(&self) -> bool {
        self.transcription.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// 1-based line number in the source text.
    pub number: usize,
    pub text: String,
    pub tokens: Vec<LyricToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lyrics {
    pub lines: Vec<LyricLine>,
    /// Distinct tokens with no transcription, in order of first occurrence.
    pub failures: Vec<String>,
    pub total_tokens: usize,
    pub transcribed_tokens: usize,
}

impl Lyrics {
    pub(crate) fn push_line(&mut self, line: LyricLine) {
        for tok in line.tokens.iter() {
            self.total_tokens += 1;
            if tok.is_transcribed() {
                self.transcribed_tokens += 1;
            } else if !self.failures.contains(&tok.token) {
                self.failures.push(tok.token.clone());
            }
        }
        self.lines.push(line);
    }

    /// Fraction of tokens that were transcribed, `None` for empty text.
    pub fn coverage(&self) -> Option<f32> {
        if self.total_tokens == 0 {
            None
        } else {
            Some(self.transcribed_tokens as f32 / self.total_tokens as f32)
        }
    }

    /// Lines that contain at least one word.
    pub fn non_blank_lines(&self) -> impl Iterator<Item = &LyricLine> {
        self.lines.iter().filter(|l| !l.tokens.is_empty())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
