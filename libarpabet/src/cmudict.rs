// libarpabet/src/cmudict.rs
//
// CMU pronouncing dictionary reader.
//
// Accepts both the classic `cmudict-0.7b` layout (`WORD  W ER1 D`, `;;;`
// comments) and the newer `cmudict.dict` layout (`word w er1 d # comment`).
// Alternate pronunciations (`word(2)`) collect under the same token.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use librhyme_core::{Lexicon, RawPronunciation, Result};

use crate::inventory::parse_pronunciation;

// word, optional (N) variant suffix, pronunciation
static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+?)(?:\((\d+)\))?\s+(.+)$").expect("cmudict entry pattern"));

/// Classification of one dictionary line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Entry {
        word: String,
        variant: u32,
        pronunciation: RawPronunciation,
    },
    /// Blank or comment-only.
    Skip,
    Malformed,
}

/// Counters from one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub entries: usize,
    pub words: usize,
    pub malformed: usize,
}

pub fn parse_line(line: &str) -> Line {
    let line = line.trim();
    if line.is_empty() || line.starts_with(";;;") {
        return Line::Skip;
    }
    // a trailing comment needs whitespace before '#', since "#HASH-MARK" is a word
    let body = match line.find(" #") {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    };
    let Some(caps) = ENTRY_RE.captures(body) else {
        return Line::Malformed;
    };
    let word = caps[1].to_lowercase();
    let variant = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);
    match parse_pronunciation(&caps[3]) {
        Some(pronunciation) => Line::Entry {
            word,
            variant,
            pronunciation,
        },
        None => Line::Malformed,
    }
}

/// Build a lexicon from dictionary lines.
pub fn parse_lines<'a, I>(lines: I) -> (Lexicon, ParseStats)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lex = Lexicon::new();
    let mut stats = ParseStats::default();
    for (n, line) in lines.into_iter().enumerate() {
        match parse_line(line) {
            Line::Entry {
                word, pronunciation, ..
            } => {
                if lex.insert(word, pronunciation) {
                    stats.entries += 1;
                }
            }
            Line::Skip => {}
            Line::Malformed => {
                tracing::debug!(line = n + 1, text = line, "skipping malformed cmudict line");
                stats.malformed += 1;
            }
        }
    }
    stats.words = lex.len();
    (lex, stats)
}

/// Parse a dictionary from any reader. Invalid UTF-8 (the 0.7b release is
/// Latin-1 in places) is replaced rather than rejected.
pub fn parse_cmudict<R: BufRead>(mut reader: R) -> Result<(Lexicon, ParseStats)> {
    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        text.push_str(&String::from_utf8_lossy(&buf));
    }
    let (lex, stats) = parse_lines(text.lines());
    if stats.malformed > 0 {
        tracing::warn!(malformed = stats.malformed, "cmudict contained malformed lines");
    }
    Ok((lex, stats))
}

/// Load a dictionary file.
pub fn load_cmudict<P: AsRef<Path>>(path: P) -> Result<Lexicon> {
    let file = File::open(path.as_ref())?;
    let (lex, stats) = parse_cmudict(BufReader::new(file))?;
    tracing::info!(
        path = %path.as_ref().display(),
        words = stats.words,
        entries = stats.entries,
        "loaded cmudict"
    );
    Ok(lex)
}

const DEMO: &str = "\
;;; built-in sample in cmudict format
a AH0
a(2) EY1
above AH0 B AH1 V
after AE1 F T ER0
again AH0 G EH1 N
again(2) AH0 G EY1 N
apart AH0 P AA1 R T
basic B EY1 S IH0 K
bat B AE1 T
beat B IY1 T
cat K AE1 T
chat CH AE1 T
city S IH1 T IY0
cold K OW1 L D
control K AH0 N T R OW1 L
daughter D AO1 T ER0
day D EY1
desire D IH0 Z AY1 ER0
dog D AO1 G
dream D R IY1 M
fame F EY1 M
feather F EH1 DH ER0
feet F IY1 T
fight F AY1 T
find F AY1 N D
fine F AY1 N
fire F AY1 ER0
fire(2) F AY1 R
flame F L EY1 M
flat F L AE1 T
flow F L OW1
fog F AA1 G
forever F ER0 EH1 V ER0
frog F R AA1 G
funny F AH1 N IY0
game G EY1 M
go G OW1
gold G OW1 L D
hat HH AE1 T
heart HH AA1 R T
heat HH IY1 T
higher HH AY1 ER0
honey HH AH1 N IY0
i AY1
in IH0 N
in(2) IH1 N
kind K AY1 N D
know N OW1
light L AY1 T
line L AY1 N
log L AO1 G
lost L AO1 S T
love L AH1 V
lover L AH1 V ER0
magic M AE1 JH IH0 K
mat M AE1 T
mind M AY1 N D
mine M AY1 N
money M AH1 N IY0
music M Y UW1 Z IH0 K
my M AY1
name N EY1 M
nation N EY1 SH AH0 N
never N EH1 V ER0
night N AY1 T
of AH1 V
old OW1 L D
on AA1 N
on(2) AO1 N
out AW1 T
over OW1 V ER0
overtime OW1 V ER0 T AY2 M
pain P EY1 N
play P L EY1
pretty P R IH1 T IY0
rain R EY1 N
rat R AE1 T
rhyme R AY1 M
right R AY1 T
sat S AE1 T
say S EY1
scream S K R IY1 M
show SH OW1
sign S AY1 N
slow S L OW1
soul S OW1 L
start S T AA1 R T
station S T EY1 SH AH0 N
stay S T EY1
stream S T R IY1 M
street S T R IY1 T
sunny S AH1 N IY0
team T IY1 M
that DH AE1 T
the DH AH0
the(2) DH AH1
the(3) DH IY0
time T AY1 M
together T AH0 G EH1 DH ER0
track T R AE1 K
water W AO1 T ER0
way W EY1
weather W EH1 DH ER0
";

/// Small built-in lexicon for smoke tests and the CLI fallback.
pub fn demo_lexicon() -> Lexicon {
    parse_lines(DEMO.lines()).0
}
