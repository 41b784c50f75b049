//! Precompute index.bincode for a data directory
//!
//! Usage:
//!   cargo run -p rhyme_tools --bin build_index -- --data-dir data
//!   cargo run -p rhyme_tools --bin build_index -- --data-dir data --vocab lyrics_words.txt --config rhyme.toml
//!
//! The index is built with the same settings the engine will load it with;
//! an engine whose config differs rebuilds instead of using the snapshot.

use anyhow::{Context, Result};
use clap::Parser;
use libarpabet::{ArpabetConfig, Engine, UnseenLog};
use librhyme_core::Lexicon;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "build_index")]
#[command(about = "Build a rhyme index snapshot from lexicon artifacts")]
struct Args {
    /// Directory holding lexicon.fst and lexicon.bincode
    #[arg(long)]
    data_dir: PathBuf,

    /// Words to index, one per line (defaults to the whole lexicon)
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (defaults to <data-dir>/index.bincode)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_vocab(path: &PathBuf) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read vocabulary {}", path.display()))?;
    Ok(text
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ArpabetConfig::load_toml(path)?,
        None => ArpabetConfig::default(),
    };
    let lexicon = Lexicon::load_from_fst_bincode(
        args.data_dir.join("lexicon.fst"),
        args.data_dir.join("lexicon.bincode"),
    )
    .map_err(|e| anyhow::anyhow!("Failed to load lexicon: {}", e))?;

    let vocabulary = match &args.vocab {
        Some(path) => read_vocab(path)?,
        None => lexicon.words(),
    };
    let requested = vocabulary.len();

    let unseen = UnseenLog::new_in_memory();
    let engine = Engine::with_vocabulary(lexicon, config, unseen, vocabulary);
    let index = engine
        .inner_arc()
        .index()
        .ok_or_else(|| anyhow::anyhow!("index was not built"))?;

    let output = args
        .output
        .unwrap_or_else(|| args.data_dir.join("index.bincode"));
    index.save_bincode(&output)?;

    let stats = index.stats();
    println!(
        "Indexed {} of {} words ({} transcriptions, {} rhyme buckets)",
        stats.tokens, requested, stats.entries, stats.buckets
    );
    let skipped = engine.unseen().export();
    if !skipped.is_empty() {
        println!("{} words had no transcription:", skipped.len());
        for r in skipped.iter().take(20) {
            println!("  {}", r.token);
        }
    }
    println!("Wrote index to {}", output.display());
    Ok(())
}
