//! Convert CMU pronouncing dictionary files into runtime lexicon artifacts
//!
//! Usage:
//!   cargo run -p rhyme_tools --bin convert_cmudict -- --inputs cmudict.dict
//!   cargo run -p rhyme_tools --bin convert_cmudict -- --inputs cmudict.dict slang.dict --out-dir data

use anyhow::{Context, Result};
use clap::Parser;
use libarpabet::parse_cmudict;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "convert_cmudict")]
#[command(about = "Build lexicon.fst + lexicon.bincode from cmudict files")]
struct Args {
    /// Dictionary files, merged in order
    #[arg(long, num_args = 1.., required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (defaults to the current directory)
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value = "lexicon.fst")]
    out_fst: String,

    #[arg(long, default_value = "lexicon.bincode")]
    out_bincode: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut bytes = Vec::new();
    for input in args.inputs.iter() {
        let mut file = std::fs::File::open(input)
            .with_context(|| format!("failed to open {}", input.display()))?;
        file.read_to_end(&mut bytes)?;
        if !bytes.ends_with(b"\n") {
            bytes.push(b'\n');
        }
    }

    let (lexicon, stats) = parse_cmudict(bytes.as_slice())?;
    if lexicon.is_empty() {
        anyhow::bail!("no dictionary entries found in {} input file(s)", args.inputs.len());
    }

    std::fs::create_dir_all(&args.out_dir)?;
    let fst_path = args.out_dir.join(&args.out_fst);
    let bincode_path = args.out_dir.join(&args.out_bincode);
    lexicon.write_fst_bincode(&fst_path, &bincode_path)?;

    println!(
        "{} words, {} pronunciations, {} malformed lines skipped",
        stats.words, stats.entries, stats.malformed
    );
    println!("Wrote fst to {} and bincode to {}", fst_path.display(), bincode_path.display());
    Ok(())
}
