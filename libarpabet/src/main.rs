//! librhyme command-line harness
//!
//! Usage:
//!   librhyme generate cat -n 10
//!   librhyme detect "time after time" "on my mind"
//!   librhyme scheme lyrics.txt
//!   librhyme transcribe lyrics.txt --json
//!   librhyme --data-dir data interactive

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libarpabet::{ArpabetConfig, Engine, Generation};
use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "librhyme")]
#[command(about = "Detect and generate rhymes from phonetic transcriptions")]
struct Args {
    /// Directory with lexicon.fst / lexicon.bincode (demo lexicon if absent)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List rhymes for a word
    Generate {
        word: String,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Score how well the endings of two lines rhyme
    Detect { line_a: String, line_b: String },
    /// Label the rhyme scheme of a text (stdin if no file)
    Scheme { file: Option<PathBuf> },
    /// Transcribe every word of a text (stdin if no file)
    Transcribe { file: Option<PathBuf> },
    /// Show the words nothing could pronounce, most frequent first
    Unseen,
    /// Read queries from stdin: a word generates, "a / b" detects
    Interactive,
}

fn read_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            Ok(s)
        }
    }
}

fn print_generation(g: &Generation) {
    if !g.status.is_ok() {
        println!("  → {:?}", g.status);
        return;
    }
    if g.rhymes.is_empty() {
        println!("  → (no rhymes found)");
    }
    for (i, m) in g.rhymes.iter().enumerate() {
        println!("  {}. {} (score: {:.3})", i + 1, m.token, m.score);
    }
}

fn build_engine(args: &Args) -> Result<Engine> {
    let mut config = match &args.config {
        Some(path) => ArpabetConfig::load_toml(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ArpabetConfig::default(),
    };
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir.clone();
    }
    Ok(Engine::from_config(config))
}

fn interactive(engine: &Engine) -> Result<()> {
    println!("Ready! Type a word, or two lines separated by ' / '.");
    println!("Examples: cat, time after time / on my mind");
    println!("Press Ctrl+D to exit.");
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let raw = line?;
        let input = raw.trim();
        if input.is_empty() {
            continue;
        }
        match input.split_once(" / ") {
            Some((a, b)) => {
                let d = engine.detect(a, b);
                match d.score {
                    Some(score) => println!("  → score: {:.3}\n", score),
                    None => println!("  → {:?}\n", d.status),
                }
            }
            None => {
                print_generation(&engine.generate(input, 5));
                if let Ok(ipa) = engine.ipa(input) {
                    if !ipa.is_empty() {
                        println!("  /{}/", ipa.join("/, /"));
                    }
                }
                println!();
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let engine = build_engine(&args)?;

    match args.command.as_ref().unwrap_or(&Command::Interactive) {
        Command::Generate { word, count } => {
            let g = engine.generate(word, *count);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&g)?);
            } else {
                print_generation(&g);
            }
        }
        Command::Detect { line_a, line_b } => {
            let d = engine.detect(line_a, line_b);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&d)?);
            } else {
                match d.score {
                    Some(score) => println!(
                        "{} / {}: {:.3}",
                        d.left.as_deref().unwrap_or("-"),
                        d.right.as_deref().unwrap_or("-"),
                        score
                    ),
                    None => println!("{:?}", d.status),
                }
            }
        }
        Command::Scheme { file } => {
            let scheme = engine.rhyme_scheme(&read_input(file)?);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&scheme)?);
            } else {
                for line in scheme.lines.iter() {
                    println!(
                        "{:>4}  {}  {}",
                        line.number,
                        line.label.as_deref().unwrap_or("-"),
                        line.ending.as_deref().unwrap_or("")
                    );
                }
                println!("{}", scheme.pattern());
            }
        }
        Command::Transcribe { file } => {
            let lyrics = engine.transcribe_text(&read_input(file)?);
            if args.json {
                println!("{}", lyrics.to_json()?);
            } else {
                for line in lyrics.non_blank_lines() {
                    let words: Vec<String> = line
                        .tokens
                        .iter()
                        .map(|t| {
                            t.transcription
                                .clone()
                                .unwrap_or_else(|| format!("<{}>", t.token))
                        })
                        .collect();
                    println!("{:>4}  {}", line.number, words.join(" | "));
                }
                if let Some(coverage) = lyrics.coverage() {
                    println!("coverage: {:.1}%", coverage * 100.0);
                }
                if !lyrics.failures.is_empty() {
                    println!("failed: {}", lyrics.failures.join(", "));
                }
            }
        }
        Command::Unseen => {
            let records = engine.unseen().export();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for r in records.iter() {
                    println!("{}\t{}", r.count, r.token);
                }
            }
        }
        Command::Interactive => interactive(&engine)?,
    }
    Ok(())
}
