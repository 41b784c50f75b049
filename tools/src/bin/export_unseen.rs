//! Export the unseen-token log to JSON or CSV format
//!
//! Usage:
//!   cargo run -p rhyme_tools --bin export_unseen -- --db data/unseen.redb --format json
//!   cargo run -p rhyme_tools --bin export_unseen -- --db data/unseen.redb --format csv --output unseen.csv

use clap::Parser;
use libarpabet::{UnseenLog, UnseenRecord};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export_unseen")]
#[command(about = "Export the unseen-token log to JSON or CSV format")]
struct Args {
    /// Path to the unseen-token database
    #[arg(short, long)]
    db: PathBuf,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only export tokens seen at least this many times
    #[arg(long, default_value_t = 1)]
    min_count: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log = UnseenLog::open(&args.db)
        .map_err(|e| anyhow::anyhow!("Failed to open unseen log: {}", e))?;

    // already sorted by count, descending
    let records: Vec<UnseenRecord> = log
        .export()
        .into_iter()
        .filter(|r| r.count >= args.min_count)
        .collect();

    let output = match args.format.as_str() {
        "json" => export_json(&records)?,
        "csv" => export_csv(&records),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json' or 'csv'", args.format),
    };

    if let Some(path) = args.output {
        std::fs::write(path, output)?;
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn export_json(records: &[UnseenRecord]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

fn export_csv(records: &[UnseenRecord]) -> String {
    let mut output = String::from("token,count\n");
    for r in records {
        let escaped = r.token.replace('"', "\"\"");
        output.push_str(&format!("\"{}\",{}\n", escaped, r.count));
    }
    output
}
