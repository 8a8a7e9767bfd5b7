use std::path::PathBuf;

use clap::{Parser, Subcommand};

use phone_lens::LoadOptions;

// ── Config (CLI) ──────────────────────────────────────────────────────────────

/// Summaries and side-by-side comparisons of smartphone listings
#[derive(Parser, Debug, Clone)]
#[command(
    name = "phone-lens",
    about = "Summaries and side-by-side comparisons of smartphone listings",
    version
)]
pub struct Config {
    /// Listings file (.csv, .tsv, .json, .parquet)
    #[arg(
        long,
        env = "PHONE_LENS_DATA",
        default_value = "flipkart_smartphones.csv",
        global = true
    )]
    pub data: PathBuf,

    /// Field delimiter for delimited text files ("tab" for tabs)
    #[arg(long, default_value = ",", value_parser = parse_delimiter, global = true)]
    pub delimiter: u8,

    /// Accept files that lack some of the standard listing columns
    #[arg(long, global = true)]
    pub no_require_columns: bool,

    /// Keep only listings where COLUMN equals VALUE (repeatable)
    #[arg(long = "filter", value_name = "COLUMN=VALUE", global = true)]
    pub filters: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Every dashboard view
    Summary,
    /// Listings per distinct value of a column
    Counts { column: String },
    /// Mean of VALUE per distinct GROUP
    Mean { group: String, value: String },
    /// Mean of VALUE for each (ROW, COL) pair
    Pivot {
        row: String,
        col: String,
        value: String,
    },
    /// Equal-width buckets over a numeric column
    Histogram {
        column: String,
        #[arg(long, default_value_t = 20)]
        buckets: usize,
    },
    /// Sorted model names available for comparison
    Models,
    /// Compare two listings by model name
    Compare { model_a: String, model_b: String },
}

impl Config {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter,
            require_columns: !self.no_require_columns,
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(format!("delimiter must be a single ASCII character, got '{other}'")),
    }
}
