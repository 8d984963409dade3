use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use gridline_lib::locale::Language;

/// gridline - filter, search, sort and paginate tabular data
#[derive(Parser, Debug)]
#[command(name = "gridline")]
#[command(version)]
#[command(about = "Filter, search, sort and paginate JSON rows", long_about = None)]
pub struct Cli {
    /// Table configuration file (JSON)
    #[arg(short = 'c', long = "config", env = "GRIDLINE_CONFIG")]
    pub config: PathBuf,

    /// Rows file: a JSON array of objects
    #[arg(short = 'r', long = "rows", conflicts_with = "url", required_unless_present = "url")]
    pub rows: Option<PathBuf>,

    /// Remote endpoint answering fetch requests
    #[arg(short = 'u', long = "url", env = "GRIDLINE_URL")]
    pub url: Option<String>,

    /// Allowed values for a column, as COL=V1,V2 (repeatable; an empty value matches nulls)
    #[arg(long = "filter", value_name = "COL=V1,V2", value_parser = parse_filter)]
    pub filters: Vec<(String, Vec<String>)>,

    /// Free-text search, every word must match
    #[arg(short = 's', long = "search")]
    pub search: Option<String>,

    /// Column to sort by
    #[arg(long = "sort")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long = "desc", requires = "sort")]
    pub desc: bool,

    /// Page to show (clamped into range)
    #[arg(short = 'p', long = "page", default_value_t = 1, allow_negative_numbers = true)]
    pub page: i64,

    /// Rows per page (overrides the config)
    #[arg(long = "per-page")]
    pub per_page: Option<usize>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Language for table headers and footer
    #[arg(long = "lang", default_value = "en")]
    pub lang: Language,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// The page as JSON
    Json,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
}

fn parse_filter(s: &str) -> Result<(String, Vec<String>), String> {
    let (column, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COL=V1,V2, got '{s}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{s}'"));
    }
    Ok((column.to_string(), values.split(',').map(str::to_string).collect()))
}
