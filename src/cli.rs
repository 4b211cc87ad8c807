use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kwalitee",
    version,
    about = "Docstring coverage and kwalitee index for Python source trees"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the kwalitee index of an unpacked source tree
    Score(ScoreCommand),
    /// List discovered entities and their documentation status
    Docstrings(DocstringsCommand),
}

#[derive(Args)]
pub struct ScoreCommand {
    pub path: PathBuf,

    #[arg(short, long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Extra config file applied after the global and repository ones
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TOML file with [[score]] tables computed by external tools
    #[arg(long)]
    pub scores: Option<PathBuf>,

    /// External leaf as CATEGORY/LABEL=RAW/MAX[:JUSTIFICATION]
    #[arg(long = "score", value_name = "SCORE")]
    pub score: Vec<String>,

    /// Lint rating on a 0-10 scale
    #[arg(long, allow_negative_numbers = true)]
    pub lint_rating: Option<f64>,

    /// Number of style error types reported by the style checker
    #[arg(long, requires = "style_warnings")]
    pub style_errors: Option<u32>,

    /// Number of style warning types reported by the style checker
    #[arg(long, requires = "style_errors")]
    pub style_warnings: Option<u32>,

    /// Exit with status 2 when the relative index is below this percentage
    #[arg(long, allow_negative_numbers = true)]
    pub fail_under: Option<i64>,
}

#[derive(Args)]
pub struct DocstringsCommand {
    pub path: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}
