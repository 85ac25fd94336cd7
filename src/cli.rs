use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::prefs::Theme;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Build an operations dashboard from CSV feeds",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load every configured feed and write the dashboard page
    Render(RenderArgs),
    /// Show the first rows of a CSV feed as a formatted table
    Preview(PreviewArgs),
    /// Bucket a CSV feed into chart categories
    Categorize(CategorizeArgs),
    /// Print the ticker rows a feed would cycle through
    Ticker(TickerArgs),
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Dashboard configuration (YAML); the built-in layout is used if omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Destination HTML file
    #[arg(short, long)]
    pub output: PathBuf,
    /// Directory or URL that relative feed locations are resolved against
    #[arg(long)]
    pub base: Option<String>,
    /// Also write the chart data as JSON to this path
    #[arg(long = "chart-json")]
    pub chart_json: Option<PathBuf>,
    /// Preferences file (JSON key-value store)
    #[arg(long)]
    pub prefs: Option<PathBuf>,
    /// Page theme; persisted into --prefs when given
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Feed location: URL or path
    #[arg(short, long)]
    pub source: String,
    /// Directory or URL that a relative location is resolved against
    #[arg(long)]
    pub base: Option<String>,
    /// Character encoding of local files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Show full cell text instead of truncated cells
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Args)]
pub struct CategorizeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Built-in rule preset: applicant, scope-of-work, status
    #[arg(long, conflicts_with_all = ["rules_file", "count_field"])]
    pub rules: Option<String>,
    /// Rule set defined in a YAML file
    #[arg(long = "rules-file", conflicts_with = "count_field")]
    pub rules_file: Option<PathBuf>,
    /// Count distinct values of this field instead of applying rules
    #[arg(long = "count-field")]
    pub count_field: Option<String>,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TickerArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Number of frames to print; the rows cycle when this exceeds them.
    /// Without it every row is printed once.
    #[arg(long)]
    pub steps: Option<usize>,
}
