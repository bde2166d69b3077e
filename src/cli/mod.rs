use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "harvester",
    about = "Transcript Harvester - Collect video page transcripts into a CSV dataset",
    version,
    long_about = "Drives a WebDriver browser session through each URL of a CSV dataset, opens the page's transcript panel and records the transcript (or a classified 'Error:' message) in the dataset's transcript column."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (defaults to ./harvester.yaml, then the user config directory)
    #[arg(short, long, global = true, value_name = "FILE", env = "HARVESTER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract transcripts for every row of a dataset
    Harvest {
        /// Dataset with a URL column: .xlsx workbook, .csv or .tsv
        #[arg(short, long, value_name = "FILE", default_value = "Raw Data.xlsx")]
        input: PathBuf,

        /// Column holding the video URLs
        #[arg(long, value_name = "NAME")]
        url_column: Option<String>,

        /// Column receiving transcripts
        #[arg(long, value_name = "NAME")]
        transcript_column: Option<String>,

        /// WebDriver server URL
        #[arg(long, value_name = "URL", env = "WEBDRIVER_URL")]
        webdriver: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Re-extract rows that already hold a transcript
        #[arg(long)]
        force: bool,

        /// Stop after this many videos
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,

        /// Summary format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the element search plan in use
    Selectors {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write the defaults to the user config file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
