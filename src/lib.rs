//! Transcript Harvester - A Rust CLI tool for collecting video page transcripts
//!
//! This library drives a WebDriver browser session through a layered element
//! search (reveal control, transcript panel, transcript segments) and turns each
//! page into a classified [`TranscriptOutcome`] that is recorded in a CSV dataset.

pub mod batch;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod extract;
pub mod locator;
pub mod output;
pub mod page;
pub mod utils;

pub use batch::{BatchOptions, BatchRunner, BatchSummary};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use dataset::{CellState, Dataset};
pub use extract::{ErrorKind, TranscriptOutcome, TranscriptPipeline};
pub use locator::{Condition, Descriptor, DescriptorList, LocateResult, Query, SearchPlan};
pub use page::{Page, PageError};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the harvester
#[derive(thiserror::Error, Debug)]
pub enum HarvesterError {
    #[error("Could not find dataset: {0}")]
    DatasetNotFound(String),

    #[error("Dataset could not be read: {0}")]
    DatasetUnreadable(String),

    #[error("Dataset has no '{0}' column")]
    MissingColumn(String),

    #[error("Descriptor list '{0}' must not be empty")]
    EmptyDescriptorList(String),

    #[error("WebDriver unavailable at {url}: {reason}")]
    WebDriverUnavailable { url: String, reason: String },
}
