use anyhow::Result;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::sleep;

use crate::dataset::{CellState, Dataset};
use crate::extract::{ErrorKind, TranscriptOutcome, TranscriptPipeline};
use crate::page::Page;

/// How a batch walks the dataset
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Re-extract rows that already hold a transcript
    pub force: bool,

    /// Stop after this many extractions
    pub limit: Option<usize>,

    /// Pause between two extractions
    pub row_delay: Duration,

    /// Draw a progress bar
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            force: false,
            limit: None,
            row_delay: Duration::from_secs(2),
            show_progress: false,
        }
    }
}

/// A row that ended in a failure cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based data row number
    pub row: usize,
    pub url: String,
    pub kind: ErrorKind,
    pub cell: String,
}

/// Counters and failures of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures_by_kind: BTreeMap<ErrorKind, usize>,
    pub failures: Vec<RowFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    fn new(total: usize) -> Self {
        let now = Utc::now();
        Self {
            total,
            processed: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            failures_by_kind: BTreeMap::new(),
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, row: usize, url: &str, outcome: &TranscriptOutcome) {
        self.processed += 1;
        match outcome.error_kind() {
            None => self.succeeded += 1,
            Some(kind) => {
                self.failed += 1;
                *self.failures_by_kind.entry(kind).or_insert(0) += 1;
                self.failures.push(RowFailure {
                    row: row + 1,
                    url: url.to_string(),
                    kind,
                    cell: outcome.to_cell(),
                });
            }
        }
    }
}

/// Runs the pipeline over every row of a dataset, in order, one at a time
pub struct BatchRunner<'a> {
    pipeline: &'a TranscriptPipeline,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(pipeline: &'a TranscriptPipeline, options: BatchOptions) -> Self {
        Self { pipeline, options }
    }

    /// Process the dataset and checkpoint it after every row.
    ///
    /// A failed row never stops the batch; only the final save can fail the run.
    pub async fn run<P: Page>(&self, dataset: &mut Dataset, page: &mut P) -> Result<BatchSummary> {
        let total = dataset.len();
        let mut summary = BatchSummary::new(total);
        let progress = self.progress_bar(total as u64);

        for row in 0..total {
            if self.options.limit.is_some_and(|limit| summary.processed >= limit) {
                tracing::info!("Reached limit of {} videos", summary.processed);
                break;
            }
            progress.inc(1);

            let url = dataset.url(row).to_string();
            if url.is_empty() {
                tracing::warn!("Row {} has no URL, skipping", row + 1);
                summary.skipped += 1;
                continue;
            }
            if !self.options.force && dataset.cell_state(row) == CellState::Done {
                tracing::debug!("Row {} already has a transcript", row + 1);
                summary.skipped += 1;
                continue;
            }

            // Pace consecutive page loads
            if summary.processed > 0 && !self.options.row_delay.is_zero() {
                sleep(self.options.row_delay).await;
            }

            tracing::info!("Processing video {}/{}: {}", row + 1, total, url);
            progress.set_message(url.clone());

            let outcome = self.pipeline.extract(page, &url).await;
            dataset.record(row, &outcome);
            summary.record(row, &url, &outcome);

            // Checkpoint in case of interruption; the final save below retries
            if let Err(e) = dataset.save() {
                tracing::warn!("Checkpoint after row {} failed: {:#}", row + 1, e);
            }
        }

        progress.finish_with_message("Batch complete");

        if summary.processed > 0 {
            dataset.save()?;
        }
        summary.finished_at = Utc::now();

        Ok(summary)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        progress
    }
}
