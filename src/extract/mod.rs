//! Transcript extraction pipeline.
//!
//! One call to [`TranscriptPipeline::extract`] walks a page through a fixed,
//! linear sequence of stages:
//!
//! 1. navigate and settle (document ready, hydration pause, scroll for lazy UI)
//! 2. locate the reveal control through the ordered reveal strategies
//! 3. activate it programmatically
//! 4. wait for the transcript container
//! 5. collect segments with the first segment descriptor that matches anything
//! 6. assemble the segment texts
//! 7. reject text that contains no letters of any script
//!
//! Every stage either hands its result to the next one or ends the run with a
//! classified [`TranscriptOutcome::Failure`]. Nothing is retried and nothing
//! escapes `extract`, panics inside a [`Page`] implementation included.

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub mod outcome;
pub mod text;

pub use outcome::{ErrorKind, TranscriptOutcome, ERROR_PREFIX};
pub use text::{assemble_text, ContentFlags};

use crate::config::Timings;
use crate::locator::{self, Descriptor, LocateResult, SearchPlan};
use crate::page::{Page, PageError};
use crate::utils;

/// Terminal failure of one stage
#[derive(Debug)]
struct StageFailure {
    kind: ErrorKind,
    detail: String,
}

impl StageFailure {
    fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    fn unexpected(error: PageError) -> Self {
        Self::new(ErrorKind::UnexpectedProcessingError, error.to_string())
    }
}

type StageResult<T> = std::result::Result<T, StageFailure>;

async fn pause(millis: u64) {
    if millis > 0 {
        sleep(Duration::from_millis(millis)).await;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during extraction".to_string()
    }
}

/// Drives a page session from URL to [`TranscriptOutcome`]
pub struct TranscriptPipeline {
    plan: SearchPlan,
    timings: Timings,
}

impl TranscriptPipeline {
    pub fn new(plan: SearchPlan, timings: Timings) -> Self {
        Self { plan, timings }
    }

    pub fn plan(&self) -> &SearchPlan {
        &self.plan
    }

    /// Extract the transcript shown for `url`.
    ///
    /// Borrows the session exclusively for the duration of the call. Each call
    /// starts with a fresh navigation, so state left by a previous call (an
    /// open panel, an open menu) does not leak into this one.
    pub async fn extract<P: Page>(&self, page: &mut P, url: &str) -> TranscriptOutcome {
        let page: &P = page;
        let outcome = match AssertUnwindSafe(self.run_stages(page, url))
            .catch_unwind()
            .await
        {
            Ok(Ok(text)) => TranscriptOutcome::success(text),
            Ok(Err(failure)) => TranscriptOutcome::failure(failure.kind, failure.detail),
            Err(panic) => TranscriptOutcome::failure(
                ErrorKind::UnexpectedProcessingError,
                panic_message(panic.as_ref()),
            ),
        };

        match &outcome {
            TranscriptOutcome::Success { char_count, .. } => {
                info!("Successfully extracted transcript ({} characters)", char_count)
            }
            TranscriptOutcome::Failure { .. } => {
                warn!("Failed to get transcript: {}", outcome.to_cell())
            }
        }

        outcome
    }

    async fn run_stages<P: Page>(&self, page: &P, url: &str) -> StageResult<String> {
        let url = utils::validate_and_normalize_url(url)
            .map_err(|e| StageFailure::new(ErrorKind::UnexpectedProcessingError, e.to_string()))?;

        self.navigate_and_settle(page, &url).await?;
        let control = self.locate_control(page).await?;
        self.activate_control(page, &control).await?;
        self.locate_container(page).await?;
        let texts = self.read_segments(page).await?;

        let text = assemble_text(&texts);
        if text.is_empty() {
            return Err(StageFailure::new(ErrorKind::EmptyText, ""));
        }

        let flags = ContentFlags::scan(&text);
        debug!("Content flags: {:?}", flags);
        if !flags.is_valid() {
            return Err(StageFailure::new(ErrorKind::ContentValidationFailed, ""));
        }

        Ok(text)
    }

    async fn navigate_and_settle<P: Page>(&self, page: &P, url: &str) -> StageResult<()> {
        info!("Loading video page...");
        page.navigate(url).await.map_err(StageFailure::unexpected)?;

        let ready_timeout = Duration::from_millis(self.timings.ready_timeout);
        if !page
            .wait_until_ready(ready_timeout)
            .await
            .map_err(StageFailure::unexpected)?
        {
            debug!("Page not ready after {:?}, continuing", ready_timeout);
        }
        pause(self.timings.render_settle).await;

        // Some reveal controls only render once their section nears the viewport
        page.scroll_to(self.timings.scroll_offset)
            .await
            .map_err(StageFailure::unexpected)?;
        pause(self.timings.scroll_settle).await;

        Ok(())
    }

    async fn locate_control<P: Page>(&self, page: &P) -> StageResult<P::Element> {
        for strategy in &self.plan.reveal {
            if let Some(opener) = &strategy.opener {
                if !self.open_menu(page, opener).await? {
                    debug!("No opener for '{}'", strategy.name);
                    continue;
                }
            }

            match locator::locate(page, &strategy.targets)
                .await
                .map_err(StageFailure::unexpected)?
            {
                LocateResult::Found { element, descriptor } => {
                    info!(
                        "Found transcript button ({} - {})",
                        strategy.name, descriptor.name
                    );
                    return Ok(element);
                }
                LocateResult::NotFound => debug!("Reveal strategy '{}' found nothing", strategy.name),
            }
        }

        Err(StageFailure::new(ErrorKind::ControlNotFound, ""))
    }

    /// Activate the opener of a reveal strategy. `false` when it is absent.
    async fn open_menu<P: Page>(&self, page: &P, opener: &Descriptor) -> StageResult<bool> {
        let Some(menu) = page
            .wait_for(&opener.query, opener.condition, opener.timeout())
            .await
            .map_err(StageFailure::unexpected)?
        else {
            return Ok(false);
        };

        page.scroll_into_view(&menu)
            .await
            .map_err(StageFailure::unexpected)?;
        pause(self.timings.activation_settle).await;
        page.activate(&menu).await.map_err(StageFailure::unexpected)?;
        pause(self.timings.menu_settle).await;

        Ok(true)
    }

    async fn activate_control<P: Page>(&self, page: &P, control: &P::Element) -> StageResult<()> {
        let click_failed = |e: PageError| StageFailure::new(ErrorKind::ControlClickFailed, e.to_string());

        page.scroll_into_view(control).await.map_err(click_failed)?;
        pause(self.timings.activation_settle).await;
        page.activate(control).await.map_err(click_failed)?;
        info!("Clicked transcript button");

        Ok(())
    }

    async fn locate_container<P: Page>(&self, page: &P) -> StageResult<()> {
        match locator::locate(page, &self.plan.container).await {
            Ok(LocateResult::Found { descriptor, .. }) => {
                info!("Found transcript container: {}", descriptor.name);
                Ok(())
            }
            Ok(LocateResult::NotFound) => Err(StageFailure::new(ErrorKind::ContainerNotFound, "")),
            Err(e) => Err(StageFailure::new(ErrorKind::ContainerWaitFailed, e.to_string())),
        }
    }

    async fn read_segments<P: Page>(&self, page: &P) -> StageResult<Vec<String>> {
        pause(self.timings.segment_settle).await;

        let Some((descriptor, segments)) = locator::locate_all(page, &self.plan.segments)
            .await
            .map_err(StageFailure::unexpected)?
        else {
            return Err(StageFailure::new(ErrorKind::SegmentsNotFound, ""));
        };
        debug!(
            "Reading {} transcript segments from '{}'",
            segments.len(),
            descriptor.name
        );

        let mut texts = Vec::with_capacity(segments.len());
        for segment in &segments {
            texts.push(page.read_text(segment).await.map_err(StageFailure::unexpected)?);
        }

        Ok(texts)
    }
}
