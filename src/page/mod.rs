use async_trait::async_trait;
use std::time::Duration;

pub mod webdriver;

pub use webdriver::WebDriverPage;

use crate::locator::{Condition, Query};

/// Errors reported by a page session.
///
/// "Element absent" is not an error: lookups return `None` or an empty list
/// for that, so a `PageError` always means the session itself misbehaved.
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Element interaction failed: {0}")]
    Interaction(String),

    #[error("Session error: {0}")]
    Session(String),
}

/// Trait for the browser page a transcript is extracted from
///
/// Implementations own nothing about session lifecycle; the caller creates the
/// session, hands out a borrow for each extraction and tears it down at the end.
#[async_trait]
pub trait Page: Send + Sync {
    /// Opaque handle to a located element
    type Element: Send + Sync;

    /// Load a URL in the current tab
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Wait until the document reports it has finished loading.
    /// Returns `false` when the timeout elapsed first.
    async fn wait_until_ready(&self, timeout: Duration) -> Result<bool, PageError>;

    /// Scroll the window to a vertical offset in pixels
    async fn scroll_to(&self, offset: i64) -> Result<(), PageError>;

    /// Wait for an element matching `query` to satisfy `condition`.
    /// A zero timeout probes exactly once.
    async fn wait_for(
        &self,
        query: &Query,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, PageError>;

    /// All elements matching `query` in document order, possibly none
    async fn find_all(&self, query: &Query) -> Result<Vec<Self::Element>, PageError>;

    /// Bring an element into the viewport
    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), PageError>;

    /// Activate an element programmatically, not through a simulated pointer event
    async fn activate(&self, element: &Self::Element) -> Result<(), PageError>;

    /// Rendered text of an element
    async fn read_text(&self, element: &Self::Element) -> Result<String, PageError>;
}
