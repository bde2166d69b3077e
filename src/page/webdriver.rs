use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus, WebDriver as WebDriverError};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::{Page, PageError};
use crate::config::WebDriverConfig;
use crate::locator::{Condition, Query, Strategy};
use crate::HarvesterError;

/// Page session backed by a W3C WebDriver endpoint (chromedriver, geckodriver, ...)
pub struct WebDriverPage {
    client: Client,
    poll_interval: Duration,
}

impl WebDriverPage {
    /// Open a new browser session on an already running WebDriver server
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, HarvesterError> {
        info!("Connecting to WebDriver at {}...", config.url);

        let client = ClientBuilder::native()
            .capabilities(Self::capabilities(config))
            .connect(&config.url)
            .await
            .map_err(|e| HarvesterError::WebDriverUnavailable {
                url: config.url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            poll_interval: config.poll_interval(),
        })
    }

    /// End the browser session
    pub async fn close(self) -> Result<(), PageError> {
        self.client
            .close()
            .await
            .map_err(|e| PageError::Session(format!("Failed to close session: {}", e)))
    }

    fn capabilities(config: &WebDriverConfig) -> serde_json::Map<String, Value> {
        let mut args = vec![
            "--disable-gpu".to_string(),
            format!("--window-size={}", config.window_size),
        ];
        if config.headless {
            args.push("--headless".to_string());
        }
        args.extend(config.browser_args.iter().cloned());

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }

    fn locator(query: &Query) -> Locator<'_> {
        match query.strategy {
            Strategy::XPath => Locator::XPath(&query.expression),
            Strategy::Css => Locator::Css(&query.expression),
        }
    }

    fn element_arg(element: &Element) -> Result<Value, PageError> {
        serde_json::to_value(element).map_err(|e| PageError::Script(e.to_string()))
    }

    async fn run_script(&self, script: &str, args: Vec<Value>) -> Result<Value, PageError> {
        self.client
            .execute(script, args)
            .await
            .map_err(|e| PageError::Script(e.to_string()))
    }

    /// One lookup without waiting
    async fn probe(&self, query: &Query, condition: Condition) -> Result<Option<Element>, PageError> {
        let element = match self.client.find(Self::locator(query)).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => return Ok(None),
            Err(e) => return Err(session_error(e)),
        };

        match condition {
            Condition::Present => Ok(Some(element)),
            Condition::Clickable => {
                let displayed = not_stale(element.is_displayed().await)?;
                let enabled = displayed && not_stale(element.is_enabled().await)?;
                Ok(enabled.then_some(element))
            }
        }
    }
}

fn session_error(e: CmdError) -> PageError {
    PageError::Session(e.to_string())
}

fn is_stale(e: &CmdError) -> bool {
    matches!(
        e,
        CmdError::Standard(WebDriverError {
            error: ErrorStatus::StaleElementReference,
            ..
        })
    )
}

/// A state check on an element that went stale reads as `false`; anything
/// else is a session problem.
fn not_stale(check: Result<bool, CmdError>) -> Result<bool, PageError> {
    match check {
        Ok(value) => Ok(value),
        Err(e) if is_stale(&e) => Ok(false),
        Err(e) => Err(session_error(e)),
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        info!("Navigating to: {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))
    }

    async fn wait_until_ready(&self, timeout: Duration) -> Result<bool, PageError> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self.run_script("return document.readyState;", vec![]).await?;
            if state.as_str() == Some("complete") {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                debug!("Document still '{}' after {:?}", state, timeout);
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn scroll_to(&self, offset: i64) -> Result<(), PageError> {
        self.run_script("window.scrollTo(0, arguments[0]);", vec![json!(offset)])
            .await
            .map(|_| ())
    }

    async fn wait_for(
        &self,
        query: &Query,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Option<Element>, PageError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.probe(query, condition).await? {
                return Ok(Some(element));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, PageError> {
        match self.client.find_all(Self::locator(query)).await {
            Ok(elements) => Ok(elements),
            Err(e) if e.is_no_such_element() => Ok(Vec::new()),
            Err(e) => Err(session_error(e)),
        }
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), PageError> {
        let arg = Self::element_arg(element)?;
        self.run_script("arguments[0].scrollIntoView();", vec![arg])
            .await
            .map(|_| ())
    }

    async fn activate(&self, element: &Element) -> Result<(), PageError> {
        let arg = Self::element_arg(element)?;
        self.client
            .execute("arguments[0].click();", vec![arg])
            .await
            .map(|_| ())
            .map_err(|e| PageError::Interaction(e.to_string()))
    }

    async fn read_text(&self, element: &Element) -> Result<String, PageError> {
        element.text().await.map_err(session_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_headless() {
        let config = WebDriverConfig::default();
        let caps = WebDriverPage::capabilities(&config);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();

        assert!(args.iter().any(|a| a == "--headless"));
        assert!(args.iter().any(|a| a == "--disable-gpu"));
    }

    #[test]
    fn test_capabilities_headed_with_extra_args() {
        let config = WebDriverConfig {
            headless: false,
            browser_args: vec!["--lang=en-US".to_string()],
            ..WebDriverConfig::default()
        };
        let caps = WebDriverPage::capabilities(&config);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();

        assert!(!args.iter().any(|a| a == "--headless"));
        assert_eq!(args.last().unwrap(), "--lang=en-US");
    }

    fn standard(status: ErrorStatus) -> CmdError {
        CmdError::Standard(WebDriverError::new(status, "from the driver"))
    }

    #[test]
    fn test_only_no_such_element_is_a_miss() {
        assert!(standard(ErrorStatus::NoSuchElement).is_no_such_element());
        assert!(!standard(ErrorStatus::InvalidSessionId).is_no_such_element());
    }

    #[test]
    fn test_stale_element_is_not_clickable() {
        assert!(not_stale(Ok(true)).unwrap());
        assert!(!not_stale(Err(standard(ErrorStatus::StaleElementReference))).unwrap());
    }

    #[test]
    fn test_dead_session_during_state_check_is_an_error() {
        let err = not_stale(Err(standard(ErrorStatus::InvalidSessionId))).unwrap_err();
        assert!(matches!(err, PageError::Session(_)));
    }
}
