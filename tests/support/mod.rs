//! Scripted in-memory page used to drive the locator, pipeline and batch runner
//! without a browser.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use transcript_harvester::config::Timings;
use transcript_harvester::locator::{Condition, Descriptor, Query};
use transcript_harvester::page::{Page, PageError};

/// No pauses at all, so scripted runs only spend time inside locator waits
pub fn immediate_timings() -> Timings {
    Timings {
        ready_timeout: 0,
        render_settle: 0,
        scroll_settle: 0,
        activation_settle: 0,
        menu_settle: 0,
        segment_settle: 0,
        row_delay: 0,
        ..Timings::default()
    }
}

/// How the page answers a query
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Matches elements with these texts, in document order
    Match(Vec<String>),
    /// Session error on every lookup
    Fail(String),
    /// Panics when queried
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub query: String,
    pub text: String,
}

#[derive(Default)]
pub struct ScriptedPage {
    rules: HashMap<String, Behavior>,
    hidden: HashSet<String>,
    failing_activation: HashSet<String>,
    failing_navigation: HashSet<String>,
    panicking_navigation: HashSet<String>,
    pub queried: Mutex<Vec<String>>,
    pub activated: Mutex<Vec<String>>,
    pub navigations: Mutex<Vec<String>>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &Query, behavior: Behavior) -> Self {
        self.rules.insert(query.expression.clone(), behavior);
        self
    }

    pub fn matching(self, descriptor: &Descriptor, texts: &[&str]) -> Self {
        let texts = texts.iter().map(|t| t.to_string()).collect();
        self.with(&descriptor.query, Behavior::Match(texts))
    }

    /// Matches of this descriptor are in the DOM but not displayed, so they
    /// satisfy `present` and never `clickable`
    pub fn hidden(mut self, descriptor: &Descriptor) -> Self {
        self.hidden.insert(descriptor.query.expression.clone());
        self
    }

    pub fn failing_activation(mut self, descriptor: &Descriptor) -> Self {
        self.failing_activation.insert(descriptor.query.expression.clone());
        self
    }

    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.failing_navigation.insert(url.to_string());
        self
    }

    pub fn panicking_navigation(mut self, url: &str) -> Self {
        self.panicking_navigation.insert(url.to_string());
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }

    pub fn activated(&self) -> Vec<String> {
        self.activated.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    fn lookup(&self, query: &Query) -> Result<Vec<FakeElement>, PageError> {
        self.queried.lock().unwrap().push(query.expression.clone());
        match self.rules.get(&query.expression) {
            None => Ok(Vec::new()),
            Some(Behavior::Match(texts)) => Ok(texts
                .iter()
                .map(|text| FakeElement {
                    query: query.expression.clone(),
                    text: text.clone(),
                })
                .collect()),
            Some(Behavior::Fail(message)) => Err(PageError::Session(message.clone())),
            Some(Behavior::Panic) => panic!("scripted panic for {}", query.expression),
        }
    }
}

#[async_trait]
impl Page for ScriptedPage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.navigations.lock().unwrap().push(url.to_string());
        if self.panicking_navigation.contains(url) {
            panic!("browser crashed on {}", url);
        }
        if self.failing_navigation.contains(url) {
            return Err(PageError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        Ok(())
    }

    async fn wait_until_ready(&self, _timeout: Duration) -> Result<bool, PageError> {
        Ok(true)
    }

    async fn scroll_to(&self, _offset: i64) -> Result<(), PageError> {
        Ok(())
    }

    async fn wait_for(
        &self,
        query: &Query,
        condition: Condition,
        timeout: Duration,
    ) -> Result<Option<FakeElement>, PageError> {
        let first = self.lookup(query)?.into_iter().next();
        let clickable = !self.hidden.contains(&query.expression);
        match first {
            Some(element) if condition == Condition::Present || clickable => Ok(Some(element)),
            _ => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<FakeElement>, PageError> {
        self.lookup(query)
    }

    async fn scroll_into_view(&self, _element: &FakeElement) -> Result<(), PageError> {
        Ok(())
    }

    async fn activate(&self, element: &FakeElement) -> Result<(), PageError> {
        if self.failing_activation.contains(&element.query) {
            return Err(PageError::Interaction("element is not attached to the page document".to_string()));
        }
        self.activated.lock().unwrap().push(element.query.clone());
        Ok(())
    }

    async fn read_text(&self, element: &FakeElement) -> Result<String, PageError> {
        Ok(element.text.clone())
    }
}
