//! Layered element search.
//!
//! Page markup for the same control differs between rollouts and locales, so
//! every search is an ordered list of [`Descriptor`]s: the most specific matcher
//! first, looser fallbacks after it. The first descriptor that matches wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub mod plan;

pub use plan::{RevealStrategy, SearchPlan};

use crate::page::{Page, PageError};
use crate::HarvesterError;

/// Query language of a descriptor expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    XPath,
    Css,
}

/// A query expression understood by the page session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub strategy: Strategy,
    pub expression: String,
}

impl Query {
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::XPath,
            expression: expression.into(),
        }
    }

    pub fn css(expression: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            expression: expression.into(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            Strategy::XPath => write!(f, "xpath:{}", self.expression),
            Strategy::Css => write!(f, "css:{}", self.expression),
        }
    }
}

/// Readiness an element must reach before a descriptor counts as matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Attached to the DOM
    Present,
    /// Displayed and enabled
    Clickable,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present => write!(f, "present"),
            Condition::Clickable => write!(f, "clickable"),
        }
    }
}

/// Named query plus its wait budget and required condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub query: Query,
    pub condition: Condition,
    /// Wait budget in milliseconds; zero probes once without waiting
    #[serde(default)]
    pub timeout_ms: u64,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, query: Query, condition: Condition, timeout_ms: u64) -> Self {
        Self {
            name: name.into(),
            query,
            condition,
            timeout_ms,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Non-empty, ordered list of descriptors for one search purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Descriptor>", into = "Vec<Descriptor>")]
pub struct DescriptorList(Vec<Descriptor>);

impl DescriptorList {
    pub fn new(purpose: &str, descriptors: Vec<Descriptor>) -> Result<Self, HarvesterError> {
        if descriptors.is_empty() {
            return Err(HarvesterError::EmptyDescriptorList(purpose.to_string()));
        }
        Ok(Self(descriptors))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Worst-case latency of a [`locate`] call over this list
    pub fn total_timeout(&self) -> Duration {
        self.0.iter().map(Descriptor::timeout).sum()
    }
}

impl TryFrom<Vec<Descriptor>> for DescriptorList {
    type Error = HarvesterError;

    fn try_from(descriptors: Vec<Descriptor>) -> Result<Self, Self::Error> {
        Self::new("descriptors", descriptors)
    }
}

impl From<DescriptorList> for Vec<Descriptor> {
    fn from(list: DescriptorList) -> Self {
        list.0
    }
}

/// Outcome of one search call
#[derive(Debug)]
pub enum LocateResult<'a, E> {
    Found { element: E, descriptor: &'a Descriptor },
    NotFound,
}

impl<'a, E> LocateResult<'a, E> {
    pub fn is_found(&self) -> bool {
        matches!(self, LocateResult::Found { .. })
    }
}

/// Try each descriptor in order and return the first element that satisfies
/// its condition within its timeout.
///
/// A miss on one descriptor is not an error. `Err` is reserved for session
/// failures. The page is only queried, never modified.
pub async fn locate<'a, P>(
    page: &P,
    descriptors: &'a DescriptorList,
) -> Result<LocateResult<'a, P::Element>, PageError>
where
    P: Page + ?Sized,
{
    for descriptor in descriptors.iter() {
        match page
            .wait_for(&descriptor.query, descriptor.condition, descriptor.timeout())
            .await?
        {
            Some(element) => {
                info!("Found element via '{}'", descriptor.name);
                return Ok(LocateResult::Found { element, descriptor });
            }
            None => debug!(
                "No {} match for '{}' within {:?}",
                descriptor.condition,
                descriptor.name,
                descriptor.timeout()
            ),
        }
    }

    Ok(LocateResult::NotFound)
}

/// Plural variant of [`locate`]: the first descriptor whose query matches a
/// non-empty set of elements wins. No waiting, each query runs once.
pub async fn locate_all<'a, P>(
    page: &P,
    descriptors: &'a DescriptorList,
) -> Result<Option<(&'a Descriptor, Vec<P::Element>)>, PageError>
where
    P: Page + ?Sized,
{
    for descriptor in descriptors.iter() {
        let elements = page.find_all(&descriptor.query).await?;
        if !elements.is_empty() {
            info!(
                "Found {} elements via '{}'",
                elements.len(),
                descriptor.name
            );
            return Ok(Some((descriptor, elements)));
        }
        debug!("No elements for '{}'", descriptor.name);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, timeout_ms: u64) -> Descriptor {
        Descriptor::new(name, Query::xpath(format!("//{}", name)), Condition::Present, timeout_ms)
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = DescriptorList::new("container", Vec::new()).unwrap_err();
        assert!(matches!(err, HarvesterError::EmptyDescriptorList(p) if p == "container"));
    }

    #[test]
    fn test_total_timeout_sums_descriptors() {
        let list = DescriptorList::new(
            "segments",
            vec![descriptor("a", 7000), descriptor("b", 0), descriptor("c", 2500)],
        )
        .unwrap();
        assert_eq!(list.total_timeout(), Duration::from_millis(9500));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_deserialize_rejects_empty_list() {
        let parsed: Result<DescriptorList, _> = serde_yaml::from_str("[]");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_deserialize_descriptor_yaml() {
        let yaml = r##"
- name: panel
  query:
    strategy: css
    expression: "#segments-container"
  condition: present
  timeout_ms: 4000
"##;
        let list: DescriptorList = serde_yaml::from_str(yaml).unwrap();
        let first = list.iter().next().unwrap();
        assert_eq!(first.query, Query::css("#segments-container"));
        assert_eq!(first.timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_query_display() {
        assert_eq!(Query::xpath("//button").to_string(), "xpath://button");
        assert_eq!(Query::css("div.cue").to_string(), "css:div.cue");
    }
}
