mod support;

use std::time::Duration;
use support::{Behavior, ScriptedPage};
use tokio::time::Instant;
use transcript_harvester::locator::{self, Condition, Descriptor, DescriptorList, LocateResult, Query};

fn list(specs: &[(&str, u64)]) -> DescriptorList {
    let descriptors = specs
        .iter()
        .map(|(name, timeout_ms)| {
            Descriptor::new(*name, Query::xpath(format!("//{}", name)), Condition::Clickable, *timeout_ms)
        })
        .collect();
    DescriptorList::new("test", descriptors).unwrap()
}

fn nth(list: &DescriptorList, n: usize) -> &Descriptor {
    list.iter().nth(n).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_first_match_short_circuits() {
    let descriptors = list(&[("first", 7000), ("second", 5000), ("third", 0)]);
    // Later descriptors would match too, but must never be queried
    let page = ScriptedPage::new()
        .matching(nth(&descriptors, 0), &["Show transcript"])
        .with(&nth(&descriptors, 1).query, Behavior::Panic)
        .with(&nth(&descriptors, 2).query, Behavior::Panic);

    let result = locator::locate(&page, &descriptors).await.unwrap();

    match result {
        LocateResult::Found { element, descriptor } => {
            assert_eq!(descriptor.name, "first");
            assert_eq!(element.text, "Show transcript");
        }
        LocateResult::NotFound => panic!("expected a match"),
    }
    assert_eq!(page.queried(), vec!["//first".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_falls_through_to_later_descriptor() {
    let descriptors = list(&[("first", 1000), ("second", 1000), ("third", 1000)]);
    let page = ScriptedPage::new()
        .matching(nth(&descriptors, 1), &["menu item"])
        .with(&nth(&descriptors, 2).query, Behavior::Panic);

    let result = locator::locate(&page, &descriptors).await.unwrap();

    assert!(result.is_found());
    assert_eq!(page.queried(), vec!["//first".to_string(), "//second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_within_summed_timeouts() {
    let descriptors = list(&[("a", 7000), ("b", 5000), ("c", 0), ("d", 2500)]);
    let page = ScriptedPage::new();

    let started = Instant::now();
    let result = locator::locate(&page, &descriptors).await.unwrap();
    let elapsed = started.elapsed();

    assert!(!result.is_found());
    assert!(elapsed <= descriptors.total_timeout());
    assert_eq!(descriptors.total_timeout(), Duration::from_millis(14_500));
    assert_eq!(page.queried().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_session_error_is_not_a_miss() {
    let descriptors = list(&[("broken", 1000), ("fine", 1000)]);
    let page = ScriptedPage::new()
        .with(&nth(&descriptors, 0).query, Behavior::Fail("invalid session id".to_string()))
        .matching(nth(&descriptors, 1), &["x"]);

    let err = locator::locate(&page, &descriptors).await.unwrap_err();

    assert!(err.to_string().contains("invalid session id"));
    assert_eq!(page.queried().len(), 1);
}

#[tokio::test]
async fn test_locate_all_takes_first_non_empty_set() {
    let descriptors = list(&[("segment-text", 0), ("cue", 0), ("renderer", 0)]);
    let page = ScriptedPage::new()
        .matching(nth(&descriptors, 1), &["one", "two", "three"])
        .with(&nth(&descriptors, 2).query, Behavior::Panic);

    let (descriptor, elements) = locator::locate_all(&page, &descriptors).await.unwrap().unwrap();

    assert_eq!(descriptor.name, "cue");
    let texts: Vec<_> = elements.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["one", "two", "three"]);
}

#[tokio::test]
async fn test_locate_all_nothing_matches() {
    let descriptors = list(&[("segment-text", 0), ("cue", 0)]);
    let page = ScriptedPage::new();

    assert!(locator::locate_all(&page, &descriptors).await.unwrap().is_none());
    assert_eq!(page.queried().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_hidden_element_is_present_but_not_clickable() {
    let hidden = Descriptor::new("panel", Query::xpath("//panel"), Condition::Present, 1000);
    let clickable = Descriptor {
        condition: Condition::Clickable,
        ..hidden.clone()
    };
    let page = ScriptedPage::new().matching(&hidden, &["panel"]).hidden(&hidden);

    let present = DescriptorList::new("present", vec![hidden]).unwrap();
    let clickable = DescriptorList::new("clickable", vec![clickable]).unwrap();

    assert!(locator::locate(&page, &present).await.unwrap().is_found());
    assert!(!locator::locate(&page, &clickable).await.unwrap().is_found());
}
