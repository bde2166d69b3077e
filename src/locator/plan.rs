use serde::{Deserialize, Serialize};

use super::{Condition, Descriptor, DescriptorList, Query};

/// One step of the reveal-control search.
///
/// When `opener` is set, the pipeline activates it before searching `targets`
/// (e.g. an overflow menu whose items only exist once it is open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealStrategy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener: Option<Descriptor>,
    pub targets: DescriptorList,
}

/// Every descriptor list used by one run. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    pub reveal: Vec<RevealStrategy>,
    pub container: DescriptorList,
    pub segments: DescriptorList,
}

impl Default for SearchPlan {
    fn default() -> Self {
        Self {
            reveal: default_reveal(),
            container: default_container(),
            segments: default_segments(),
        }
    }
}

fn list(descriptors: Vec<Descriptor>) -> DescriptorList {
    DescriptorList(descriptors)
}

fn default_reveal() -> Vec<RevealStrategy> {
    vec![
        RevealStrategy {
            name: "description button".to_string(),
            opener: None,
            targets: list(vec![Descriptor::new(
                "transcript button by aria-label",
                Query::xpath(
                    "//button[contains(@aria-label, 'Show transcript') or contains(@aria-label, 'transcript')]",
                ),
                Condition::Clickable,
                7000,
            )]),
        },
        RevealStrategy {
            name: "more actions menu".to_string(),
            opener: Some(Descriptor::new(
                "more actions button",
                Query::xpath("//button[@aria-label='More actions']"),
                Condition::Present,
                0,
            )),
            targets: list(vec![Descriptor::new(
                "transcript menu item",
                Query::xpath(
                    "//yt-formatted-string[contains(text(), 'Show transcript') or contains(text(), 'Transcript')]",
                ),
                Condition::Clickable,
                5000,
            )]),
        },
        RevealStrategy {
            name: "structural fallbacks".to_string(),
            opener: None,
            targets: list(vec![
                Descriptor::new(
                    "button with exact aria-label",
                    Query::xpath("//button[@aria-label='Show transcript']"),
                    Condition::Present,
                    0,
                ),
                Descriptor::new(
                    "button by text",
                    Query::xpath("//button[contains(text(), 'Show transcript')]"),
                    Condition::Present,
                    0,
                ),
                Descriptor::new(
                    "button renderer by aria-label",
                    Query::xpath("//yt-button-renderer[contains(@aria-label, 'transcript')]"),
                    Condition::Present,
                    0,
                ),
                Descriptor::new(
                    "button by class",
                    Query::xpath("//button[contains(@class, 'transcript')]"),
                    Condition::Present,
                    0,
                ),
            ]),
        },
    ]
}

fn default_container() -> DescriptorList {
    list(vec![
        Descriptor::new(
            "segments container id",
            Query::xpath("//div[@id='segments-container']"),
            Condition::Present,
            10_000,
        ),
        Descriptor::new(
            "transcript renderer element",
            Query::xpath("//ytd-transcript-renderer"),
            Condition::Present,
            10_000,
        ),
        Descriptor::new(
            "div with transcript class",
            Query::xpath("//div[contains(@class, 'transcript')]"),
            Condition::Present,
            10_000,
        ),
        Descriptor::new(
            "segment renderer class",
            Query::xpath("//div[@class='ytd-transcript-segment-renderer']"),
            Condition::Present,
            10_000,
        ),
    ])
}

fn default_segments() -> DescriptorList {
    list(vec![
        Descriptor::new(
            "segment-text div",
            Query::xpath("//div[@class='segment-text']"),
            Condition::Present,
            0,
        ),
        Descriptor::new(
            "segment-text formatted string",
            Query::xpath(
                "//yt-formatted-string[@class='segment-text style-scope ytd-transcript-segment-renderer']",
            ),
            Condition::Present,
            0,
        ),
        Descriptor::new(
            "cue group cues",
            Query::xpath("//div[contains(@class, 'cue-group')]//div[contains(@class, 'cue')]"),
            Condition::Present,
            0,
        ),
        Descriptor::new(
            "segment renderer strings",
            Query::xpath("//ytd-transcript-segment-renderer//yt-formatted-string"),
            Condition::Present,
            0,
        ),
        Descriptor::new(
            "segment-text scoped div",
            Query::xpath("//div[@class='segment-text style-scope ytd-transcript-segment-renderer']"),
            Condition::Present,
            0,
        ),
    ])
}
