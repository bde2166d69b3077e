use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking a failed row in the dataset
pub const ERROR_PREFIX: &str = "Error:";

/// Classified reason an extraction produced no transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorKind {
    ControlNotFound,
    ControlClickFailed,
    ContainerNotFound,
    ContainerWaitFailed,
    SegmentsNotFound,
    EmptyText,
    ContentValidationFailed,
    UnexpectedProcessingError,
}

impl ErrorKind {
    /// Human-readable message written to the dataset
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::ControlNotFound => "Transcript button not found",
            ErrorKind::ControlClickFailed => "Could not click transcript button",
            ErrorKind::ContainerNotFound => "Transcript panel failed to load",
            ErrorKind::ContainerWaitFailed => "Failed waiting for transcript panel",
            ErrorKind::SegmentsNotFound => "Could not extract transcript text",
            ErrorKind::EmptyText => "Transcript text is empty",
            ErrorKind::ContentValidationFailed => "Transcript has no recognizable text",
            ErrorKind::UnexpectedProcessingError => "Unexpected processing failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of one extraction. Exactly one is produced per processed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranscriptOutcome {
    Success { text: String, char_count: usize },
    Failure { kind: ErrorKind, detail: String },
}

impl TranscriptOutcome {
    pub fn success(text: String) -> Self {
        let char_count = text.chars().count();
        TranscriptOutcome::Success { text, char_count }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        TranscriptOutcome::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TranscriptOutcome::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            TranscriptOutcome::Success { .. } => None,
            TranscriptOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Dataset cell for this outcome: the transcript itself, or
    /// `Error: <message>[: <detail>]`
    pub fn to_cell(&self) -> String {
        match self {
            TranscriptOutcome::Success { text, .. } => text.clone(),
            TranscriptOutcome::Failure { kind, detail } if detail.is_empty() => {
                format!("{} {}", ERROR_PREFIX, kind.message())
            }
            TranscriptOutcome::Failure { kind, detail } => {
                format!("{} {}: {}", ERROR_PREFIX, kind.message(), detail)
            }
        }
    }
}
