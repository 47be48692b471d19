//! Annotation envelope: who asserted which occurrence, and with what intent

use serde::{Deserialize, Serialize};
use std::fmt;

use super::occurrence::Occurrence;

/// What the annotator expects the receiving collection to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    #[default]
    None,
    Insert,
    Update,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// The agent that produced an annotation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotator {
    pub name: String,
    /// SHA-1 of the annotator's mailbox URI
    pub mbox_sha1sum: String,
    pub workplace_homepage: String,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One annotation: an assertion carrying exactly one occurrence body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// `rdf:about` of the annotation element
    pub id: String,
    pub expectation: Expectation,
    pub annotated_at: String,
    /// Motivation markers in document order, duplicates kept
    pub motivations: Vec<String>,
    pub annotator: Option<Annotator>,
    /// The body; `None` when the annotation closed without an occurrence
    pub occurrence: Option<Occurrence>,
}

impl Annotation {
    /// Creates an annotation for the given `rdf:about` value
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Name of the annotator, empty when no annotator was given
    pub fn annotator_name(&self) -> &str {
        self.annotator
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotator_name() {
        let mut annotation = Annotation::new("urn:uuid:a");
        assert_eq!(annotation.annotator_name(), "");

        annotation.annotator = Some(Annotator {
            name: "Jane Collector".to_string(),
            ..Annotator::default()
        });
        assert_eq!(annotation.annotator_name(), "Jane Collector");
    }

    #[test]
    fn test_expectation_serializes_lowercase() {
        let json = serde_json::to_string(&Expectation::Insert).unwrap();
        assert_eq!(json, "\"insert\"");
        assert_eq!(Expectation::default(), Expectation::None);
    }
}
