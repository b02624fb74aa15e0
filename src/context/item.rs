//! Context item model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a context item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Conversation,
    Document,
    Decision,
    Meeting,
}

impl ContextKind {
    /// Lowercase label, used for display and substring search.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Document => "document",
            Self::Decision => "decision",
            Self::Meeting => "meeting",
        }
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An immutable, timestamped record of collaboration context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextItem {
    /// Unique id; re-adding the same id overwrites the stored item.
    pub id: String,
    pub kind: ContextKind,
    pub content: String,
    /// Origin label ("slack", "jira", "conductor", …).
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
    /// Relevance weight in [0, 1].
    pub importance: f64,
}

impl ContextItem {
    /// Create an item with default importance 0.5 and the current time.
    pub fn new(
        id: impl Into<String>,
        kind: ContextKind,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            source: source.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
            importance: 0.5,
        }
    }

    /// Set the importance weight.
    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
