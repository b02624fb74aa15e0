//! Command orchestration: decomposition, dispatch, synthesis, conflict watch.

pub mod conflict;
pub mod decomposer;
pub mod dispatcher;
pub mod engine;
pub mod synthesizer;

pub use conflict::ConflictMonitor;
pub use decomposer::Decomposer;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use engine::{CommandOutcome, Orchestrator};
pub use synthesizer::{SYNTHESIS_FALLBACK, Synthesizer};

use crate::context::ContextItem;

/// One digest line per item: kind plus a content snippet.
///
/// Shared by the decomposer (relevant-context digest) and the conflict
/// monitor (prior-decision digest).
pub(crate) fn context_digest(items: &[ContextItem], snippet_chars: usize) -> String {
    if items.is_empty() {
        return "No relevant context available.".to_string();
    }
    items
        .iter()
        .map(|item| {
            let snippet: String = item.content.chars().take(snippet_chars).collect();
            format!("- {}: {snippet}...", item.kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
