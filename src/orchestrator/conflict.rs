//! Proactive conflict detection against prior decisions.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ConflictConfig, OrchestratorConfig};
use crate::context::{ContextItem, ContextKind, ContextStore};
use crate::llm::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::orchestrator::context_digest;

/// Watches new input for tension with high-importance prior decisions.
pub struct ConflictMonitor {
    store: Arc<ContextStore>,
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
    snippet_chars: usize,
    config: ConflictConfig,
}

impl ConflictMonitor {
    pub fn new(
        store: Arc<ContextStore>,
        provider: Arc<dyn CompletionProvider>,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            provider,
            model: config.model.clone(),
            temperature: config.synthesis_temperature,
            snippet_chars: config.digest_snippet_chars,
            config: config.conflict.clone(),
        }
    }

    /// Produce an intervention message when the text trips a conflict
    /// keyword AND at least one qualifying decision exists.
    ///
    /// `None` when nothing qualifies — and on provider failure, which is
    /// logged and swallowed: a missed intervention is not an error.
    pub async fn check(&self, current_text: &str, participants: &[String]) -> Option<String> {
        let lowered = current_text.to_lowercase();
        let tripped: Vec<&str> = self
            .config
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
            .collect();
        if tripped.is_empty() {
            return None;
        }

        // The full text rarely appears verbatim in a stored decision; its
        // signal words do. Query with both and dedupe.
        let mut queries = vec![current_text];
        queries.extend(tripped);

        let mut seen = std::collections::HashSet::new();
        let mut decisions: Vec<ContextItem> = Vec::new();
        for query in queries {
            for item in self.store.search(query, self.config.search_limit).await {
                if item.kind == ContextKind::Decision
                    && item.importance > self.config.importance_threshold
                    && seen.insert(item.id.clone())
                {
                    decisions.push(item);
                }
            }
        }

        if decisions.is_empty() {
            return None;
        }

        debug!(
            decisions = decisions.len(),
            "Potential conflict with prior decisions"
        );

        let digest = context_digest(&decisions, self.snippet_chars);
        let user = format!(
            "A possible conflict with earlier decisions was detected.\n\n\
             Current context: {current_text}\n\
             Participants: {}\n\n\
             Relevant prior decisions:\n{digest}\n\n\
             Write a proactive, respectful intervention that identifies the potential \
             conflict, gives the context of the prior decisions, suggests how to \
             proceed, and keeps a collaborative tone. Answer in direct conversational \
             form.",
            participants.join(", ")
        );

        let request = CompletionRequest::new(
            vec![
                ChatMessage::system(
                    "You are a collaboration assistant watching for contradictions with \
                     decisions the team already agreed on.",
                ),
                ChatMessage::user(user),
            ],
            self.model.clone(),
            self.temperature,
        );

        match self.provider.complete(request).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Conflict intervention request failed");
                None
            }
        }
    }
}
