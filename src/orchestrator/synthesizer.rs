//! Result synthesis into a single narrative summary.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::config::OrchestratorConfig;
use crate::llm::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::task::Task;

/// Fallback summary returned when the provider cannot be reached.
pub const SYNTHESIS_FALLBACK: &str =
    "Tasks finished, some with errors. Check the logs for per-task details.";

/// Produces the final narrative for a processed command.
pub struct Synthesizer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
}

impl Synthesizer {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &OrchestratorConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.synthesis_temperature,
        }
    }

    /// Summarize what was executed, problems found, and next steps.
    ///
    /// Provider failure yields the fixed fallback string — no retry is
    /// attempted here or anywhere else.
    pub async fn synthesize(
        &self,
        command: &str,
        tasks: &[Task],
        results: &HashMap<String, serde_json::Value>,
    ) -> String {
        let task_digest =
            serde_json::to_string_pretty(tasks).unwrap_or_else(|_| "[]".to_string());
        let result_digest =
            serde_json::to_string_pretty(results).unwrap_or_else(|_| "{}".to_string());

        let user = format!(
            "You executed multiple tasks for this command.\n\n\
             Original command: {command}\n\n\
             Executed tasks:\n{task_digest}\n\n\
             Results:\n{result_digest}\n\n\
             Provide a clear, concise synthesis of what was completed, any problems \
             encountered, and recommended next steps. Keep a professional but \
             conversational tone."
        );

        let request = CompletionRequest::new(
            vec![
                ChatMessage::system(
                    "You are the coordinator of a team of specialist workers, reporting \
                     back to the person who issued the command.",
                ),
                ChatMessage::user(user),
            ],
            self.model.clone(),
            self.temperature,
        );

        match self.provider.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Synthesis failed; returning the fallback summary");
                SYNTHESIS_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::llm::MockProvider;

    fn synthesizer(provider: MockProvider) -> Synthesizer {
        Synthesizer::new(Arc::new(provider), &OrchestratorConfig::default())
    }

    fn one_task() -> (Vec<Task>, HashMap<String, serde_json::Value>) {
        let mut task = Task::new("do y", Capability::Dev, 1);
        task.start().unwrap();
        task.complete(serde_json::json!({"output": "done"})).unwrap();
        let mut results = HashMap::new();
        results.insert(task.id.clone(), serde_json::json!({"output": "done"}));
        (vec![task], results)
    }

    #[tokio::test]
    async fn returns_provider_text() {
        let (tasks, results) = one_task();
        let summary = synthesizer(MockProvider::with_responses(["All done; ship it."]))
            .synthesize("do y", &tasks, &results)
            .await;
        assert_eq!(summary, "All done; ship it.");
    }

    #[tokio::test]
    async fn provider_failure_yields_fixed_fallback() {
        let (tasks, results) = one_task();
        let summary = synthesizer(MockProvider::failing())
            .synthesize("do y", &tasks, &results)
            .await;
        assert_eq!(summary, SYNTHESIS_FALLBACK);
    }

    #[tokio::test]
    async fn works_on_an_empty_batch() {
        let summary = synthesizer(MockProvider::with_responses(["Nothing to do."]))
            .synthesize("noop", &[], &HashMap::new())
            .await;
        assert_eq!(summary, "Nothing to do.");
    }
}
