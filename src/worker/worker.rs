//! Worker trait and the LLM-backed domain worker.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::capability::Capability;
use crate::error::TaskError;
use crate::llm::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::task::Task;

/// A capability-specific execution unit.
#[async_trait]
pub trait Worker: Send + Sync {
    /// The capability this worker serves.
    fn capability(&self) -> Capability;

    /// Domain vocabulary for heuristic classification of free text.
    fn keywords(&self) -> &'static [&'static str] {
        self.capability().keywords()
    }

    /// Heuristic check that a description falls in this worker's domain
    /// vocabulary. Never used for dispatch — dispatch is by capability tag.
    fn can_handle(&self, description: &str) -> bool {
        let lowered = description.to_lowercase();
        self.keywords().iter().any(|k| lowered.contains(k))
    }

    /// Execute one task, producing an opaque result payload.
    async fn execute(&self, task: &Task) -> Result<serde_json::Value, TaskError>;
}

/// LLM-backed worker for one capability domain.
///
/// Keyword hits in the task description pick a specialized prompt template
/// (an API-endpoint task gets the endpoint template, a test task the test
/// template, …); everything else falls through to the domain's general
/// template.
pub struct DomainWorker {
    capability: Capability,
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
}

impl DomainWorker {
    pub fn new(
        capability: Capability,
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            capability,
            provider,
            model: model.into(),
            temperature: 0.2,
        }
    }

    /// Override the sampling temperature (default 0.2).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Worker for DomainWorker {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn execute(&self, task: &Task) -> Result<serde_json::Value, TaskError> {
        if !self.can_handle(&task.description) {
            debug!(
                task = %task.id,
                capability = %self.capability,
                "Task description outside this domain's vocabulary"
            );
        }

        let (system, user) = build_prompt(self.capability, &task.description);
        let request = CompletionRequest::new(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            self.model.clone(),
            self.temperature,
        );

        let text = self
            .provider
            .complete(request)
            .await
            .map_err(|e| TaskError::ExecutionFailed {
                task_id: task.id.clone(),
                reason: e.to_string(),
            })?;

        Ok(serde_json::json!({ "output": text }))
    }
}

/// Select the prompt pair (system, user) for a capability and description.
fn build_prompt(capability: Capability, description: &str) -> (String, String) {
    let system = format!(
        "You are the {} specialist of a collaboration assistant. Domain: {}.",
        capability.tag(),
        capability.description()
    );

    let lowered = description.to_lowercase();
    let user = match capability {
        Capability::Dev => {
            if lowered.contains("endpoint") || lowered.contains("api") {
                format!(
                    "Produce a complete API endpoint for this task:\n\n{description}\n\n\
                     Include the endpoint code, unit tests, documentation, error handling \
                     and input validation."
                )
            } else if lowered.contains("test") {
                format!(
                    "Produce a complete test suite for this task:\n\n{description}\n\n\
                     Include unit tests, integration tests, edge cases, and the mocks and \
                     fixtures they need."
                )
            } else {
                format!(
                    "Produce clean, well-documented code following best practices for this \
                     task:\n\n{description}"
                )
            }
        }
        Capability::Qa => {
            if lowered.contains("pull request") || lowered.contains("pr ") {
                format!(
                    "As a QA engineer, review the change described below and produce \
                     end-to-end test cases, a risk analysis, improvement suggestions and a \
                     testing plan:\n\n{description}"
                )
            } else {
                format!(
                    "Produce complete test cases for:\n\n{description}\n\n\
                     Cover positive, negative, edge and regression cases, with the test data \
                     they need."
                )
            }
        }
        Capability::Designer => {
            if lowered.contains("mockup") || lowered.contains("wireframe") {
                format!(
                    "Produce a detailed mockup for:\n\n{description}\n\n\
                     Include the HTML structure, CSS following a design system, interaction \
                     notes, UX considerations and responsive behavior."
                )
            } else {
                format!("Produce a design proposal for:\n\n{description}")
            }
        }
        Capability::Hr => {
            if lowered.contains("onboarding") {
                format!(
                    "Create a complete onboarding plan for:\n\n{description}\n\n\
                     Include a welcome message, accounts to provision, onboarding meetings, \
                     a buddy assignment and a first-week checklist."
                )
            } else {
                format!("Handle this people-operations task:\n\n{description}")
            }
        }
        Capability::Finance => {
            if lowered.contains("invoice")
                || lowered.contains("expense")
                || lowered.contains("factura")
                || lowered.contains("gasto")
            {
                format!(
                    "Process this expense or invoice:\n\n{description}\n\n\
                     Categorize it, validate it against policy, prepare it for approval and \
                     assess the budget impact."
                )
            } else {
                format!("Handle this finance task:\n\n{description}")
            }
        }
        Capability::Sales => {
            if lowered.contains("demo") {
                format!(
                    "Create a complete demo briefing for:\n\n{description}\n\n\
                     Summarize the lead's company, role and prior interactions, likely pain \
                     points, and the demo strategy."
                )
            } else {
                format!("Handle this sales task:\n\n{description}")
            }
        }
        Capability::Marketing => {
            if lowered.contains("email") {
                format!(
                    "Write a professional email for:\n\n{description}\n\n\
                     Include a compelling subject, the body, a call to action, and match the \
                     tone to the audience."
                )
            } else {
                format!("Produce marketing content for:\n\n{description}")
            }
        }
        Capability::Support => {
            if lowered.contains("ticket") {
                format!(
                    "Create a support ticket for:\n\n{description}\n\n\
                     Include problem category, priority, a detailed description, reproduction \
                     steps and the customer information."
                )
            } else {
                format!("Handle this customer-support task:\n\n{description}")
            }
        }
        Capability::Analyst => {
            if lowered.contains("correlation") || lowered.contains("correlación") {
                format!(
                    "Analyze the requested correlation:\n\n{description}\n\n\
                     Describe the methodology, the data required, the metrics to correlate, \
                     how to interpret results, and recommendations."
                )
            } else if lowered.contains("report") || lowered.contains("reporte") {
                format!(
                    "Produce the requested report:\n\n{description}\n\n\
                     Include the key metrics, trends and actionable insights."
                )
            } else {
                format!("Analyze the following and report findings:\n\n{description}")
            }
        }
    };

    (system, user)
}
