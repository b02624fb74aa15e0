//! Orchestrator composition and public API.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::context::{ContextItem, ContextKind, ContextStore, PROJECT_ID_KEY};
use crate::error::ContextError;
use crate::llm::CompletionProvider;
use crate::orchestrator::conflict::ConflictMonitor;
use crate::orchestrator::decomposer::Decomposer;
use crate::orchestrator::dispatcher::Dispatcher;
use crate::orchestrator::synthesizer::Synthesizer;
use crate::task::{Task, TaskStatus};
use crate::worker::CapabilityRegistry;

/// Importance defaults for ingested context.
const CONVERSATION_IMPORTANCE: f64 = 0.7;
const DECISION_IMPORTANCE: f64 = 0.9;

/// Response object of one processed command.
#[derive(Debug, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    /// Tasks in decomposition order, all terminal.
    pub tasks: Vec<Task>,
    /// Result payloads keyed by task id; `tasks` is the ordering authority.
    pub results: HashMap<String, serde_json::Value>,
    pub synthesis: String,
}

/// Composes store, registry and provider into the command-processing and
/// context-ingestion API.
///
/// Built once at the composition root; holds no global state. Safe to share
/// across concurrent callers — the store is the only shared mutable state
/// and guards itself.
pub struct Orchestrator {
    store: Arc<ContextStore>,
    registry: Arc<CapabilityRegistry>,
    decomposer: Decomposer,
    dispatcher: Dispatcher,
    synthesizer: Synthesizer,
    conflicts: ConflictMonitor,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<ContextStore>,
        registry: Arc<CapabilityRegistry>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        let decomposer = Decomposer::new(Arc::clone(&store), Arc::clone(&provider), &config);
        let dispatcher = Dispatcher::new(Arc::clone(&registry), config.max_concurrent_tasks);
        let synthesizer = Synthesizer::new(Arc::clone(&provider), &config);
        let conflicts = ConflictMonitor::new(Arc::clone(&store), provider, &config);

        Self {
            store,
            registry,
            decomposer,
            dispatcher,
            synthesizer,
            conflicts,
        }
    }

    /// Process one natural-language command: decompose, dispatch, synthesize.
    ///
    /// Provider and worker failures never escape: the worst case is a single
    /// errored fallback task plus the fallback synthesis text.
    pub async fn process_command(
        &self,
        command: &str,
        context: &HashMap<String, String>,
    ) -> CommandOutcome {
        info!(%command, "Processing command");

        let available = self.registry.capabilities().await;
        let tasks = self.decomposer.decompose(command, context, &available).await;

        let report = self.dispatcher.dispatch(tasks).await;
        info!(
            completed = report
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count(),
            errored = report
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Error)
                .count(),
            "Dispatch finished"
        );

        let synthesis = self
            .synthesizer
            .synthesize(command, &report.tasks, &report.results)
            .await;

        CommandOutcome {
            command: command.to_string(),
            tasks: report.tasks,
            results: report.results,
            synthesis,
        }
    }

    /// Record a conversation fragment from a platform (importance 0.7).
    pub async fn add_conversation_context(
        &self,
        platform: &str,
        conversation_id: &str,
        participants: &[String],
        content: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), ContextError> {
        let mut item = ContextItem::new(
            format!("conv_{platform}_{conversation_id}_{}", Uuid::new_v4()),
            ContextKind::Conversation,
            content,
            platform,
        )
        .with_importance(CONVERSATION_IMPORTANCE);
        item.metadata
            .insert("participants".to_string(), participants.join(","));
        item.metadata
            .insert("conversation_id".to_string(), conversation_id.to_string());
        item.metadata.extend(metadata);

        self.store.add(item).await
    }

    /// Record a decision the team took (importance 0.9).
    pub async fn add_decision_context(
        &self,
        decision_id: &str,
        decision: &str,
        rationale: &str,
        participants: &[String],
        project_id: Option<&str>,
    ) -> Result<(), ContextError> {
        let mut item = ContextItem::new(
            format!("decision_{decision_id}"),
            ContextKind::Decision,
            format!("Decision: {decision}\nRationale: {rationale}"),
            "conductor",
        )
        .with_importance(DECISION_IMPORTANCE);
        item.metadata
            .insert("participants".to_string(), participants.join(","));
        item.metadata
            .insert("decision_id".to_string(), decision_id.to_string());
        if let Some(project) = project_id {
            item.metadata
                .insert(PROJECT_ID_KEY.to_string(), project.to_string());
        }

        self.store.add(item).await
    }

    /// Ask the conflict monitor whether the text collides with prior
    /// decisions.
    pub async fn proactive_check(
        &self,
        current_text: &str,
        participants: &[String],
    ) -> Option<String> {
        self.conflicts.check(current_text, participants).await
    }

    /// Shared context store, for direct queries and connector ingestion.
    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }
}
