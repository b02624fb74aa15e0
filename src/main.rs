use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;

use conductor::capability::Capability;
use conductor::config::OrchestratorConfig;
use conductor::connector::ConnectorManager;
use conductor::context::ContextStore;
use conductor::llm::{ProviderConfig, create_provider};
use conductor::orchestrator::Orchestrator;
use conductor::worker::{CapabilityRegistry, DomainWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read API key from environment
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: OPENAI_API_KEY not set");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    let model = std::env::var("CONDUCTOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let max_concurrent: usize = std::env::var("CONDUCTOR_MAX_CONCURRENT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8);

    eprintln!("🤝 Conductor v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {model}");
    eprintln!("   Concurrency: {max_concurrent}");
    eprintln!("   Type a command and press Enter. /quit to exit.\n");

    // Completion provider
    let mut provider_config = ProviderConfig::new(secrecy::SecretString::from(api_key));
    if let Ok(endpoint) = std::env::var("CONDUCTOR_ENDPOINT") {
        provider_config = provider_config.with_endpoint(endpoint);
    }
    let provider = create_provider(provider_config)?;

    let config = OrchestratorConfig {
        model: model.clone(),
        max_concurrent_tasks: max_concurrent,
        ..OrchestratorConfig::default()
    };

    // ── Workers ─────────────────────────────────────────────────────────
    let registry = Arc::new(CapabilityRegistry::new());
    for capability in Capability::ALL {
        registry
            .register(Arc::new(DomainWorker::new(
                capability,
                Arc::clone(&provider),
                model.clone(),
            )))
            .await;
    }
    eprintln!("   Workers: {} registered", registry.count().await);

    // ── Orchestrator ────────────────────────────────────────────────────
    let store = Arc::new(ContextStore::new());
    let orchestrator = Arc::new(Orchestrator::new(config, store, registry, provider));

    // ── Platform connectors ─────────────────────────────────────────────
    // Concrete integrations register here; events flow straight into
    // context ingestion.
    let mut connectors = ConnectorManager::new();
    let ready = connectors.connect_all().await;
    eprintln!("   Connectors: {ready} ready\n");

    if let Some(mut events) = connectors.events() {
        let sink = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if let Err(e) = sink
                    .add_conversation_context(
                        &event.connector,
                        &event.conversation_id,
                        &event.participants,
                        &event.content,
                        HashMap::new(),
                    )
                    .await
                {
                    tracing::warn!(error = %e, "Failed to ingest connector event");
                }
            }
        });
    }

    // ── Command loop ────────────────────────────────────────────────────
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let no_context = HashMap::new();

    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "/quit" {
            break;
        }

        if let Some(notice) = orchestrator.proactive_check(command, &[]).await {
            println!("\n⚠ {notice}\n");
        }

        let outcome = orchestrator.process_command(command, &no_context).await;

        println!("\nTasks: {}", outcome.tasks.len());
        for task in &outcome.tasks {
            match &task.error {
                Some(error) => {
                    println!("  ✗ [{}] {} — {error}", task.capability, task.description)
                }
                None => println!("  ✓ [{}] {}", task.capability, task.description),
            }
        }
        println!("\n{}\n", outcome.synthesis);
    }

    Ok(())
}
