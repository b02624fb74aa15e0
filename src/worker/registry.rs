//! Capability registry mapping tags to workers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::capability::Capability;
use crate::worker::worker::Worker;

/// Registry of capability workers.
///
/// Dispatch is always by `Capability` tag. The keyword classifier exists for
/// callers holding free text only — it never routes a task.
pub struct CapabilityRegistry {
    workers: RwLock<HashMap<Capability, Arc<dyn Worker>>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a worker under its capability, replacing any previous one.
    pub async fn register(&self, worker: Arc<dyn Worker>) {
        let capability = worker.capability();
        if self
            .workers
            .write()
            .await
            .insert(capability, worker)
            .is_some()
        {
            tracing::warn!(%capability, "Replaced existing worker registration");
        } else {
            tracing::debug!(%capability, "Registered worker");
        }
    }

    /// Get the worker for a capability.
    pub async fn get(&self, capability: Capability) -> Option<Arc<dyn Worker>> {
        self.workers.read().await.get(&capability).cloned()
    }

    /// Check if a capability has a worker.
    pub async fn has(&self, capability: Capability) -> bool {
        self.workers.read().await.contains_key(&capability)
    }

    /// Registered capabilities, in catalog order.
    pub async fn capabilities(&self) -> Vec<Capability> {
        let workers = self.workers.read().await;
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| workers.contains_key(c))
            .collect()
    }

    /// Number of registered workers.
    pub async fn count(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Heuristic: first capability (catalog order) whose worker vocabulary
    /// appears in the text. Fallback classifier only, never dispatch.
    pub async fn classify(&self, description: &str) -> Option<Capability> {
        let workers = self.workers.read().await;
        Capability::ALL.iter().copied().find(|c| {
            workers
                .get(c)
                .is_some_and(|w| w.can_handle(description))
        })
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
