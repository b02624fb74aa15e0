//! Concurrent task dispatch with per-task failure isolation.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::capability::Capability;
use crate::task::Task;
use crate::worker::{CapabilityRegistry, Worker};

/// Outcome of one dispatch round.
///
/// `tasks` holds every input task, now terminal, in decomposition order —
/// iterate it when order matters; `results` is keyed by task id and
/// unordered. Errored tasks map to `{"error": <text>}`.
#[derive(Debug)]
pub struct DispatchReport {
    pub tasks: Vec<Task>,
    pub results: HashMap<String, serde_json::Value>,
}

enum Scheduled {
    Spawned {
        /// Retained to reconstruct the task if its execution panics.
        fallback: Task,
        handle: JoinHandle<Task>,
    },
    Rejected(Task),
}

/// Runs a task batch against the registry under a bounded pool.
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    max_concurrent: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, max_concurrent: usize) -> Self {
        Self {
            registry,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Execute every dispatchable task concurrently and join them all.
    ///
    /// A task whose capability has no registered worker fails immediately
    /// and is never dispatched. A worker failure (or panic) marks only its
    /// own task as errored — the batch always runs to the end.
    pub async fn dispatch(&self, tasks: Vec<Task>) -> DispatchReport {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        // One registry lookup per capability group.
        let mut workers: HashMap<Capability, Option<Arc<dyn Worker>>> = HashMap::new();
        for task in &tasks {
            if !workers.contains_key(&task.capability) {
                workers.insert(task.capability, self.registry.get(task.capability).await);
            }
        }

        let mut scheduled = Vec::with_capacity(tasks.len());
        for mut task in tasks {
            match workers.get(&task.capability).and_then(Clone::clone) {
                Some(worker) => {
                    let semaphore = Arc::clone(&semaphore);
                    let fallback = task.clone();
                    let handle = tokio::spawn(async move {
                        // The semaphore is never closed while handles are
                        // pending; a failed acquire still fails only this task.
                        let _permit = match semaphore.acquire_owned().await {
                            Ok(permit) => permit,
                            Err(e) => {
                                let _ = task.fail(format!("scheduling failed: {e}"));
                                return task;
                            }
                        };
                        run_task(task, worker).await
                    });
                    scheduled.push(Scheduled::Spawned { fallback, handle });
                }
                None => {
                    warn!(
                        task = %task.id,
                        capability = %task.capability,
                        "No worker registered for capability"
                    );
                    let _ = task.fail(format!("unknown capability: {}", task.capability));
                    scheduled.push(Scheduled::Rejected(task));
                }
            }
        }

        // Full join, in decomposition order.
        let joins = scheduled.into_iter().map(|entry| async move {
            match entry {
                Scheduled::Spawned { fallback, handle } => match handle.await {
                    Ok(task) => task,
                    Err(e) => {
                        let mut task = fallback;
                        let _ = task.fail(format!("worker panicked: {e}"));
                        task
                    }
                },
                Scheduled::Rejected(task) => task,
            }
        });
        let finished = join_all(joins).await;

        let mut results = HashMap::with_capacity(finished.len());
        for task in &finished {
            match (&task.result, &task.error) {
                (Some(value), _) => {
                    results.insert(task.id.clone(), value.clone());
                }
                (None, Some(error)) => {
                    results.insert(task.id.clone(), serde_json::json!({ "error": error }));
                }
                (None, None) => {}
            }
        }

        DispatchReport {
            tasks: finished,
            results,
        }
    }
}

async fn run_task(mut task: Task, worker: Arc<dyn Worker>) -> Task {
    if let Err(e) = task.start() {
        let _ = task.fail(format!("could not start: {e}"));
        return task;
    }
    debug!(task = %task.id, capability = %task.capability, "Task started");

    match worker.execute(&task).await {
        Ok(result) => {
            let _ = task.complete(result);
            debug!(task = %task.id, "Task completed");
        }
        Err(e) => {
            warn!(task = %task.id, error = %e, "Task failed");
            let _ = task.fail(e.to_string());
        }
    }
    task
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::task::TaskStatus;
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    /// Worker that sleeps, then fails on descriptions containing a marker.
    struct ScriptedWorker {
        capability: Capability,
        delay: Duration,
        fail_marker: Option<&'static str>,
    }

    impl ScriptedWorker {
        fn instant(capability: Capability) -> Self {
            Self {
                capability,
                delay: Duration::ZERO,
                fail_marker: None,
            }
        }

        fn slow(capability: Capability, delay: Duration) -> Self {
            Self {
                capability,
                delay,
                fail_marker: None,
            }
        }
    }

    #[async_trait]
    impl Worker for ScriptedWorker {
        fn capability(&self) -> Capability {
            self.capability
        }

        async fn execute(&self, task: &Task) -> Result<serde_json::Value, TaskError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(marker) = self.fail_marker {
                if task.description.contains(marker) {
                    return Err(TaskError::ExecutionFailed {
                        task_id: task.id.clone(),
                        reason: "scripted failure".to_string(),
                    });
                }
            }
            Ok(serde_json::json!({ "echo": task.description }))
        }
    }

    async fn registry_with(workers: Vec<ScriptedWorker>) -> Arc<CapabilityRegistry> {
        let registry = Arc::new(CapabilityRegistry::new());
        for worker in workers {
            registry.register(Arc::new(worker)).await;
        }
        registry
    }

    #[tokio::test]
    async fn one_failing_task_does_not_affect_the_rest() {
        let registry = registry_with(vec![ScriptedWorker {
            capability: Capability::Dev,
            delay: Duration::ZERO,
            fail_marker: Some("poison"),
        }])
        .await;
        let dispatcher = Dispatcher::new(registry, 8);

        let tasks = vec![
            Task::new("fine one", Capability::Dev, 1),
            Task::new("poison pill", Capability::Dev, 1),
            Task::new("fine two", Capability::Dev, 1),
        ];
        let report = dispatcher.dispatch(tasks).await;

        assert_eq!(report.tasks.len(), 3);
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.tasks[0].status, TaskStatus::Completed);
        assert_eq!(report.tasks[1].status, TaskStatus::Error);
        assert_eq!(report.tasks[2].status, TaskStatus::Completed);
        assert!(
            report.tasks[1]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("scripted failure"))
        );
        assert!(report.results[&report.tasks[1].id]["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_capability_fails_without_dispatch() {
        let registry = registry_with(vec![ScriptedWorker::instant(Capability::Dev)]).await;
        let dispatcher = Dispatcher::new(registry, 8);

        let tasks = vec![
            Task::new("known", Capability::Dev, 1),
            Task::new("orphan", Capability::Finance, 1),
        ];
        let report = dispatcher.dispatch(tasks).await;

        assert_eq!(report.tasks[0].status, TaskStatus::Completed);
        assert_eq!(report.tasks[1].status, TaskStatus::Error);
        assert!(
            report.tasks[1]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("unknown capability"))
        );
        // Rejected tasks still get a terminal timestamp.
        assert!(report.tasks[1].completed_at.is_some());
    }

    #[tokio::test]
    async fn tasks_run_concurrently_not_serially() {
        let registry = registry_with(vec![ScriptedWorker::slow(
            Capability::Dev,
            Duration::from_millis(100),
        )])
        .await;
        let dispatcher = Dispatcher::new(registry, 8);

        let tasks = vec![
            Task::new("a", Capability::Dev, 1),
            Task::new("b", Capability::Dev, 1),
            Task::new("c", Capability::Dev, 1),
        ];

        let start = Instant::now();
        let report = dispatcher.dispatch(tasks).await;
        let elapsed = start.elapsed();

        assert!(report.tasks.iter().all(|t| t.status == TaskStatus::Completed));
        // Three 100ms executions in parallel land well under the serial 300ms.
        assert!(
            elapsed < Duration::from_millis(250),
            "dispatch took {elapsed:?}, expected concurrent execution"
        );
    }

    #[tokio::test]
    async fn pool_bound_serializes_when_exhausted() {
        let registry = registry_with(vec![ScriptedWorker::slow(
            Capability::Dev,
            Duration::from_millis(50),
        )])
        .await;
        let dispatcher = Dispatcher::new(registry, 1);

        let tasks = vec![
            Task::new("a", Capability::Dev, 1),
            Task::new("b", Capability::Dev, 1),
        ];

        let start = Instant::now();
        dispatcher.dispatch(tasks).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100),
            "one permit must serialize: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn report_preserves_input_order() {
        let registry = registry_with(vec![
            ScriptedWorker::slow(Capability::Dev, Duration::from_millis(80)),
            ScriptedWorker::instant(Capability::Qa),
        ])
        .await;
        let dispatcher = Dispatcher::new(registry, 8);

        let tasks = vec![
            Task::new("slow first", Capability::Dev, 1),
            Task::new("fast second", Capability::Qa, 1),
        ];
        let ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();

        let report = dispatcher.dispatch(tasks).await;
        let out_ids: Vec<String> = report.tasks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, out_ids);
    }

    #[tokio::test]
    async fn completed_tasks_carry_results_not_errors() {
        let registry = registry_with(vec![ScriptedWorker::instant(Capability::Analyst)]).await;
        let dispatcher = Dispatcher::new(registry, 4);

        let report = dispatcher
            .dispatch(vec![Task::new("analyze", Capability::Analyst, 1)])
            .await;

        let task = &report.tasks[0];
        assert!(task.result.is_some());
        assert!(task.error.is_none());
        assert!(task.completed_at.is_some());
        assert_eq!(report.results[&task.id]["echo"], "analyze");
    }

    #[tokio::test]
    async fn empty_batch_is_fine() {
        let registry = registry_with(vec![]).await;
        let dispatcher = Dispatcher::new(registry, 4);
        let report = dispatcher.dispatch(vec![]).await;
        assert!(report.tasks.is_empty());
        assert!(report.results.is_empty());
    }
}
