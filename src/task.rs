//! Task model and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::Capability;
use crate::error::TaskError;

/// Status of a task.
///
/// Transitions are monotonic; `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting to be dispatched.
    Pending,
    /// A worker is executing the task.
    Running,
    /// Task finished with a result.
    Completed,
    /// Task failed; `error` carries the description.
    Error,
}

impl TaskStatus {
    /// Check if this status allows transitioning to another status.
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        use TaskStatus::*;

        matches!(
            (self, target),
            (Pending, Running) | (Running, Completed) | (Running, Error) |
            // Tasks without a registered worker fail without ever running.
            (Pending, Error)
        )
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// A unit of work produced by decomposition and consumed by one worker.
///
/// `result` and `error` are mutually exclusive; `completed_at` is stamped
/// only on the terminal transition.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Unique task ID.
    pub id: String,
    /// What the worker should do.
    pub description: String,
    /// Target worker's domain tag.
    pub capability: Capability,
    /// Priority as emitted by decomposition — carried through, not enforced.
    pub priority: i32,
    /// Current status.
    pub status: TaskStatus,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
    /// Payload of a completed task.
    pub result: Option<serde_json::Value>,
    /// Failure description of an errored task.
    pub error: Option<String>,
}

impl Task {
    /// Create a new pending task with a fresh unique id.
    pub fn new(description: impl Into<String>, capability: Capability, priority: i32) -> Self {
        Self {
            id: format!("task-{}", Uuid::new_v4()),
            description: description.into(),
            capability,
            priority,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
            error: None,
        }
    }

    fn transition_to(&mut self, target: TaskStatus) -> Result<(), TaskError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskError::InvalidTransition {
                id: self.id.clone(),
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        if target.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Mark the task as running.
    pub fn start(&mut self) -> Result<(), TaskError> {
        self.transition_to(TaskStatus::Running)
    }

    /// Terminal success: store the payload and stamp completion.
    pub fn complete(&mut self, result: serde_json::Value) -> Result<(), TaskError> {
        self.transition_to(TaskStatus::Completed)?;
        self.result = Some(result);
        self.error = None;
        Ok(())
    }

    /// Terminal failure: store the failure text and stamp completion.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TaskError> {
        self.transition_to(TaskStatus::Error)?;
        self.error = Some(error.into());
        self.result = None;
        Ok(())
    }
}
