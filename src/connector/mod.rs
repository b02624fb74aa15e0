//! Platform connector boundary.
//!
//! Concrete chat / issue-tracker / document integrations live outside this
//! crate. They implement [`PlatformConnector`] and surface inbound activity
//! as [`PlatformEvent`]s over a broadcast channel — subscribers get pushed
//! events, nobody polls.

pub mod manager;

pub use manager::ConnectorManager;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::ConnectorError;

/// A message record fetched from a platform's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMessage {
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Inbound platform activity, ready for context ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Connector that produced the event ("slack", "jira", …).
    pub connector: String,
    /// Conversation / channel / thread identifier.
    pub conversation_id: String,
    pub participants: Vec<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// External collaboration platform (chat, issue tracker, document store).
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    /// Connector name ("slack", "jira", …).
    fn name(&self) -> &str;

    /// Establish the platform session. `Ok(false)` means not configured.
    async fn connect(&self) -> Result<bool, ConnectorError>;

    /// Send a message to a target channel or user.
    async fn send_message(&self, target: &str, text: &str) -> Result<(), ConnectorError>;

    /// Fetch recent message records from a source channel.
    async fn get_history(
        &self,
        source: &str,
        limit: usize,
    ) -> Result<Vec<PlatformMessage>, ConnectorError>;

    /// Subscribe to inbound events.
    fn subscribe(&self) -> broadcast::Receiver<PlatformEvent>;
}
