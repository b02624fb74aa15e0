//! Fan-in of connector events.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::connector::{PlatformConnector, PlatformEvent};

/// Default fan-in channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Merges every registered connector's event stream into one mpsc receiver,
/// for the composition root to drain into context ingestion.
pub struct ConnectorManager {
    connectors: Vec<Arc<dyn PlatformConnector>>,
    tx: mpsc::Sender<PlatformEvent>,
    rx: Option<mpsc::Receiver<PlatformEvent>>,
    forwarders: Vec<JoinHandle<()>>,
}

impl ConnectorManager {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            connectors: Vec::new(),
            tx,
            rx: Some(rx),
            forwarders: Vec::new(),
        }
    }

    /// Register a connector and start forwarding its events.
    pub fn add(&mut self, connector: Arc<dyn PlatformConnector>) {
        let mut events = connector.subscribe();
        let tx = self.tx.clone();
        let name = connector.name().to_string();

        self.forwarders.push(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            debug!(connector = %name, "Event sink closed; forwarder stopping");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(connector = %name, skipped, "Connector events dropped under load");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(connector = %name, "Connector event stream closed");
                        break;
                    }
                }
            }
        }));

        self.connectors.push(connector);
    }

    /// Connect every registered connector; returns how many came up.
    pub async fn connect_all(&self) -> usize {
        let mut connected = 0;
        for connector in &self.connectors {
            match connector.connect().await {
                Ok(true) => {
                    info!(connector = %connector.name(), "Connector ready");
                    connected += 1;
                }
                Ok(false) => {
                    info!(connector = %connector.name(), "Connector not configured; skipping");
                }
                Err(e) => {
                    warn!(connector = %connector.name(), error = %e, "Connector failed to connect");
                }
            }
        }
        connected
    }

    /// Take the merged event stream. Callable once.
    pub fn events(&mut self) -> Option<mpsc::Receiver<PlatformEvent>> {
        self.rx.take()
    }

    /// Number of registered connectors.
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// Check if no connector is registered.
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl Default for ConnectorManager {
    fn default() -> Self {
        Self::new()
    }
}
