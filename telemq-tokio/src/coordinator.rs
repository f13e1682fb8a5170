use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use telemq_core::ClientId;

use crate::config::HarnessConfig;
use crate::error::ClientError;
use crate::handler::EventHandler;
use crate::registry::SessionRegistry;
use crate::session::{SessionHandle, SessionSummary, SubscriberSession};

/// Runs several independent subscriber sessions and stops them together.
///
/// Each session owns its connection and runs on its own task. The only state
/// they share is the live-session registry.
pub struct Coordinator {
    config: HarnessConfig,
    registry: Arc<SessionRegistry>,
    sessions: Vec<SessionHandle>,
    id_base: u32,
    started: u32,
}

impl Coordinator {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            registry: Arc::new(SessionRegistry::new()),
            sessions: Vec::new(),
            id_base: rand::random(),
            started: 0,
        }
    }

    /// Connect, subscribe and start one more session. Returns without waiting
    /// for any message.
    pub async fn start<H: EventHandler>(
        &mut self,
        label: impl Into<String>,
        handler: H,
    ) -> Result<ClientId, ClientError> {
        let client_id = self.next_client_id();
        let label = label.into();
        debug!("Starting session '{}' as {}", label, client_id);

        let session = SubscriberSession::connect(&self.config, client_id.clone(), label)
            .await?
            .with_registry(self.registry.clone());
        self.sessions.push(session.spawn(handler));
        Ok(client_id)
    }

    /// Sessions started and not yet shut down
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sessions whose task is still running
    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Stop every session and wait for all of them. When this returns no
    /// handler of this coordinator runs any more.
    pub async fn shutdown(&mut self) -> Vec<SessionSummary> {
        let sessions = std::mem::take(&mut self.sessions);
        info!("Stopping {} subscriber sessions", sessions.len());

        for session in &sessions {
            session.signal_stop();
        }
        let mut summaries = Vec::with_capacity(sessions.len());
        for session in sessions {
            summaries.push(session.join().await);
        }
        summaries
    }

    /// Wait for `shutdown`, then stop everything.
    pub async fn run_until<F>(mut self, shutdown: F) -> Vec<SessionSummary>
    where
        F: Future<Output = ()>,
    {
        shutdown.await;
        self.shutdown().await
    }

    fn next_client_id(&mut self) -> ClientId {
        let n = self.id_base.wrapping_add(self.started);
        self.started += 1;
        ClientId::generate(&self.config.subscriber.client_id_prefix, n)
    }
}
