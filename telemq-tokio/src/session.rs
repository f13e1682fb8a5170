use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use telemq_core::protocol::packets::Packet;
use telemq_core::{ClientId, TopicName};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::config::HarnessConfig;
use crate::connection::MqttConnection;
use crate::error::ClientError;
use crate::event::{DisconnectReason, ReceivedMessage, SessionEvent};
use crate::handler::EventHandler;
use crate::registry::SessionRegistry;

/// How a subscriber session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub client_id: ClientId,
    pub label: String,
    pub messages_received: u64,
    pub reason: DisconnectReason,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} messages received, {}",
            self.label, self.client_id, self.messages_received, self.reason
        )
    }
}

/// A connected and subscribed session that has not started receiving yet.
pub struct SubscriberSession {
    connection: MqttConnection,
    topic: TopicName,
    label: String,
    keep_alive: Option<Duration>,
    registry: Option<Arc<SessionRegistry>>,
}

impl SubscriberSession {
    /// Connect to the configured broker and subscribe to the configured topic.
    pub async fn connect(
        config: &HarnessConfig,
        client_id: ClientId,
        label: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let topic = TopicName::new(&config.topic)?;
        let mut connection = MqttConnection::connect(&config.broker, client_id).await?;
        connection.subscribe(&topic).await?;

        Ok(Self {
            connection,
            topic,
            label: label.into(),
            keep_alive: config.broker.keep_alive(),
            registry: None,
        })
    }

    /// Track the session in `registry` while its task runs.
    pub fn with_registry(mut self, registry: Arc<SessionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn client_id(&self) -> &ClientId {
        self.connection.client_id()
    }

    pub fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Start the receive loop on its own task.
    pub fn spawn<H: EventHandler>(self, handler: H) -> SessionHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let client_id = self.client_id().clone();
        let label = self.label.clone();

        if let Some(registry) = &self.registry {
            registry.insert(client_id.clone(), label.clone());
        }

        let task = tokio::spawn(self.run(handler, stop_rx));
        SessionHandle {
            client_id,
            label,
            stop: stop_tx,
            task,
        }
    }

    async fn run<H: EventHandler>(mut self, mut handler: H, mut stop: watch::Receiver<bool>) -> SessionSummary {
        let client_id = self.client_id().clone();
        info!("{} ({}) listening on '{}'", self.label, client_id, self.topic);

        handler
            .handle(SessionEvent::Connected {
                client_id: client_id.clone(),
                session_present: self.connection.session_present(),
            })
            .await;

        let mut keep_alive = self.keep_alive.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let mut awaiting_pingresp = false;
        let mut messages_received = 0u64;

        let reason = loop {
            tokio::select! {
                // stop wins over any packet already buffered
                biased;

                changed = stop.changed() => {
                    // a dropped handle counts as a stop request
                    let stopped = changed.is_err() || *stop.borrow();
                    if !stopped {
                        continue;
                    }
                    if let Err(e) = self.connection.disconnect().await {
                        debug!("{}: DISCONNECT not delivered: {}", self.label, e);
                    }
                    break DisconnectReason::Stopped;
                }

                packet = self.connection.next_packet() => {
                    match packet {
                        Ok(Some(Packet::Publish(publish))) => {
                            messages_received += 1;
                            trace!("{}: message {} on '{}'", self.label, messages_received, publish.topic_name);
                            let message = ReceivedMessage::new(publish.topic_name, publish.payload);
                            handler.handle(SessionEvent::MessageReceived(message)).await;
                        }
                        Ok(Some(Packet::PingResp(_))) => {
                            awaiting_pingresp = false;
                        }
                        Ok(Some(other)) => {
                            debug!("{}: ignoring unexpected {}", self.label, other.packet_type());
                        }
                        Ok(None) => {
                            info!("{}: broker closed the connection", self.label);
                            break DisconnectReason::ClosedByBroker;
                        }
                        Err(e) => {
                            warn!("{}: {}", self.label, e);
                            break DisconnectReason::Error(e.to_string());
                        }
                    }
                }

                _ = next_tick(&mut keep_alive) => {
                    if awaiting_pingresp {
                        warn!("{}: no PINGRESP within keep-alive period", self.label);
                        break DisconnectReason::KeepAliveTimeout;
                    }
                    if let Err(e) = self.connection.ping().await {
                        warn!("{}: failed to send PINGREQ: {}", self.label, e);
                        break DisconnectReason::Error(e.to_string());
                    }
                    awaiting_pingresp = true;
                }
            }
        };

        info!("{} disconnected: {}", self.label, reason);
        handler
            .handle(SessionEvent::Disconnected {
                reason: reason.clone(),
            })
            .await;

        if let Some(registry) = &self.registry {
            registry.remove(&client_id);
        }

        SessionSummary {
            client_id,
            label: self.label,
            messages_received,
            reason,
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Owner side of a running session. Dropping it also stops the session.
pub struct SessionHandle {
    client_id: ClientId,
    label: String,
    stop: watch::Sender<bool>,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Ask the session to stop without waiting for it.
    pub fn signal_stop(&self) {
        self.stop.send_replace(true);
    }

    /// Wait for the session task to end.
    pub async fn join(mut self) -> SessionSummary {
        let result = (&mut self.task).await;
        self.into_summary(result)
    }

    /// Stop the session and wait until its handler has seen the last event.
    pub async fn stop(self) -> SessionSummary {
        self.signal_stop();
        self.join().await
    }

    /// Run until `shutdown` resolves or the session ends on its own.
    pub async fn run_until<F>(mut self, shutdown: F) -> SessionSummary
    where
        F: Future<Output = ()>,
    {
        let finished = tokio::select! {
            _ = shutdown => None,
            result = &mut self.task => Some(result),
        };
        match finished {
            Some(result) => self.into_summary(result),
            None => {
                debug!("Shutdown requested for {}", self.label);
                self.stop().await
            }
        }
    }

    fn into_summary(self, result: Result<SessionSummary, JoinError>) -> SessionSummary {
        match result {
            Ok(summary) => summary,
            Err(e) => {
                error!("Session task for {} failed: {}", self.label, e);
                SessionSummary {
                    client_id: self.client_id,
                    label: self.label,
                    messages_received: 0,
                    reason: DisconnectReason::Error(format!("session task failed: {}", e)),
                }
            }
        }
    }
}
