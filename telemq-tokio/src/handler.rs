use async_trait::async_trait;
use log::info;
use tokio::sync::mpsc;

use crate::event::SessionEvent;

/// Receives the events of one subscriber session, in order.
///
/// A session owns its handler and calls it from the session task, so no two
/// events of the same session are ever handled concurrently.
#[async_trait]
pub trait EventHandler: Send + 'static {
    async fn handle(&mut self, event: SessionEvent);
}

/// Forwards every event into an unbounded channel.
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventHandler for ChannelHandler {
    async fn handle(&mut self, event: SessionEvent) {
        // receiver gone means nobody is listening any more
        let _ = self.tx.send(event);
    }
}

/// Prints each received payload on stdout, one line per message. Without a
/// label the line is the payload text alone.
#[derive(Debug, Clone, Default)]
pub struct PrintHandler {
    label: Option<String>,
}

impl PrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every line with `label`, e.g. `Subscriber 1 received: ...`
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    pub fn line(&self, text: &str) -> String {
        match &self.label {
            Some(label) => format!("{} received: {}", label, text),
            None => text.to_string(),
        }
    }
}

#[async_trait]
impl EventHandler for PrintHandler {
    async fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected { client_id, .. } => {
                info!("{} connected", self.label.as_deref().unwrap_or(client_id.as_str()));
            }
            SessionEvent::MessageReceived(message) => {
                println!("{}", self.line(&message.text()));
            }
            SessionEvent::Disconnected { reason } => {
                info!("{} disconnected: {}", self.label.as_deref().unwrap_or("Subscriber"), reason);
            }
        }
    }
}
