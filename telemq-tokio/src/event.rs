use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use telemq_core::{ClientId, TelemetryMessage, TopicName};

/// A message delivered on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub topic: TopicName,
    pub payload: Bytes,
}

impl ReceivedMessage {
    pub fn new(topic: TopicName, payload: impl Into<Bytes>) -> Self {
        Self {
            topic,
            payload: payload.into(),
        }
    }

    /// Payload as text. Invalid UTF-8 is replaced, never rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Telemetry sample carried by the payload, if it has the publisher's format
    pub fn telemetry(&self) -> Option<TelemetryMessage> {
        TelemetryMessage::parse(&self.text())
    }
}

/// Why a subscriber session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Stop was requested locally
    Stopped,
    ClosedByBroker,
    /// No PINGRESP within one keep-alive period
    KeepAliveTimeout,
    Error(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Stopped => f.write_str("stopped"),
            DisconnectReason::ClosedByBroker => f.write_str("connection closed by broker"),
            DisconnectReason::KeepAliveTimeout => f.write_str("keep-alive timeout"),
            DisconnectReason::Error(e) => write!(f, "error: {}", e),
        }
    }
}

/// Events a subscriber session hands to its [`crate::EventHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected {
        client_id: ClientId,
        session_present: bool,
    },
    MessageReceived(ReceivedMessage),
    /// Always the last event of a session
    Disconnected { reason: DisconnectReason },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_telemetry() {
        let message = ReceivedMessage::new(TopicName::default(), &b"Device 3: Data 12"[..]);
        assert_eq!(message.text(), "Device 3: Data 12");
        let telemetry = message.telemetry().unwrap();
        assert_eq!(telemetry.device_id(), 3);
        assert_eq!(telemetry.sequence(), 12);
    }

    #[test]
    fn test_non_utf8_payload_is_lossy() {
        let message = ReceivedMessage::new(TopicName::default(), vec![b'o', b'k', 0xFF]);
        assert_eq!(message.text(), "ok\u{FFFD}");
        assert_eq!(message.telemetry(), None);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(DisconnectReason::KeepAliveTimeout.to_string(), "keep-alive timeout");
        assert_eq!(
            DisconnectReason::Error("reset".into()).to_string(),
            "error: reset"
        );
    }
}
