use std::path::PathBuf;

use telemq_core::protocol::packets::ConnectReturnCode;
use telemq_core::protocol::PacketType;
use telemq_core::ProtocolError;
use thiserror::Error;

/// Failure of a client connection or one of its operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("connection refused by broker: {0}")]
    ConnectionRefused(ConnectReturnCode),

    #[error("subscription to '{topic}' rejected by broker")]
    SubscriptionRejected { topic: String },

    #[error("expected {expected}, got {actual}")]
    UnexpectedPacket {
        expected: PacketType,
        actual: PacketType,
    },

    #[error("connection closed by broker")]
    ConnectionClosed,

    #[error("incoming frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
