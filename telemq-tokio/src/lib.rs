//! # telemq-tokio
//!
//! Tokio MQTT client harness: publish synthetic telemetry, subscribe and
//! print it, or run several subscriber sessions side by side.
//!
//! Built on `telemq-core` for the wire format. Talks to any MQTT 3.1.1
//! broker over plain TCP.
//!
//! ## Example
//!
//! ```no_run
//! use telemq_tokio::{run_subscriber, HarnessConfig, PrintHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HarnessConfig::from_env()?;
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     run_subscriber(&config, PrintHandler::new(), shutdown).await?;
//!     Ok(())
//! }
//! ```

// Re-export core types for convenience
pub use telemq_core::{
    protocol::packets::Packet, ClientId, ProtocolError, TelemetryMessage, TopicName, DEFAULT_TOPIC,
};

// Public API
pub mod config;
pub mod connection;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod handler;
pub mod publisher;
pub mod registry;
pub mod session;
pub mod subscriber;

pub use config::{BrokerConfig, HarnessConfig, PublisherConfig, SubscriberConfig};
pub use connection::MqttConnection;
pub use coordinator::Coordinator;
pub use error::{ClientError, ConfigError};
pub use event::{DisconnectReason, ReceivedMessage, SessionEvent};
pub use handler::{ChannelHandler, EventHandler, PrintHandler};
pub use publisher::{run_publisher, DelayRange, LatencyWindow, PublishReport, Publisher};
pub use registry::SessionRegistry;
pub use session::{SessionHandle, SessionSummary, SubscriberSession};
pub use subscriber::run_subscriber;

// Modules (private)
mod io;

#[cfg(test)]
mod testing;
