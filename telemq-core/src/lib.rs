//! # telemq-core
//!
//! `no_std` MQTT 3.1.1 client codec and telemetry data model.
//!
//! This crate holds everything that does not need an async runtime: packet
//! encoding and decoding, validated topic and client identifier types, and the
//! synthetic telemetry message exchanged by publishers and subscribers.
//!
//! ## Features
//!
//! - **no_std** compatible - needs only `alloc`
//! - **MQTT 3.1.1** client subset - CONNECT, CONNACK, PUBLISH, SUBSCRIBE,
//!   SUBACK, PINGREQ, PINGRESP, DISCONNECT
//!
//! ## Limitations
//!
//! - QoS 0 only on the publish path
//! - No topic wildcards (+, #)
//! - No will messages, no authentication

#![no_std]

extern crate alloc;

pub mod client;
pub mod protocol;
pub mod telemetry;
pub mod topics;

pub use client::ClientId;
pub use protocol::ProtocolError;
pub use telemetry::TelemetryMessage;
pub use topics::{TopicName, DEFAULT_TOPIC};
