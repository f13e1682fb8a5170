//! Synthetic telemetry messages
//!
//! A publisher produces one message per iteration; the text form is what goes
//! on the wire.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// One telemetry sample. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryMessage {
    sequence: u64,
    device_id: u32,
    payload: String,
}

impl TelemetryMessage {
    pub fn new(device_id: u32, sequence: u64) -> Self {
        Self {
            sequence,
            device_id,
            payload: format!("Device {}: Data {}", device_id, sequence),
        }
    }

    /// Recognise a payload produced by [`TelemetryMessage::new`].
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix("Device ")?;
        let (device, sequence) = rest.split_once(": Data ")?;
        let message = Self::new(device.parse().ok()?, sequence.parse().ok()?);
        // integer parsing also accepts "+1" and "007"
        (message.payload == text).then_some(message)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.payload.into_bytes()
    }
}

impl core::fmt::Display for TelemetryMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.payload)
    }
}
