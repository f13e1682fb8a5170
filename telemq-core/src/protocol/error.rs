#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer too small for packet
    BufferTooSmall { buffer_size: usize },
    /// Client identifier is empty
    ClientIdEmpty,
    /// Client identifier length exceeded maximum allowed length
    ClientIdLengthExceeded {
        max_length: usize,
        actual_length: usize,
    },
    /// Client identifier contains a character outside [0-9a-zA-Z_-]
    InvalidClientIdCharacter { character: char },
    /// Incomplete packet (not enough data)
    IncompletePacket { available: usize },
    /// Invalid or unsupported connect flags in CONNECT
    InvalidConnectFlags { flags: u8 },
    /// Invalid connect return code in CONNACK
    InvalidConnectReturnCode { return_code: u8 },
    /// Fixed header flags do not match the value required for the packet type
    InvalidFixedHeaderFlags { expected: u8, actual: u8 },
    /// Variable length integer is malformed or out of range
    InvalidLengthEncoding,
    /// Packet length does not match expected length
    InvalidPacketLength { expected: usize, actual: usize },
    /// Invalid packet type
    InvalidPacketType { packet_type: u8 },
    /// Invalid protocol name in CONNECT
    InvalidProtocolName,
    /// Invalid QoS level
    InvalidQosLevel { level: u8 },
    /// Invalid session present flag in CONNACK
    InvalidSessionPresentFlag { flag: u8 },
    /// Invalid SUBACK return code
    InvalidSubAckReturnCode { return_code: u8 },
    /// Topic name contains a wildcard or NUL character
    InvalidTopicCharacter { character: char },
    /// Invalid UTF-8 string
    InvalidUtf8String,
    /// Packet is structurally malformed
    MalformedPacket,
    /// Missing Packet Identifier where one is required
    MissingPacketId,
    /// Topic name is empty
    TopicEmpty,
    /// Topic name length exceeded maximum allowed length
    TopicNameLengthExceeded {
        max_length: usize,
        actual_length: usize,
    },
    /// Well-formed packet type that this client never handles
    UnsupportedPacketType { packet_type: u8 },
    /// Unsupported protocol level in CONNECT
    UnsupportedProtocolLevel { level: u8 },
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::BufferTooSmall { buffer_size } => {
                write!(f, "Buffer too small for packet: size {}", buffer_size)
            }
            ProtocolError::ClientIdEmpty => write!(f, "Client ID is empty"),
            ProtocolError::ClientIdLengthExceeded {
                max_length,
                actual_length,
            } => {
                write!(
                    f,
                    "Client ID length exceeded: length {}, max {}",
                    actual_length, max_length
                )
            }
            ProtocolError::InvalidClientIdCharacter { character } => {
                write!(f, "Invalid character in client ID: {:?}", character)
            }
            ProtocolError::IncompletePacket { available } => {
                write!(f, "Incomplete packet: available {}", available)
            }
            ProtocolError::InvalidConnectFlags { flags } => {
                write!(f, "Invalid connect flags in CONNECT packet: {:#010b}", flags)
            }
            ProtocolError::InvalidConnectReturnCode { return_code } => {
                write!(f, "Invalid connect return code in CONNACK: {}", return_code)
            }
            ProtocolError::InvalidFixedHeaderFlags { expected, actual } => {
                write!(
                    f,
                    "Invalid fixed header flags: expected {:#06b}, got {:#06b}",
                    expected, actual
                )
            }
            ProtocolError::InvalidLengthEncoding => {
                write!(f, "Invalid variable length integer encoding")
            }
            ProtocolError::InvalidPacketLength { expected, actual } => {
                write!(
                    f,
                    "Invalid packet length: expected {}, got {}",
                    expected, actual
                )
            }
            ProtocolError::InvalidPacketType { packet_type } => {
                write!(f, "Invalid packet type: {}", packet_type)
            }
            ProtocolError::InvalidProtocolName => {
                write!(f, "Invalid protocol name in CONNECT packet")
            }
            ProtocolError::InvalidQosLevel { level } => {
                write!(f, "Invalid QoS level: {}", level)
            }
            ProtocolError::InvalidSessionPresentFlag { flag } => {
                write!(
                    f,
                    "Invalid session present flag in CONNACK packet: {}",
                    flag
                )
            }
            ProtocolError::InvalidSubAckReturnCode { return_code } => {
                write!(f, "Invalid SUBACK return code: {:#04x}", return_code)
            }
            ProtocolError::InvalidTopicCharacter { character } => {
                write!(f, "Invalid character in topic name: {:?}", character)
            }
            ProtocolError::InvalidUtf8String => write!(f, "Invalid UTF-8 string"),
            ProtocolError::MalformedPacket => write!(f, "Malformed packet"),
            ProtocolError::MissingPacketId => {
                write!(f, "Missing Packet Identifier where one is required")
            }
            ProtocolError::TopicEmpty => write!(f, "Topic name is empty"),
            ProtocolError::TopicNameLengthExceeded {
                max_length,
                actual_length,
            } => {
                write!(
                    f,
                    "Topic name length exceeded: length {}, max {}",
                    actual_length, max_length
                )
            }
            ProtocolError::UnsupportedPacketType { packet_type } => {
                write!(f, "Unsupported packet type: {}", packet_type)
            }
            ProtocolError::UnsupportedProtocolLevel { level } => {
                write!(f, "Unsupported protocol level in CONNECT packet: {}", level)
            }
        }
    }
}

impl core::error::Error for ProtocolError {}
