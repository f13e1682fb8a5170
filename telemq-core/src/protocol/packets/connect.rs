use crate::client::ClientId;
use crate::protocol::packets::PacketEncoder;
use crate::protocol::utils::{check_fixed_flags, read_string, read_u16, write_string, write_u16, write_u8};
use crate::protocol::{PacketType, ProtocolError};

pub const MQTT_PROTOCOL_NAME: &str = "MQTT";
pub const MQTT_3_1_1_PROTOCOL_LEVEL: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ConnectFlags(u8);

impl ConnectFlags {
    pub const RESERVED: Self = Self(0b_0000_0001);
    pub const CLEAN_SESSION: Self = Self(0b_0000_0010);
    pub const WILL_FLAG: Self = Self(0b_0000_0100);
    pub const WILL_QOS_1: Self = Self(0b_0000_1000);
    pub const WILL_QOS_2: Self = Self(0b_0001_0000);
    pub const WILL_RETAIN: Self = Self(0b_0010_0000);
    pub const PASSWORD: Self = Self(0b_0100_0000);
    pub const USERNAME: Self = Self(0b_1000_0000);

    /// Flags that would require will/credential fields this client never sends.
    const UNSUPPORTED: u8 = Self::RESERVED.0
        | Self::WILL_FLAG.0
        | Self::WILL_QOS_1.0
        | Self::WILL_QOS_2.0
        | Self::WILL_RETAIN.0
        | Self::PASSWORD.0
        | Self::USERNAME.0;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Fixed Header
///   byte 1:  0x10                      (type=1, flags=0000)
///   bytes :  Remaining Length (var-int)
///
/// Variable Header
///   Protocol Name      ("MQTT" as UTF-8 string)
///   Protocol Level     (0x04 for MQTT 3.1.1)
///   Connect Flags      (bitfield)
///   Keep Alive         (2 bytes)
///
/// Payload
///   Client Identifier  (UTF-8 string)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPacket {
    pub connect_flags: ConnectFlags,
    pub keep_alive: u16,
    pub client_id: ClientId,
}

impl ConnectPacket {
    pub fn clean_session(client_id: ClientId, keep_alive: u16) -> Self {
        Self {
            connect_flags: ConnectFlags::CLEAN_SESSION,
            keep_alive,
            client_id,
        }
    }
}

impl PacketEncoder for ConnectPacket {
    const PACKET_TYPE: PacketType = PacketType::Connect;

    fn remaining_length(&self) -> usize {
        2 + MQTT_PROTOCOL_NAME.len() // Protocol Name
            + 1 // Protocol Level
            + 1 // Connect Flags
            + 2 // Keep Alive
            + 2 + self.client_id.len()
    }

    fn encode_body(&self, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
        write_string(MQTT_PROTOCOL_NAME, buffer, offset)?;
        write_u8(MQTT_3_1_1_PROTOCOL_LEVEL, buffer, offset)?;
        write_u8(self.connect_flags.bits(), buffer, offset)?;
        write_u16(self.keep_alive, buffer, offset)?;
        write_string(self.client_id.as_str(), buffer, offset)
    }

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        check_fixed_flags(header, 0b0000)?;
        let mut offset = 0;

        let protocol_name = read_string(body, &mut offset)?;
        if protocol_name != MQTT_PROTOCOL_NAME {
            return Err(ProtocolError::InvalidProtocolName);
        }

        let protocol_level = *body.get(offset).ok_or(ProtocolError::IncompletePacket {
            available: body.len(),
        })?;
        offset += 1;
        if protocol_level != MQTT_3_1_1_PROTOCOL_LEVEL {
            return Err(ProtocolError::UnsupportedProtocolLevel {
                level: protocol_level,
            });
        }

        let flags = *body.get(offset).ok_or(ProtocolError::IncompletePacket {
            available: body.len(),
        })?;
        offset += 1;
        if flags & ConnectFlags::UNSUPPORTED != 0 {
            return Err(ProtocolError::InvalidConnectFlags { flags });
        }

        let keep_alive = read_u16(body, &mut offset)?;
        let client_id = ClientId::new(read_string(body, &mut offset)?)?;

        if offset != body.len() {
            return Err(ProtocolError::InvalidPacketLength {
                expected: offset,
                actual: body.len(),
            });
        }

        Ok(Self {
            connect_flags: ConnectFlags(flags),
            keep_alive,
            client_id,
        })
    }
}
