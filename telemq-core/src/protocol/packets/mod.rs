mod connack;
mod connect;
mod disconnect;
mod pingreq;
mod pingresp;
mod publish;
mod suback;
mod subscribe;

pub use connack::{ConnAckPacket, ConnectReturnCode};
pub use connect::{ConnectFlags, ConnectPacket, MQTT_3_1_1_PROTOCOL_LEVEL, MQTT_PROTOCOL_NAME};
pub use disconnect::DisconnectPacket;
pub use pingreq::PingReqPacket;
pub use pingresp::PingRespPacket;
pub use publish::PublishPacket;
pub use suback::{SubAckPacket, SubAckReturnCode};
pub use subscribe::SubscribePacket;

use log::trace;

use crate::protocol::utils::{split_frame, variable_length_length, write_variable_length};
use crate::protocol::{PacketType, ProtocolError};

/// Whole-frame encoding: fixed header, remaining length, then the body.
pub trait PacketEncoder: Sized {
    const PACKET_TYPE: PacketType;

    fn fixed_flags(&self) -> u8 {
        0b0000
    }

    fn header_first_byte(&self) -> u8 {
        (Self::PACKET_TYPE as u8) << 4 | (self.fixed_flags() & 0x0F)
    }

    /// Length of the variable header plus payload.
    fn remaining_length(&self) -> usize;

    fn encoded_len(&self) -> usize {
        let remaining_length = self.remaining_length();
        1 + variable_length_length(remaining_length) + remaining_length
    }

    fn encode_body(&self, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError>;

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError>;

    fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        let total_len = self.encoded_len();
        if buffer.len() < total_len {
            return Err(ProtocolError::BufferTooSmall {
                buffer_size: buffer.len(),
            });
        }
        buffer[0] = self.header_first_byte();
        let mut offset = 1;
        offset += write_variable_length(self.remaining_length(), &mut buffer[offset..])?;
        self.encode_body(buffer, &mut offset)?;
        if offset != total_len {
            return Err(ProtocolError::InvalidPacketLength {
                expected: total_len,
                actual: offset,
            });
        }
        Ok(offset)
    }

    fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (header, body) = split_frame(bytes)?;
        if PacketType::from_header(header) != Self::PACKET_TYPE {
            return Err(ProtocolError::InvalidPacketType {
                packet_type: header >> 4,
            });
        }
        Self::decode_body(header, body)
    }
}

/// Zero-length packets (PINGREQ, PINGRESP, DISCONNECT) must carry no body.
pub(crate) fn expect_empty_body(body: &[u8]) -> Result<(), ProtocolError> {
    if !body.is_empty() {
        return Err(ProtocolError::InvalidPacketLength {
            expected: 0,
            actual: body.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(ConnectPacket),
    ConnAck(ConnAckPacket),
    Publish(PublishPacket),
    Subscribe(SubscribePacket),
    SubAck(SubAckPacket),
    PingReq(PingReqPacket),
    PingResp(PingRespPacket),
    Disconnect(DisconnectPacket),
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnAck(_) => PacketType::ConnAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::SubAck(_) => PacketType::SubAck,
            Packet::PingReq(_) => PacketType::PingReq,
            Packet::PingResp(_) => PacketType::PingResp,
            Packet::Disconnect(_) => PacketType::Disconnect,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Packet::Connect(packet) => packet.encoded_len(),
            Packet::ConnAck(packet) => packet.encoded_len(),
            Packet::Publish(packet) => packet.encoded_len(),
            Packet::Subscribe(packet) => packet.encoded_len(),
            Packet::SubAck(packet) => packet.encoded_len(),
            Packet::PingReq(packet) => packet.encoded_len(),
            Packet::PingResp(packet) => packet.encoded_len(),
            Packet::Disconnect(packet) => packet.encoded_len(),
        }
    }

    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        match self {
            Packet::Connect(packet) => packet.encode(buffer),
            Packet::ConnAck(packet) => packet.encode(buffer),
            Packet::Publish(packet) => packet.encode(buffer),
            Packet::Subscribe(packet) => packet.encode(buffer),
            Packet::SubAck(packet) => packet.encode(buffer),
            Packet::PingReq(packet) => packet.encode(buffer),
            Packet::PingResp(packet) => packet.encode(buffer),
            Packet::Disconnect(packet) => packet.encode(buffer),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let header = *bytes
            .first()
            .ok_or(ProtocolError::IncompletePacket { available: 0 })?;
        let packet_type = PacketType::from_header(header);
        let packet = match packet_type {
            PacketType::Connect => Packet::Connect(ConnectPacket::decode(bytes)?),
            PacketType::ConnAck => Packet::ConnAck(ConnAckPacket::decode(bytes)?),
            PacketType::Publish => Packet::Publish(PublishPacket::decode(bytes)?),
            PacketType::Subscribe => Packet::Subscribe(SubscribePacket::decode(bytes)?),
            PacketType::SubAck => Packet::SubAck(SubAckPacket::decode(bytes)?),
            PacketType::PingReq => Packet::PingReq(PingReqPacket::decode(bytes)?),
            PacketType::PingResp => Packet::PingResp(PingRespPacket::decode(bytes)?),
            PacketType::Disconnect => Packet::Disconnect(DisconnectPacket::decode(bytes)?),
            PacketType::Reserved | PacketType::Reserved2 => {
                return Err(ProtocolError::InvalidPacketType {
                    packet_type: header >> 4,
                })
            }
            _ => {
                return Err(ProtocolError::UnsupportedPacketType {
                    packet_type: header >> 4,
                })
            }
        };
        trace!("Decoded {} ({} bytes)", packet_type, packet.encoded_len());
        Ok(packet)
    }
}

impl From<ConnectPacket> for Packet {
    fn from(packet: ConnectPacket) -> Self {
        Packet::Connect(packet)
    }
}

impl From<ConnAckPacket> for Packet {
    fn from(packet: ConnAckPacket) -> Self {
        Packet::ConnAck(packet)
    }
}

impl From<PublishPacket> for Packet {
    fn from(packet: PublishPacket) -> Self {
        Packet::Publish(packet)
    }
}

impl From<SubscribePacket> for Packet {
    fn from(packet: SubscribePacket) -> Self {
        Packet::Subscribe(packet)
    }
}

impl From<SubAckPacket> for Packet {
    fn from(packet: SubAckPacket) -> Self {
        Packet::SubAck(packet)
    }
}
