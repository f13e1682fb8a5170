use crate::protocol::packets::PacketEncoder;
use crate::protocol::utils::{check_fixed_flags, read_string, read_u16, write_string, write_u16, write_u8};
use crate::protocol::{PacketType, ProtocolError, QoS};
use crate::topics::TopicName;

/// SUBSCRIBE carrying exactly one topic filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribePacket {
    pub packet_id: u16,
    pub topic_filter: TopicName,
    pub requested_qos: QoS,
}

impl PacketEncoder for SubscribePacket {
    const PACKET_TYPE: PacketType = PacketType::Subscribe;

    fn fixed_flags(&self) -> u8 {
        0b0010
    }

    fn remaining_length(&self) -> usize {
        2 + 2 + self.topic_filter.len() + 1
    }

    fn encode_body(&self, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
        if self.packet_id == 0 {
            return Err(ProtocolError::MissingPacketId);
        }
        write_u16(self.packet_id, buffer, offset)?;
        write_string(self.topic_filter.as_str(), buffer, offset)?;
        write_u8(self.requested_qos as u8, buffer, offset)
    }

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        check_fixed_flags(header, 0b0010)?;
        let mut offset = 0;

        let packet_id = read_u16(body, &mut offset)?;
        if packet_id == 0 {
            return Err(ProtocolError::MissingPacketId);
        }

        let topic_filter = TopicName::new(read_string(body, &mut offset)?)?;

        let qos_byte = *body.get(offset).ok_or(ProtocolError::IncompletePacket {
            available: body.len(),
        })?;
        offset += 1;
        let requested_qos = QoS::from_u8(qos_byte)?;

        if offset != body.len() {
            return Err(ProtocolError::MalformedPacket);
        }

        Ok(Self {
            packet_id,
            topic_filter,
            requested_qos,
        })
    }
}
