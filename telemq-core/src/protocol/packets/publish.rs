use alloc::vec::Vec;

use crate::protocol::packets::PacketEncoder;
use crate::protocol::utils::{read_string, read_u16, write_string, write_u16};
use crate::protocol::{PacketType, ProtocolError, QoS};
use crate::topics::TopicName;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct PublishFlags {
    dup: bool,
    qos: QoS,
    retain: bool,
}

impl PublishFlags {
    const fn to_nibble(self) -> u8 {
        let dup = if self.dup { 1u8 } else { 0u8 };
        let retain = if self.retain { 1u8 } else { 0u8 };
        (dup << 3) | ((self.qos as u8) << 1) | retain
    }

    fn from_nibble(nibble: u8) -> Result<Self, ProtocolError> {
        let qos = QoS::from_u8((nibble >> 1) & 0b11)?;
        Ok(PublishFlags {
            dup: (nibble & 0b1000) != 0,
            qos,
            retain: (nibble & 0b0001) != 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPacket {
    pub topic_name: TopicName,
    pub packet_id: Option<u16>,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub dup: bool,
    pub retain: bool,
}

impl PublishPacket {
    /// Fire-and-forget publish: QoS 0, no packet identifier, not retained.
    pub fn at_most_once(topic_name: TopicName, payload: Vec<u8>) -> Self {
        Self {
            topic_name,
            packet_id: None,
            payload,
            qos: QoS::AtMostOnce,
            dup: false,
            retain: false,
        }
    }
}

impl PacketEncoder for PublishPacket {
    const PACKET_TYPE: PacketType = PacketType::Publish;

    fn fixed_flags(&self) -> u8 {
        PublishFlags {
            dup: self.dup,
            qos: self.qos,
            retain: self.retain,
        }
        .to_nibble()
    }

    fn remaining_length(&self) -> usize {
        let mut remaining_length = 2 + self.topic_name.len();
        if self.qos != QoS::AtMostOnce {
            remaining_length += 2; // packet ID
        }
        remaining_length + self.payload.len()
    }

    fn encode_body(&self, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
        write_string(self.topic_name.as_str(), buffer, offset)?;

        if self.qos != QoS::AtMostOnce {
            let pid = self.packet_id.ok_or(ProtocolError::MissingPacketId)?;
            write_u16(pid, buffer, offset)?;
        }

        let end = *offset + self.payload.len();
        if end > buffer.len() {
            return Err(ProtocolError::BufferTooSmall {
                buffer_size: buffer.len(),
            });
        }
        buffer[*offset..end].copy_from_slice(&self.payload);
        *offset = end;
        Ok(())
    }

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        let publish_flags = PublishFlags::from_nibble(header & 0x0F)?;
        let mut offset = 0;

        let topic_name = TopicName::new(read_string(body, &mut offset)?)?;

        let packet_id = if publish_flags.qos != QoS::AtMostOnce {
            let pid = read_u16(body, &mut offset)?;
            if pid == 0 {
                return Err(ProtocolError::MissingPacketId);
            }
            Some(pid)
        } else {
            None
        };

        Ok(Self {
            topic_name,
            packet_id,
            payload: body[offset..].to_vec(),
            qos: publish_flags.qos,
            dup: publish_flags.dup,
            retain: publish_flags.retain,
        })
    }
}

impl core::fmt::Display for PublishPacket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "PublishPacket {{ topic_name: {}, packet_id: {:?}, qos: {:?}, dup: {}, retain: {}, payload: {} bytes }}",
            self.topic_name,
            self.packet_id,
            self.qos,
            self.dup,
            self.retain,
            self.payload.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn roundtrip_test(bytes: &[u8]) -> PublishPacket {
        let packet = PublishPacket::decode(bytes).unwrap();
        let mut buffer = [0u8; 256];
        let size = packet.encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..size], bytes, "Encoded bytes mismatch");
        packet
    }

    #[test]
    fn test_encode_telemetry_payload() {
        let packet = PublishPacket::at_most_once(
            TopicName::default(),
            b"Device 1: Data 0".to_vec(),
        );
        let mut buffer = [0u8; 64];
        let size = packet.encode(&mut buffer).unwrap();
        assert_eq!(size, 24);
        assert_eq!(&buffer[..8], &[0x30, 0x16, 0x00, 0x04, b'd', b'a', b't', b'a']);
        assert_eq!(&buffer[8..size], b"Device 1: Data 0");
    }

    #[test]
    fn test_qos0_with_payload() {
        // QoS 0, topic="sensor/temp" (11 bytes), payload="hello" (5 bytes)
        let bytes: &[u8] = &[
            0x30, 0x12, 0x00, 0x0B, b's', b'e', b'n', b's', b'o', b'r', b'/', b't', b'e', b'm',
            b'p', b'h', b'e', b'l', b'l', b'o',
        ];
        let packet = roundtrip_test(bytes);
        assert_eq!(packet.topic_name.as_str(), "sensor/temp");
        assert_eq!(packet.qos, QoS::AtMostOnce);
        assert_eq!(packet.packet_id, None);
        assert_eq!(packet.payload, b"hello");
    }

    #[test]
    fn test_qos1_with_packet_id() {
        let bytes = [0x32, 0x07, 0x00, 0x01, b'a', 0x00, 0x0A, b'2', b'2'];
        let packet = roundtrip_test(&bytes);
        assert_eq!(packet.qos, QoS::AtLeastOnce);
        assert_eq!(packet.packet_id, Some(10));
        assert_eq!(packet.payload, b"22");
    }

    #[test]
    fn test_dup_and_retain_flags() {
        let bytes = [0x3B, 0x05, 0x00, 0x01, b'a', 0x00, 0x01];
        let packet = roundtrip_test(&bytes);
        assert!(packet.dup);
        assert!(packet.retain);
        assert_eq!(packet.qos, QoS::AtLeastOnce);
    }

    #[test]
    fn test_empty_payload() {
        let packet = roundtrip_test(&[0x30, 0x03, 0x00, 0x01, b'a']);
        assert!(packet.payload.is_empty());
    }

    #[test]
    fn test_binary_payload_preserved() {
        let bytes = [0x30, 0x08, 0x00, 0x01, b'a', 0x00, 0x01, 0x02, 0xFF, 0xFE];
        let packet = roundtrip_test(&bytes);
        assert_eq!(packet.payload, vec![0x00, 0x01, 0x02, 0xFF, 0xFE]);
    }

    #[test]
    fn test_invalid_qos() {
        assert_eq!(
            PublishPacket::decode(&[0x36, 0x03, 0x00, 0x01, b'a']),
            Err(ProtocolError::InvalidQosLevel { level: 3 })
        );
    }

    #[test]
    fn test_zero_packet_id_rejected() {
        assert_eq!(
            PublishPacket::decode(&[0x32, 0x05, 0x00, 0x01, b'a', 0x00, 0x00]),
            Err(ProtocolError::MissingPacketId)
        );
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_eq!(
            PublishPacket::decode(&[0x30, 0x02, 0x00, 0x00]),
            Err(ProtocolError::TopicEmpty)
        );
    }

    #[test]
    fn test_qos1_encode_requires_packet_id() {
        let mut packet = PublishPacket::at_most_once(TopicName::default(), vec![]);
        packet.qos = QoS::AtLeastOnce;
        let mut buffer = [0u8; 16];
        assert_eq!(packet.encode(&mut buffer), Err(ProtocolError::MissingPacketId));
    }
}
