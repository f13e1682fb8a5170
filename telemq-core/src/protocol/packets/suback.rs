use crate::protocol::packets::PacketEncoder;
use crate::protocol::utils::{check_fixed_flags, read_u16, write_u16, write_u8};
use crate::protocol::{PacketType, ProtocolError, QoS};

const SUBACK_FAILURE: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubAckReturnCode {
    Granted(QoS),
    Failure,
}

impl SubAckReturnCode {
    pub const fn to_u8(self) -> u8 {
        match self {
            SubAckReturnCode::Granted(qos) => qos as u8,
            SubAckReturnCode::Failure => SUBACK_FAILURE,
        }
    }

    pub const fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        match value {
            SUBACK_FAILURE => Ok(SubAckReturnCode::Failure),
            0..=2 => match QoS::from_u8(value) {
                Ok(qos) => Ok(SubAckReturnCode::Granted(qos)),
                Err(e) => Err(e),
            },
            _ => Err(ProtocolError::InvalidSubAckReturnCode { return_code: value }),
        }
    }
}

/// SUBACK for a single-filter SUBSCRIBE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAckPacket {
    pub packet_id: u16,
    pub return_code: SubAckReturnCode,
}

impl PacketEncoder for SubAckPacket {
    const PACKET_TYPE: PacketType = PacketType::SubAck;

    fn remaining_length(&self) -> usize {
        3
    }

    fn encode_body(&self, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
        write_u16(self.packet_id, buffer, offset)?;
        write_u8(self.return_code.to_u8(), buffer, offset)
    }

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        check_fixed_flags(header, 0b0000)?;
        if body.len() != 3 {
            return Err(ProtocolError::InvalidPacketLength {
                expected: 3,
                actual: body.len(),
            });
        }
        let mut offset = 0;
        let packet_id = read_u16(body, &mut offset)?;
        let return_code = SubAckReturnCode::from_u8(body[offset])?;
        Ok(Self {
            packet_id,
            return_code,
        })
    }
}
