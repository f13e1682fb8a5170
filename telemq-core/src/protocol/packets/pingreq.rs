use crate::protocol::packets::{expect_empty_body, PacketEncoder};
use crate::protocol::utils::check_fixed_flags;
use crate::protocol::{PacketType, ProtocolError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PingReqPacket;

impl PacketEncoder for PingReqPacket {
    const PACKET_TYPE: PacketType = PacketType::PingReq;

    fn remaining_length(&self) -> usize {
        0
    }

    fn encode_body(&self, _buffer: &mut [u8], _offset: &mut usize) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        check_fixed_flags(header, 0b0000)?;
        expect_empty_body(body)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let mut buffer = [0u8; 2];
        assert_eq!(PingReqPacket.encode(&mut buffer), Ok(2));
        assert_eq!(buffer, [0xC0, 0x00]);
    }

    #[test]
    fn test_decode_rejects_body() {
        assert_eq!(
            PingReqPacket::decode(&[0xC0, 0x01, 0x00]),
            Err(ProtocolError::InvalidPacketLength {
                expected: 0,
                actual: 1,
            })
        );
    }
}
