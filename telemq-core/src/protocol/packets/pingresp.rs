use crate::protocol::packets::{expect_empty_body, PacketEncoder};
use crate::protocol::utils::check_fixed_flags;
use crate::protocol::{PacketType, ProtocolError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PingRespPacket;

impl PacketEncoder for PingRespPacket {
    const PACKET_TYPE: PacketType = PacketType::PingResp;

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
