use crate::protocol::packets::PacketEncoder;
use crate::protocol::utils::{check_fixed_flags, write_u8};
use crate::protocol::{PacketType, ProtocolError};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectReturnCode {
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUserNameOrPassword = 4,
    NotAuthorized = 5,
}

impl TryFrom<u8> for ConnectReturnCode {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ConnectReturnCode::Accepted),
            1 => Ok(ConnectReturnCode::UnacceptableProtocolVersion),
            2 => Ok(ConnectReturnCode::IdentifierRejected),
            3 => Ok(ConnectReturnCode::ServerUnavailable),
            4 => Ok(ConnectReturnCode::BadUserNameOrPassword),
            5 => Ok(ConnectReturnCode::NotAuthorized),
            _ => Err(ProtocolError::InvalidConnectReturnCode { return_code: code }),
        }
    }
}

impl core::fmt::Display for ConnectReturnCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            ConnectReturnCode::Accepted => "connection accepted",
            ConnectReturnCode::UnacceptableProtocolVersion => "unacceptable protocol version",
            ConnectReturnCode::IdentifierRejected => "identifier rejected",
            ConnectReturnCode::ServerUnavailable => "server unavailable",
            ConnectReturnCode::BadUserNameOrPassword => "bad user name or password",
            ConnectReturnCode::NotAuthorized => "not authorized",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnAckPacket {
    pub session_present: bool,
    pub return_code: ConnectReturnCode,
}

impl ConnAckPacket {
    pub fn accepted() -> Self {
        Self {
            session_present: false,
            return_code: ConnectReturnCode::Accepted,
        }
    }
}

impl PacketEncoder for ConnAckPacket {
    const PACKET_TYPE: PacketType = PacketType::ConnAck;

    fn remaining_length(&self) -> usize {
        2
    }

    fn encode_body(&self, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
        write_u8(self.session_present as u8, buffer, offset)?;
        write_u8(self.return_code as u8, buffer, offset)
    }

    fn decode_body(header: u8, body: &[u8]) -> Result<Self, ProtocolError> {
        check_fixed_flags(header, 0b0000)?;
        if body.len() != 2 {
            return Err(ProtocolError::InvalidPacketLength {
                expected: 2,
                actual: body.len(),
            });
        }
        let session_present = match body[0] {
            0b0000_0000 => false,
            0b0000_0001 => true,
            flag => return Err(ProtocolError::InvalidSessionPresentFlag { flag }),
        };
        let return_code = ConnectReturnCode::try_from(body[1])?;
        Ok(ConnAckPacket {
            session_present,
            return_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_accepted() {
        let mut buffer = [0u8; 4];
        assert_eq!(ConnAckPacket::accepted().encode(&mut buffer), Ok(4));
        assert_eq!(buffer, [0x20, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_session_present_rejected() {
        let packet = ConnAckPacket::decode(&[0x20, 0x02, 0x01, 0x05]).unwrap();
        assert!(packet.session_present);
        assert_eq!(packet.return_code, ConnectReturnCode::NotAuthorized);
    }

    #[test]
    fn test_decode_invalid_return_code() {
        assert_eq!(
            ConnAckPacket::decode(&[0x20, 0x02, 0x00, 0x06]),
            Err(ProtocolError::InvalidConnectReturnCode { return_code: 6 })
        );
    }

    #[test]
    fn test_decode_invalid_session_present_flag() {
        assert_eq!(
            ConnAckPacket::decode(&[0x20, 0x02, 0x02, 0x00]),
            Err(ProtocolError::InvalidSessionPresentFlag { flag: 2 })
        );
    }

    #[test]
    fn test_decode_wrong_length() {
        assert_eq!(
            ConnAckPacket::decode(&[0x20, 0x03, 0x00, 0x00, 0x00]),
            Err(ProtocolError::InvalidPacketLength {
                expected: 2,
                actual: 3,
            })
        );
    }
}
