use bytes::{Buf, Bytes, BytesMut};
use log::trace;
use telemq_core::protocol::packets::Packet;
use telemq_core::protocol::utils::peek_frame_length;
use telemq_core::ProtocolError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ClientError;

/// Largest frame accepted from the broker.
pub const MAX_INCOMING_FRAME_SIZE: usize = 256 * 1024;

/// Get detailed packet info for logging
pub fn packet_details(packet: &Packet) -> String {
    match packet {
        Packet::Connect(c) => format!("client_id={}, keep_alive={}", c.client_id, c.keep_alive),
        Packet::ConnAck(c) => format!(
            "return_code={:?}, session_present={}",
            c.return_code, c.session_present
        ),
        Packet::Publish(p) => format!(
            "topic={}, qos={}, retain={}, payload_len={}",
            p.topic_name,
            p.qos as u8,
            p.retain,
            p.payload.len()
        ),
        Packet::Subscribe(s) => format!("packet_id={}, topic_filter={}", s.packet_id, s.topic_filter),
        Packet::SubAck(s) => format!("packet_id={}, return_code={:?}", s.packet_id, s.return_code),
        Packet::PingReq(_) | Packet::PingResp(_) | Packet::Disconnect(_) => String::new(),
    }
}

/// Read a complete MQTT packet from the stream.
///
/// Returns `Ok(None)` on a clean end of stream between packets. Bytes past the
/// returned frame stay in `buffer` for the next call, so dropping this future
/// mid-read loses nothing.
pub async fn read_packet<R>(reader: &mut R, buffer: &mut BytesMut) -> Result<Option<Packet>, ClientError>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some(total_len) = peek_frame_length(&buffer[..])? {
            if total_len > MAX_INCOMING_FRAME_SIZE {
                return Err(ClientError::FrameTooLarge {
                    size: total_len,
                    max: MAX_INCOMING_FRAME_SIZE,
                });
            }
            if buffer.len() >= total_len {
                let packet = Packet::decode(&buffer[..total_len])?;
                buffer.advance(total_len);
                trace!("Buffer advanced by {} bytes, {} bytes remaining", total_len, buffer.len());
                return Ok(Some(packet));
            }
            buffer.reserve(total_len - buffer.len());
        } else {
            buffer.reserve(64);
        }

        let n = reader.read_buf(buffer).await?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            return Err(ClientError::Protocol(ProtocolError::IncompletePacket {
                available: buffer.len(),
            }));
        }
        trace!("Read {} bytes, buffer now has {} bytes", n, buffer.len());
    }
}

/// Encode a packet into Bytes for transmission
pub fn encode_frame(packet: &Packet) -> Result<Bytes, ProtocolError> {
    let mut buffer = BytesMut::zeroed(packet.encoded_len());
    let size = packet.encode(&mut buffer[..])?;
    buffer.truncate(size);
    trace!("Encoded {}: {} bytes", packet.packet_type(), size);
    Ok(buffer.freeze())
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemq_core::protocol::packets::{PingRespPacket, PublishPacket};
    use telemq_core::TopicName;

    #[tokio::test]
    async fn test_read_packets_split_across_reads() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let publish = Packet::Publish(PublishPacket::at_most_once(
            TopicName::default(),
            b"Device 1: Data 0".to_vec(),
        ));
        let frame = encode_frame(&publish).unwrap();

        tokio::spawn(async move {
            server.write_all(&frame[..3]).await.unwrap();
            server.flush().await.unwrap();
            tokio::task::yield_now().await;
            server.write_all(&frame[3..]).await.unwrap();
            server.write_all(&[0xD0, 0x00]).await.unwrap();
        });

        let mut buffer = BytesMut::new();
        assert_eq!(read_packet(&mut client, &mut buffer).await.unwrap(), Some(publish));
        assert_eq!(
            read_packet(&mut client, &mut buffer).await.unwrap(),
            Some(Packet::PingResp(PingRespPacket))
        );
        assert_eq!(read_packet(&mut client, &mut buffer).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        server.write_all(&[0x30, 0x05, 0x00]).await.unwrap();
        drop(server);

        let mut buffer = BytesMut::new();
        let result = read_packet(&mut client, &mut buffer).await;
        assert!(matches!(
            result,
            Err(ClientError::Protocol(ProtocolError::IncompletePacket { available: 3 }))
        ));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        // remaining length 2,097,152
        server.write_all(&[0x30, 0x80, 0x80, 0x80, 0x01]).await.unwrap();

        let mut buffer = BytesMut::new();
        let result = read_packet(&mut client, &mut buffer).await;
        assert!(matches!(result, Err(ClientError::FrameTooLarge { .. })));
    }

    #[test]
    fn test_packet_details() {
        let publish = Packet::Publish(PublishPacket::at_most_once(TopicName::default(), vec![1, 2]));
        assert_eq!(
            packet_details(&publish),
            "topic=data, qos=0, retain=false, payload_len=2"
        );
    }
}
