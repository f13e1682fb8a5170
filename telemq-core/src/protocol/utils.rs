use crate::protocol::ProtocolError;

/// MQTT limits the remaining length to 268,435,455 (0x0FFFFFFF)
pub const MAX_VARIABLE_LENGTH: usize = 268_435_455;

pub const fn variable_length_length(value: usize) -> usize {
    if value < 128 {
        1
    } else if value < 16_384 {
        2
    } else if value < 2_097_152 {
        3
    } else {
        4
    }
}

/// Returns `(value, bytes_read)`.
pub fn read_variable_length(bytes: &[u8]) -> Result<(usize, usize), ProtocolError> {
    let mut multiplier = 1usize;
    let mut value = 0usize;
    let mut bytes_read = 0usize;

    loop {
        if bytes_read == 4 {
            return Err(ProtocolError::InvalidLengthEncoding);
        }
        let byte = *bytes
            .get(bytes_read)
            .ok_or(ProtocolError::IncompletePacket {
                available: bytes.len(),
            })? as usize;
        bytes_read += 1;
        value += (byte & 0x7F) * multiplier;

        if (byte & 0x80) == 0 {
            break;
        }
        multiplier *= 128;
    }

    Ok((value, bytes_read))
}

pub fn write_variable_length(value: usize, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
    if value > MAX_VARIABLE_LENGTH {
        return Err(ProtocolError::InvalidLengthEncoding);
    }

    let mut encoded = value;
    let mut bytes_written = 0;

    loop {
        if bytes_written >= buffer.len() {
            return Err(ProtocolError::BufferTooSmall {
                buffer_size: buffer.len(),
            });
        }
        let mut byte = (encoded & 0x7F) as u8;
        encoded >>= 7;
        if encoded > 0 {
            byte |= 0x80;
        }
        buffer[bytes_written] = byte;
        bytes_written += 1;
        if encoded == 0 {
            break;
        }
    }

    Ok(bytes_written)
}

/// Total length of the frame at the start of `bytes`, or `None` while the
/// fixed header is still incomplete.
pub fn peek_frame_length(bytes: &[u8]) -> Result<Option<usize>, ProtocolError> {
    if bytes.len() < 2 {
        return Ok(None);
    }
    match read_variable_length(&bytes[1..]) {
        Ok((remaining_length, len_bytes)) => Ok(Some(1 + len_bytes + remaining_length)),
        Err(ProtocolError::IncompletePacket { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Split a complete frame into its header byte and its body (variable header
/// plus payload). Bytes past the end of the frame are ignored.
pub fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8]), ProtocolError> {
    let (&header, rest) = bytes
        .split_first()
        .ok_or(ProtocolError::IncompletePacket { available: 0 })?;
    let (remaining_length, len_bytes) = read_variable_length(rest)?;
    let start = 1 + len_bytes;
    let end = start + remaining_length;
    if bytes.len() < end {
        return Err(ProtocolError::IncompletePacket {
            available: bytes.len(),
        });
    }
    Ok((header, &bytes[start..end]))
}

pub fn check_fixed_flags(header: u8, expected: u8) -> Result<(), ProtocolError> {
    let actual = header & 0x0F;
    if actual != expected {
        return Err(ProtocolError::InvalidFixedHeaderFlags { expected, actual });
    }
    Ok(())
}

pub fn read_u16(bytes: &[u8], offset: &mut usize) -> Result<u16, ProtocolError> {
    if *offset + 2 > bytes.len() {
        return Err(ProtocolError::IncompletePacket {
            available: bytes.len(),
        });
    }
    let value = u16::from_be_bytes([bytes[*offset], bytes[*offset + 1]]);
    *offset += 2;
    Ok(value)
}

pub fn write_u16(value: u16, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
    if *offset + 2 > buffer.len() {
        return Err(ProtocolError::BufferTooSmall {
            buffer_size: buffer.len(),
        });
    }
    buffer[*offset..*offset + 2].copy_from_slice(&value.to_be_bytes());
    *offset += 2;
    Ok(())
}

pub fn write_u8(value: u8, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
    let buffer_size = buffer.len();
    let slot = buffer
        .get_mut(*offset)
        .ok_or(ProtocolError::BufferTooSmall { buffer_size })?;
    *slot = value;
    *offset += 1;
    Ok(())
}

pub fn read_string<'a>(bytes: &'a [u8], offset: &mut usize) -> Result<&'a str, ProtocolError> {
    let len = read_u16(bytes, offset)? as usize;
    if *offset + len > bytes.len() {
        return Err(ProtocolError::IncompletePacket {
            available: bytes.len(),
        });
    }
    let str_bytes = &bytes[*offset..*offset + len];
    *offset += len;
    core::str::from_utf8(str_bytes).map_err(|_| ProtocolError::InvalidUtf8String)
}

pub fn write_string(s: &str, buffer: &mut [u8], offset: &mut usize) -> Result<(), ProtocolError> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len > u16::MAX as usize {
        return Err(ProtocolError::InvalidPacketLength {
            expected: u16::MAX as usize,
            actual: len,
        });
    }
    if *offset + 2 + len > buffer.len() {
        return Err(ProtocolError::BufferTooSmall {
            buffer_size: buffer.len(),
        });
    }
    write_u16(len as u16, buffer, offset)?;
    buffer[*offset..*offset + len].copy_from_slice(bytes);
    *offset += len;
    Ok(())
}
