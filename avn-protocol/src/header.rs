use crate::{errors::WireError, ByteSerializable, Serializable};

/// Protocol version carried in every frame.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size in bytes of a serialized [`FrameHeader`].
pub const HEADER_SIZE: usize = 6;

/// Each frame contains a fixed size header (6 bytes) followed by a variable size body.
#[derive(Debug, PartialEq)]
pub struct FrameHeader {
    version: u8,
    opcode: Opcode,
    body_length: u32,
}

impl FrameHeader {
    pub fn new(opcode: Opcode, body_length: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            opcode,
            body_length,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn body_length(&self) -> u32 {
        self.body_length
    }
}

impl Serializable for FrameHeader {
    /// ```md
    /// 0         8        16        24        32        40        48
    /// +---------+---------+---------+---------+---------+---------+
    /// | version | opcode  |             body_length               |
    /// +---------+---------+---------+---------+---------+---------+
    /// ```
    fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut buffer = Vec::new();

        buffer.push(self.version);
        buffer.push(self.opcode.to_byte()?);
        buffer.extend_from_slice(&self.body_length.to_be_bytes());

        Ok(buffer)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::NotEnoughBytes);
        }

        if bytes[0] != PROTOCOL_VERSION {
            return Err(WireError::InvalidCode);
        }

        let opcode = Opcode::from_byte(bytes[1])?;

        let body_length = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);

        Ok(Self {
            version: bytes[0],
            opcode,
            body_length,
        })
    }
}

/// The opcode determines which record shape the frame body carries.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Opcode {
    Report = 0x01,
    Notice = 0x02,
    Payment = 0x03,
}

impl ByteSerializable for Opcode {
    fn from_byte(byte: u8) -> Result<Self, WireError> {
        match byte {
            0x01 => Ok(Opcode::Report),
            0x02 => Ok(Opcode::Notice),
            0x03 => Ok(Opcode::Payment),
            _ => Err(WireError::InvalidCode),
        }
    }

    fn to_byte(&self) -> std::result::Result<u8, WireError> {
        Ok(*self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_to_bytes() {
        let header = FrameHeader::new(Opcode::Payment, 42);
        let bytes = header.to_bytes().unwrap();

        assert_eq!(bytes, vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x2A]);
    }

    #[test]
    fn header_round_trip() {
        let header = FrameHeader::new(Opcode::Notice, 1024);
        let bytes = header.to_bytes().unwrap();
        let decoded = FrameHeader::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, header);
    }

    #[test]
    fn header_rejects_unknown_version() {
        let bytes = [0x7F, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert!(FrameHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn header_rejects_short_input() {
        let bytes = [0x01, 0x01];
        assert_eq!(
            FrameHeader::from_bytes(&bytes),
            Err(WireError::NotEnoughBytes)
        );
    }
}
