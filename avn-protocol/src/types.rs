use std::io::{Cursor, Read};

use chrono::{DateTime, NaiveDateTime};

use crate::errors::WireError;
use crate::ByteSerializable;

/// Reads a length-prefixed UTF-8 string (u16 big-endian length) from a cursor.
pub trait WireString {
    fn from_string_bytes(cursor: &mut Cursor<&[u8]>) -> std::result::Result<Self, WireError>
    where
        Self: Sized;

    fn to_string_bytes(&self) -> std::result::Result<Vec<u8>, WireError>;
}

impl WireString for String {
    fn from_string_bytes(cursor: &mut Cursor<&[u8]>) -> std::result::Result<Self, WireError> {
        let mut len_bytes = [0u8; 2];
        cursor
            .read_exact(&mut len_bytes)
            .map_err(|_| WireError::CursorError)?;
        let len = u16::from_be_bytes(len_bytes) as usize;

        let mut string_bytes = vec![0u8; len];
        cursor
            .read_exact(&mut string_bytes)
            .map_err(|_| WireError::CursorError)?;

        String::from_utf8(string_bytes).map_err(|_| WireError::DeserializationError)
    }

    fn to_string_bytes(&self) -> std::result::Result<Vec<u8>, WireError> {
        let len = u16::try_from(self.len()).map_err(|_| WireError::SerializationError)?;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(self.as_bytes());

        Ok(bytes)
    }
}

pub fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, WireError> {
    let mut bytes = [0u8; 1];
    cursor
        .read_exact(&mut bytes)
        .map_err(|_| WireError::CursorError)?;
    Ok(bytes[0])
}

pub fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, WireError> {
    let mut bytes = [0u8; 4];
    cursor
        .read_exact(&mut bytes)
        .map_err(|_| WireError::CursorError)?;
    Ok(u32::from_be_bytes(bytes))
}

pub fn read_i64(cursor: &mut Cursor<&[u8]>) -> Result<i64, WireError> {
    let mut bytes = [0u8; 8];
    cursor
        .read_exact(&mut bytes)
        .map_err(|_| WireError::CursorError)?;
    Ok(i64::from_be_bytes(bytes))
}

pub fn read_f64(cursor: &mut Cursor<&[u8]>) -> Result<f64, WireError> {
    let mut bytes = [0u8; 8];
    cursor
        .read_exact(&mut bytes)
        .map_err(|_| WireError::CursorError)?;
    Ok(f64::from_bits(u64::from_be_bytes(bytes)))
}

/// Timestamps travel as i64 epoch seconds (UTC).
pub fn timestamp_to_bytes(timestamp: NaiveDateTime) -> Vec<u8> {
    timestamp.and_utc().timestamp().to_be_bytes().to_vec()
}

pub fn timestamp_from_bytes(cursor: &mut Cursor<&[u8]>) -> Result<NaiveDateTime, WireError> {
    let secs = read_i64(cursor)?;
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(WireError::InvalidTimestamp)
}

/// The class of an aircraft, which also determines its dispatch priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AircraftClass {
    Emergency,
    Cargo,
    Commercial,
}

impl AircraftClass {
    /// Lower values are dispatched first.
    pub fn priority(&self) -> u8 {
        match self {
            AircraftClass::Emergency => 1,
            AircraftClass::Cargo => 2,
            AircraftClass::Commercial => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AircraftClass::Emergency => "Emergency",
            AircraftClass::Cargo => "Cargo",
            AircraftClass::Commercial => "Commercial",
        }
    }
}

impl ByteSerializable for AircraftClass {
    fn to_byte(&self) -> std::result::Result<u8, WireError> {
        Ok(self.priority())
    }

    fn from_byte(byte: u8) -> std::result::Result<Self, WireError> {
        match byte {
            1 => Ok(AircraftClass::Emergency),
            2 => Ok(AircraftClass::Cargo),
            3 => Ok(AircraftClass::Commercial),
            _ => Err(WireError::InvalidCode),
        }
    }
}

/// The kind of breach a violation report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Speed,
    Boundary,
    Altitude,
    Rollout,
}

impl ViolationKind {
    pub fn as_str(&self) -> &str {
        match self {
            ViolationKind::Speed => "SPEED",
            ViolationKind::Boundary => "BOUNDARY",
            ViolationKind::Altitude => "ALTITUDE",
            ViolationKind::Rollout => "ROLLOUT",
        }
    }
}

impl ByteSerializable for ViolationKind {
    fn to_byte(&self) -> std::result::Result<u8, WireError> {
        let byte = match self {
            ViolationKind::Speed => 0x01,
            ViolationKind::Boundary => 0x02,
            ViolationKind::Altitude => 0x03,
            ViolationKind::Rollout => 0x04,
        };
        Ok(byte)
    }

    fn from_byte(byte: u8) -> std::result::Result<Self, WireError> {
        match byte {
            0x01 => Ok(ViolationKind::Speed),
            0x02 => Ok(ViolationKind::Boundary),
            0x03 => Ok(ViolationKind::Altitude),
            0x04 => Ok(ViolationKind::Rollout),
            _ => Err(WireError::InvalidCode),
        }
    }
}

/// Payment status of a violation notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl ByteSerializable for PaymentStatus {
    fn to_byte(&self) -> std::result::Result<u8, WireError> {
        match self {
            PaymentStatus::Unpaid => Ok(0x00),
            PaymentStatus::Paid => Ok(0x01),
        }
    }

    fn from_byte(byte: u8) -> std::result::Result<Self, WireError> {
        match byte {
            0x00 => Ok(PaymentStatus::Unpaid),
            0x01 => Ok(PaymentStatus::Paid),
            _ => Err(WireError::InvalidCode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        let original = "AVN1748000000123_101".to_string();
        let bytes = original.to_string_bytes().unwrap();

        let mut cursor = Cursor::new(bytes.as_slice());
        let decoded = String::from_string_bytes(&mut cursor).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn class_priorities_are_ordered() {
        assert!(AircraftClass::Emergency.priority() < AircraftClass::Cargo.priority());
        assert!(AircraftClass::Cargo.priority() < AircraftClass::Commercial.priority());
    }

    #[test]
    fn class_from_invalid_byte() {
        assert!(AircraftClass::from_byte(0x07).is_err());
    }
}
