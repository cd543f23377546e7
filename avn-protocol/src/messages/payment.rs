use std::io::Cursor;

use chrono::NaiveDateTime;

use crate::errors::WireError;
use crate::types::{
    read_f64, read_u8, timestamp_from_bytes, timestamp_to_bytes, AircraftClass, WireString,
};
use crate::{ByteSerializable, Serializable};

/// A payment message keyed by notice id.
///
/// Two semantically distinct messages share this shape:
/// a *registration* (`amount_paid == 0`, establishes the obligation) and a
/// *settlement attempt* (`amount_paid > 0`, carries a real payment). The
/// Payment Service also answers with this shape, filling in `successful`
/// and `settled_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub notice_id: String,
    pub aircraft_id: String,
    pub aircraft_class: AircraftClass,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub successful: bool,
    pub settled_at: Option<NaiveDateTime>,
}

impl PaymentRecord {
    pub fn is_registration(&self) -> bool {
        self.amount_paid == 0.0
    }
}

impl Serializable for PaymentRecord {
    fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.notice_id.to_string_bytes()?);
        bytes.extend_from_slice(&self.aircraft_id.to_string_bytes()?);
        bytes.push(self.aircraft_class.to_byte()?);
        bytes.extend_from_slice(&self.amount_due.to_bits().to_be_bytes());
        bytes.extend_from_slice(&self.amount_paid.to_bits().to_be_bytes());
        bytes.push(self.successful as u8);

        match self.settled_at {
            Some(timestamp) => {
                bytes.push(0x01);
                bytes.extend_from_slice(&timestamp_to_bytes(timestamp));
            }
            None => bytes.push(0x00),
        }

        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = Cursor::new(bytes);

        let notice_id = String::from_string_bytes(&mut cursor)?;
        let aircraft_id = String::from_string_bytes(&mut cursor)?;
        let aircraft_class = AircraftClass::from_byte(read_u8(&mut cursor)?)?;
        let amount_due = read_f64(&mut cursor)?;
        let amount_paid = read_f64(&mut cursor)?;

        let successful = match read_u8(&mut cursor)? {
            0x00 => false,
            0x01 => true,
            _ => return Err(WireError::InvalidCode),
        };

        let settled_at = match read_u8(&mut cursor)? {
            0x00 => None,
            0x01 => Some(timestamp_from_bytes(&mut cursor)?),
            _ => return Err(WireError::InvalidCode),
        };

        Ok(Self {
            notice_id,
            aircraft_id,
            aircraft_class,
            amount_due,
            amount_paid,
            successful,
            settled_at,
        })
    }
}
