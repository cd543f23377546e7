use std::io::Cursor;

use chrono::NaiveDateTime;

use crate::errors::WireError;
use crate::types::{
    read_f64, read_u32, read_u8, timestamp_from_bytes, timestamp_to_bytes, AircraftClass,
    PaymentStatus, WireString,
};
use crate::{ByteSerializable, Serializable};

/// An Airspace Violation Notice, immutable once issued.
///
/// The notice id is derived from the issuance time and the flight number
/// (`AVN{epoch_millis}_{flight}`) and is unique for the run. The status is
/// the only field a downstream consumer may rewrite in its own copy, and
/// only `unpaid` to `paid`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationNotice {
    pub id: String,
    pub flight_number: u32,
    pub airline: String,
    pub aircraft_class: AircraftClass,
    pub recorded: f64,
    pub limit: f64,
    pub issued_at: NaiveDateTime,
    pub due_by: NaiveDateTime,
    pub base_fine: f64,
    pub surcharge_rate: f64,
    pub total_amount: f64,
    pub status: PaymentStatus,
}

impl ViolationNotice {
    /// The aircraft identifier used on payment records, e.g. `F0104`.
    pub fn aircraft_id(&self) -> String {
        format!("F{:04}", self.flight_number)
    }
}

impl Serializable for ViolationNotice {
    fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.id.to_string_bytes()?);
        bytes.extend_from_slice(&self.flight_number.to_be_bytes());
        bytes.extend_from_slice(&self.airline.to_string_bytes()?);
        bytes.push(self.aircraft_class.to_byte()?);
        bytes.extend_from_slice(&self.recorded.to_bits().to_be_bytes());
        bytes.extend_from_slice(&self.limit.to_bits().to_be_bytes());
        bytes.extend_from_slice(&timestamp_to_bytes(self.issued_at));
        bytes.extend_from_slice(&timestamp_to_bytes(self.due_by));
        bytes.extend_from_slice(&self.base_fine.to_bits().to_be_bytes());
        bytes.extend_from_slice(&self.surcharge_rate.to_bits().to_be_bytes());
        bytes.extend_from_slice(&self.total_amount.to_bits().to_be_bytes());
        bytes.push(self.status.to_byte()?);

        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = Cursor::new(bytes);

        let id = String::from_string_bytes(&mut cursor)?;
        let flight_number = read_u32(&mut cursor)?;
        let airline = String::from_string_bytes(&mut cursor)?;
        let aircraft_class = AircraftClass::from_byte(read_u8(&mut cursor)?)?;
        let recorded = read_f64(&mut cursor)?;
        let limit = read_f64(&mut cursor)?;
        let issued_at = timestamp_from_bytes(&mut cursor)?;
        let due_by = timestamp_from_bytes(&mut cursor)?;
        let base_fine = read_f64(&mut cursor)?;
        let surcharge_rate = read_f64(&mut cursor)?;
        let total_amount = read_f64(&mut cursor)?;
        let status = PaymentStatus::from_byte(read_u8(&mut cursor)?)?;

        Ok(Self {
            id,
            flight_number,
            airline,
            aircraft_class,
            recorded,
            limit,
            issued_at,
            due_by,
            base_fine,
            surcharge_rate,
            total_amount,
            status,
        })
    }
}
