use std::io::Cursor;

use crate::errors::WireError;
use crate::types::{read_f64, read_u32, read_u8, AircraftClass, ViolationKind, WireString};
use crate::{ByteSerializable, Serializable};

/// A raw breach detected by the flight phase state machine.
///
/// Reports carry no notice id and no fine. The Violation-Notice Service is
/// the party that assigns the id, stamps the timestamps and computes the
/// amounts when it turns a report into a [`ViolationNotice`].
///
/// [`ViolationNotice`]: crate::messages::notice::ViolationNotice
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationReport {
    pub flight_number: u32,
    pub airline: String,
    pub aircraft_class: AircraftClass,
    pub kind: ViolationKind,
    /// The value the aircraft was observed at (speed, coordinate or altitude).
    pub recorded: f64,
    /// The permissible limit the recorded value breached.
    pub limit: f64,
}

impl Serializable for ViolationReport {
    fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.flight_number.to_be_bytes());
        bytes.extend_from_slice(&self.airline.to_string_bytes()?);
        bytes.push(self.aircraft_class.to_byte()?);
        bytes.push(self.kind.to_byte()?);
        bytes.extend_from_slice(&self.recorded.to_bits().to_be_bytes());
        bytes.extend_from_slice(&self.limit.to_bits().to_be_bytes());

        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = Cursor::new(bytes);

        let flight_number = read_u32(&mut cursor)?;
        let airline = String::from_string_bytes(&mut cursor)?;
        let aircraft_class = AircraftClass::from_byte(read_u8(&mut cursor)?)?;
        let kind = ViolationKind::from_byte(read_u8(&mut cursor)?)?;
        let recorded = read_f64(&mut cursor)?;
        let limit = read_f64(&mut cursor)?;

        Ok(Self {
            flight_number,
            airline,
            aircraft_class,
            kind,
            recorded,
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trip() {
        let report = ViolationReport {
            flight_number: 104,
            airline: "AirBlue".to_string(),
            aircraft_class: AircraftClass::Commercial,
            kind: ViolationKind::Speed,
            recorded: 618.4,
            limit: 600.0,
        };

        let bytes = report.to_bytes().unwrap();
        let decoded = ViolationReport::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, report);
    }

    #[test]
    fn report_truncated_input_fails() {
        let report = ViolationReport {
            flight_number: 101,
            airline: "PIA".to_string(),
            aircraft_class: AircraftClass::Cargo,
            kind: ViolationKind::Boundary,
            recorded: 104.2,
            limit: 100.0,
        };

        let bytes = report.to_bytes().unwrap();
        assert!(ViolationReport::from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }
}
