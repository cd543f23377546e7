use crate::{
    errors::WireError,
    header::{FrameHeader, Opcode, HEADER_SIZE},
    messages::{notice::ViolationNotice, payment::PaymentRecord, report::ViolationReport},
    Serializable,
};

/// A message transmitted over one of the service channels.
///
/// Every channel carries exactly one record shape, but the frame layer does
/// not care: the opcode in the header selects the body codec.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A breach detected by the simulation, bound for the notice service.
    Report(ViolationReport),
    /// A full violation notice, bound for the portal.
    Notice(ViolationNotice),
    /// A payment registration, settlement attempt or settlement outcome.
    Payment(PaymentRecord),
}

impl Frame {
    /// Total serialized size of the frame starting at `bytes`, if the header
    /// is complete. Used by readers to reassemble frames from a byte stream.
    pub fn wire_size(bytes: &[u8]) -> Result<Option<usize>, WireError> {
        if bytes.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = FrameHeader::from_bytes(&bytes[..HEADER_SIZE])?;
        Ok(Some(HEADER_SIZE + header.body_length() as usize))
    }
}

impl Serializable for Frame {
    fn to_bytes(&self) -> std::result::Result<Vec<u8>, WireError> {
        let opcode = match self {
            Frame::Report(_) => Opcode::Report,
            Frame::Notice(_) => Opcode::Notice,
            Frame::Payment(_) => Opcode::Payment,
        };

        let body_bytes = match self {
            Frame::Report(report) => report.to_bytes()?,
            Frame::Notice(notice) => notice.to_bytes()?,
            Frame::Payment(payment) => payment.to_bytes()?,
        };

        let length =
            u32::try_from(body_bytes.len()).map_err(|_| WireError::SerializationError)?;

        let header = FrameHeader::new(opcode, length);

        let mut bytes = header.to_bytes()?;
        bytes.extend_from_slice(&body_bytes);

        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, WireError> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::NotEnoughBytes);
        }

        let header = FrameHeader::from_bytes(&bytes[..HEADER_SIZE])?;

        let body = &bytes[HEADER_SIZE..];
        if body.len() < header.body_length() as usize {
            return Err(WireError::NotEnoughBytes);
        }
        let body = &body[..header.body_length() as usize];

        let frame = match header.opcode() {
            Opcode::Report => Self::Report(ViolationReport::from_bytes(body)?),
            Opcode::Notice => Self::Notice(ViolationNotice::from_bytes(body)?),
            Opcode::Payment => Self::Payment(PaymentRecord::from_bytes(body)?),
        };

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AircraftClass, ViolationKind};

    fn sample_report() -> ViolationReport {
        ViolationReport {
            flight_number: 104,
            airline: "Blue Dart".to_string(),
            aircraft_class: AircraftClass::Cargo,
            kind: ViolationKind::Altitude,
            recorded: 41_873.0,
            limit: 40_000.0,
        }
    }

    #[test]
    fn frame_round_trip_report() {
        let frame = Frame::Report(sample_report());
        let bytes = frame.to_bytes().unwrap();

        let decoded = Frame::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn frame_round_trip_payment() {
        let frame = Frame::Payment(PaymentRecord {
            notice_id: "AVN1748000000123_104".to_string(),
            aircraft_id: "F0104".to_string(),
            aircraft_class: AircraftClass::Cargo,
            amount_due: 805_000.0,
            amount_paid: 805_000.0,
            successful: true,
            settled_at: None,
        });

        let bytes = frame.to_bytes().unwrap();
        assert_eq!(Frame::from_bytes(&bytes).unwrap(), frame);
    }

    #[test]
    fn wire_size_matches_serialized_length() {
        let frame = Frame::Report(sample_report());
        let bytes = frame.to_bytes().unwrap();

        assert_eq!(Frame::wire_size(&bytes).unwrap(), Some(bytes.len()));
    }

    #[test]
    fn wire_size_incomplete_header() {
        assert_eq!(Frame::wire_size(&[0x01, 0x01]).unwrap(), None);
    }

    #[test]
    fn frame_from_truncated_body_fails() {
        let frame = Frame::Report(sample_report());
        let bytes = frame.to_bytes().unwrap();

        assert_eq!(
            Frame::from_bytes(&bytes[..bytes.len() - 1]),
            Err(WireError::NotEnoughBytes)
        );
    }
}
