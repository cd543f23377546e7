use std::fmt;

/// Enum representing errors that can occur within the wire protocol.
#[derive(Debug, PartialEq)]
pub enum WireError {
    SerializationError,
    DeserializationError,
    NotEnoughBytes,
    CursorError,
    InvalidCode,
    InvalidTimestamp,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            WireError::SerializationError => "Serialization error occurred",
            WireError::DeserializationError => "Deserialization error occurred",
            WireError::NotEnoughBytes => "Not enough bytes for operation",
            WireError::CursorError => "Cursor error encountered",
            WireError::InvalidCode => "Invalid code encountered",
            WireError::InvalidTimestamp => "Timestamp out of range",
        };
        write!(f, "{}", description)
    }
}
