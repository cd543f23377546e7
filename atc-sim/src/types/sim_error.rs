use std::fmt;

use channel::ChannelError;
use logger::LoggerError;

/// Represents errors that can occur in the traffic-control simulator.
#[derive(Debug)]
pub enum SimError {
    InvalidInput,
    UnknownAirline(String),   // Spawn rule references an airline not in the roster
    QuotaExhausted(String),   // Airline has no concurrent slots or flights left
    ChannelError(String),     // Fatal channel failure at startup
    LoggerError(String),      // Log file could not be created or written
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidInput => {
                write!(f, "Invalid input. Please check your input and try again.")
            }
            SimError::UnknownAirline(ref name) => write!(f, "Unknown airline: {}", name),
            SimError::QuotaExhausted(ref name) => write!(f, "No slots left for {}", name),
            SimError::ChannelError(msg) => write!(f, "Channel error: {}", msg),
            SimError::LoggerError(msg) => write!(f, "Logger error: {}", msg),
        }
    }
}

impl From<ChannelError> for SimError {
    fn from(err: ChannelError) -> Self {
        SimError::ChannelError(err.to_string())
    }
}

impl From<LoggerError> for SimError {
    fn from(err: LoggerError) -> Self {
        SimError::LoggerError(err.to_string())
    }
}
