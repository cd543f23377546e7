use std::fmt;

use channel::ChannelError;
use logger::LoggerError;

#[derive(Debug)]
pub enum PaymentError {
    Channel(ChannelError),
    Logger(LoggerError),
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::Channel(e) => write!(f, "Channel error: {}", e),
            PaymentError::Logger(e) => write!(f, "Logger error: {}", e),
        }
    }
}

impl From<ChannelError> for PaymentError {
    fn from(err: ChannelError) -> Self {
        PaymentError::Channel(err)
    }
}

impl From<LoggerError> for PaymentError {
    fn from(err: LoggerError) -> Self {
        PaymentError::Logger(err)
    }
}
