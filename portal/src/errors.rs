use std::fmt;

use channel::ChannelError;
use logger::LoggerError;

#[derive(Debug)]
pub enum PortalError {
    Channel(ChannelError),
    Logger(LoggerError),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Channel(e) => write!(f, "Channel error: {}", e),
            PortalError::Logger(e) => write!(f, "Logger error: {}", e),
        }
    }
}

impl From<ChannelError> for PortalError {
    fn from(err: ChannelError) -> Self {
        PortalError::Channel(err)
    }
}

impl From<LoggerError> for PortalError {
    fn from(err: LoggerError) -> Self {
        PortalError::Logger(err)
    }
}
