use std::fmt;

use channel::ChannelError;
use logger::LoggerError;

#[derive(Debug)]
pub enum GeneratorError {
    Channel(ChannelError),
    Logger(LoggerError),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Channel(e) => write!(f, "Channel error: {}", e),
            GeneratorError::Logger(e) => write!(f, "Logger error: {}", e),
        }
    }
}

impl From<ChannelError> for GeneratorError {
    fn from(err: ChannelError) -> Self {
        GeneratorError::Channel(err)
    }
}

impl From<LoggerError> for GeneratorError {
    fn from(err: LoggerError) -> Self {
        GeneratorError::Logger(err)
    }
}
