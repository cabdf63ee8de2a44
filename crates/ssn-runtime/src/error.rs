use std::fmt;

use ssn_config::ConfigurationError;
use ssn_risk::MalformedLoanError;
use ssn_signals::MalformedSignalError;

/// Everything the engine can reject. Never retried, never swallowed.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Configuration(ConfigurationError),
    MalformedLoan(MalformedLoanError),
    MalformedSignal(MalformedSignalError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Configuration(e) => write!(f, "configuration error: {e}"),
            EngineError::MalformedLoan(e) => write!(f, "malformed loan: {e}"),
            EngineError::MalformedSignal(e) => write!(f, "malformed signal: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Configuration(e) => Some(e),
            EngineError::MalformedLoan(e) => Some(e),
            EngineError::MalformedSignal(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for EngineError {
    fn from(e: ConfigurationError) -> Self {
        EngineError::Configuration(e)
    }
}

impl From<MalformedLoanError> for EngineError {
    fn from(e: MalformedLoanError) -> Self {
        EngineError::MalformedLoan(e)
    }
}

impl From<MalformedSignalError> for EngineError {
    fn from(e: MalformedSignalError) -> Self {
        EngineError::MalformedSignal(e)
    }
}
