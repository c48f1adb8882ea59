//! Error handling for the ledger node
//!
//! Every fallible operation in the crate returns [`Result`]. None of these
//! errors are allowed to take the node down: the network layer logs them and
//! keeps serving the remaining peers.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for chain, protocol and transport operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Network communication errors (connect refused, write failure)
    Network(String),
    /// File and stream I/O errors
    Io(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// Block failed successor validation
    InvalidBlock(String),
    /// Candidate chain failed validation or was not longer
    InvalidChain(String),
    /// Undecodable or oversized peer message
    MalformedMessage(String),
    /// Operation attempted on a connection that is not open
    ConnectionClosed(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            LedgerError::InvalidChain(msg) => write!(f, "Invalid chain: {msg}"),
            LedgerError::MalformedMessage(msg) => write!(f, "Malformed message: {msg}"),
            LedgerError::ConnectionClosed(msg) => write!(f, "Connection closed: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_display_messages() {
        let err = LedgerError::InvalidBlock("index 3 does not follow 1".to_string());
        assert_eq!(err.to_string(), "Invalid block: index 3 does not follow 1");
    }
}
