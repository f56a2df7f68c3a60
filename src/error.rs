use std::io;

/// The adapter error type.
///
/// The first four variants are the contract-level kinds a benchmark
/// driver may assert on; the rest cover construction and the wire.
#[derive(Debug)]
pub enum AdapterError {
    /// Read fields / Insert / Update values must contain exactly one entry
    InvalidFieldCount {
        /// Entries the operation requires
        expected: usize,
        /// Entries the caller supplied
        got: usize,
    },

    /// Key is not a base-10 unsigned 64-bit integer where the backend
    /// requires one
    InvalidKeyFormat(String),

    /// Operation the backend cannot honestly support
    UnsupportedOperation(&'static str),

    /// Transport-level failure, propagated from the clerk unchanged
    TransportFailure(String),

    /// Wire (de)serialization error
    Codec(Box<bincode::ErrorKind>),

    /// Required configuration key absent at construction
    MissingProperty(&'static str),

    /// No factory registered under the requested name
    UnknownAdapter(String),

    /// Malformed property file
    InvalidProperties(String),
}

impl From<io::Error> for AdapterError {
    fn from(value: io::Error) -> AdapterError {
        AdapterError::TransportFailure(value.to_string())
    }
}

impl From<Box<bincode::ErrorKind>> for AdapterError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        AdapterError::Codec(err)
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, AdapterError>;
