//! Structured error categories for the garbled-circuit protocol.
//!
//! Mirrors the categorization used by other MPC crates in this workspace's
//! lineage: each failure mode gets its own variant so callers (and the CLI's
//! exit-code mapping) can distinguish "your circuit file is malformed" from
//! "the peer violated the protocol" without string matching.

use thiserror::Error;

/// Everything that can go wrong while garbling, evaluating, or transferring.
#[derive(Debug, Error)]
pub enum Error {
    /// The circuit JSON failed structural or semantic validation.
    #[error("circuit validation failed: {0}")]
    CircuitValidation(String),

    /// A file could not be read or parsed into the expected shape.
    #[error("io/parse error: {0}")]
    IoParse(String),

    /// The transport failed to deliver or accept a message.
    #[error("transport error: {0}")]
    Transport(String),

    /// The peer (or our own state machine) violated a protocol invariant.
    #[error("protocol invariant violated: {0}")]
    ProtocolInvariant(String),

    /// A cryptographic check failed (garbled-row MAC, OT decryption, ...).
    #[error("cryptographic error: {0}")]
    Cryptographic(String),

    /// A configuration value (bit width, party name, flag combination) is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoParse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::IoParse(e.to_string())
    }
}

/// Result alias used throughout the `gc` crate.
pub type Result<T> = std::result::Result<T, Error>;
