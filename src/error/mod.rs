//! Error handling for the exchange ledger
//!
//! Every rejected operation surfaces one of these variants synchronously.
//! The first five are the domain rejections of the ledger itself, the rest
//! come from the surrounding plumbing (storage, config, parsing).

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero, not a multiple of the exchange ratio, or overflows
    InvalidAmount(String),
    /// Minting would push issued supply past the cap
    SupplyCapExceeded {
        requested: u64,
        issued: u64,
        cap: u64,
    },
    /// The asset-transfer provider rejected a pull or push
    TransferFailed(String),
    /// Caller tried to convert more derived units than they hold
    InsufficientDerivedBalance { required: u64, available: u64 },
    /// The ledger's base-asset reserve cannot cover a conversion
    InsufficientReserve { required: u64, available: u64 },
    /// Malformed account address
    InvalidAddress(String),
    /// Configuration errors
    Config(String),
    /// Database-related errors
    Database(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InvalidAmount(msg) => write!(f, "Invalid amount: {msg}"),
            LedgerError::SupplyCapExceeded {
                requested,
                issued,
                cap,
            } => write!(
                f,
                "Supply cap exceeded: minting {requested} on top of {issued} issued exceeds cap {cap}"
            ),
            LedgerError::TransferFailed(msg) => write!(f, "Transfer failed: {msg}"),
            LedgerError::InsufficientDerivedBalance {
                required,
                available,
            } => write!(
                f,
                "Insufficient derived balance: required {required}, available {available}"
            ),
            LedgerError::InsufficientReserve {
                required,
                available,
            } => write!(
                f,
                "Insufficient reserve: required {required}, available {available}"
            ),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Database(msg) => write!(f, "Database error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl LedgerError {
    /// True for the rejections the ledger raises on its own preconditions,
    /// as opposed to infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount(_)
                | LedgerError::SupplyCapExceeded { .. }
                | LedgerError::TransferFailed(_)
                | LedgerError::InsufficientDerivedBalance { .. }
                | LedgerError::InsufficientReserve { .. }
        )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
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
