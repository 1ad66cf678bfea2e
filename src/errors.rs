//! Error types for the casino core.
//!
//! One root error wraps a sub-enum per concern so callers can match on the
//! class of failure without losing the detail.

use std::error::Error as StdError;
use std::fmt;

/// Root error type for all casino operations
#[derive(Debug)]
pub enum CasinoError {
    /// Bet validation failures (nothing mutated)
    Validation(ValidationError),

    /// Balance and transaction failures
    Ledger(LedgerError),

    /// Active-session lifecycle failures
    Session(SessionError),

    /// Storage system errors
    Storage(StorageError),

    /// Configuration errors
    Configuration(ConfigurationError),
}

/// Bet validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    ZeroBet,
    BelowMinimum { min: u64 },
    AboveMaximum { max: u64 },
    InsufficientBalance { balance: u64, bet: u64 },
}

/// Ledger mutation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InsufficientFunds { balance: u64, debit: u64 },
    BalanceOverflow { ceiling: u64 },
    UnknownUser(u64),
    UserBanned(u64),
}

/// Session lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A game is already in flight for this user; resolve it first
    Conflict { game: String },
    /// No active session backs this action (stale or expired reference)
    NotFound,
}

/// Storage system errors
#[derive(Debug)]
pub enum StorageError {
    OpenFailed(String),
    ReadFailed(String),
    WriteFailed(String),
    CorruptedData(String),
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigurationError {
    LoadFailed(String),
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

// Display implementations
impl fmt::Display for CasinoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasinoError::Validation(e) => write!(f, "Validation error: {}", e),
            CasinoError::Ledger(e) => write!(f, "Ledger error: {}", e),
            CasinoError::Session(e) => write!(f, "Session error: {}", e),
            CasinoError::Storage(e) => write!(f, "Storage error: {}", e),
            CasinoError::Configuration(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroBet => write!(f, "Bet amount must be positive"),
            ValidationError::BelowMinimum { min } => write!(f, "Minimum bet is {} stars", min),
            ValidationError::AboveMaximum { max } => write!(f, "Maximum bet is {} stars", max),
            ValidationError::InsufficientBalance { balance, bet } => {
                write!(f, "Balance {} cannot cover bet {}", balance, bet)
            }
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InsufficientFunds { balance, debit } => {
                write!(f, "Insufficient funds: balance {}, debit {}", balance, debit)
            }
            LedgerError::BalanceOverflow { ceiling } => {
                write!(f, "Balance would exceed ceiling {}", ceiling)
            }
            LedgerError::UnknownUser(id) => write!(f, "Unknown user: {}", id),
            LedgerError::UserBanned(id) => write!(f, "User {} is banned", id),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Conflict { game } => {
                write!(f, "A {} game is already in progress", game)
            }
            SessionError::NotFound => write!(f, "No active game"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OpenFailed(msg) => write!(f, "Database open failed: {}", msg),
            StorageError::ReadFailed(msg) => write!(f, "Read failed: {}", msg),
            StorageError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            StorageError::CorruptedData(msg) => write!(f, "Corrupted data: {}", msg),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::LoadFailed(msg) => {
                write!(f, "Failed to load configuration: {}", msg)
            }
            ConfigurationError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value for {}: '{}' ({})", field, value, reason)
            }
        }
    }
}

// Standard Error trait implementations
impl StdError for CasinoError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CasinoError::Validation(e) => Some(e),
            CasinoError::Ledger(e) => Some(e),
            CasinoError::Session(e) => Some(e),
            CasinoError::Storage(e) => Some(e),
            CasinoError::Configuration(e) => Some(e),
        }
    }
}

impl StdError for ValidationError {}
impl StdError for LedgerError {}
impl StdError for SessionError {}
impl StdError for StorageError {}
impl StdError for ConfigurationError {}

// From implementations for easy conversion
impl From<ValidationError> for CasinoError {
    fn from(e: ValidationError) -> Self {
        CasinoError::Validation(e)
    }
}

impl From<LedgerError> for CasinoError {
    fn from(e: LedgerError) -> Self {
        CasinoError::Ledger(e)
    }
}

impl From<SessionError> for CasinoError {
    fn from(e: SessionError) -> Self {
        CasinoError::Session(e)
    }
}

impl From<StorageError> for CasinoError {
    fn from(e: StorageError) -> Self {
        CasinoError::Storage(e)
    }
}

impl From<ConfigurationError> for CasinoError {
    fn from(e: ConfigurationError) -> Self {
        CasinoError::Configuration(e)
    }
}

// External error conversions
impl From<rocksdb::Error> for CasinoError {
    fn from(e: rocksdb::Error) -> Self {
        CasinoError::Storage(StorageError::WriteFailed(e.to_string()))
    }
}

impl From<std::io::Error> for CasinoError {
    fn from(e: std::io::Error) -> Self {
        CasinoError::Storage(StorageError::ReadFailed(e.to_string()))
    }
}

impl From<serde_json::Error> for CasinoError {
    fn from(e: serde_json::Error) -> Self {
        CasinoError::Storage(StorageError::CorruptedData(e.to_string()))
    }
}

/// Convenience type alias for Results
pub type CasinoResult<T> = Result<T, CasinoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CasinoError::Ledger(LedgerError::InsufficientFunds {
            balance: 5,
            debit: 10,
        });

        assert!(err.to_string().contains("Ledger error"));
        assert!(err.to_string().contains("balance 5"));
    }

    #[test]
    fn test_error_conversion() {
        let err: CasinoError = SessionError::NotFound.into();

        match err {
            CasinoError::Session(SessionError::NotFound) => {}
            _ => panic!("Expected session error"),
        }
    }

    #[test]
    fn test_error_source() {
        let err = CasinoError::Validation(ValidationError::ZeroBet);
        assert!(err.source().is_some());
    }
}
