//! Error types for ReelSpin

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid payline {index}: {reason}")]
    InvalidPayline { index: usize, reason: String },

    #[error("Reel {reel} is {actual}, expected {expected}")]
    InvalidReelState {
        reel: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Spin already in progress")]
    SpinInProgress,

    #[error("Insufficient balance: {balance} < bet {bet}")]
    InsufficientBalance { balance: f64, bet: f64 },

    #[error("Invalid bet: {0}")]
    InvalidBet(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
