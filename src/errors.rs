//! Error types for the round engine.
//!
//! Every betting and settlement error is locally recoverable by the caller;
//! nothing here should take the process down.

use crate::types::Period;
use thiserror::Error;

/// Root error type for engine operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// The round is inside its lock window (or already locked); bets are
    /// rejected until the next round opens.
    #[error("round {period} is locked for betting")]
    RoundLocked { period: Period },

    /// Stake outside the configured betting bounds.
    #[error("stake {stake} outside allowed range [{min}, {max}]")]
    InvalidStake { stake: u64, min: u64, max: u64 },

    /// Stake exceeds the subject's current ledger balance.
    #[error("stake {stake} exceeds balance {balance}")]
    InsufficientBalance { stake: u64, balance: i64 },

    /// Settlement was requested for a round that already settled.
    #[error("round {period} has already been settled")]
    DuplicateSettlement { period: Period },

    /// Settlement was requested for a round voided after a suspension; a
    /// voided round never gets an outcome.
    #[error("round {period} was voided and cannot be settled")]
    RoundVoided { period: Period },

    /// The referenced round is not the current one and is not in the store.
    #[error("unknown round {period}")]
    UnknownRound { period: Period },

    /// An operator-supplied result outside the valid number range.
    #[error("result number {0} outside [0, 9]")]
    InvalidResult(u8),

    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Keyed store fault (missing record where one must exist).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_error_display() {
        let period = Period::first(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let err = GameError::RoundLocked { period };
        assert!(err.to_string().contains("250101001"));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_invalid_stake_details() {
        let err = GameError::InvalidStake {
            stake: 5,
            min: 10,
            max: 10_000,
        };
        assert!(err.to_string().contains("[10, 10000]"));
    }
}
