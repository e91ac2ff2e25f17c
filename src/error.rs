//! Error types for script, address, and descriptor construction

use thiserror::Error;

use crate::assemble::RoundTripReport;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockscriptError {
    #[error("Invalid key length: {0}")]
    InvalidKeyLength(String),

    #[error("Invalid witness program length: {0}")]
    InvalidProgramLength(String),

    #[error("Invalid multisig policy: {0}")]
    InvalidMultisigPolicy(String),

    #[error("Checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("Invalid bech32m checksum: {0}")]
    InvalidChecksum(String),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Network mismatch: {0}")]
    NetworkMismatch(String),

    #[error("Insufficient funds: fee {fee} does not leave a spendable amount out of {amount}")]
    InsufficientFunds { amount: i64, fee: i64 },

    #[error("Derivation mismatch: {0}")]
    DerivationMismatch(RoundTripReport),
}

pub type Result<T> = std::result::Result<T, LockscriptError>;
