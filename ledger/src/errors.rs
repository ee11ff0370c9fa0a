//! Ledger error types

use thiserror::Error;
use umbra_fhe::{Address, FheError};

/// Errors raised by ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The identity already holds an active position
    #[error("player {identity:?} has already joined")]
    AlreadyJoined { identity: Address },

    /// The identity has no active position
    #[error("player {identity:?} is not registered")]
    NotRegistered { identity: Address },

    /// A move submission did not contain exactly one ciphertext per axis
    #[error("expected {expected} encrypted coordinates, got {actual}")]
    MalformedInput { expected: usize, actual: usize },

    /// A coprocessor failure, including rejected input proofs
    #[error(transparent)]
    Fhe(#[from] FheError),
}
