//! Relayer error types
//!
//! Precise on the relayer side for logging; clients collapse all of these
//! into a single opaque decryption failure.

use thiserror::Error;
use umbra_fhe::FheError;
use umbra_pq::PqError;

/// Reasons a user-decryption request is rejected
#[derive(Error, Debug)]
pub enum RelayerError {
    /// Signature field is not valid hex
    #[error("signature is not valid hex: {0}")]
    SignatureFormat(String),

    /// Signature does not verify over the presented authorization
    #[error("signature does not verify for the presented authorization")]
    InvalidSignature,

    /// Verifying key does not hash to the claimed requester identity
    #[error("verifying key does not match the requester identity")]
    IdentityMismatch,

    /// Grant start lies in the future
    #[error("authorization grant is not yet valid")]
    GrantNotYetValid,

    /// Grant window has passed
    #[error("authorization grant has expired")]
    GrantExpired,

    /// Requested duration exceeds what this relayer accepts
    #[error("grant duration {0}s exceeds the relayer maximum")]
    GrantTooLong(u64),

    /// A requested handle's contract is outside the signed scope
    #[error("contract {0} is outside the signed grant scope")]
    ScopeMismatch(String),

    /// Requester is not on the handle's access-control list
    #[error("requester is not authorized for handle {0}")]
    UnauthorizedHandle(String),

    /// Sealing the plaintext to the ephemeral key failed
    #[error("failed to seal plaintext to the ephemeral key")]
    SealFailed,

    /// Opening a sealed value failed (wrong key or tampered payload)
    #[error("failed to open sealed value")]
    OpenFailed,

    /// Signature or KEM key material is malformed
    #[error(transparent)]
    Pq(#[from] PqError),

    /// Coprocessor failure
    #[error(transparent)]
    Fhe(#[from] FheError),
}
