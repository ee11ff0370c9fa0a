//! PQ error types

use thiserror::Error;

/// Errors from signature and KEM operations
#[derive(Error, Debug)]
pub enum PqError {
    /// Key has the wrong length
    #[error("Invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// Signature has the wrong length
    #[error("Invalid signature size: expected {expected} bytes, got {actual}")]
    InvalidSignatureSize { expected: usize, actual: usize },

    /// KEM ciphertext has the wrong length
    #[error("Invalid ciphertext size: expected {expected} bytes, got {actual}")]
    InvalidCiphertextSize { expected: usize, actual: usize },

    /// Public key bytes are not a valid key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Secret key bytes are not a valid key
    #[error("Invalid secret key")]
    InvalidSecretKey,

    /// KEM ciphertext bytes are not a valid ciphertext
    #[error("Invalid ciphertext")]
    InvalidCiphertext,

    /// Signature bytes are malformed
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),
}
