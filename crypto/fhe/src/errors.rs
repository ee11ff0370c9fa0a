//! FHE error types

use thiserror::Error;

/// Errors that can occur inside the coprocessor
#[derive(Error, Debug)]
pub enum FheError {
    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Invalid ciphertext
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// External input proof does not bind to the expected contract and identity
    #[error("Input proof does not match the target contract and identity")]
    InvalidProof,

    /// Handle does not name a stored ciphertext
    #[error("Unknown ciphertext handle {0}")]
    UnknownHandle(String),

    /// Handle names a ciphertext of the wrong kind for the operation
    #[error("Handle {0} does not hold an encrypted value of the expected kind")]
    KindMismatch(String),

    /// Requester is not on the handle's access-control list
    #[error("Identity {identity} is not authorized to decrypt handle {handle}")]
    AccessDenied { identity: String, handle: String },

    /// No server key has been set for homomorphic operations
    #[error("No server key set; homomorphic operations are unavailable")]
    ServerKeyMissing,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
