//! Client error types

use thiserror::Error;
use umbra_fhe::FheError;

/// Errors surfaced by the client flows
#[derive(Error, Debug)]
pub enum ClientError {
    /// The encryption service has not finished initializing
    #[error("encryption service is not ready")]
    EncryptionUnavailable,

    /// A prerequisite of the decryption flow is missing
    #[error("missing {0}; complete that step before requesting decryption")]
    MissingContext(&'static str),

    /// The signing key could not be obtained or refused to sign
    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// The relayer rejected the request or the response could not be opened.
    /// Deliberately opaque: rejection subtypes are not distinguished here.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Encryption-primitive failure while building an input
    #[error(transparent)]
    Fhe(#[from] FheError),
}
