//! UMBRA Decryption Relayer
//!
//! The relayer side of the decryption-authorization protocol. A requester
//! presents a signed, time-bounded grant over a fresh ephemeral public key;
//! the relayer verifies the signature, the requester's identity, the grant
//! window and scope, and each handle's access-control list, then returns
//! plaintext sealed to the ephemeral key so only the requesting session can
//! open it.

pub mod errors;
mod seal;
mod service;
mod types;

pub use errors::RelayerError;
pub use seal::{open_value, seal_value};
pub use service::{DecryptionRelayer, RelayerConfig, UserDecryption};
pub use types::{
    AuthorizationMessage, HandleContractPair, SealedValue, UserDecryptRequest,
    UserDecryptResponse, GRANT_VALIDITY_SECS,
};
