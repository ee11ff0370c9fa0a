//! UMBRA FHE Coprocessor
//!
//! The encrypted-integer primitive backing the confidential grid, built on
//! TFHE-rs. Ciphertexts live inside a coprocessor and are addressed from the
//! outside only through opaque 32-byte handles, so the ledger can orchestrate
//! homomorphic computation without ever holding (or being able to open) a
//! ciphertext itself.
//!
//! # Capabilities
//! - Encrypt/decrypt 8-bit values
//! - Homomorphic add, remainder, comparisons, and conditional select
//! - Fresh encrypted random draws
//! - Per-handle access-control lists gating decryption
//! - Verification of externally encrypted inputs bound to a contract and
//!   submitting identity
//!
//! # Key roles
//! - `ClientKey`: decryption, held inside the coprocessor boundary
//! - `ServerKey`: homomorphic operations, set globally before computing
//! - `NetworkPublicKey`: published so clients can encrypt inputs

pub mod errors;
mod ciphertext;
mod coprocessor;
mod handle;
mod input;
mod keys;

pub use ciphertext::{CiphertextBlob, EncryptedBit, EncryptedU8};
pub use coprocessor::Coprocessor;
pub use errors::FheError;
pub use handle::{Address, Handle};
pub use input::{EncryptedInput, EncryptedInputBuilder, InputProof};
pub use keys::{set_server_key, server_key_id, ClientKey, KeyPair, NetworkPublicKey, ServerKey};

/// Result type for FHE operations
pub type FheResult<T> = Result<T, FheError>;
