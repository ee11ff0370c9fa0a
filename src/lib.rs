//! UMBRA: Confidential Grid Protocol
//!
//! This is the root crate that re-exports all UMBRA components for integration
//! testing and provides unified access to the protocol primitives.
//!
//! ## Architecture Overview
//!
//! UMBRA keeps each player's 2D position secret from everyone but its owner
//! while a publicly-auditable ledger stores, updates, and validates it:
//!
//! - **Encrypted State**: positions live in the FHE coprocessor as ciphertext
//!   handles; the ledger computes spawn draws and bounds-clamps entirely over
//!   ciphertexts and never observes a coordinate.
//! - **Ciphertext ACLs**: every write re-grants decryption rights to exactly
//!   {ledger, owner}, so handles can be read by anyone but opened by no one
//!   else.
//! - **Authorized Decryption**: owners recover plaintext through a relayer by
//!   presenting a signed, time-bounded grant over a fresh ephemeral keypair;
//!   the relayer seals plaintext to that keypair so only the requester's
//!   session can read it.
//!
//! ## Crate Organization
//!
//! - `umbra-fhe`: handle-addressed FHE coprocessor (TFHE-rs)
//! - `umbra-pq`: Dilithium signatures and Kyber KEM
//! - `umbra-ledger`: the confidential position ledger
//! - `umbra-relayer`: user-decryption protocol and relayer service
//! - `umbra-client`: input encryption and decryption-authorization flows

// Re-export all crates for integration testing
pub use umbra_client as client;
pub use umbra_fhe as fhe;
pub use umbra_ledger as ledger;
pub use umbra_pq as pq;
pub use umbra_relayer as relayer;

/// UMBRA protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use umbra_client::{
        EncryptionSession, IdentityKeypair, InputEncryptor, PositionDecryption, TypedSigner,
        WalletSigner,
    };
    pub use umbra_fhe::{Address, Coprocessor, EncryptedInput, Handle};
    pub use umbra_ledger::{GridLedger, LedgerEvent, GRID_MAX, GRID_MIN};
    pub use umbra_relayer::{
        AuthorizationMessage, DecryptionRelayer, UserDecryption, GRANT_VALIDITY_SECS,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_grid_bounds_constants() {
        assert_eq!(ledger::GRID_MIN, 1);
        assert_eq!(ledger::GRID_MAX, 10);
    }
}
