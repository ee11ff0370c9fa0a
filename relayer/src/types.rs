//! User-decryption protocol types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use umbra_fhe::{Address, Handle};

/// How long a decryption grant stays valid: ten days, in seconds
pub const GRANT_VALIDITY_SECS: u64 = 10 * 24 * 60 * 60;

const AUTHORIZATION_DOMAIN: &[u8] = b"umbra_user_decrypt_v1";

/// The signed, time-bounded capability a requester presents to the relayer.
///
/// Built fresh for every request around a single-use ephemeral keypair;
/// never cached, never reused across retries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationMessage {
    /// Ephemeral KEM public key the response will be sealed to
    pub public_key: Vec<u8>,
    /// Contract addresses the grant covers
    pub contracts: Vec<Address>,
    /// Grant start, seconds since the unix epoch
    pub valid_from: u64,
    /// Grant lifetime in seconds
    pub valid_duration: u64,
}

impl AuthorizationMessage {
    /// Build a grant starting at `valid_from` with the standard lifetime
    pub fn new(public_key: Vec<u8>, contracts: Vec<Address>, valid_from: u64) -> Self {
        Self {
            public_key,
            contracts,
            valid_from,
            valid_duration: GRANT_VALIDITY_SECS,
        }
    }

    /// Canonical bytes the identity signs.
    ///
    /// Length-prefixed so field boundaries cannot shift between the signer
    /// and the verifier.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            AUTHORIZATION_DOMAIN.len() + 8 + self.public_key.len() + 8 + self.contracts.len() * 32 + 16,
        );
        bytes.extend_from_slice(AUTHORIZATION_DOMAIN);
        bytes.extend_from_slice(&(self.public_key.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&self.public_key);
        bytes.extend_from_slice(&(self.contracts.len() as u64).to_le_bytes());
        for contract in &self.contracts {
            bytes.extend_from_slice(contract.as_bytes());
        }
        bytes.extend_from_slice(&self.valid_from.to_le_bytes());
        bytes.extend_from_slice(&self.valid_duration.to_le_bytes());
        bytes
    }

    /// First second at which the grant is no longer valid
    pub fn expires_at(&self) -> u64 {
        self.valid_from.saturating_add(self.valid_duration)
    }
}

/// One ciphertext the requester wants opened, with its owning contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    /// Ciphertext handle to decrypt
    pub handle: Handle,
    /// Contract the handle belongs to
    pub contract: Address,
}

/// A complete user-decryption request.
///
/// Carries only public material; the ephemeral secret key stays with the
/// requesting session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDecryptRequest {
    /// Handles to decrypt, each with its owning contract
    pub pairs: Vec<HandleContractPair>,
    /// Ephemeral KEM public key, as signed in the grant
    pub public_key: Vec<u8>,
    /// Hex signature over the grant, `0x` prefix stripped before transmission
    pub signature: String,
    /// Requester's long-term verifying key; must hash to `identity`
    pub verifying_key: Vec<u8>,
    /// Contract scope of the grant
    pub contracts: Vec<Address>,
    /// Requester identity
    pub identity: Address,
    /// Grant start, seconds since the unix epoch
    pub valid_from: u64,
    /// Grant lifetime in seconds
    pub valid_duration: u64,
}

impl UserDecryptRequest {
    /// Reconstruct the authorization message this request claims was signed.
    ///
    /// Verification over the reconstruction is what makes key substitution
    /// fail: a signature over any other ephemeral key will not match.
    pub fn authorization(&self) -> AuthorizationMessage {
        AuthorizationMessage {
            public_key: self.public_key.clone(),
            contracts: self.contracts.clone(),
            valid_from: self.valid_from,
            valid_duration: self.valid_duration,
        }
    }
}

/// A plaintext sealed to the requester's ephemeral public key
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedValue {
    /// Kyber encapsulation of the sealing key
    pub kem_ciphertext: Vec<u8>,
    /// AEAD nonce
    pub nonce: [u8; 12],
    /// ChaCha20-Poly1305 ciphertext of the plaintext value
    pub payload: Vec<u8>,
}

/// Relayer response: one sealed value per requested handle
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserDecryptResponse {
    /// Sealed plaintexts keyed by handle
    pub values: HashMap<Handle, SealedValue>,
}
