//! Opaque identifiers: identity addresses and ciphertext handles.

use serde::{Deserialize, Serialize};

const ADDRESS_DOMAIN: &[u8] = b"umbra_address_v1";
const HANDLE_INPUT_DOMAIN: &[u8] = b"umbra_handle_input_v1";
const HANDLE_INTERNAL_DOMAIN: &[u8] = b"umbra_handle_internal_v1";

/// An identity or contract address, derived from a key fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an address from public key material
    pub fn from_key_bytes(key: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(key);
        Self(*hasher.finalize().as_bytes())
    }

    /// Generate a random address
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..8]))
    }
}

/// An opaque reference to a ciphertext held by the coprocessor.
///
/// Handles carry no plaintext information; without a matching access grant
/// and the decryption protocol they are inert.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle([u8; 32]);

impl Handle {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the handle of an externally encrypted input ciphertext.
    ///
    /// Client and coprocessor compute this independently from the ciphertext
    /// bytes and its position in the input, so no round trip is needed to
    /// agree on handles.
    pub fn derive_input(ciphertext: &[u8], index: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(HANDLE_INPUT_DOMAIN);
        hasher.update(&index.to_le_bytes());
        hasher.update(ciphertext);
        Self(*hasher.finalize().as_bytes())
    }

    /// Derive a handle for a ciphertext created inside the coprocessor.
    pub(crate) fn derive_internal(salt: &[u8; 32], counter: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(HANDLE_INTERNAL_DOMAIN);
        hasher.update(salt);
        hasher.update(&counter.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", hex::encode(&self.0[..8]))
    }
}
