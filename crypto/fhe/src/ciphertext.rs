//! FHE ciphertext types
//!
//! `EncryptedU8` is the working form used for homomorphic operations;
//! `CiphertextBlob` is its serialized form for transport and handle
//! derivation.

use crate::keys::{ClientKey, NetworkPublicKey};
use crate::{FheError, FheResult};
use serde::{Deserialize, Serialize};
use tfhe::prelude::*;
use tfhe::{CompactFheUint8, FheBool as TfheFheBool, FheUint8 as TfheFheUint8};

/// Serialized ciphertext for transport
#[derive(Clone, Serialize, Deserialize)]
pub struct CiphertextBlob {
    /// Serialized ciphertext bytes
    data: Vec<u8>,
    /// Number of bits encrypted
    bits: u8,
    /// Operation count (for noise tracking)
    op_count: u32,
}

impl CiphertextBlob {
    /// Create a new blob from serialized ciphertext data
    pub fn new(data: Vec<u8>, bits: u8, op_count: u32) -> Self {
        Self {
            data,
            bits,
            op_count,
        }
    }

    /// Get the ciphertext data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the number of bits
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Get the operation count (noise proxy)
    pub fn op_count(&self) -> u32 {
        self.op_count
    }
}

impl std::fmt::Debug for CiphertextBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CiphertextBlob")
            .field("size", &self.data.len())
            .field("bits", &self.bits)
            .field("ops", &self.op_count)
            .finish()
    }
}

/// Encrypted 8-bit unsigned integer, the coordinate type of the grid
#[derive(Clone)]
pub struct EncryptedU8 {
    /// Inner TFHE-rs encrypted value
    inner: TfheFheUint8,
    /// Operation count for noise tracking
    op_count: u32,
}

impl EncryptedU8 {
    /// Encrypt a value with the client key
    pub fn encrypt(value: u8, client_key: &ClientKey) -> FheResult<Self> {
        let encrypted = TfheFheUint8::try_encrypt(value, client_key.inner())
            .map_err(|e| FheError::EncryptionFailed(e.to_string()))?;

        Ok(Self {
            inner: encrypted,
            op_count: 0,
        })
    }

    /// Encrypt a value with the published compact public key
    pub fn encrypt_with_public(value: u8, public_key: &NetworkPublicKey) -> FheResult<Self> {
        let compact = CompactFheUint8::encrypt(value, public_key.inner());

        Ok(Self {
            inner: compact.expand(),
            op_count: 0,
        })
    }

    /// Decrypt with the client key
    pub fn decrypt(&self, client_key: &ClientKey) -> u8 {
        self.inner.decrypt(client_key.inner())
    }

    /// Get reference to the inner TFHE value
    pub fn inner(&self) -> &TfheFheUint8 {
        &self.inner
    }

    /// Get the operation count
    pub fn op_count(&self) -> u32 {
        self.op_count
    }

    /// Create from a TFHE value produced by a homomorphic operation
    pub(crate) fn from_tfhe_with_ops(inner: TfheFheUint8, op_count: u32) -> Self {
        Self { inner, op_count }
    }

    /// Serialize to a blob for transport
    pub fn to_blob(&self) -> FheResult<CiphertextBlob> {
        let data = bincode::serialize(&self.inner)
            .map_err(|e| FheError::SerializationError(e.to_string()))?;

        Ok(CiphertextBlob {
            data,
            bits: 8,
            op_count: self.op_count,
        })
    }

    /// Deserialize from a blob
    pub fn from_blob(blob: &CiphertextBlob) -> FheResult<Self> {
        if blob.bits != 8 {
            return Err(FheError::InvalidCiphertext(format!(
                "expected 8-bit ciphertext, got {} bits",
                blob.bits
            )));
        }

        let inner: TfheFheUint8 = bincode::deserialize(&blob.data)
            .map_err(|e| FheError::InvalidCiphertext(e.to_string()))?;

        Ok(Self {
            inner,
            op_count: blob.op_count,
        })
    }
}

impl std::fmt::Debug for EncryptedU8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedU8")
            .field("ops", &self.op_count)
            .finish()
    }
}

/// Encrypted boolean, produced by homomorphic comparisons
#[derive(Clone)]
pub struct EncryptedBit {
    inner: TfheFheBool,
}

impl EncryptedBit {
    /// Create from a TFHE boolean
    pub(crate) fn from_tfhe(inner: TfheFheBool) -> Self {
        Self { inner }
    }

    /// Get reference to the inner value
    pub fn inner(&self) -> &TfheFheBool {
        &self.inner
    }

    /// Decrypt with the client key
    pub fn decrypt(&self, client_key: &ClientKey) -> bool {
        self.inner.decrypt(client_key.inner())
    }
}

impl std::fmt::Debug for EncryptedBit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBit").finish()
    }
}
