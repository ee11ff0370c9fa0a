//! Externally encrypted inputs
//!
//! Clients encrypt coordinates under the network public key and attach a
//! proof binding the ciphertexts to one contract and one submitting identity,
//! so an input cannot be replayed against another ledger instance or on
//! behalf of someone else.

use crate::ciphertext::{CiphertextBlob, EncryptedU8};
use crate::handle::{Address, Handle};
use crate::keys::NetworkPublicKey;
use crate::FheResult;
use serde::{Deserialize, Serialize};

const INPUT_PROOF_DOMAIN: &[u8] = b"umbra_input_proof_v1";

/// Proof that a set of input ciphertexts was produced for a specific
/// contract and identity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputProof {
    /// Commitment to the ciphertexts and their binding
    commitment: [u8; 32],
}

impl InputProof {
    fn bind(blobs: &[CiphertextBlob], contract: &Address, identity: &Address) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(INPUT_PROOF_DOMAIN);
        hasher.update(contract.as_bytes());
        hasher.update(identity.as_bytes());
        hasher.update(&(blobs.len() as u64).to_le_bytes());
        for blob in blobs {
            hasher.update(&(blob.data().len() as u64).to_le_bytes());
            hasher.update(blob.data());
        }

        Self {
            commitment: *hasher.finalize().as_bytes(),
        }
    }

    /// Check the proof against ciphertexts and the expected binding
    pub fn verify(&self, blobs: &[CiphertextBlob], contract: &Address, identity: &Address) -> bool {
        Self::bind(blobs, contract, identity).commitment == self.commitment
    }
}

/// A batch of encrypted inputs ready for submission
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedInput {
    blobs: Vec<CiphertextBlob>,
    proof: InputProof,
}

impl EncryptedInput {
    /// Get the ciphertext blobs
    pub fn blobs(&self) -> &[CiphertextBlob] {
        &self.blobs
    }

    /// Get the binding proof
    pub fn proof(&self) -> &InputProof {
        &self.proof
    }

    /// Handles the coprocessor will assign on import
    pub fn handles(&self) -> Vec<Handle> {
        self.blobs
            .iter()
            .enumerate()
            .map(|(i, blob)| Handle::derive_input(blob.data(), i as u32))
            .collect()
    }
}

/// Builder for encrypted inputs: `new(contract, identity).add8(x).add8(y).encrypt(pk)`
pub struct EncryptedInputBuilder {
    contract: Address,
    identity: Address,
    values: Vec<u8>,
}

impl EncryptedInputBuilder {
    /// Start an input bound to a contract and submitting identity
    pub fn new(contract: Address, identity: Address) -> Self {
        Self {
            contract,
            identity,
            values: Vec::new(),
        }
    }

    /// Append an 8-bit value
    pub fn add8(mut self, value: u8) -> Self {
        self.values.push(value);
        self
    }

    /// Encrypt all values under the network public key and bind the proof
    pub fn encrypt(self, public_key: &NetworkPublicKey) -> FheResult<EncryptedInput> {
        let mut blobs = Vec::with_capacity(self.values.len());
        for value in &self.values {
            let ciphertext = EncryptedU8::encrypt_with_public(*value, public_key)?;
            blobs.push(ciphertext.to_blob()?);
        }

        let proof = InputProof::bind(&blobs, &self.contract, &self.identity);
        Ok(EncryptedInput { blobs, proof })
    }
}
