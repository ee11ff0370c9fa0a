//! CRYSTALS-Dilithium digital signatures
//!
//! Identities sign decryption-authorization grants with a long-term
//! Dilithium3 key. The relayer verifies the detached signature and checks
//! that the verifying key hashes to the claimed identity address.

use crate::errors::PqError;
use pqcrypto_dilithium::dilithium3;
use pqcrypto_traits::sign::{DetachedSignature, PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Dilithium3 public key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DilithiumPublicKey {
    bytes: Vec<u8>,
}

/// Dilithium3 secret key (zeroized on drop)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DilithiumSecretKey {
    bytes: Vec<u8>,
}

/// Dilithium3 keypair
pub struct DilithiumKeypair {
    pub public_key: DilithiumPublicKey,
    pub secret_key: DilithiumSecretKey,
}

impl DilithiumPublicKey {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PqError> {
        let expected = dilithium3::public_key_bytes();
        if bytes.len() != expected {
            return Err(PqError::InvalidKeySize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }
}

impl DilithiumSecretKey {
    /// Get the raw bytes (use with caution)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Generate a Dilithium3 keypair
pub fn generate_keypair() -> DilithiumKeypair {
    let (pk, sk) = dilithium3::keypair();
    DilithiumKeypair {
        public_key: DilithiumPublicKey {
            bytes: pk.as_bytes().to_vec(),
        },
        secret_key: DilithiumSecretKey {
            bytes: sk.as_bytes().to_vec(),
        },
    }
}

/// Sign a message, returning detached signature bytes
pub fn sign_detached(secret_key: &DilithiumSecretKey, message: &[u8]) -> Result<Vec<u8>, PqError> {
    let sk = dilithium3::SecretKey::from_bytes(secret_key.as_bytes())
        .map_err(|_| PqError::InvalidSecretKey)?;
    let signature = dilithium3::detached_sign(message, &sk);
    Ok(signature.as_bytes().to_vec())
}

/// Verify detached signature bytes against a message and public key
pub fn verify_detached(
    public_key: &DilithiumPublicKey,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool, PqError> {
    let pk = dilithium3::PublicKey::from_bytes(public_key.as_bytes())
        .map_err(|_| PqError::InvalidPublicKey)?;
    let signature = dilithium3::DetachedSignature::from_bytes(signature_bytes)
        .map_err(|_| PqError::InvalidSignatureFormat("invalid signature bytes".into()))?;

    match dilithium3::verify_detached_signature(&signature, message, &pk) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let keypair = generate_keypair();
        let message = b"umbra grant test message";

        let signature = sign_detached(&keypair.secret_key, message).unwrap();
        assert!(verify_detached(&keypair.public_key, message, &signature).unwrap());
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = generate_keypair();
        let signature = sign_detached(&keypair.secret_key, b"original").unwrap();

        assert!(!verify_detached(&keypair.public_key, b"tampered", &signature).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = generate_keypair();
        let other = generate_keypair();
        let message = b"test message";

        let signature = sign_detached(&signer.secret_key, message).unwrap();
        assert!(!verify_detached(&other.public_key, message, &signature).unwrap());
    }

    #[test]
    fn test_public_key_size_enforced() {
        assert!(matches!(
            DilithiumPublicKey::from_bytes(&[0u8; 16]),
            Err(PqError::InvalidKeySize { .. })
        ));
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let keypair = generate_keypair();
        let result = verify_detached(&keypair.public_key, b"message", &[0u8; 7]);
        assert!(matches!(result, Err(PqError::InvalidSignatureFormat(_))));
    }
}
