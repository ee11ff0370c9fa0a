//! CRYSTALS-Kyber key encapsulation
//!
//! The decryption-authorization protocol seals relayer responses to a fresh
//! Kyber768 keypair generated per request, so plaintext in transit can only
//! be opened by the requesting session.

use crate::errors::PqError;
use pqcrypto_kyber::kyber768;
use pqcrypto_traits::kem::{Ciphertext, PublicKey, SecretKey, SharedSecret};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Kyber768 public key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KyberPublicKey {
    bytes: Vec<u8>,
}

/// Kyber768 secret key (zeroized on drop)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KyberSecretKey {
    bytes: Vec<u8>,
}

/// Kyber768 keypair
pub struct KyberKeypair {
    pub public_key: KyberPublicKey,
    pub secret_key: KyberSecretKey,
}

/// Kyber768 encapsulated key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KyberCiphertext {
    bytes: Vec<u8>,
}

/// Shared secret from key encapsulation (zeroized on drop)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KyberSharedSecret {
    bytes: [u8; 32],
}

impl KyberPublicKey {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PqError> {
        let expected = kyber768::public_key_bytes();
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

impl KyberSecretKey {
    /// Get the raw bytes (use with caution)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl KyberCiphertext {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PqError> {
        let expected = kyber768::ciphertext_bytes();
        if bytes.len() != expected {
            return Err(PqError::InvalidCiphertextSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }
}

impl KyberSharedSecret {
    /// Get the raw bytes (use with caution)
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

/// Generate a Kyber768 keypair
pub fn generate_keypair() -> KyberKeypair {
    let (pk, sk) = kyber768::keypair();
    KyberKeypair {
        public_key: KyberPublicKey {
            bytes: pk.as_bytes().to_vec(),
        },
        secret_key: KyberSecretKey {
            bytes: sk.as_bytes().to_vec(),
        },
    }
}

/// Encapsulate a shared secret to the given public key
pub fn encapsulate(
    public_key: &KyberPublicKey,
) -> Result<(KyberCiphertext, KyberSharedSecret), PqError> {
    let pk = kyber768::PublicKey::from_bytes(public_key.as_bytes())
        .map_err(|_| PqError::InvalidPublicKey)?;
    let (ss, ct) = kyber768::encapsulate(&pk);

    let mut ss_bytes = [0u8; 32];
    ss_bytes.copy_from_slice(ss.as_bytes());

    Ok((
        KyberCiphertext {
            bytes: ct.as_bytes().to_vec(),
        },
        KyberSharedSecret { bytes: ss_bytes },
    ))
}

/// Decapsulate to recover the shared secret
pub fn decapsulate(
    secret_key: &KyberSecretKey,
    ciphertext: &KyberCiphertext,
) -> Result<KyberSharedSecret, PqError> {
    let sk = kyber768::SecretKey::from_bytes(secret_key.as_bytes())
        .map_err(|_| PqError::InvalidSecretKey)?;
    let ct = kyber768::Ciphertext::from_bytes(ciphertext.as_bytes())
        .map_err(|_| PqError::InvalidCiphertext)?;
    let ss = kyber768::decapsulate(&ct, &sk);

    let mut ss_bytes = [0u8; 32];
    ss_bytes.copy_from_slice(ss.as_bytes());
    Ok(KyberSharedSecret { bytes: ss_bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encapsulate_decapsulate_agree() {
        let keypair = generate_keypair();

        let (ciphertext, sent) = encapsulate(&keypair.public_key).unwrap();
        let received = decapsulate(&keypair.secret_key, &ciphertext).unwrap();

        assert_eq!(sent.as_bytes(), received.as_bytes());
    }

    #[test]
    fn test_encapsulations_are_probabilistic() {
        let keypair = generate_keypair();

        let (ct1, ss1) = encapsulate(&keypair.public_key).unwrap();
        let (ct2, ss2) = encapsulate(&keypair.public_key).unwrap();

        assert_ne!(ct1.as_bytes(), ct2.as_bytes());
        assert_ne!(ss1.as_bytes(), ss2.as_bytes());
    }

    #[test]
    fn test_wrong_secret_key_yields_different_secret() {
        let keypair = generate_keypair();
        let other = generate_keypair();

        let (ciphertext, sent) = encapsulate(&keypair.public_key).unwrap();
        let received = decapsulate(&other.secret_key, &ciphertext).unwrap();

        // Kyber decapsulation never fails; a wrong key silently derives an
        // unrelated secret, so downstream AEAD opening is what rejects.
        assert_ne!(sent.as_bytes(), received.as_bytes());
    }

    #[test]
    fn test_public_key_size_enforced() {
        assert!(matches!(
            KyberPublicKey::from_bytes(&[0u8; 10]),
            Err(PqError::InvalidKeySize { .. })
        ));
    }
}
