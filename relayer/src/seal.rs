//! In-transit sealing of decrypted values
//!
//! Hybrid scheme: Kyber-encapsulate to the requester's ephemeral public key,
//! derive a symmetric key from the shared secret, encrypt the plaintext with
//! ChaCha20-Poly1305. Only the holder of the ephemeral secret key can open
//! the result, so the relayer response is useless to anyone else on the wire.

use crate::errors::RelayerError;
use crate::types::SealedValue;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use umbra_pq::kyber::{self, KyberPublicKey, KyberSecretKey};

/// Domain for deriving the AEAD key from the KEM shared secret
const SEAL_KEY_CONTEXT: &str = "umbra relayer seal v1";

/// Seal a plaintext to an ephemeral public key
pub fn seal_value(public_key: &KyberPublicKey, plaintext: &[u8]) -> Result<SealedValue, RelayerError> {
    let (kem_ciphertext, shared) = kyber::encapsulate(public_key)?;
    let key = blake3::derive_key(SEAL_KEY_CONTEXT, shared.as_bytes());

    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    let payload = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| RelayerError::SealFailed)?;

    Ok(SealedValue {
        kem_ciphertext: kem_ciphertext.as_bytes().to_vec(),
        nonce,
        payload,
    })
}

/// Open a sealed value with the matching ephemeral secret key
pub fn open_value(secret_key: &KyberSecretKey, sealed: &SealedValue) -> Result<Vec<u8>, RelayerError> {
    let kem_ciphertext = kyber::KyberCiphertext::from_bytes(&sealed.kem_ciphertext)?;
    let shared = kyber::decapsulate(secret_key, &kem_ciphertext)?;
    let key = blake3::derive_key(SEAL_KEY_CONTEXT, shared.as_bytes());

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.payload.as_ref())
        .map_err(|_| RelayerError::OpenFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let keypair = kyber::generate_keypair();

        let sealed = seal_value(&keypair.public_key, &[7u8]).unwrap();
        let opened = open_value(&keypair.secret_key, &sealed).unwrap();

        assert_eq!(opened, vec![7u8]);
    }

    #[test]
    fn test_wrong_key_cannot_open() {
        let keypair = kyber::generate_keypair();
        let other = kyber::generate_keypair();

        let sealed = seal_value(&keypair.public_key, &[7u8]).unwrap();
        assert!(matches!(
            open_value(&other.secret_key, &sealed),
            Err(RelayerError::OpenFailed)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let keypair = kyber::generate_keypair();

        let mut sealed = seal_value(&keypair.public_key, &[7u8]).unwrap();
        sealed.payload[0] ^= 0xFF;
        assert!(matches!(
            open_value(&keypair.secret_key, &sealed),
            Err(RelayerError::OpenFailed)
        ));
    }
}
