//! The signing interface
//!
//! Decryption grants are signed by the identity's wallet. The trait keeps
//! the flow independent of where the key lives; `WalletSigner` is the
//! in-process implementation over an `IdentityKeypair`.

use crate::errors::ClientError;
use crate::keypair::IdentityKeypair;
use async_trait::async_trait;
use umbra_fhe::Address;
use umbra_pq::dilithium;
use umbra_relayer::AuthorizationMessage;

/// Signs authorization grants with the identity's long-term key
#[async_trait]
pub trait TypedSigner: Send + Sync {
    /// Sign the canonical bytes of an authorization message.
    ///
    /// Returns hex in the wallet convention, `0x`-prefixed; the transport
    /// layer strips the prefix before transmission.
    async fn sign_authorization(&self, message: &AuthorizationMessage)
        -> Result<String, ClientError>;

    /// The verifying key matching the signatures this signer produces
    fn verifying_key(&self) -> Vec<u8>;

    /// The address derived from the verifying key
    fn address(&self) -> Address {
        Address::from_key_bytes(&self.verifying_key())
    }
}

/// In-process signer over a locally held identity keypair
pub struct WalletSigner {
    keypair: IdentityKeypair,
}

impl WalletSigner {
    /// Wrap an identity keypair
    pub fn new(keypair: IdentityKeypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TypedSigner for WalletSigner {
    async fn sign_authorization(
        &self,
        message: &AuthorizationMessage,
    ) -> Result<String, ClientError> {
        let signature =
            dilithium::sign_detached(&self.keypair.signing.secret_key, &message.signing_bytes())
                .map_err(|e| ClientError::SignerUnavailable(e.to_string()))?;
        Ok(format!("0x{}", hex::encode(signature)))
    }

    fn verifying_key(&self) -> Vec<u8> {
        self.keypair.signing.public_key.as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_pq::dilithium::verify_detached;

    #[tokio::test]
    async fn test_wallet_signature_verifies_and_is_prefixed() {
        let signer = WalletSigner::new(IdentityKeypair::generate());
        let message = AuthorizationMessage::new(vec![1, 2, 3], vec![Address::random()], 1_000);

        let signature = signer.sign_authorization(&message).await.unwrap();
        assert!(signature.starts_with("0x"));

        let bytes = hex::decode(signature.trim_start_matches("0x")).unwrap();
        let verifying_key =
            dilithium::DilithiumPublicKey::from_bytes(&signer.verifying_key()).unwrap();
        assert!(verify_detached(&verifying_key, &message.signing_bytes(), &bytes).unwrap());
    }

    #[test]
    fn test_signer_address_matches_keypair() {
        let keypair = IdentityKeypair::generate();
        let address = keypair.address();
        let signer = WalletSigner::new(keypair);
        assert_eq!(signer.address(), address);
    }
}
