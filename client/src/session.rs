//! The encryption session
//!
//! A session wraps the network's published encryption material and provides
//! the client-side protocol operations: input encryption, ephemeral keypair
//! generation, authorization-message construction, and the user-decryption
//! round trip.

use crate::errors::ClientError;
use std::collections::HashMap;
use tracing::debug;
use umbra_fhe::{Address, Coprocessor, EncryptedInput, EncryptedInputBuilder, Handle, NetworkPublicKey};
use umbra_pq::kyber::{self, KyberKeypair, KyberPublicKey, KyberSecretKey};
use umbra_relayer::{
    open_value, AuthorizationMessage, HandleContractPair, UserDecryptRequest, UserDecryption,
};

/// Client-side handle to the network's encryption material
#[derive(Clone)]
pub struct EncryptionSession {
    public_key: NetworkPublicKey,
}

impl EncryptionSession {
    /// Connect to a coprocessor and fetch its public key
    pub fn connect(coprocessor: &Coprocessor) -> Self {
        Self {
            public_key: coprocessor.public_key(),
        }
    }

    /// Build a session from an already-distributed public key
    pub fn from_public_key(public_key: NetworkPublicKey) -> Self {
        Self { public_key }
    }

    /// The network public key inputs are encrypted under
    pub fn public_key(&self) -> &NetworkPublicKey {
        &self.public_key
    }

    /// Generate a fresh ephemeral keypair for one decryption request
    pub fn generate_keypair(&self) -> KyberKeypair {
        kyber::generate_keypair()
    }

    /// Build the authorization message for a set of contracts.
    /// Uses the standard ten-day validity.
    pub fn authorization_message(
        &self,
        public_key: &KyberPublicKey,
        contracts: Vec<Address>,
        valid_from: u64,
    ) -> AuthorizationMessage {
        AuthorizationMessage::new(public_key.as_bytes().to_vec(), contracts, valid_from)
    }

    /// Run the user-decryption round trip and reconstruct plaintexts.
    ///
    /// Strips a `0x` prefix from the signature before transmission. The
    /// ephemeral secret key is used only locally, to open the sealed
    /// response; it is never part of the request.
    #[allow(clippy::too_many_arguments)]
    pub async fn user_decrypt(
        &self,
        relayer: &dyn UserDecryption,
        pairs: Vec<HandleContractPair>,
        secret_key: &KyberSecretKey,
        public_key: &KyberPublicKey,
        signature: &str,
        verifying_key: Vec<u8>,
        contracts: Vec<Address>,
        identity: Address,
        valid_from: u64,
        valid_duration: u64,
    ) -> Result<HashMap<Handle, u8>, ClientError> {
        let signature = signature.strip_prefix("0x").unwrap_or(signature);

        let request = UserDecryptRequest {
            pairs: pairs.clone(),
            public_key: public_key.as_bytes().to_vec(),
            signature: signature.to_string(),
            verifying_key,
            contracts,
            identity,
            valid_from,
            valid_duration,
        };

        let response = relayer
            .user_decrypt(request)
            .await
            .map_err(|e| ClientError::DecryptionFailed(e.to_string()))?;
        debug!(handles = pairs.len(), "relayer returned sealed values");

        let mut plaintexts = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            let sealed = response.values.get(&pair.handle).ok_or_else(|| {
                ClientError::DecryptionFailed("relayer response is missing a handle".into())
            })?;
            let opened = open_value(secret_key, sealed)
                .map_err(|e| ClientError::DecryptionFailed(e.to_string()))?;
            let value = opened.first().copied().ok_or_else(|| {
                ClientError::DecryptionFailed("relayer returned an empty value".into())
            })?;
            plaintexts.insert(pair.handle, value);
        }
        Ok(plaintexts)
    }
}

impl std::fmt::Debug for EncryptionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionSession")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Turns plaintext coordinates into bound ciphertext inputs.
///
/// Holds no session until one is attached; encrypting before that fails
/// with `EncryptionUnavailable`.
#[derive(Debug, Default)]
pub struct InputEncryptor {
    session: Option<EncryptionSession>,
}

impl InputEncryptor {
    /// Create an encryptor with no session yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an initialized session
    pub fn attach(&mut self, session: EncryptionSession) {
        self.session = Some(session);
    }

    /// Whether a session is attached
    pub fn ready(&self) -> bool {
        self.session.is_some()
    }

    /// Encrypt a coordinate pair for submission to `contract` as `identity`.
    ///
    /// Values are not clamped here; bounds enforcement is the ledger's job.
    /// The returned input's proof binds the ciphertexts to exactly this
    /// contract and identity.
    pub fn encrypt_pair(
        &self,
        contract: Address,
        identity: Address,
        x: u8,
        y: u8,
    ) -> Result<EncryptedInput, ClientError> {
        let session = self
            .session
            .as_ref()
            .ok_or(ClientError::EncryptionUnavailable)?;

        let input = EncryptedInputBuilder::new(contract, identity)
            .add8(x)
            .add8(y)
            .encrypt(session.public_key())?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryptor_without_session_is_unavailable() {
        let encryptor = InputEncryptor::new();
        assert!(!encryptor.ready());

        let err = encryptor
            .encrypt_pair(Address::random(), Address::random(), 3, 4)
            .unwrap_err();
        assert!(matches!(err, ClientError::EncryptionUnavailable));
    }
}
