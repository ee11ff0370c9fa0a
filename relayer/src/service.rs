//! The relayer service
//!
//! Request handling is two-phase: `validate` checks everything that can be
//! checked without touching ciphertexts (signature, identity binding, grant
//! window, scope), then the decrypt-and-seal phase consults the coprocessor
//! ACL per handle. Nothing is decrypted for a request that fails validation.

use crate::errors::RelayerError;
use crate::seal::seal_value;
use crate::types::{SealedValue, UserDecryptRequest, UserDecryptResponse};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use umbra_fhe::{Address, Coprocessor, FheError};
use umbra_pq::{dilithium, kyber::KyberPublicKey};

/// Relayer acceptance policy
#[derive(Debug, Clone)]
pub struct RelayerConfig {
    /// Longest grant duration the relayer accepts, in seconds
    pub max_grant_duration: u64,
    /// Tolerated clock skew on `valid_from`, in seconds
    pub clock_skew: u64,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            max_grant_duration: 30 * 24 * 60 * 60,
            clock_skew: 60,
        }
    }
}

/// The user-decryption interface a requesting session talks to
#[async_trait]
pub trait UserDecryption: Send + Sync {
    /// Verify an authorization and return sealed plaintexts for its handles
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<UserDecryptResponse, RelayerError>;
}

/// Relayer backed by a coprocessor it shares with the ledger
pub struct DecryptionRelayer {
    coprocessor: Arc<RwLock<Coprocessor>>,
    config: RelayerConfig,
}

impl DecryptionRelayer {
    /// Create a relayer with the default acceptance policy
    pub fn new(coprocessor: Arc<RwLock<Coprocessor>>) -> Self {
        Self::with_config(coprocessor, RelayerConfig::default())
    }

    /// Create a relayer with an explicit acceptance policy
    pub fn with_config(coprocessor: Arc<RwLock<Coprocessor>>, config: RelayerConfig) -> Self {
        Self { coprocessor, config }
    }

    fn unix_now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Checks that need no ciphertext access: signature over the
    /// reconstructed grant, identity binding, window, and scope.
    pub(crate) fn validate(
        request: &UserDecryptRequest,
        config: &RelayerConfig,
        now: u64,
    ) -> Result<(), RelayerError> {
        if Address::from_key_bytes(&request.verifying_key) != request.identity {
            return Err(RelayerError::IdentityMismatch);
        }

        let signature = hex::decode(&request.signature)
            .map_err(|e| RelayerError::SignatureFormat(e.to_string()))?;
        let verifying_key = dilithium::DilithiumPublicKey::from_bytes(&request.verifying_key)?;
        let message = request.authorization();
        if !dilithium::verify_detached(&verifying_key, &message.signing_bytes(), &signature)? {
            return Err(RelayerError::InvalidSignature);
        }

        if request.valid_duration > config.max_grant_duration {
            return Err(RelayerError::GrantTooLong(request.valid_duration));
        }
        if request.valid_from > now.saturating_add(config.clock_skew) {
            return Err(RelayerError::GrantNotYetValid);
        }
        if message.expires_at() <= now {
            return Err(RelayerError::GrantExpired);
        }

        for pair in &request.pairs {
            if !request.contracts.contains(&pair.contract) {
                return Err(RelayerError::ScopeMismatch(pair.contract.to_hex()));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl UserDecryption for DecryptionRelayer {
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<UserDecryptResponse, RelayerError> {
        if let Err(err) = Self::validate(&request, &self.config, Self::unix_now()) {
            warn!(
                identity = %request.identity.to_hex(),
                %err,
                "rejected user-decryption request"
            );
            return Err(err);
        }

        let ephemeral = KyberPublicKey::from_bytes(&request.public_key)?;
        let mut values: HashMap<_, SealedValue> = HashMap::with_capacity(request.pairs.len());
        {
            let cop = self.coprocessor.read();
            for pair in &request.pairs {
                let plaintext =
                    cop.decrypt_authorized(pair.handle, &request.identity)
                        .map_err(|err| match err {
                            FheError::AccessDenied { .. } => {
                                RelayerError::UnauthorizedHandle(pair.handle.to_hex())
                            }
                            other => RelayerError::Fhe(other),
                        })?;
                values.insert(pair.handle, seal_value(&ephemeral, &[plaintext])?);
            }
        }

        info!(
            identity = %request.identity.to_hex(),
            handles = request.pairs.len(),
            "served user-decryption request"
        );
        Ok(UserDecryptResponse { values })
    }
}
