//! The decryption-authorization flow
//!
//! A linear sequence of fallible steps: check prerequisites, generate an
//! ephemeral keypair, build and sign the grant, run the relayer round trip,
//! reconstruct the coordinate pair. Each failure short-circuits; retrying
//! starts over with a fresh keypair.

use crate::errors::ClientError;
use crate::session::EncryptionSession;
use crate::signer::TypedSigner;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use umbra_fhe::{Address, Handle};
use umbra_relayer::{HandleContractPair, UserDecryption};

/// One position-decryption attempt.
///
/// Collect the context with the builder methods, then `run` it against a
/// relayer. Every piece is required; `run` names the first missing one.
#[derive(Default)]
pub struct PositionDecryption {
    session: Option<EncryptionSession>,
    identity: Option<Address>,
    contract: Option<Address>,
    handles: Option<(Handle, Handle)>,
    signer: Option<Arc<dyn TypedSigner>>,
}

impl PositionDecryption {
    /// Start with no context
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the encryption session
    pub fn session(mut self, session: EncryptionSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Provide the requesting identity
    pub fn identity(mut self, identity: Address) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Provide the ledger contract the handles belong to
    pub fn contract(mut self, contract: Address) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Provide the position handles read from the ledger
    pub fn handles(mut self, x: Handle, y: Handle) -> Self {
        self.handles = Some((x, y));
        self
    }

    /// Provide the identity's signer
    pub fn signer(mut self, signer: Arc<dyn TypedSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Run the protocol and return the plaintext coordinate pair
    pub async fn run(self, relayer: &dyn UserDecryption) -> Result<(u8, u8), ClientError> {
        let session = self
            .session
            .ok_or(ClientError::MissingContext("encryption session"))?;
        let identity = self.identity.ok_or(ClientError::MissingContext("identity"))?;
        let contract = self.contract.ok_or(ClientError::MissingContext("contract"))?;
        let (handle_x, handle_y) = self
            .handles
            .ok_or(ClientError::MissingContext("position handles"))?;
        let signer = self.signer.ok_or(ClientError::MissingContext("signer"))?;

        // Fresh keypair per request; never reused, even across retries
        let ephemeral = session.generate_keypair();

        let valid_from = unix_now();
        let message = session.authorization_message(
            &ephemeral.public_key,
            vec![contract],
            valid_from,
        );
        let signature = signer.sign_authorization(&message).await?;

        let pairs = vec![
            HandleContractPair {
                handle: handle_x,
                contract,
            },
            HandleContractPair {
                handle: handle_y,
                contract,
            },
        ];
        let plaintexts = session
            .user_decrypt(
                relayer,
                pairs,
                &ephemeral.secret_key,
                &ephemeral.public_key,
                &signature,
                signer.verifying_key(),
                message.contracts.clone(),
                identity,
                message.valid_from,
                message.valid_duration,
            )
            .await?;

        let x = plaintexts.get(&handle_x).copied().ok_or_else(|| {
            ClientError::DecryptionFailed("response is missing the x coordinate".into())
        })?;
        let y = plaintexts.get(&handle_y).copied().ok_or_else(|| {
            ClientError::DecryptionFailed("response is missing the y coordinate".into())
        })?;
        Ok((x, y))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
