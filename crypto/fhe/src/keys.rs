//! FHE key management
//!
//! - `ClientKey`: encryption and decryption, never leaves the coprocessor
//! - `ServerKey`: homomorphic operations, set globally before computing
//! - `NetworkPublicKey`: compact public key published to input encryptors

use crate::{FheError, FheResult};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tfhe::{generate_keys, CompactPublicKey, ConfigBuilder};
use tfhe::{ClientKey as TfheClientKey, ServerKey as TfheServerKey};

/// Identifier of the server key currently active for homomorphic operations.
/// TFHE-rs keeps the key itself in thread-global state; we track which one.
static ACTIVE_SERVER_KEY: OnceCell<RwLock<Option<[u8; 32]>>> = OnceCell::new();

fn active_server_key() -> &'static RwLock<Option<[u8; 32]>> {
    ACTIVE_SERVER_KEY.get_or_init(|| RwLock::new(None))
}

/// Set the server key for homomorphic operations
pub fn set_server_key(key: &ServerKey) {
    *active_server_key().write() = Some(key.id);
    tfhe::set_server_key(key.inner.clone());
}

/// Identifier of the active server key, if one has been set
pub fn server_key_id() -> Option<[u8; 32]> {
    *active_server_key().read()
}

/// Fail fast when no server key has been installed
pub(crate) fn ensure_server_key() -> FheResult<()> {
    if server_key_id().is_none() {
        return Err(FheError::ServerKeyMissing);
    }
    Ok(())
}

/// Client key for encryption and decryption.
/// Must stay inside the coprocessor boundary.
#[derive(Clone)]
pub struct ClientKey {
    pub(crate) inner: TfheClientKey,
}

impl ClientKey {
    /// Generate a new client key
    pub fn generate() -> FheResult<Self> {
        let config = ConfigBuilder::default().build();
        let (client_key, _server_key) = generate_keys(config);
        Ok(Self { inner: client_key })
    }

    /// Derive the server key from this client key
    pub fn derive_server_key(&self) -> ServerKey {
        ServerKey::new(TfheServerKey::new(&self.inner))
    }

    /// Derive the compact public key from this client key
    pub fn derive_public_key(&self) -> FheResult<NetworkPublicKey> {
        NetworkPublicKey::new(CompactPublicKey::new(&self.inner))
    }

    /// Get reference to inner TFHE key
    pub fn inner(&self) -> &TfheClientKey {
        &self.inner
    }
}

impl std::fmt::Debug for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientKey").finish_non_exhaustive()
    }
}

/// Server key for homomorphic operations.
/// Can be shared with any party that computes on ciphertexts.
#[derive(Clone)]
pub struct ServerKey {
    pub(crate) inner: TfheServerKey,
    /// Random instance id; content hashing is impractical at server-key size
    id: [u8; 32],
}

impl ServerKey {
    fn new(inner: TfheServerKey) -> Self {
        let mut id = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut id);
        Self { inner, id }
    }

    /// Get this key's instance id
    pub fn id(&self) -> [u8; 32] {
        self.id
    }

    /// Set this as the global server key for operations
    pub fn set_global(&self) {
        set_server_key(self);
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("id", &hex::encode(&self.id[..8]))
            .finish()
    }
}

/// Compact public key for input encryption.
/// Published so clients can encrypt values without holding the client key.
#[derive(Clone)]
pub struct NetworkPublicKey {
    inner: CompactPublicKey,
    id: [u8; 32],
}

impl NetworkPublicKey {
    fn new(inner: CompactPublicKey) -> FheResult<Self> {
        let serialized = bincode::serialize(&inner)
            .map_err(|e| FheError::SerializationError(e.to_string()))?;
        let id = *blake3::hash(&serialized).as_bytes();
        Ok(Self { inner, id })
    }

    /// Get a compact identifier for this public key
    pub fn id(&self) -> [u8; 32] {
        self.id
    }

    /// Get reference to inner key
    pub fn inner(&self) -> &CompactPublicKey {
        &self.inner
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> FheResult<Vec<u8>> {
        bincode::serialize(&self.inner).map_err(|e| FheError::SerializationError(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> FheResult<Self> {
        let inner: CompactPublicKey = bincode::deserialize(bytes)
            .map_err(|e| FheError::SerializationError(e.to_string()))?;
        Self::new(inner)
    }
}

impl std::fmt::Debug for NetworkPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkPublicKey")
            .field("id", &hex::encode(&self.id[..8]))
            .finish()
    }
}

/// Complete key set for one coprocessor instance
#[derive(Clone)]
pub struct KeyPair {
    /// Client key (secret)
    pub client: ClientKey,
    /// Server key (shareable)
    pub server: ServerKey,
    /// Public key (published)
    pub public: NetworkPublicKey,
}

impl KeyPair {
    /// Generate a new key set
    ///
    /// WARNING: key generation takes on the order of seconds.
    pub fn generate() -> FheResult<Self> {
        let config = ConfigBuilder::default().build();
        let (client_key, server_key) = generate_keys(config);
        let public = NetworkPublicKey::new(CompactPublicKey::new(&client_key))?;

        Ok(Self {
            client: ClientKey { inner: client_key },
            server: ServerKey::new(server_key),
            public,
        })
    }

    /// Set the server key globally for operations
    pub fn set_server_key(&self) {
        self.server.set_global();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_id", &hex::encode(&self.public.id()[..8]))
            .finish()
    }
}
