//! UMBRA Client
//!
//! The two off-chain flows a player runs:
//!
//! - **Input encryption**: turn plaintext coordinates into ciphertext blobs
//!   plus a proof binding them to one ledger instance and one identity,
//!   without plaintext ever leaving the session.
//! - **Decryption authorization**: recover plaintext for handles the player
//!   is entitled to read, by signing a time-bounded grant over a fresh
//!   ephemeral keypair and exchanging it with a relayer.
//!
//! Both flows are strictly sequential chains of fallible steps; any missing
//! prerequisite or failed step aborts the whole flow with no partial state.

mod authorizer;
pub mod errors;
mod keypair;
mod session;
mod signer;

pub use authorizer::PositionDecryption;
pub use errors::ClientError;
pub use keypair::IdentityKeypair;
pub use session::{EncryptionSession, InputEncryptor};
pub use signer::{TypedSigner, WalletSigner};
