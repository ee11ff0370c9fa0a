//! UMBRA Position Ledger
//!
//! A publicly-auditable ledger of secret grid positions. Each identity's
//! coordinates exist only as coprocessor ciphertext handles; the ledger
//! draws spawn positions, validates submitted moves, and clamps everything
//! into the grid entirely over ciphertexts. Anyone can observe that a
//! position exists or changed; only the owner (and the ledger itself) is
//! ever granted the right to decrypt it.

pub mod errors;
mod events;
mod ledger;
mod position;

pub use errors::LedgerError;
pub use events::LedgerEvent;
pub use ledger::GridLedger;
pub use position::{PositionRecord, GRID_MAX, GRID_MIN};
