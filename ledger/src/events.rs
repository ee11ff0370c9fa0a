//! Ledger notifications
//!
//! Events carry identities only. Ciphertext handles and coordinates never
//! appear in the event log.

use serde::{Deserialize, Serialize};
use umbra_fhe::Address;

/// A committed state transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// An identity joined the grid at a hidden random position
    Joined { identity: Address },
    /// An identity moved to a hidden submitted position
    Moved { identity: Address },
}

impl LedgerEvent {
    /// The identity the event concerns
    pub fn identity(&self) -> Address {
        match self {
            LedgerEvent::Joined { identity } | LedgerEvent::Moved { identity } => *identity,
        }
    }
}
