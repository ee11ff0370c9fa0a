//! Position records and grid bounds

use serde::{Deserialize, Serialize};
use umbra_fhe::Handle;

/// Smallest coordinate on either axis
pub const GRID_MIN: u8 = 1;
/// Largest coordinate on either axis
pub const GRID_MAX: u8 = 10;

/// One identity's encrypted position.
///
/// The handles are replaced wholesale on every move; records are never
/// deleted once created.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Handle of the encrypted x coordinate
    pub x: Handle,
    /// Handle of the encrypted y coordinate
    pub y: Handle,
    /// True once the identity has joined
    pub active: bool,
}
