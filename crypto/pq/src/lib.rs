//! UMBRA Post-Quantum Primitives
//!
//! Long-term identity signatures (CRYSTALS-Dilithium3) and the ephemeral
//! key-encapsulation mechanism (CRYSTALS-Kyber768) used by the
//! decryption-authorization protocol. Thin wrappers over the `pqcrypto`
//! crates; secret material is zeroized on drop.

pub mod dilithium;
pub mod errors;
pub mod kyber;

pub use errors::PqError;
