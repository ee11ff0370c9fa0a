//! Player identity keys

use umbra_fhe::Address;
use umbra_pq::dilithium::{self, DilithiumKeypair};

/// A player's long-term signing keypair and the address derived from it
pub struct IdentityKeypair {
    /// Dilithium signing keypair
    pub signing: DilithiumKeypair,
}

impl IdentityKeypair {
    /// Generate a fresh identity
    pub fn generate() -> Self {
        Self {
            signing: dilithium::generate_keypair(),
        }
    }

    /// The address other parties know this identity by
    pub fn address(&self) -> Address {
        Address::from_key_bytes(self.signing.public_key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_stable_per_identity() {
        let identity = IdentityKeypair::generate();
        assert_eq!(identity.address(), identity.address());
        assert_ne!(identity.address(), IdentityKeypair::generate().address());
    }
}
