//! The FHE coprocessor
//!
//! Owns every ciphertext in the system and exposes them only as opaque
//! handles. Callers orchestrate homomorphic computation handle-by-handle;
//! plaintext leaves the coprocessor solely through `decrypt_authorized`,
//! which consults the per-handle access-control list.

use crate::ciphertext::{EncryptedBit, EncryptedU8};
use crate::handle::{Address, Handle};
use crate::input::EncryptedInput;
use crate::keys::{ensure_server_key, KeyPair, NetworkPublicKey};
use crate::{FheError, FheResult};
use std::collections::{HashMap, HashSet};
use tfhe::prelude::*;

/// A stored ciphertext: an 8-bit integer or a comparison result
#[derive(Clone, Debug)]
enum Slot {
    Uint(EncryptedU8),
    Bit(EncryptedBit),
}

/// Handle-addressed ciphertext store with homomorphic operations and ACLs
pub struct Coprocessor {
    keys: KeyPair,
    slots: HashMap<Handle, Slot>,
    acl: HashMap<Handle, HashSet<Address>>,
    /// Instance salt mixed into internally derived handles
    salt: [u8; 32],
    next_slot: u64,
}

impl Coprocessor {
    /// Create a coprocessor with freshly generated keys.
    ///
    /// WARNING: key generation takes on the order of seconds.
    pub fn new() -> FheResult<Self> {
        Self::with_keys(KeyPair::generate()?)
    }

    /// Create a coprocessor from an existing key set
    pub fn with_keys(keys: KeyPair) -> FheResult<Self> {
        keys.set_server_key();

        let mut salt = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);

        Ok(Self {
            keys,
            slots: HashMap::new(),
            acl: HashMap::new(),
            salt,
            next_slot: 0,
        })
    }

    /// The public key clients encrypt inputs under
    pub fn public_key(&self) -> NetworkPublicKey {
        self.keys.public.clone()
    }

    /// Number of stored ciphertexts
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn insert_uint(&mut self, ciphertext: EncryptedU8) -> Handle {
        let handle = Handle::derive_internal(&self.salt, self.next_slot);
        self.next_slot += 1;
        self.slots.insert(handle, Slot::Uint(ciphertext));
        handle
    }

    fn insert_bit(&mut self, ciphertext: EncryptedBit) -> Handle {
        let handle = Handle::derive_internal(&self.salt, self.next_slot);
        self.next_slot += 1;
        self.slots.insert(handle, Slot::Bit(ciphertext));
        handle
    }

    fn uint(&self, handle: Handle) -> FheResult<&EncryptedU8> {
        match self.slots.get(&handle) {
            Some(Slot::Uint(ciphertext)) => Ok(ciphertext),
            Some(Slot::Bit(_)) => Err(FheError::KindMismatch(handle.to_hex())),
            None => Err(FheError::UnknownHandle(handle.to_hex())),
        }
    }

    fn bit(&self, handle: Handle) -> FheResult<&EncryptedBit> {
        match self.slots.get(&handle) {
            Some(Slot::Bit(ciphertext)) => Ok(ciphertext),
            Some(Slot::Uint(_)) => Err(FheError::KindMismatch(handle.to_hex())),
            None => Err(FheError::UnknownHandle(handle.to_hex())),
        }
    }

    /// Draw a fresh encrypted random byte.
    ///
    /// The draw happens inside the coprocessor boundary; callers only ever
    /// see the handle, so no ledger code path observes the sampled value.
    pub fn rand8(&mut self) -> FheResult<Handle> {
        let draw: u8 = rand::random();
        let ciphertext = EncryptedU8::encrypt_with_public(draw, &self.keys.public)?;
        Ok(self.insert_uint(ciphertext))
    }

    /// Encrypt a public constant for use as a homomorphic operand
    pub fn constant8(&mut self, value: u8) -> FheResult<Handle> {
        let ciphertext = EncryptedU8::encrypt(value, &self.keys.client)?;
        Ok(self.insert_uint(ciphertext))
    }

    /// Homomorphic addition
    pub fn add(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        ensure_server_key()?;
        let result = {
            let x = self.uint(a)?;
            let y = self.uint(b)?;
            EncryptedU8::from_tfhe_with_ops(
                x.inner() + y.inner(),
                x.op_count() + y.op_count() + 1,
            )
        };
        Ok(self.insert_uint(result))
    }

    /// Homomorphic remainder
    pub fn rem(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        ensure_server_key()?;
        let result = {
            let x = self.uint(a)?;
            let y = self.uint(b)?;
            EncryptedU8::from_tfhe_with_ops(
                x.inner() % y.inner(),
                x.op_count() + y.op_count() + 5,
            )
        };
        Ok(self.insert_uint(result))
    }

    /// Homomorphic less-than; the result handle holds an encrypted boolean
    pub fn lt(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        ensure_server_key()?;
        let result = {
            let x = self.uint(a)?;
            let y = self.uint(b)?;
            EncryptedBit::from_tfhe(x.inner().lt(y.inner()))
        };
        Ok(self.insert_bit(result))
    }

    /// Homomorphic greater-than; the result handle holds an encrypted boolean
    pub fn gt(&mut self, a: Handle, b: Handle) -> FheResult<Handle> {
        ensure_server_key()?;
        let result = {
            let x = self.uint(a)?;
            let y = self.uint(b)?;
            EncryptedBit::from_tfhe(x.inner().gt(y.inner()))
        };
        Ok(self.insert_bit(result))
    }

    /// Conditional select: if cond then a else b.
    ///
    /// The comparison and the branch are both ciphertexts; nothing about the
    /// condition is revealed by computing the result.
    pub fn select(&mut self, cond: Handle, a: Handle, b: Handle) -> FheResult<Handle> {
        ensure_server_key()?;
        let result = {
            let c = self.bit(cond)?;
            let x = self.uint(a)?;
            let y = self.uint(b)?;
            EncryptedU8::from_tfhe_with_ops(
                c.inner().if_then_else(x.inner(), y.inner()),
                x.op_count() + y.op_count() + 5,
            )
        };
        Ok(self.insert_uint(result))
    }

    /// Verify an external input's binding proof and import its ciphertexts.
    ///
    /// Fails with `InvalidProof` when the proof does not bind the ciphertexts
    /// to exactly this `(contract, identity)` pair; nothing is imported in
    /// that case.
    pub fn verify_input(
        &mut self,
        input: &EncryptedInput,
        contract: &Address,
        identity: &Address,
    ) -> FheResult<Vec<Handle>> {
        if !input.proof().verify(input.blobs(), contract, identity) {
            return Err(FheError::InvalidProof);
        }

        let mut imported = Vec::with_capacity(input.blobs().len());
        for (index, blob) in input.blobs().iter().enumerate() {
            let ciphertext = EncryptedU8::from_blob(blob)?;
            imported.push((Handle::derive_input(blob.data(), index as u32), ciphertext));
        }

        let mut handles = Vec::with_capacity(imported.len());
        for (handle, ciphertext) in imported {
            self.slots.insert(handle, Slot::Uint(ciphertext));
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Grant `who` the right to request decryption of `handle`.
    /// Grants accumulate; nothing in the protocol revokes them.
    pub fn allow(&mut self, handle: Handle, who: Address) -> FheResult<()> {
        if !self.slots.contains_key(&handle) {
            return Err(FheError::UnknownHandle(handle.to_hex()));
        }
        self.acl.entry(handle).or_default().insert(who);
        Ok(())
    }

    /// Check whether `who` may request decryption of `handle`
    pub fn is_allowed(&self, handle: &Handle, who: &Address) -> bool {
        self.acl
            .get(handle)
            .map(|grantees| grantees.contains(who))
            .unwrap_or(false)
    }

    /// Decrypt a handle on behalf of an authorized requester.
    ///
    /// The access-control check is not optional: this is the only path by
    /// which plaintext leaves the coprocessor.
    pub fn decrypt_authorized(&self, handle: Handle, requester: &Address) -> FheResult<u8> {
        if !self.is_allowed(&handle, requester) {
            return Err(FheError::AccessDenied {
                identity: requester.to_hex(),
                handle: handle.to_hex(),
            });
        }

        let ciphertext = self.uint(handle)?;
        Ok(ciphertext.decrypt(&self.keys.client))
    }
}

impl std::fmt::Debug for Coprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coprocessor")
            .field("slots", &self.slots.len())
            .field("granted_handles", &self.acl.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EncryptedInputBuilder;

    // All of these need TFHE key generation (slow). Run with:
    // cargo test -p umbra-fhe --release -- --ignored

    #[test]
    #[ignore]
    fn test_arithmetic_over_handles() {
        let mut cop = Coprocessor::new().unwrap();
        let owner = Address::random();

        let a = cop.constant8(9).unwrap();
        let b = cop.constant8(4).unwrap();

        let sum = cop.add(a, b).unwrap();
        let rem = cop.rem(sum, b).unwrap();

        cop.allow(sum, owner).unwrap();
        cop.allow(rem, owner).unwrap();
        assert_eq!(cop.decrypt_authorized(sum, &owner).unwrap(), 13);
        assert_eq!(cop.decrypt_authorized(rem, &owner).unwrap(), 1);
    }

    #[test]
    #[ignore]
    fn test_select_multiplexes_without_decrypting() {
        let mut cop = Coprocessor::new().unwrap();
        let owner = Address::random();

        let small = cop.constant8(3).unwrap();
        let large = cop.constant8(200).unwrap();

        let cond = cop.lt(small, large).unwrap();
        let picked = cop.select(cond, small, large).unwrap();

        cop.allow(picked, owner).unwrap();
        assert_eq!(cop.decrypt_authorized(picked, &owner).unwrap(), 3);
    }

    #[test]
    #[ignore]
    fn test_decrypt_requires_grant() {
        let mut cop = Coprocessor::new().unwrap();
        let owner = Address::random();
        let stranger = Address::random();

        let value = cop.constant8(5).unwrap();
        cop.allow(value, owner).unwrap();

        assert_eq!(cop.decrypt_authorized(value, &owner).unwrap(), 5);
        assert!(matches!(
            cop.decrypt_authorized(value, &stranger),
            Err(FheError::AccessDenied { .. })
        ));
    }

    #[test]
    #[ignore]
    fn test_verify_input_imports_bound_ciphertexts() {
        let mut cop = Coprocessor::new().unwrap();
        let contract = Address::random();
        let identity = Address::random();

        let input = EncryptedInputBuilder::new(contract, identity)
            .add8(7)
            .add8(8)
            .encrypt(&cop.public_key())
            .unwrap();

        let handles = cop.verify_input(&input, &contract, &identity).unwrap();
        assert_eq!(handles, input.handles());

        // Imported handles decrypt to the submitted values once granted
        cop.allow(handles[0], identity).unwrap();
        cop.allow(handles[1], identity).unwrap();
        assert_eq!(cop.decrypt_authorized(handles[0], &identity).unwrap(), 7);
        assert_eq!(cop.decrypt_authorized(handles[1], &identity).unwrap(), 8);
    }

    #[test]
    #[ignore]
    fn test_verify_input_rejects_wrong_binding() {
        let mut cop = Coprocessor::new().unwrap();
        let contract = Address::random();
        let identity = Address::random();

        let input = EncryptedInputBuilder::new(contract, identity)
            .add8(1)
            .encrypt(&cop.public_key())
            .unwrap();

        let err = cop
            .verify_input(&input, &contract, &Address::random())
            .unwrap_err();
        assert!(matches!(err, FheError::InvalidProof));
        assert_eq!(cop.slot_count(), 0);
    }
}
