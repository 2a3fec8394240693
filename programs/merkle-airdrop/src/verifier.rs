use std::marker::PhantomData;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{hash, keccak};

/// Hash scheme the tree was built with. Chosen once, as a type parameter of
/// the verifier, so a deployed root is always checked with the same function.
pub trait MerkleHasher {
    fn hashv(parts: &[&[u8]]) -> [u8; 32];
}

/// Keccak-256, the scheme the on-chain program uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keccak256;

impl MerkleHasher for Keccak256 {
    fn hashv(parts: &[&[u8]]) -> [u8; 32] {
        keccak::hashv(parts).0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256;

impl MerkleHasher for Sha256 {
    fn hashv(parts: &[&[u8]]) -> [u8; 32] {
        hash::hashv(parts).to_bytes()
    }
}

pub const ZERO_ROOT: [u8; 32] = [0u8; 32];

/// Leaf commitment for one allow-list entry.
///
/// The entry is serialized as `recipient (32 bytes) || amount (u64 LE)` and
/// hashed twice, so a leaf can never be confused with a 64-byte internal node
/// preimage.
pub fn hash_leaf<H: MerkleHasher>(recipient: &Pubkey, amount: u64) -> [u8; 32] {
    let entry = H::hashv(&[recipient.as_ref(), &amount.to_le_bytes()]);
    H::hashv(&[&entry])
}

/// Combines two nodes with the smaller one on the left.
pub fn hash_pair<H: MerkleHasher>(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    if a <= b {
        H::hashv(&[a, b])
    } else {
        H::hashv(&[b, a])
    }
}

/// Folds `proof` into `leaf` and returns the root it implies.
pub fn process_proof<H: MerkleHasher>(leaf: [u8; 32], proof: &[[u8; 32]]) -> [u8; 32] {
    proof
        .iter()
        .fold(leaf, |current_hash, node| hash_pair::<H>(&current_hash, node))
}

pub fn verify_proof<H: MerkleHasher>(proof: &[[u8; 32]], root: [u8; 32], leaf: [u8; 32]) -> bool {
    if root == ZERO_ROOT {
        return false;
    }
    process_proof::<H>(leaf, proof) == root
}

/// Membership check of (recipient, amount) pairs against a fixed root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentVerifier<H> {
    root: [u8; 32],
    _hasher: PhantomData<H>,
}

impl<H: MerkleHasher> CommitmentVerifier<H> {
    pub fn new(root: [u8; 32]) -> Self {
        Self {
            root,
            _hasher: PhantomData,
        }
    }

    pub fn root(&self) -> [u8; 32] {
        self.root
    }

    pub fn is_configured(&self) -> bool {
        self.root != ZERO_ROOT
    }

    pub fn verify(&self, recipient: &Pubkey, amount: u64, proof: &[[u8; 32]]) -> bool {
        if *recipient == Pubkey::default() || !self.is_configured() {
            return false;
        }
        let leaf = hash_leaf::<H>(recipient, amount);
        let computed = process_proof::<H>(leaf, proof);
        if computed != self.root {
            msg!("Leaf {:02X?}", leaf);
            msg!("Computed root {:02X?}", computed);
            msg!("Root {:02X?}", self.root);
            return false;
        }
        true
    }
}
