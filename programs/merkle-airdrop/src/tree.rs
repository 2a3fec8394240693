use std::collections::HashMap;
use std::marker::PhantomData;

use anchor_lang::prelude::Pubkey;

use crate::{hash_leaf, hash_pair, MerkleAirdropError, MerkleHasher};

/// Sorted-pair Merkle tree over an allow-list, for building the root that gets
/// deployed and the proofs claimants submit.
///
/// Leaves keep the order of the input list. An unpaired node is carried up to
/// the next level unchanged, so proofs for those leaves are shorter than the
/// tree depth.
#[derive(Clone, Debug)]
pub struct AllowListTree<H> {
    entries: Vec<(Pubkey, u64)>,
    index: HashMap<Pubkey, usize>,
    levels: Vec<Vec<[u8; 32]>>,
    _hasher: PhantomData<H>,
}

impl<H: MerkleHasher> AllowListTree<H> {
    pub fn new(entries: Vec<(Pubkey, u64)>) -> Result<Self, MerkleAirdropError> {
        if entries.is_empty() {
            return Err(MerkleAirdropError::EmptyAllowList);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (position, (recipient, _)) in entries.iter().enumerate() {
            if index.insert(*recipient, position).is_some() {
                return Err(MerkleAirdropError::DuplicateRecipient);
            }
        }

        let leaves: Vec<[u8; 32]> = entries
            .iter()
            .map(|(recipient, amount)| hash_leaf::<H>(recipient, *amount))
            .collect();

        let mut levels = vec![leaves];
        while levels.last().map_or(false, |level| level.len() > 1) {
            let level = &levels[levels.len() - 1];
            let next: Vec<[u8; 32]> = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair::<H>(left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }

        Ok(Self {
            entries,
            index,
            levels,
            _hasher: PhantomData,
        })
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn amount_of(&self, recipient: &Pubkey) -> Option<u64> {
        self.index
            .get(recipient)
            .map(|position| self.entries[*position].1)
    }

    pub fn proof(&self, recipient: &Pubkey) -> Result<Vec<[u8; 32]>, MerkleAirdropError> {
        let mut position = *self
            .index
            .get(recipient)
            .ok_or(MerkleAirdropError::RecipientNotInAllowList)?;

        let mut proof = Vec::with_capacity(self.depth());
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(position ^ 1) {
                proof.push(*sibling);
            }
            position /= 2;
        }
        Ok(proof)
    }
}
