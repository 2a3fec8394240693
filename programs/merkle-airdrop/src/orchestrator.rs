use std::collections::BTreeSet;

use anchor_lang::prelude::*;

use crate::{
    claim_message, ClaimAuthorization, ClaimAuthorizer, CommitmentVerifier, MerkleAirdropError,
    MerkleHasher, Receipt, TokensClaimed, ValueLedger,
};

pub type ClaimResult = std::result::Result<(), MerkleAirdropError>;

/// Record of recipients that have claimed.
///
/// `rollback_claim` undoes a mark made earlier in the same, failed, claim. No
/// other path clears a mark.
pub trait ClaimRegistry {
    fn is_claimed(&self, recipient: &Pubkey) -> bool;
    fn mark_claimed(&mut self, recipient: &Pubkey, amount: u64);
    fn rollback_claim(&mut self, recipient: &Pubkey);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimedSet {
    claimed: BTreeSet<Pubkey>,
}

impl ClaimedSet {
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

impl ClaimRegistry for ClaimedSet {
    fn is_claimed(&self, recipient: &Pubkey) -> bool {
        self.claimed.contains(recipient)
    }

    fn mark_claimed(&mut self, recipient: &Pubkey, _amount: u64) {
        self.claimed.insert(*recipient);
    }

    fn rollback_claim(&mut self, recipient: &Pubkey) {
        self.claimed.remove(recipient);
    }
}

/// Claimed-set backed by the recipient's receipt PDA. The PDA seeds bind it
/// to one recipient, so it only ever answers for that key.
pub struct ReceiptRegistry<'a, 'info> {
    receipt: &'a mut Account<'info, Receipt>,
}

impl<'a, 'info> ReceiptRegistry<'a, 'info> {
    pub fn new(receipt: &'a mut Account<'info, Receipt>) -> Self {
        Self { receipt }
    }
}

impl<'a, 'info> ClaimRegistry for ReceiptRegistry<'a, 'info> {
    fn is_claimed(&self, recipient: &Pubkey) -> bool {
        self.receipt.claimed && self.receipt.recipient == *recipient
    }

    fn mark_claimed(&mut self, recipient: &Pubkey, amount: u64) {
        self.receipt.recipient = *recipient;
        self.receipt.amount = amount;
        self.receipt.claimed = true;
    }

    fn rollback_claim(&mut self, _recipient: &Pubkey) {
        self.receipt.claimed = false;
        self.receipt.amount = 0;
    }
}

/// Gates the one-time payout of each allow-list entry.
pub struct ClaimOrchestrator<H, L, A, R = ClaimedSet> {
    verifier: CommitmentVerifier<H>,
    ledger: L,
    authorizer: A,
    claimed: R,
}

impl<H, L, A, R> ClaimOrchestrator<H, L, A, R>
where
    H: MerkleHasher,
    L: ValueLedger,
    A: ClaimAuthorizer,
    R: ClaimRegistry + Default,
{
    pub fn new(root: [u8; 32], ledger: L, authorizer: A) -> Self {
        Self::with_registry(root, ledger, authorizer, R::default())
    }
}

impl<H, L, A, R> ClaimOrchestrator<H, L, A, R>
where
    H: MerkleHasher,
    L: ValueLedger,
    A: ClaimAuthorizer,
    R: ClaimRegistry,
{
    pub fn with_registry(root: [u8; 32], ledger: L, authorizer: A, claimed: R) -> Self {
        Self {
            verifier: CommitmentVerifier::new(root),
            ledger,
            authorizer,
            claimed,
        }
    }

    pub fn root(&self) -> [u8; 32] {
        self.verifier.root()
    }

    pub fn verifier(&self) -> &CommitmentVerifier<H> {
        &self.verifier
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Ledger access for refilling the pool without losing the claimed-set.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn registry(&self) -> &R {
        &self.claimed
    }

    pub fn is_claimed(&self, recipient: &Pubkey) -> bool {
        self.claimed.is_claimed(recipient)
    }

    /// Pure membership check against the stored root.
    pub fn verify(&self, recipient: &Pubkey, amount: u64, proof: &[[u8; 32]]) -> bool {
        self.verifier.verify(recipient, amount, proof)
    }

    /// Pays `amount` to `recipient` if the entry is in the allow-list, the
    /// recipient signed off on it and has not claimed before.
    ///
    /// The recipient is marked claimed before the ledger is called. If the
    /// transfer fails the mark is undone and `TransferFailed` is returned.
    pub fn claim(
        &mut self,
        recipient: &Pubkey,
        amount: u64,
        proof: &[[u8; 32]],
        authorization: &ClaimAuthorization,
    ) -> ClaimResult {
        if self.claimed.is_claimed(recipient) {
            msg!("{} has already claimed", recipient);
            return Err(MerkleAirdropError::AlreadyClaimed);
        }

        let root = self.verifier.root();
        let message = claim_message(&root, recipient, amount);
        if !self
            .authorizer
            .is_authorized(recipient, &message, authorization)
        {
            msg!("Authorization by {} rejected for {}", authorization.signer, recipient);
            return Err(MerkleAirdropError::InvalidAuthorization);
        }

        if !self.verifier.verify(recipient, amount, proof) {
            return Err(MerkleAirdropError::InvalidProof);
        }

        self.claimed.mark_claimed(recipient, amount);

        if let Err(err) = self.ledger.transfer(recipient, amount) {
            msg!("Transfer of {} to {} failed: {}", amount, recipient, err);
            self.claimed.rollback_claim(recipient);
            return Err(MerkleAirdropError::TransferFailed);
        }

        msg!("Claimed {:#} tokens for {}", amount, recipient);
        emit!(TokensClaimed {
            root,
            recipient: *recipient,
            amount,
        });
        Ok(())
    }
}
