use std::sync::Arc;

use anchor_lang::prelude::Pubkey;
use parking_lot::Mutex;

use crate::{
    ClaimAuthorization, ClaimAuthorizer, ClaimOrchestrator, ClaimRegistry, ClaimResult,
    MerkleHasher, ValueLedger,
};

/// Orchestrator handle for hosts that accept claims from several threads.
///
/// Every claim runs under one lock, so claims are applied in a single total
/// order and each one observes all earlier commits.
pub struct SharedClaimOrchestrator<H, L, A, R> {
    inner: Arc<Mutex<ClaimOrchestrator<H, L, A, R>>>,
}

impl<H, L, A, R> Clone for SharedClaimOrchestrator<H, L, A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H, L, A, R> SharedClaimOrchestrator<H, L, A, R>
where
    H: MerkleHasher,
    L: ValueLedger,
    A: ClaimAuthorizer,
    R: ClaimRegistry,
{
    pub fn new(orchestrator: ClaimOrchestrator<H, L, A, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    pub fn claim(
        &self,
        recipient: &Pubkey,
        amount: u64,
        proof: &[[u8; 32]],
        authorization: &ClaimAuthorization,
    ) -> ClaimResult {
        self.inner
            .lock()
            .claim(recipient, amount, proof, authorization)
    }

    pub fn is_claimed(&self, recipient: &Pubkey) -> bool {
        self.inner.lock().is_claimed(recipient)
    }

    pub fn balance_of(&self, holder: &Pubkey) -> u64 {
        self.inner.lock().ledger().balance_of(holder)
    }
}
