use anchor_lang::prelude::*;

pub const AIRDROP_STATE_SEED: &[u8] = b"airdrop_state";
pub const RECEIPT_SEED: &[u8] = b"receipt";

/// State for the verifier. Seeds: ["airdrop_state", token_mint, root]
#[account]
pub struct AirdropState {
    pub authority: Pubkey,
    pub token_mint: Pubkey,
    pub root: [u8; 32],
    pub is_token_2022: bool,
}

/// Claim record for one recipient. Seeds: ["receipt", airdrop_state, recipient]
///
/// Created on the first claim attempt; `claimed` only stays set if the claim
/// transaction commits.
#[account]
#[derive(Default, Debug)]
pub struct Receipt {
    pub recipient: Pubkey,
    pub amount: u64,
    pub claimed: bool,
}
