use anchor_lang::prelude::*;

#[event]
pub struct TokensClaimed {
    pub root: [u8; 32],
    pub recipient: Pubkey,
    pub amount: u64,
}

#[event]
pub struct VaultWithdrawn {
    pub airdrop_state: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
}
