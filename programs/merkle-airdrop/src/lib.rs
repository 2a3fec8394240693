use anchor_lang::prelude::*;

mod authorization;
mod errors;
mod events;
mod ledger;
mod orchestrator;
mod processor;
mod state;
mod utils;
mod verifier;
#[cfg(not(target_os = "solana"))]
mod shared;
#[cfg(not(target_os = "solana"))]
mod tree;

pub use crate::authorization::*;
pub use crate::errors::*;
pub use crate::events::*;
pub use crate::ledger::*;
pub use crate::orchestrator::*;
pub use crate::processor::*;
pub use crate::state::*;
pub use crate::utils::*;
pub use crate::verifier::*;
#[cfg(not(target_os = "solana"))]
pub use crate::shared::*;
#[cfg(not(target_os = "solana"))]
pub use crate::tree::*;

declare_id!("HjHfxeQKw3MKVae6W29YLEeFkohABygiY71Zq1J6FJsd");

#[program]
pub mod merkle_airdrop {
    use super::*;

    /// Any payer may relay a claim; the funds always go to the recipient,
    /// whose ed25519 signature over the claim must precede this instruction.
    pub fn claim(
        ctx: Context<Claim>,
        root: [u8; 32],
        amount: u64,
        proof: Vec<[u8; 32]>,
        authorization: ClaimAuthorization,
    ) -> Result<()> {
        handle_claim(ctx, root, amount, proof, authorization)
    }

    pub fn init(ctx: Context<InitializeAirdropState>, root: [u8; 32], is_token_2022: bool) -> Result<()> {
        handle_init(ctx, root, is_token_2022)
    }

    pub fn withdraw_from_vault(ctx: Context<WithdrawTokensFromVault>, root: [u8; 32]) -> Result<()> {
        handle_withdraw_tokens_from_vault(ctx, root)
    }
}
