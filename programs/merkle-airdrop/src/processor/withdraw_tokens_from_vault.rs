use crate::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

#[derive(Accounts)]
#[instruction(root: [u8; 32])]
pub struct WithdrawTokensFromVault<'info> {
    /// Airdrop State Authority
    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: checked below
    #[account(mut)]
    pub authority_mint_ata: UncheckedAccount<'info>,

    #[account(mint::token_program = spl_token_program)]
    pub token_mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        close = authority,
        has_one = token_mint,
        has_one = authority,
        seeds = [AIRDROP_STATE_SEED, token_mint.key().as_ref(), root.as_ref()],
        bump,)]
    pub airdrop_state: Account<'info, AirdropState>,

    #[account(mut,
        token::mint = token_mint,
        token::authority = airdrop_state,
        token::token_program = spl_token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// The SPL token program account
    pub spl_token_program: Interface<'info, TokenInterface>,
    pub ata_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

/// Sweeps whatever the pool still holds to the authority and closes the
/// airdrop state. Unclaimed allocations can no longer be claimed afterwards.
pub fn handle_withdraw_tokens_from_vault(ctx: Context<WithdrawTokensFromVault>, root: [u8; 32]) -> Result<()> {
    let accounts = ctx.accounts;
    let authority = accounts.authority.key();
    let token_mint_key = accounts.token_mint.key();
    let airdrop_state_key = accounts.airdrop_state.key();
    let is_token_2022 = accounts.airdrop_state.is_token_2022;

    if accounts.authority_mint_ata.data_is_empty() {
        make_ata(
            accounts.authority_mint_ata.to_account_info(),
            accounts.authority.to_account_info(),
            accounts.token_mint.to_account_info(),
            accounts.authority.to_account_info(),
            accounts.ata_program.to_account_info(),
            accounts.spl_token_program.to_account_info(),
            accounts.system_program.to_account_info(),
        )?;
    }

    assert_is_ata(&accounts.authority_mint_ata, &authority, &token_mint_key, is_token_2022)?;
    assert_is_ata(
        &accounts.vault.to_account_info(),
        &airdrop_state_key,
        &token_mint_key,
        is_token_2022,
    )?;

    let bump = [ctx.bumps.airdrop_state];
    let signer_seeds: &[&[u8]] = &[AIRDROP_STATE_SEED, token_mint_key.as_ref(), root.as_ref(), &bump];

    let mut ledger = VaultLedger {
        vault: accounts.vault.to_account_info(),
        token_mint: accounts.token_mint.to_account_info(),
        decimals: accounts.token_mint.decimals,
        pool_authority: accounts.airdrop_state.to_account_info(),
        destination: accounts.authority_mint_ata.to_account_info(),
        destination_owner: authority,
        token_program: accounts.spl_token_program.to_account_info(),
        is_token_2022,
        signer_seeds,
    };

    let amount = ledger.balance_of(&airdrop_state_key);
    msg!("Withdrawing {:#} tokens", amount);
    if amount > 0 {
        ledger.transfer(&authority, amount)?;
    }

    emit!(VaultWithdrawn {
        airdrop_state: airdrop_state_key,
        authority,
        amount,
    });
    Ok(())
}
