use crate::*;
use anchor_lang::solana_program::sysvar::instructions as instructions_sysvar;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

#[derive(Accounts)]
#[instruction(root: [u8; 32])]
pub struct Claim<'info> {
    /// Pays for the receipt and the recipient's token account. Does not have
    /// to be the recipient.
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: bound to the claim by the recipient's ed25519 signature
    pub recipient: UncheckedAccount<'info>,

    /// CHECK: checked below
    #[account(mut)]
    pub recipient_mint_ata: UncheckedAccount<'info>,

    #[account(mint::token_program = spl_token_program)]
    pub token_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init_if_needed,
        seeds = [RECEIPT_SEED, airdrop_state.key().as_ref(), recipient.key().as_ref()],
        bump,
        space = 8 + std::mem::size_of::<Receipt>(),
        payer = payer
    )]
    pub receipt: Account<'info, Receipt>,

    #[account(
        has_one = token_mint,
        seeds = [AIRDROP_STATE_SEED, token_mint.key().as_ref(), root.as_ref()],
        bump,)]
    pub airdrop_state: Account<'info, AirdropState>,

    #[account(mut,
        token::mint = token_mint,
        token::authority = airdrop_state,
        token::token_program = spl_token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: address constraint
    #[account(address = instructions_sysvar::ID)]
    pub instructions: UncheckedAccount<'info>,

    /// The SPL token program account
    pub spl_token_program: Interface<'info, TokenInterface>,
    pub ata_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

pub fn handle_claim(
    ctx: Context<Claim>,
    root: [u8; 32],
    amount: u64,
    proof: Vec<[u8; 32]>,
    authorization: ClaimAuthorization,
) -> Result<()> {
    let accounts = ctx.accounts;
    let recipient = accounts.recipient.key();
    let token_mint_key = accounts.token_mint.key();
    let airdrop_state_key = accounts.airdrop_state.key();
    let is_token_2022 = accounts.airdrop_state.is_token_2022;

    msg!("Recipient {}", recipient);
    msg!("Amount {}", amount);
    msg!("Proof length {}", proof.len());

    if accounts.recipient_mint_ata.data_is_empty() {
        make_ata(
            accounts.recipient_mint_ata.to_account_info(),
            accounts.recipient.to_account_info(),
            accounts.token_mint.to_account_info(),
            accounts.payer.to_account_info(),
            accounts.ata_program.to_account_info(),
            accounts.spl_token_program.to_account_info(),
            accounts.system_program.to_account_info(),
        )?;
    }

    assert_is_ata(&accounts.recipient_mint_ata, &recipient, &token_mint_key, is_token_2022)?;
    assert_is_ata(
        &accounts.vault.to_account_info(),
        &airdrop_state_key,
        &token_mint_key,
        is_token_2022,
    )?;

    let bump = [ctx.bumps.airdrop_state];
    let signer_seeds: &[&[u8]] = &[AIRDROP_STATE_SEED, token_mint_key.as_ref(), root.as_ref(), &bump];

    let ledger = VaultLedger {
        vault: accounts.vault.to_account_info(),
        token_mint: accounts.token_mint.to_account_info(),
        decimals: accounts.token_mint.decimals,
        pool_authority: accounts.airdrop_state.to_account_info(),
        destination: accounts.recipient_mint_ata.to_account_info(),
        destination_owner: recipient,
        token_program: accounts.spl_token_program.to_account_info(),
        is_token_2022,
        signer_seeds,
    };
    let instructions = accounts.instructions.to_account_info();
    let authorizer = Ed25519InstructionAuthorizer::new(&instructions);
    let registry = ReceiptRegistry::new(&mut accounts.receipt);

    let mut orchestrator: ClaimOrchestrator<Keccak256, _, _, _> =
        ClaimOrchestrator::with_registry(accounts.airdrop_state.root, ledger, authorizer, registry);
    orchestrator.claim(&recipient, amount, &proof, &authorization)?;

    Ok(())
}
