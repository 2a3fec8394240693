use anchor_lang::{
    prelude::*,
    solana_program::{program::invoke_signed, program_memory::sol_memcmp, pubkey::PUBKEY_BYTES},
};
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use spl_token_2022::extension::StateWithExtensions;

use crate::MerkleAirdropError;

pub fn token_program_id(is_token_2022: bool) -> Pubkey {
    if is_token_2022 {
        spl_token_2022::id()
    } else {
        spl_token::id()
    }
}

/// Checks that `ata` is the associated token account of (`wallet`, `mint`)
/// under the selected token program and, once it exists, that it is owned by
/// that program and holds `mint` for `wallet`.
pub fn assert_is_ata(
    ata: &AccountInfo,
    wallet: &Pubkey,
    mint: &Pubkey,
    is_token_2022: bool,
) -> Result<()> {
    let token_program = token_program_id(is_token_2022);

    assert_keys_equal(
        get_associated_token_address_with_program_id(wallet, mint, &token_program),
        *ata.key,
    )?;

    if !ata.data_is_empty() {
        assert_owned_by(ata, &token_program)?;
        let data = ata.try_borrow_data()?;
        let account = StateWithExtensions::<spl_token_2022::state::Account>::unpack(&data)
            .map_err(|_| error!(MerkleAirdropError::UninitializedAccount))?;
        assert_keys_equal(account.base.owner, *wallet)?;
        assert_keys_equal(account.base.mint, *mint)?;
    }

    Ok(())
}

pub fn assert_owned_by(account: &AccountInfo, owner: &Pubkey) -> Result<()> {
    if account.owner != owner {
        msg!("Wrong account owner: {} should be {}", account.owner, owner);
        return Err(MerkleAirdropError::WrongAccountOwner.into());
    }
    Ok(())
}

pub fn assert_keys_equal(key1: Pubkey, key2: Pubkey) -> Result<()> {
    if sol_memcmp(key1.as_ref(), key2.as_ref(), PUBKEY_BYTES) != 0 {
        msg!("Wrong public key: {} should be {}", key1, key2);
        return err!(MerkleAirdropError::PublicKeyMismatch);
    }
    Ok(())
}

/// Creates the associated token account of `wallet` for `mint`, paid by
/// `fee_payer`.
pub fn make_ata<'a>(
    ata: AccountInfo<'a>,
    wallet: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    fee_payer: AccountInfo<'a>,
    ata_program: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    system_program: AccountInfo<'a>,
) -> Result<()> {
    invoke_signed(
        &spl_associated_token_account::instruction::create_associated_token_account(
            fee_payer.key,
            wallet.key,
            mint.key,
            token_program.key,
        ),
        &[
            ata,
            wallet,
            mint,
            fee_payer,
            ata_program,
            system_program,
            token_program,
        ],
        &[],
    )?;

    Ok(())
}
