use anchor_lang::{prelude::*, solana_program::program::invoke_signed};
use anchor_spl::token_interface::TokenAccount;

use crate::MerkleAirdropError;

/// Pooled balance the airdrop pays out of.
pub trait ValueLedger {
    /// Moves `amount` from the pool to `to`. Must fail without moving
    /// anything when the pool is short.
    fn transfer(&mut self, to: &Pubkey, amount: u64) -> Result<()>;

    fn balance_of(&self, holder: &Pubkey) -> u64;
}

/// Amount held by a token account, or zero if it does not exist yet.
pub fn token_amount(account: &AccountInfo) -> u64 {
    if account.data_is_empty() {
        return 0;
    }
    match account.try_borrow_data() {
        Ok(data) => TokenAccount::try_deserialize(&mut &data[..])
            .map(|token_account| token_account.amount)
            .unwrap_or(0),
        Err(_) => 0,
    }
}

/// SPL token vault owned by the airdrop state PDA, paying into a single
/// destination token account per instruction.
pub struct VaultLedger<'a, 'info> {
    pub vault: AccountInfo<'info>,
    pub token_mint: AccountInfo<'info>,
    pub decimals: u8,
    /// PDA that owns the vault and signs the transfer.
    pub pool_authority: AccountInfo<'info>,
    pub destination: AccountInfo<'info>,
    pub destination_owner: Pubkey,
    pub token_program: AccountInfo<'info>,
    pub is_token_2022: bool,
    pub signer_seeds: &'a [&'a [u8]],
}

impl<'a, 'info> ValueLedger for VaultLedger<'a, 'info> {
    fn transfer(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        if *to != self.destination_owner {
            msg!("Transfer target {} is not the destination owner {}", to, self.destination_owner);
            return err!(MerkleAirdropError::PublicKeyMismatch);
        }

        // A failing token CPI aborts the whole transaction, so check first to
        // report a typed error.
        let available = token_amount(&self.vault);
        if available < amount {
            msg!("Vault holds {} tokens, {} requested", available, amount);
            return err!(MerkleAirdropError::InsufficientPoolBalance);
        }

        let transfer_ix = if self.is_token_2022 {
            spl_token_2022::instruction::transfer_checked(
                self.token_program.key,
                self.vault.key,
                self.token_mint.key,
                self.destination.key,
                self.pool_authority.key,
                &[],
                amount,
                self.decimals,
            )?
        } else {
            spl_token::instruction::transfer(
                self.token_program.key,
                self.vault.key,
                self.destination.key,
                self.pool_authority.key,
                &[],
                amount,
            )?
        };

        let mut invoke_args = vec![
            self.destination.clone(),
            self.vault.clone(),
            self.token_program.clone(),
            self.pool_authority.clone(),
        ];
        if self.is_token_2022 {
            invoke_args.push(self.token_mint.clone());
        }

        invoke_signed(&transfer_ix, &invoke_args, &[self.signer_seeds])?;
        Ok(())
    }

    fn balance_of(&self, holder: &Pubkey) -> u64 {
        if holder == self.pool_authority.key {
            token_amount(&self.vault)
        } else if *holder == self.destination_owner {
            token_amount(&self.destination)
        } else {
            0
        }
    }
}

#[cfg(not(target_os = "solana"))]
pub use self::host::InMemoryLedger;

#[cfg(not(target_os = "solana"))]
mod host {
    use std::collections::BTreeMap;

    use anchor_lang::prelude::*;

    use super::ValueLedger;
    use crate::MerkleAirdropError;

    #[derive(Clone, Debug, Default)]
    pub struct InMemoryLedger {
        pool: Pubkey,
        balances: BTreeMap<Pubkey, u64>,
    }

    impl InMemoryLedger {
        pub fn new(pool: Pubkey, funded: u64) -> Self {
            let mut balances = BTreeMap::new();
            balances.insert(pool, funded);
            Self { pool, balances }
        }

        pub fn pool(&self) -> Pubkey {
            self.pool
        }

        pub fn fund(&mut self, amount: u64) -> Result<()> {
            let balance = self.balances.entry(self.pool).or_default();
            *balance = balance
                .checked_add(amount)
                .ok_or(MerkleAirdropError::NumericalOverflow)?;
            Ok(())
        }
    }

    impl ValueLedger for InMemoryLedger {
        fn transfer(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
            let available = self.balance_of(&self.pool);
            if available < amount {
                return err!(MerkleAirdropError::InsufficientPoolBalance);
            }
            if *to == self.pool {
                return Ok(());
            }
            let credited = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(MerkleAirdropError::NumericalOverflow)?;

            self.balances.insert(self.pool, available - amount);
            *self.balances.entry(*to).or_default() = credited;
            Ok(())
        }

        fn balance_of(&self, holder: &Pubkey) -> u64 {
            self.balances.get(holder).copied().unwrap_or(0)
        }
    }
}
