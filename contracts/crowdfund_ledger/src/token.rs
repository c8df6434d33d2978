//! # Reward Token
//!
//! The RNT balance book. Invariant: the sum of all balances equals
//! [`RewardToken::total_supply`] after every operation.
//!
//! Minting is gated on a single `minter` identity. The gate is a plain field
//! checked on every privileged call; [`RewardToken::transfer_ownership`] hands
//! it to exactly one new holder and the previous minter loses it for good.

use std::collections::HashMap;

use crate::events::{EventLog, LedgerEvent};
use crate::types::{Address, Amount, DECIMALS, TOKEN_NAME, TOKEN_SYMBOL, UNIT};
use crate::{Error, Result};

#[derive(Debug)]
pub struct RewardToken {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
    minter: Address,
}

/// A checked mint, applied with [`RewardToken::commit_mint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub(crate) struct Mint {
    to: Address,
    amount: Amount,
    balance_after: Amount,
    supply_after: Amount,
}

impl RewardToken {
    /// Deploy the token, crediting `whole_tokens` (scaled by [`UNIT`]) to
    /// `deployer`, who also becomes the minter.
    pub fn new(deployer: Address, whole_tokens: Amount, log: &mut EventLog) -> Result<Self> {
        let supply = whole_tokens.checked_mul(UNIT).ok_or(Error::Overflow)?;
        let mut token = Self {
            balances: HashMap::new(),
            total_supply: 0,
            minter: deployer,
        };
        token.mint(deployer, deployer, supply, log)?;
        Ok(token)
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// The identity currently allowed to mint.
    pub fn minter(&self) -> Address {
        self.minter
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Every holder with a recorded balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, Amount)> + '_ {
        self.balances.iter().map(|(holder, amount)| (holder, *amount))
    }

    /// Move `amount` from `caller` to `to`.
    ///
    /// A self-transfer succeeds, keeps the balance and still emits the event.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        log: &mut EventLog,
    ) -> Result<()> {
        let available = self.balance_of(&caller);
        let from_after = available
            .checked_sub(amount)
            .ok_or(Error::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let to_before = if caller == to {
            from_after
        } else {
            self.balance_of(&to)
        };
        let to_after = to_before.checked_add(amount).ok_or(Error::Overflow)?;

        self.balances.insert(caller, from_after);
        self.balances.insert(to, to_after);

        log.emit(LedgerEvent::Transfer {
            from: caller,
            to,
            amount,
        });
        Ok(())
    }

    /// Hand the minter role to `new_minter`.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_minter: Address,
        log: &mut EventLog,
    ) -> Result<()> {
        self.require_minter(caller)?;
        self.minter = new_minter;
        log.emit(LedgerEvent::OwnershipTransferred {
            previous: caller,
            new: new_minter,
        });
        Ok(())
    }

    /// Create `amount` new units for `to`. Only the minter may call this.
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        log: &mut EventLog,
    ) -> Result<()> {
        let mint = self.prepare_mint(caller, to, amount)?;
        self.commit_mint(mint, log);
        Ok(())
    }

    pub(crate) fn prepare_mint(&self, caller: Address, to: Address, amount: Amount) -> Result<Mint> {
        self.require_minter(caller)?;
        let supply_after = self
            .total_supply
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        // Bounded by supply_after, cannot overflow once the supply check passed.
        let balance_after = self.balance_of(&to) + amount;
        Ok(Mint {
            to,
            amount,
            balance_after,
            supply_after,
        })
    }

    pub(crate) fn commit_mint(&mut self, mint: Mint, log: &mut EventLog) {
        self.balances.insert(mint.to, mint.balance_after);
        self.total_supply = mint.supply_after;
        log.emit(LedgerEvent::Transfer {
            from: Address::ZERO,
            to: mint.to,
            amount: mint.amount,
        });
    }

    fn require_minter(&self, caller: Address) -> Result<()> {
        if caller != self.minter {
            return Err(Error::Unauthorized(caller));
        }
        Ok(())
    }
}
