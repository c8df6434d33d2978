//! Native-currency balances held by the host.
//!
//! Contributions move value from the contributor into the registry's escrow
//! address; finalization moves the escrow out to the campaign creator. Moves
//! are prepared against `&self` and committed with `&mut self` so a caller
//! can check every step of an operation before applying any of them.

use std::collections::HashMap;

use crate::types::{Address, Amount};
use crate::{Error, Result};

#[derive(Debug, Default, Clone)]
pub struct NativeBank {
    balances: HashMap<Address, Amount>,
}

/// A checked native move, applied with [`NativeBank::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub(crate) struct ValueTransfer {
    from: Address,
    to: Address,
    from_after: Amount,
    to_after: Amount,
}

impl NativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Add freshly issued native funds to `to`.
    pub fn credit(&mut self, to: Address, amount: Amount) -> Result<()> {
        let after = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        self.balances.insert(to, after);
        Ok(())
    }

    /// Sum of every native balance.
    pub fn total(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
    }

    pub(crate) fn prepare_transfer(
        &self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<ValueTransfer> {
        let available = self.balance_of(&from);
        let from_after = available
            .checked_sub(amount)
            .ok_or(Error::InsufficientFunds {
                needed: amount,
                available,
            })?;
        let to_before = if from == to {
            from_after
        } else {
            self.balance_of(&to)
        };
        let to_after = to_before.checked_add(amount).ok_or(Error::Overflow)?;
        Ok(ValueTransfer {
            from,
            to,
            from_after,
            to_after,
        })
    }

    pub(crate) fn commit(&mut self, transfer: ValueTransfer) {
        self.balances.insert(transfer.from, transfer.from_after);
        self.balances.insert(transfer.to, transfer.to_after);
    }
}
