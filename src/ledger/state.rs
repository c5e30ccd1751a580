//! Balance and allowance tables
//!
//! Both tables are sparse: a missing entry reads as zero and is created on
//! first write. This module does not enforce token protocol rules (approval
//! checks, self-transfer rejection); [`crate::ledger::Ledger`] does that
//! before touching state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::address::{Address, Amount};
use super::error::InvariantError;

/// The mutable part of the ledger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Balances: account -> amount
    balances: HashMap<Address, Amount>,
    /// Allowances: owner -> (spender -> amount)
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    /// Sum of all balances
    total_supply: Amount,
}

impl LedgerState {
    /// Create empty state with zero supply
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of an account, zero when absent
    pub fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Mutable balance slot, inserted as zero on first access
    pub(crate) fn balance_mut(&mut self, account: Address) -> &mut Amount {
        self.balances.entry(account).or_insert(0)
    }

    /// Allowance from `owner` to `spender`, zero when either level is absent
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Mutable allowance slot. Creates the owner's inner map on first approval.
    pub(crate) fn allowance_mut(&mut self, owner: Address, spender: Address) -> &mut Amount {
        self.allowances
            .entry(owner)
            .or_default()
            .entry(spender)
            .or_insert(0)
    }

    pub(crate) fn set_total_supply(&mut self, supply: Amount) {
        self.total_supply = supply;
    }

    /// Accounts holding a non-zero balance
    pub fn holders(&self) -> Vec<(&Address, &Amount)> {
        self.balances.iter().filter(|(_, &b)| b > 0).collect()
    }

    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    /// Recompute the conservation invariant over every stored balance.
    ///
    /// Non-negativity holds by construction of [`Amount`].
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut balance_sum: Amount = 0;
        for (account, balance) in &self.balances {
            balance_sum = balance_sum
                .checked_add(*balance)
                .ok_or(InvariantError::SumOverflow(*account))?;
        }

        if balance_sum != self.total_supply {
            return Err(InvariantError::BalanceSupplyMismatch {
                supply: self.total_supply,
                balance_sum,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_missing_entries_read_as_zero() {
        let state = LedgerState::new();

        assert_eq!(state.balance(&addr(1)), 0);
        assert_eq!(state.allowance(&addr(1), &addr(2)), 0);
        assert_eq!(state.total_supply(), 0);
        assert_eq!(state.holder_count(), 0);
    }

    #[test]
    fn test_explicit_zero_equals_absent() {
        let mut absent = LedgerState::new();
        let mut explicit = LedgerState::new();
        *explicit.balance_mut(addr(1)) = 0;

        assert_eq!(absent.balance(&addr(1)), explicit.balance(&addr(1)));
        assert_eq!(explicit.holder_count(), 0);
        assert!(explicit.check_invariants().is_ok());

        *absent.balance_mut(addr(1)) += 5;
        assert_eq!(absent.balance(&addr(1)), 5);
    }

    #[test]
    fn test_allowance_inner_map_created_on_write() {
        let mut state = LedgerState::new();
        *state.allowance_mut(addr(1), addr(2)) = 30;

        assert_eq!(state.allowance(&addr(1), &addr(2)), 30);
        // Other spenders for the same owner stay zero
        assert_eq!(state.allowance(&addr(1), &addr(3)), 0);
        // The reverse direction is a different entry
        assert_eq!(state.allowance(&addr(2), &addr(1)), 0);
    }

    #[test]
    fn test_invariant_mismatch_detected() {
        let mut state = LedgerState::new();
        *state.balance_mut(addr(1)) = 10;

        assert_eq!(
            state.check_invariants(),
            Err(InvariantError::BalanceSupplyMismatch {
                supply: 0,
                balance_sum: 10
            })
        );

        state.set_total_supply(10);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_invariant_sum_overflow_detected() {
        let mut state = LedgerState::new();
        *state.balance_mut(addr(1)) = Amount::MAX;
        *state.balance_mut(addr(2)) = 1;

        assert!(matches!(
            state.check_invariants(),
            Err(InvariantError::SumOverflow(_))
        ));
    }

    #[test]
    fn test_holders_skip_zero_balances() {
        let mut state = LedgerState::new();
        *state.balance_mut(addr(1)) = 10;
        *state.balance_mut(addr(2)) = 0;

        let holders = state.holders();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0], (&addr(1), &10));
    }
}
