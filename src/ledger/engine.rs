//! Ledger engine
//!
//! Implements mint, transfer, delegated transfer and approval on top of
//! [`LedgerState`].
//!
//! # Atomicity
//!
//! Every operation resolves all of its fallible checks (balance, allowance,
//! overflow) before its first write. An `Err` therefore leaves the ledger
//! exactly as it was and emits no events. Hosts that wrap several operations
//! into one call are still responsible for their own rollback, see
//! [`crate::runtime::Runtime`].

use serde::{Deserialize, Serialize};

use super::address::{Address, Amount};
use super::error::{InvariantError, LedgerError, LedgerResult};
use super::events::{EventSink, LedgerEvent};
use super::state::LedgerState;

/// Longest accepted token name
pub const MAX_NAME_LENGTH: usize = 50;
/// Longest accepted token symbol
pub const MAX_SYMBOL_LENGTH: usize = 10;
/// Largest accepted number of decimal places
pub const MAX_DECIMALS: u8 = 18;

/// Token metadata (immutable after creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Token name (e.g., "My Token")
    pub name: String,
    /// Token symbol (e.g., "MTK")
    pub symbol: String,
    /// Decimal places (usually 18)
    pub decimals: u8,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(name: String, symbol: String, decimals: u8) -> LedgerResult<Self> {
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(LedgerError::InvalidArgument(format!(
                "name must be 1-{} characters",
                MAX_NAME_LENGTH
            )));
        }

        if symbol.is_empty() || symbol.chars().count() > MAX_SYMBOL_LENGTH {
            return Err(LedgerError::InvalidArgument(format!(
                "symbol must be 1-{} characters",
                MAX_SYMBOL_LENGTH
            )));
        }

        if decimals > MAX_DECIMALS {
            return Err(LedgerError::InvalidArgument(format!(
                "decimals must be 0-{}",
                MAX_DECIMALS
            )));
        }

        Ok(Self {
            name,
            symbol,
            decimals,
        })
    }
}

/// Balance movement resolved ahead of any write
struct PlannedMove {
    from: Address,
    to: Address,
    amount: Amount,
    /// New `(from, to)` balances, `None` when both sides are the same account
    balances: Option<(Amount, Amount)>,
}

/// A single fungible-token ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    metadata: TokenMetadata,
    state: LedgerState,
}

impl Ledger {
    /// Deploy a ledger, minting `initial_supply` to `deployer`.
    ///
    /// Emits one issuance `Transfer` from [`Address::NULL`].
    pub fn create<E: EventSink>(
        deployer: Address,
        name: String,
        symbol: String,
        initial_supply: Amount,
        decimals: u8,
        events: &mut E,
    ) -> LedgerResult<Self> {
        if deployer.is_null() {
            return Err(LedgerError::InvalidArgument(
                "deployer cannot be the null address".to_string(),
            ));
        }

        let metadata = TokenMetadata::new(name, symbol, decimals)?;
        let mut ledger = Self {
            metadata,
            state: LedgerState::new(),
        };
        ledger.mint(deployer, initial_supply, events)?;

        log::debug!(
            "Ledger {} ({}) created with supply {} for {}",
            ledger.name(),
            ledger.symbol(),
            initial_supply,
            deployer
        );

        Ok(ledger)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn total_supply(&self) -> Amount {
        self.state.total_supply()
    }

    /// Get balance of an account, zero if it never held tokens
    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.state.balance(owner)
    }

    /// Get the amount `spender` may still move out of `owner`'s balance
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.allowance(owner, spender)
    }

    /// Get all holders with balances
    pub fn holders(&self) -> Vec<(&Address, &Amount)> {
        self.state.holders()
    }

    pub fn holder_count(&self) -> usize {
        self.state.holder_count()
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Audit the committed state
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.state.check_invariants()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Move `amount` from `sender` to `to`
    pub fn transfer<E: EventSink>(
        &mut self,
        sender: Address,
        to: Address,
        amount: Amount,
        events: &mut E,
    ) -> LedgerResult<bool> {
        reject_self_transfer(sender, to)?;

        let planned = self.plan_move(sender, to, amount)?;
        self.apply_move(planned, events);

        Ok(true)
    }

    /// Move `amount` from `from` to `to` on `from`'s behalf, consuming
    /// `sender`'s allowance
    pub fn transfer_from<E: EventSink>(
        &mut self,
        sender: Address,
        from: Address,
        to: Address,
        amount: Amount,
        events: &mut E,
    ) -> LedgerResult<bool> {
        reject_self_transfer(sender, to)?;

        let allowance = self.state.allowance(&from, &sender);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(LedgerError::LimitExceeded {
                allowance,
                need: amount,
            })?;
        let planned = self.plan_move(from, to, amount)?;

        *self.state.allowance_mut(from, sender) = remaining;
        self.apply_move(planned, events);

        Ok(true)
    }

    /// Set `sender`'s allowance for `spender` to exactly `amount`.
    /// Re-approving overwrites; it never accumulates.
    pub fn approve<E: EventSink>(
        &mut self,
        sender: Address,
        spender: Address,
        amount: Amount,
        events: &mut E,
    ) -> LedgerResult<bool> {
        *self.state.allowance_mut(sender, spender) = amount;

        events.emit(LedgerEvent::Approval {
            owner: sender,
            spender,
            value: amount,
        });

        Ok(true)
    }

    /// Issue new supply to `account`. Only reachable through [`Ledger::create`].
    fn mint<E: EventSink>(
        &mut self,
        account: Address,
        amount: Amount,
        events: &mut E,
    ) -> LedgerResult<()> {
        let supply = self
            .state
            .total_supply()
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let balance = self
            .state
            .balance(&account)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.state.set_total_supply(supply);
        *self.state.balance_mut(account) = balance;

        events.emit(LedgerEvent::Transfer {
            from: Address::NULL,
            to: account,
            value: amount,
        });

        Ok(())
    }

    /// Resolve a balance movement without writing anything
    fn plan_move(&self, from: Address, to: Address, amount: Amount) -> LedgerResult<PlannedMove> {
        let from_balance = self.state.balance(&from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                have: from_balance,
                need: amount,
            })?;

        let balances = if from == to {
            None
        } else {
            let new_to = self
                .state
                .balance(&to)
                .checked_add(amount)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            Some((new_from, new_to))
        };

        Ok(PlannedMove {
            from,
            to,
            amount,
            balances,
        })
    }

    fn apply_move<E: EventSink>(&mut self, planned: PlannedMove, events: &mut E) {
        if let Some((new_from, new_to)) = planned.balances {
            *self.state.balance_mut(planned.from) = new_from;
            *self.state.balance_mut(planned.to) = new_to;
        }

        events.emit(LedgerEvent::Transfer {
            from: planned.from,
            to: planned.to,
            value: planned.amount,
        });
    }
}

fn reject_self_transfer(sender: Address, to: Address) -> LedgerResult<()> {
    if sender == to {
        return Err(LedgerError::InvalidArgument(
            "cannot transfer to self".to_string(),
        ));
    }
    Ok(())
}
