//! Call execution with commit/rollback semantics
//!
//! Each call runs against a snapshot boundary: on success its state changes
//! and events are committed together, on failure the snapshot is restored and
//! the buffered events are dropped.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::call::{Call, Receipt};
use crate::ledger::{Address, Amount, InvariantError, Ledger, LedgerError, LedgerEvent};

/// Number of receipts kept by default
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Host-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Ledger not initialized")]
    NotInitialized,
    #[error("Ledger already initialized")]
    AlreadyInitialized,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Receipts kept in history, oldest dropped first
    pub history_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Hosts a single ledger deployment
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Runtime {
    #[serde(default)]
    config: RuntimeConfig,
    /// `None` until the create call commits
    ledger: Option<Ledger>,
    /// Most recent committed calls
    history: Vec<Receipt>,
    /// Id given to the next committed call
    next_id: u64,
}

impl Runtime {
    /// Create an empty, uninitialized runtime
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.ledger.is_some()
    }

    /// Deploy the ledger with `sender` as the initial holder
    pub fn deploy(
        &mut self,
        sender: Address,
        name: &str,
        symbol: &str,
        initial_supply: Amount,
        decimals: u8,
    ) -> Result<Receipt, RuntimeError> {
        self.execute(
            sender,
            Call::Create {
                name: name.to_string(),
                symbol: symbol.to_string(),
                initial_supply,
                decimals,
            },
        )
    }

    /// Run one call atomically on behalf of `sender`
    pub fn execute(&mut self, sender: Address, call: Call) -> Result<Receipt, RuntimeError> {
        let snapshot = self.ledger.clone();
        let mut events: Vec<LedgerEvent> = Vec::new();

        match self.dispatch(sender, &call, &mut events) {
            Ok(returned) => {
                let receipt = Receipt {
                    id: self.next_id,
                    sender,
                    call,
                    returned,
                    events,
                    executed_at: Utc::now(),
                };
                self.commit(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                self.ledger = snapshot;
                log::warn!("Rolled back {} from {}: {}", call, sender, e);
                Err(e)
            }
        }
    }

    fn dispatch(
        &mut self,
        sender: Address,
        call: &Call,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<bool, RuntimeError> {
        let returned = match *call {
            Call::Create {
                ref name,
                ref symbol,
                initial_supply,
                decimals,
            } => {
                if self.ledger.is_some() {
                    return Err(RuntimeError::AlreadyInitialized);
                }
                let ledger = Ledger::create(
                    sender,
                    name.clone(),
                    symbol.clone(),
                    initial_supply,
                    decimals,
                    events,
                )?;
                self.ledger = Some(ledger);
                true
            }
            Call::Transfer { to, amount } => {
                self.ledger_mut()?.transfer(sender, to, amount, events)?
            }
            Call::TransferFrom { from, to, amount } => self
                .ledger_mut()?
                .transfer_from(sender, from, to, amount, events)?,
            Call::Approve { spender, amount } => self
                .ledger_mut()?
                .approve(sender, spender, amount, events)?,
        };

        Ok(returned)
    }

    fn ledger_mut(&mut self) -> Result<&mut Ledger, RuntimeError> {
        self.ledger.as_mut().ok_or(RuntimeError::NotInitialized)
    }

    fn commit(&mut self, receipt: Receipt) {
        log::info!(
            "Committed #{} {} from {} ({} events)",
            receipt.id,
            receipt.call,
            receipt.sender,
            receipt.events.len()
        );
        for event in &receipt.events {
            log::debug!("  {}", event);
        }

        self.next_id += 1;
        self.history.push(receipt);
        if self.history.len() > self.config.history_limit {
            let excess = self.history.len() - self.config.history_limit;
            self.history.drain(..excess);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn ledger(&self) -> Result<&Ledger, RuntimeError> {
        self.ledger.as_ref().ok_or(RuntimeError::NotInitialized)
    }

    pub fn name(&self) -> Result<&str, RuntimeError> {
        Ok(self.ledger()?.name())
    }

    pub fn symbol(&self) -> Result<&str, RuntimeError> {
        Ok(self.ledger()?.symbol())
    }

    pub fn decimals(&self) -> Result<u8, RuntimeError> {
        Ok(self.ledger()?.decimals())
    }

    pub fn total_supply(&self) -> Result<Amount, RuntimeError> {
        Ok(self.ledger()?.total_supply())
    }

    pub fn balance_of(&self, owner: &Address) -> Result<Amount, RuntimeError> {
        Ok(self.ledger()?.balance_of(owner))
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount, RuntimeError> {
        Ok(self.ledger()?.allowance(owner, spender))
    }

    /// Committed receipts, oldest first
    pub fn history(&self) -> &[Receipt] {
        &self.history
    }

    /// Number of calls committed since deployment
    pub fn committed_calls(&self) -> u64 {
        self.next_id
    }

    /// Audit the committed ledger state
    pub fn verify(&self) -> Result<(), RuntimeError> {
        self.ledger()?.check_invariants()?;
        Ok(())
    }
}
