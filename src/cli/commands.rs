//! CLI commands for the ledger
//!
//! Implements all command handlers for the CLI interface. Mutating commands
//! go through [`Runtime::execute`] and are persisted only when they commit.

use crate::crypto::KeyPair;
use crate::ledger::{Address, Amount, LedgerEvent};
use crate::runtime::{Call, Receipt, Runtime, RuntimeConfig, RuntimeError};
use crate::storage::{Storage, StorageConfig};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub runtime: Runtime,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the deployed ledger from the data directory
    pub fn load(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(storage_config(&data_dir))?;

        if !storage.exists() {
            return Err(format!(
                "no ledger found at {:?}, deploy one with: token-ledger init",
                data_dir
            )
            .into());
        }

        let runtime = storage.load()?;

        Ok(Self {
            runtime,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.runtime)?;
        Ok(())
    }

    /// Execute a call and persist the result only if it commits
    pub fn execute(&mut self, sender: Address, call: Call) -> CliResult<Receipt> {
        match self.runtime.execute(sender, call) {
            Ok(receipt) => {
                self.save()?;
                Ok(receipt)
            }
            Err(e) => {
                println!("❌ Call rejected: {}", e);
                println!("   No state was changed.");
                Err(e.into())
            }
        }
    }
}

fn storage_config(data_dir: &Path) -> StorageConfig {
    StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

/// Render an amount using the token's decimal places
pub fn format_amount(amount: Amount, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let digits = format!("{:0>width$}", amount, width = decimals as usize + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals as usize);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Resolve the calling account from its hex private key
fn signer(private_key: &str) -> CliResult<KeyPair> {
    Ok(KeyPair::from_private_key_hex(private_key)?)
}

fn print_events(events: &[LedgerEvent]) {
    for event in events {
        println!("   └─ {}", event);
    }
}

/// Deploy a new ledger
pub fn cmd_init(
    data_dir: &Path,
    private_key: &str,
    name: &str,
    symbol: &str,
    supply: Amount,
    decimals: u8,
) -> CliResult<()> {
    let from = signer(private_key)?.address();
    let storage = Storage::new(storage_config(data_dir))?;

    if storage.exists() {
        println!("⚠️  Ledger already exists at {:?}", data_dir);
        println!("   A ledger can only be deployed once per data directory.");
        return Err(RuntimeError::AlreadyInitialized.into());
    }

    let mut runtime = Runtime::new(RuntimeConfig::default());
    let receipt = runtime.deploy(from, name, symbol, supply, decimals)?;
    storage.save(&runtime)?;

    println!("✅ Ledger deployed!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🪙 Token: {} ({})", name, symbol);
    println!("   🔢 Decimals: {}", decimals);
    println!(
        "   💰 Initial supply: {} minted to {}",
        format_amount(supply, decimals),
        from
    );
    print_events(&receipt.events);

    Ok(())
}

/// Generate a new account identity
pub fn cmd_account_new() -> CliResult<()> {
    let key_pair = KeyPair::generate();

    println!("🔐 New account created!");
    println!("   📍 Address: {}", key_pair.address());
    println!("   🔑 Public Key: {}", key_pair.public_key_hex());
    println!("   🗝️  Private Key: {}", key_pair.private_key_hex());
    println!("\n   ⚠️  IMPORTANT: The private key is not stored anywhere.");
    println!("   Pass it with --key to move tokens or grant allowances from this address.");

    Ok(())
}

/// Transfer tokens
pub fn cmd_transfer(
    state: &mut AppState,
    private_key: &str,
    to: Address,
    amount: Amount,
) -> CliResult<()> {
    let from = signer(private_key)?.address();
    let receipt = state.execute(from, Call::Transfer { to, amount })?;
    let decimals = state.runtime.decimals()?;

    println!("📤 Transfer committed (#{})", receipt.id);
    println!("   From: {}", from);
    println!("   To: {}", to);
    println!("   Amount: {}", format_amount(amount, decimals));
    print_events(&receipt.events);

    Ok(())
}

/// Approve a spender
pub fn cmd_approve(
    state: &mut AppState,
    private_key: &str,
    spender: Address,
    amount: Amount,
) -> CliResult<()> {
    let from = signer(private_key)?.address();
    let receipt = state.execute(from, Call::Approve { spender, amount })?;
    let decimals = state.runtime.decimals()?;

    println!("✍️  Approval committed (#{})", receipt.id);
    println!("   Owner: {}", from);
    println!("   Spender: {}", spender);
    println!("   Allowance: {}", format_amount(amount, decimals));
    print_events(&receipt.events);

    Ok(())
}

/// Delegated transfer by a spender
pub fn cmd_transfer_from(
    state: &mut AppState,
    private_key: &str,
    owner: Address,
    to: Address,
    amount: Amount,
) -> CliResult<()> {
    let spender = signer(private_key)?.address();
    let receipt = state.execute(
        spender,
        Call::TransferFrom {
            from: owner,
            to,
            amount,
        },
    )?;
    let decimals = state.runtime.decimals()?;
    let remaining = state.runtime.allowance(&owner, &spender)?;

    println!("📤 Delegated transfer committed (#{})", receipt.id);
    println!("   Spender: {}", spender);
    println!("   From: {}", owner);
    println!("   To: {}", to);
    println!("   Amount: {}", format_amount(amount, decimals));
    println!("   Remaining allowance: {}", format_amount(remaining, decimals));
    print_events(&receipt.events);

    Ok(())
}

/// Show an account balance
pub fn cmd_balance(state: &AppState, address: &Address) -> CliResult<()> {
    let ledger = state.runtime.ledger()?;
    let balance = ledger.balance_of(address);

    println!("💰 Balance for {}", address);
    println!(
        "   {} {} ({} base units)",
        format_amount(balance, ledger.decimals()),
        ledger.symbol(),
        balance
    );

    Ok(())
}

/// Show an allowance
pub fn cmd_allowance(state: &AppState, owner: &Address, spender: &Address) -> CliResult<()> {
    let ledger = state.runtime.ledger()?;
    let allowance = ledger.allowance(owner, spender);

    println!("✍️  Allowance");
    println!("   ├─ Owner: {}", owner);
    println!("   ├─ Spender: {}", spender);
    println!(
        "   └─ Remaining: {} {}",
        format_amount(allowance, ledger.decimals()),
        ledger.symbol()
    );

    Ok(())
}

/// Display ledger info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let ledger = state.runtime.ledger()?;
    let stats = state.storage.stats()?;

    println!("🪙 Ledger Info");
    println!("   ├─ Name: {}", ledger.name());
    println!("   ├─ Symbol: {}", ledger.symbol());
    println!("   ├─ Decimals: {}", ledger.decimals());
    println!(
        "   ├─ Total supply: {}",
        format_amount(ledger.total_supply(), ledger.decimals())
    );
    println!("   ├─ Holders: {}", ledger.holder_count());
    println!("   ├─ Committed calls: {}", state.runtime.committed_calls());
    println!("   ├─ File size: {} bytes", stats.file_size);
    println!("   └─ Backups: {}", stats.backup_count);

    Ok(())
}

/// List holders by balance
pub fn cmd_holders(state: &AppState) -> CliResult<()> {
    let ledger = state.runtime.ledger()?;
    let mut holders = ledger.holders();

    if holders.is_empty() {
        println!("📭 No holders.");
        return Ok(());
    }

    holders.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("📋 Holders ({}):", holders.len());
    for (address, balance) in holders {
        println!(
            "   {} - {} {}",
            address,
            format_amount(*balance, ledger.decimals()),
            ledger.symbol()
        );
    }

    Ok(())
}

/// List recent committed calls
pub fn cmd_history(state: &AppState, count: usize) -> CliResult<()> {
    let history = state.runtime.history();
    let start = history.len().saturating_sub(count);

    println!("🧾 Recent calls:");
    for receipt in history[start..].iter().rev() {
        println!(
            "   #{} | {} | {} | {}",
            receipt.id,
            receipt.executed_at.format("%Y-%m-%d %H:%M:%S"),
            receipt.sender,
            receipt.call
        );
        print_events(&receipt.events);
    }

    Ok(())
}

/// Audit the ledger invariants
pub fn cmd_verify(state: &AppState) -> CliResult<()> {
    println!("🔍 Verifying ledger...");

    match state.runtime.verify() {
        Ok(()) => {
            let ledger = state.runtime.ledger()?;
            println!("✅ Ledger is consistent!");
            println!(
                "   Total supply {} equals the sum of {} balances",
                ledger.total_supply(),
                ledger.holder_count()
            );
        }
        Err(e) => {
            println!("❌ Ledger verification FAILED!");
            println!("   {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> (KeyPair, String) {
        let key_pair = KeyPair::generate();
        let private_key = key_pair.private_key_hex();
        (key_pair, private_key)
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0, 0), "0");
        assert_eq!(format_amount(1234, 0), "1234");
        assert_eq!(format_amount(1_500_000, 6), "1.5");
        assert_eq!(format_amount(1_000_000, 6), "1");
        assert_eq!(format_amount(5, 3), "0.005");
        assert_eq!(format_amount(0, 18), "0");
        assert_eq!(
            format_amount(u128::MAX, 18),
            "340282366920938463463.374607431768211455"
        );
    }

    #[test]
    fn test_init_then_transfer_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();
        let (alice, alice_key) = account();
        let (bob, _) = account();

        cmd_init(&data_dir, &alice_key, "Test Token", "TST", 1000, 0).unwrap();

        let mut state = AppState::load(data_dir.clone()).unwrap();
        cmd_transfer(&mut state, &alice_key, bob.address(), 300).unwrap();

        let reloaded = AppState::load(data_dir).unwrap();
        assert_eq!(reloaded.runtime.balance_of(&alice.address()).unwrap(), 700);
        assert_eq!(reloaded.runtime.balance_of(&bob.address()).unwrap(), 300);
    }

    #[test]
    fn test_sender_is_derived_from_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();
        let (alice, alice_key) = account();
        let (bob, bob_key) = account();
        let (carol, _) = account();

        cmd_init(&data_dir, &alice_key, "Test Token", "TST", 1000, 0).unwrap();
        let mut state = AppState::load(data_dir.clone()).unwrap();

        // Bob holds nothing, so a transfer signed by his key is rejected
        assert!(cmd_transfer(&mut state, &bob_key, carol.address(), 1).is_err());
        // Malformed keys never reach the ledger
        assert!(cmd_transfer(&mut state, "not a key", carol.address(), 1).is_err());

        cmd_approve(&mut state, &alice_key, bob.address(), 50).unwrap();
        cmd_transfer_from(&mut state, &bob_key, alice.address(), carol.address(), 20).unwrap();

        let reloaded = AppState::load(data_dir).unwrap();
        assert_eq!(reloaded.runtime.balance_of(&alice.address()).unwrap(), 980);
        assert_eq!(reloaded.runtime.balance_of(&carol.address()).unwrap(), 20);
        assert_eq!(
            reloaded
                .runtime
                .allowance(&alice.address(), &bob.address())
                .unwrap(),
            30
        );
        assert_eq!(reloaded.runtime.committed_calls(), 3);
    }

    #[test]
    fn test_rejected_call_is_not_persisted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();
        let (alice, alice_key) = account();
        let (_, bob_key) = account();

        cmd_init(&data_dir, &alice_key, "Test Token", "TST", 1000, 0).unwrap();

        let mut state = AppState::load(data_dir.clone()).unwrap();
        assert!(cmd_transfer(&mut state, &bob_key, alice.address(), 1).is_err());
        assert!(cmd_transfer(&mut state, &alice_key, alice.address(), 1).is_err());

        let reloaded = AppState::load(data_dir).unwrap();
        assert_eq!(reloaded.runtime.committed_calls(), 1);
        assert_eq!(reloaded.runtime.balance_of(&alice.address()).unwrap(), 1000);
    }

    #[test]
    fn test_init_twice_fails_and_keeps_first_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().to_path_buf();
        let (_, alice_key) = account();
        let (bob, bob_key) = account();

        cmd_init(&data_dir, &alice_key, "Test Token", "TST", 1000, 0).unwrap();
        assert!(cmd_init(&data_dir, &bob_key, "Other", "OTH", 5, 0).is_err());

        let state = AppState::load(data_dir).unwrap();
        assert_eq!(state.runtime.name().unwrap(), "Test Token");
        assert_eq!(state.runtime.balance_of(&bob.address()).unwrap(), 0);
    }

    #[test]
    fn test_load_without_ledger_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(AppState::load(temp_dir.path().to_path_buf()).is_err());
    }
}
