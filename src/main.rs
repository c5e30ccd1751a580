//! Token Ledger CLI Application
//!
//! A command-line host for a single fungible-token ledger.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use token_ledger::cli::{self, AppState};
use token_ledger::ledger::{Address, Amount};

#[derive(Parser)]
#[command(name = "token-ledger")]
#[command(version = "0.1.0")]
#[command(about = "A fungible-token ledger with delegated allowances", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".ledger_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new ledger, minting the initial supply to the deployer
    Init {
        /// Private key (hex) of the deployer, which receives the initial supply
        #[arg(short, long)]
        key: String,

        /// Token name
        #[arg(short, long)]
        name: String,

        /// Token symbol
        #[arg(short, long)]
        symbol: String,

        /// Initial supply in base units
        #[arg(long)]
        supply: Amount,

        /// Decimal places
        #[arg(long, default_value = "18")]
        decimals: u8,
    },

    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Transfer tokens to another account
    Transfer {
        /// Private key (hex) of the sender
        #[arg(short, long)]
        key: String,

        /// Recipient address
        #[arg(short, long)]
        to: Address,

        /// Amount in base units
        #[arg(short, long)]
        amount: Amount,
    },

    /// Set a spender's allowance (overwrites any previous allowance)
    Approve {
        /// Private key (hex) of the owner
        #[arg(short, long)]
        key: String,

        /// Spender address
        #[arg(short, long)]
        spender: Address,

        /// Allowance in base units
        #[arg(short, long)]
        amount: Amount,
    },

    /// Transfer tokens on behalf of an owner using an allowance
    TransferFrom {
        /// Private key (hex) of the spender
        #[arg(short, long)]
        key: String,

        /// Owner address the tokens are taken from
        #[arg(short, long)]
        owner: Address,

        /// Recipient address
        #[arg(short, long)]
        to: Address,

        /// Amount in base units
        #[arg(short, long)]
        amount: Amount,
    },

    /// Show an account balance
    Balance {
        /// Account address
        #[arg(short, long)]
        address: Address,
    },

    /// Show the allowance an owner granted a spender
    Allowance {
        /// Owner address
        #[arg(short, long)]
        owner: Address,

        /// Spender address
        #[arg(short, long)]
        spender: Address,
    },

    /// Display ledger information
    Info,

    /// List accounts holding tokens
    Holders,

    /// Show recent committed calls
    History {
        /// Number of calls to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Verify the ledger invariants
    Verify,
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Generate a new key pair and its address
    New,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a deployed ledger
    match &cli.command {
        Commands::Init {
            key,
            name,
            symbol,
            supply,
            decimals,
        } => {
            return cli::cmd_init(&cli.data_dir, key, name, symbol, *supply, *decimals);
        }
        Commands::Account { action } => {
            return match action {
                AccountCommands::New => cli::cmd_account_new(),
            };
        }
        _ => {}
    }

    // Load the deployed ledger
    let mut state = AppState::load(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. } | Commands::Account { .. } => {}

        Commands::Transfer { key, to, amount } => {
            cli::cmd_transfer(&mut state, &key, to, amount)?;
        }

        Commands::Approve {
            key,
            spender,
            amount,
        } => {
            cli::cmd_approve(&mut state, &key, spender, amount)?;
        }

        Commands::TransferFrom {
            key,
            owner,
            to,
            amount,
        } => {
            cli::cmd_transfer_from(&mut state, &key, owner, to, amount)?;
        }

        Commands::Balance { address } => {
            cli::cmd_balance(&state, &address)?;
        }

        Commands::Allowance { owner, spender } => {
            cli::cmd_allowance(&state, &owner, &spender)?;
        }

        Commands::Info => {
            cli::cmd_info(&state)?;
        }

        Commands::Holders => {
            cli::cmd_holders(&state)?;
        }

        Commands::History { count } => {
            cli::cmd_history(&state, count)?;
        }

        Commands::Verify => {
            cli::cmd_verify(&state)?;
        }
    }

    Ok(())
}
