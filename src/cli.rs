use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lamports moved by `deposit` when `--lamports` is omitted (0.1 SOL).
pub const DEFAULT_DEPOSIT_LAMPORTS: u64 = 100_000_000;

/// Display name given to a new bank when `--name` is omitted.
pub const DEFAULT_BANK_NAME: &str = "Dev Phantom";

#[derive(Parser, Debug)]
#[command(name = "pda-bank")]
#[command(version)]
#[command(about = "Create, fund and drain program-derived bank accounts on Solana")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Network to connect to (localnet, devnet, testnet, mainnet)
    /// If not specified, uses the config file or defaults to devnet
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    /// Custom RPC URL (overrides network default)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Bank program id (base58)
    #[arg(long, global = true)]
    pub program_id: Option<String>,

    /// Signing keypair file (JSON byte array)
    #[arg(short, long, global = true)]
    pub keypair: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory path
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the bank address derived for the wallet
    Address,

    /// Create the wallet's bank account
    Create {
        #[arg(long, default_value = DEFAULT_BANK_NAME)]
        name: String,
    },

    /// Deposit lamports into a bank
    Deposit {
        /// Bank address (base58)
        bank: String,

        #[arg(long, default_value_t = DEFAULT_DEPOSIT_LAMPORTS)]
        lamports: u64,
    },

    /// Withdraw everything above the reserve floor from a bank you own
    Withdraw {
        /// Bank address (base58)
        bank: String,
    },

    /// List every bank owned by the program
    List {
        /// Print the accounts as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
