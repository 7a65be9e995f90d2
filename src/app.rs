use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use pda_bank::{
    config::{Config, get_config_dir},
    domain::{
        bank::BankAccount,
        cache::AccountListCache,
        error::Error,
        operations::{BankOperations, Receipt},
        wallet::{KeypairWallet, Wallet},
    },
    infra::rpc::RpcGateway,
};
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::{
    cli::{Args, Command},
    errors::into_report,
};

const CONFIG_FILE: &str = "config.json";
const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

pub struct App {
    command: Command,
    config: Config,
    operations: BankOperations<RpcGateway>,
    cache: AccountListCache,
}

impl App {
    pub fn new(args: &Args) -> Result<Self> {
        let config = resolve_config(args)?;
        let keypair_path = config.keypair_path();
        let wallet = KeypairWallet::from_file(&keypair_path)
            .map_err(into_report)
            .wrap_err_with(|| format!("failed to load keypair {}", keypair_path.display()))?;
        let wallet: Arc<dyn Wallet> = Arc::new(wallet);

        let gateway = RpcGateway::new(config.clone(), wallet.clone()).map_err(into_report)?;
        let program_id = parse_address(&config.program.program_id)?;
        info!(
            network = %config.network.name,
            rpc_url = %config.network.rpc_url,
            %program_id,
            "app initialized"
        );

        Ok(Self {
            command: args.command.clone(),
            config,
            operations: BankOperations::new(gateway, wallet, program_id),
            cache: AccountListCache::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        match self.command.clone() {
            Command::Address => {
                let owner = self.operations.owner().map_err(into_report)?;
                let (bank, bump) = self.operations.bank_address().map_err(into_report)?;
                println!("network: {}", self.config.network.name);
                println!("owner:   {owner}");
                println!("bank:    {bank}");
                println!("bump:    {bump}");
            }
            Command::Create { name } => {
                let receipt = self.operations.create(&name).await.map_err(into_report)?;
                print_receipt(&receipt);
                self.refresh().await;
            }
            Command::Deposit { bank, lamports } => {
                let bank = parse_address(&bank)?;
                let receipt = self
                    .operations
                    .deposit(&bank, lamports)
                    .await
                    .map_err(into_report)?;
                print_receipt(&receipt);
                self.refresh().await;
            }
            Command::Withdraw { bank } => {
                let bank = parse_address(&bank)?;
                let receipt = self.operations.withdraw(&bank).await.map_err(into_report)?;
                print_receipt(&receipt);
                self.refresh().await;
            }
            Command::List { json } => {
                self.cache
                    .refresh(self.operations.gateway(), &self.operations.program_id())
                    .await
                    .map_err(into_report)?;
                let accounts: Vec<BankAccount> = self.cache.snapshot().into_values().collect();
                if json {
                    println!("{}", serde_json::to_string_pretty(&accounts)?);
                } else {
                    print_accounts(&accounts);
                }
            }
        }
        Ok(())
    }

    /// Refresh the account list after a write. A failure here does not
    /// undo the confirmed operation, so it is only logged.
    async fn refresh(&self) {
        match self
            .cache
            .refresh(self.operations.gateway(), &self.operations.program_id())
            .await
        {
            Ok(count) => println!("{count} bank account(s) on {}", self.config.network.name),
            Err(e) => warn!(error = %e, "account list refresh failed"),
        }
    }
}

/// Build the config from the config file (if any) and CLI overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| get_config_dir().join(CONFIG_FILE));

    let mut config = if path.exists() {
        let mut config = Config::load(&path)?;
        if let Some(network) = args.network.as_deref()
            && network != config.network.name
        {
            config.network = Config::from_network(network).network;
        }
        config
    } else if args.config.is_some() {
        return Err(color_eyre::eyre::eyre!(
            "config file {} does not exist",
            path.display()
        ));
    } else {
        Config::from_network(args.network.as_deref().unwrap_or("devnet"))
    };

    if let Some(url) = &args.rpc_url {
        config.network.rpc_url = url.clone();
    }
    if let Some(program_id) = &args.program_id {
        parse_address(program_id)?;
        config.program.program_id = program_id.clone();
    }
    if let Some(keypair) = &args.keypair {
        config.keypair_path = Some(keypair.clone());
    }
    Ok(config)
}

fn parse_address(s: &str) -> Result<Pubkey> {
    s.parse()
        .map_err(|e| into_report(Error::InvalidAddress(format!("{s}: {e}"))))
}

fn print_receipt(receipt: &Receipt) {
    println!("{} {}", receipt.kind, receipt.state);
    println!("  bank:      {}", receipt.bank);
    if let Some(amount) = receipt.amount {
        println!(
            "  amount:    {amount} lamports ({:.9} SOL)",
            amount as f64 / LAMPORTS_PER_SOL
        );
    }
    println!("  signature: {}", receipt.signature);
    println!("  slot:      {}", receipt.slot);
}

fn print_accounts(accounts: &[BankAccount]) {
    if accounts.is_empty() {
        println!("no bank accounts");
        return;
    }
    for account in accounts {
        println!("{}", account.address);
        println!("  name:    {}", account.name);
        println!("  owner:   {}", account.owner);
        println!(
            "  balance: {} lamports ({:.9} SOL)",
            account.balance,
            account.balance as f64 / LAMPORTS_PER_SOL
        );
    }
}
