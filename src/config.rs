use std::{path::Path, path::PathBuf, time::Duration};

use color_eyre::eyre::{Result, WrapErr};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use strum::{Display, EnumString};

/// Address of the deployed bank program.
pub const DEFAULT_PROGRAM_ID: &str = "EYahPbK4gjtQNwdigmwSvoPQvPiwSQNo3KrScmc2RqBH";

const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("PDA_BANK_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "pda-bank", "pda-bank") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Get the config directory for the application.
pub fn get_config_dir() -> PathBuf {
    if let Ok(s) = std::env::var("PDA_BANK_CONFIG") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "pda-bank", "pda-bank") {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

/// Default keypair location used by the ledger's CLI tooling.
pub fn default_keypair_path() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".config").join("solana").join("id.json"),
        None => PathBuf::from("id.json"),
    }
}

/// How final a submission must be before it counts as confirmed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    pub commitment: Commitment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub program_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub confirm_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Bound on a single RPC round-trip.
    pub request_timeout_secs: u64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            confirm_timeout_secs: DEFAULT_CONFIRM_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SubmitConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub program: ProgramConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub keypair_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::devnet()
    }
}

impl Config {
    /// Create config from CLI args.
    pub fn new(network: &str, rpc_url: Option<&str>) -> Self {
        let mut config = Self::from_network(network);
        if let Some(url) = rpc_url {
            config.network.rpc_url = url.to_string();
        }
        config
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn preset(name: &str, rpc_url: &str) -> Self {
        Self {
            network: NetworkConfig {
                name: name.to_string(),
                rpc_url: rpc_url.to_string(),
                commitment: Commitment::Confirmed,
            },
            program: ProgramConfig {
                program_id: DEFAULT_PROGRAM_ID.to_string(),
            },
            submit: SubmitConfig::default(),
            keypair_path: None,
        }
    }

    pub fn localnet() -> Self {
        Self::preset("localnet", "http://127.0.0.1:8899")
    }

    pub fn devnet() -> Self {
        Self::preset("devnet", "https://api.devnet.solana.com")
    }

    pub fn testnet() -> Self {
        Self::preset("testnet", "https://api.testnet.solana.com")
    }

    pub fn mainnet() -> Self {
        let mut config = Self::preset("mainnet", "https://api.mainnet-beta.solana.com");
        config.network.commitment = Commitment::Finalized;
        config
    }

    pub fn from_network(network: &str) -> Self {
        match network {
            "localnet" => Self::localnet(),
            "testnet" => Self::testnet(),
            "mainnet" => Self::mainnet(),
            _ => Self::devnet(),
        }
    }

    pub fn keypair_path(&self) -> PathBuf {
        self.keypair_path.clone().unwrap_or_else(default_keypair_path)
    }
}
