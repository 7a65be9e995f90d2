use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the bank client.
///
/// Business-rule failures (`AlreadyExists`, `InvalidAmount`, `InsufficientFunds`,
/// `NotOwner`) should be reported to the user. Environmental failures
/// (`NetworkUnavailable`, `SimulationFailed`, `Timeout`) may be retried by the
/// caller; nothing in this crate retries on its own.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no valid derived address found for the given seeds")]
    DerivationExhausted,
    #[error("bank account {0} already exists")]
    AlreadyExists(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(u64),
    #[error("insufficient funds: balance {balance} does not exceed reserve floor {reserve}")]
    InsufficientFunds { balance: u64, reserve: u64 },
    #[error("account {0} not found")]
    NotFound(String),
    #[error("wallet not connected")]
    WalletNotConnected,
    #[error("bank account {bank} is owned by {owner}")]
    NotOwner { bank: String, owner: String },
    #[error("display name is {len} bytes, at most {max} fit in the account")]
    NameTooLong { len: usize, max: usize },
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("failed to decode account data: {0}")]
    Decode(String),
    #[error("failed to encode instruction data: {0}")]
    Encode(String),
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
    #[error("transaction simulation failed: {message}")]
    SimulationFailed { message: String, logs: Vec<String> },
    #[error("timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl Error {
    /// Whether the failure came from the environment rather than a business rule.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::NetworkUnavailable(_) | Error::SimulationFailed { .. } | Error::Timeout { .. }
        )
    }

    /// Whether a rejected submission reports that the target account is
    /// already initialized.
    pub fn is_account_in_use(&self) -> bool {
        match self {
            Error::SimulationFailed { message, logs } => {
                message.contains("already in use") || logs.iter().any(|l| l.contains("already in use"))
            }
            _ => false,
        }
    }
}
