//! JSON-RPC gateway to a ledger node.
//!
//! Wraps the non-blocking `RpcClient`, converting its errors into the crate's
//! error kinds and polling signature statuses until the configured commitment
//! is reached.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{account::Account, instruction::Instruction, pubkey::Pubkey, signature::Signature};
use tracing::{debug, warn};

use crate::{
    config::Config,
    domain::{
        bank::{BankAccount, bank_discriminator},
        error::{Error, Result},
        transaction::sign_transaction,
        wallet::Wallet,
    },
    infra::gateway::{AccountStream, Confirmation, LedgerGateway},
};

/// JSON-RPC code the node returns when preflight simulation rejects a transaction.
const SEND_TRANSACTION_PREFLIGHT_FAILURE: i64 = -32002;

/// Convert a client error into the most specific error kind.
fn classify_client_error(err: &ClientError, request_timeout: Duration) -> Error {
    match err.kind() {
        ClientErrorKind::Reqwest(e) if e.is_timeout() => Error::Timeout {
            what: "RPC response".to_string(),
            secs: request_timeout.as_secs(),
        },
        ClientErrorKind::Reqwest(e) => match e.status() {
            Some(status) if status.is_server_error() => {
                Error::NetworkUnavailable(format!("node returned HTTP {status}"))
            }
            Some(status) => Error::Rpc {
                code: i64::from(status.as_u16()),
                message: e.to_string(),
            },
            None => Error::NetworkUnavailable(e.to_string()),
        },
        ClientErrorKind::Io(e) => Error::NetworkUnavailable(e.to_string()),
        ClientErrorKind::RpcError(e) => classify_rpc_error(e),
        ClientErrorKind::SerdeJson(e) => Error::Decode(e.to_string()),
        ClientErrorKind::SigningError(e) => Error::Wallet(e.to_string()),
        ClientErrorKind::TransactionError(e) => Error::SimulationFailed {
            message: e.to_string(),
            logs: Vec::new(),
        },
        _ => Error::Rpc {
            code: 0,
            message: err.to_string(),
        },
    }
}

fn classify_rpc_error(err: &RpcError) -> Error {
    match err {
        RpcError::RpcResponseError {
            code,
            message,
            data,
        } => match data {
            RpcResponseErrorData::SendTransactionPreflightFailure(sim) => Error::SimulationFailed {
                message: match &sim.err {
                    Some(inner) => format!("{message}: {inner:?}"),
                    None => message.clone(),
                },
                logs: sim.logs.clone().unwrap_or_default(),
            },
            RpcResponseErrorData::NodeUnhealthy { .. } => Error::NetworkUnavailable(message.clone()),
            _ if *code == SEND_TRANSACTION_PREFLIGHT_FAILURE => Error::SimulationFailed {
                message: message.clone(),
                logs: Vec::new(),
            },
            _ => Error::Rpc {
                code: *code,
                message: message.clone(),
            },
        },
        RpcError::ParseError(what) => Error::Decode(what.clone()),
        other => Error::Rpc {
            code: 0,
            message: other.to_string(),
        },
    }
}

fn decode_account(address: Pubkey, account: &Account, program_id: &Pubkey) -> Result<BankAccount> {
    if &account.owner != program_id {
        return Err(Error::Decode(format!(
            "{address} is owned by {}, not {program_id}",
            account.owner
        )));
    }
    BankAccount::from_ledger(address, account)
}

/// JSON-RPC gateway to a ledger node.
pub struct RpcGateway {
    client: RpcClient,
    config: Config,
    program_id: Pubkey,
    wallet: Arc<dyn Wallet>,
}

impl RpcGateway {
    pub fn new(config: Config, wallet: Arc<dyn Wallet>) -> Result<Self> {
        let program_id = config.program.program_id.parse().map_err(|e| {
            Error::InvalidAddress(format!("{}: {e}", config.program.program_id))
        })?;
        let client = RpcClient::new_with_timeout_and_commitment(
            config.network.rpc_url.clone(),
            config.submit.request_timeout(),
            config.network.commitment.into(),
        );
        Ok(Self {
            client,
            config,
            program_id,
            wallet,
        })
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> String {
        self.client.url()
    }

    fn classify(&self, err: ClientError) -> Error {
        classify_client_error(&err, self.config.submit.request_timeout())
    }

    /// Wait for the signature to reach the configured commitment, bounded by
    /// the confirmation timeout.
    async fn await_confirmation(&self, signature: &Signature) -> Result<Confirmation> {
        let timeout = self.config.submit.confirm_timeout();
        match tokio::time::timeout(timeout, self.poll_signature(signature)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%signature, "confirmation timed out");
                Err(Error::Timeout {
                    what: format!("confirmation of {signature}"),
                    secs: timeout.as_secs(),
                })
            }
        }
    }

    async fn poll_signature(&self, signature: &Signature) -> Result<Confirmation> {
        let poll_interval = self.config.submit.poll_interval();
        let commitment = self.client.commitment();

        loop {
            let statuses = self
                .client
                .get_signature_statuses(&[*signature])
                .await
                .map_err(|e| self.classify(e))?;

            if let Some(Some(status)) = statuses.value.into_iter().next() {
                if let Some(err) = status.err {
                    return Err(Error::SimulationFailed {
                        message: format!("transaction {signature} failed: {err:?}"),
                        logs: Vec::new(),
                    });
                }
                if status.satisfies_commitment(commitment) {
                    return Ok(Confirmation {
                        signature: signature.to_string(),
                        slot: status.slot,
                    });
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[async_trait]
impl LedgerGateway for RpcGateway {
    async fn fetch_account(&self, address: &Pubkey) -> Result<BankAccount> {
        let account = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| self.classify(e))?
            .value
            .ok_or_else(|| Error::NotFound(address.to_string()))?;
        decode_account(*address, &account, &self.program_id)
    }

    async fn list_program_accounts(&self, program_id: &Pubkey) -> Result<AccountStream> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                0,
                &bank_discriminator(),
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.client.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| self.classify(e))?;
        debug!(count = accounts.len(), "program accounts listed");

        let program_id = *program_id;
        Ok(stream::iter(accounts)
            .map(move |(address, account)| {
                decode_account(address, &account, &program_id).map(|bank| (address, bank))
            })
            .boxed())
    }

    async fn minimum_reserve(&self, data_size: usize) -> Result<u64> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_size)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn submit(&self, instruction: Instruction) -> Result<Confirmation> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| self.classify(e))?;
        let tx = sign_transaction(&[instruction], self.wallet.as_ref(), blockhash)?;
        let signature = self
            .client
            .send_transaction(&tx)
            .await
            .map_err(|e| self.classify(e))?;
        debug!(%signature, "transaction sent");
        self.await_confirmation(&signature).await
    }
}
