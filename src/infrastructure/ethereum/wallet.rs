//! Wallet provider abstraction and the Alloy-backed implementation
//!
//! The wallet is modelled on the EIP-1193 surface: a single `request`
//! entry point plus a chain-change subscription. The Alloy implementation
//! talks JSON-RPC to an endpoint whose accounts sign transactions
//! (a dev node such as anvil, or a signing proxy).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::registry::{AlloyRegistry, RegistryContract};

/// JSON-RPC "method not found"
const METHOD_NOT_FOUND: i64 = -32601;

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Wallet implementation family, classified from the client version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletKind {
    Anvil,
    Hardhat,
    Geth,
    Reth,
    Other(String),
}

impl WalletKind {
    pub fn from_client_version(version: &str) -> Self {
        let lower = version.to_lowercase();
        if lower.contains("anvil") {
            WalletKind::Anvil
        } else if lower.contains("hardhat") {
            WalletKind::Hardhat
        } else if lower.contains("reth") {
            WalletKind::Reth
        } else if lower.contains("geth") || lower.contains("go-ethereum") {
            WalletKind::Geth
        } else {
            WalletKind::Other(version.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WalletKind::Anvil => "anvil",
            WalletKind::Hardhat => "hardhat",
            WalletKind::Geth => "geth",
            WalletKind::Reth => "reth",
            WalletKind::Other(version) => version,
        }
    }
}

/// How a provider identifies itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub client_version: String,
    pub kind: WalletKind,
}

impl ProviderIdentity {
    pub fn from_client_version(version: impl Into<String>) -> Self {
        let client_version = version.into();
        let kind = WalletKind::from_client_version(&client_version);
        Self {
            client_version,
            kind,
        }
    }

    /// Whether this provider is the wallet implementation we were told to expect
    pub fn is(&self, expected: &str) -> bool {
        self.kind.as_str().eq_ignore_ascii_case(expected.trim())
    }
}

/// Wallet provider trait
///
/// Everything the session needs from a wallet: raw requests, chain change
/// notifications and a contract binding that signs with a given account.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    fn identity(&self) -> &ProviderIdentity;

    /// Issue a wallet request (`eth_chainId`, `eth_accounts`, ...)
    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Receive the new chain id every time the wallet switches chains
    fn subscribe_chain_changed(&self) -> broadcast::Receiver<String>;

    /// Bind the registry contract at `address`, sending as `signer`
    fn registry(&self, address: Address, signer: Address) -> Arc<dyn RegistryContract>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

pub struct AlloyWallet {
    provider: DynProvider,
    endpoint: String,
    identity: ProviderIdentity,
    chain_tx: broadcast::Sender<String>,
    chain_watcher: JoinHandle<()>,
    receipt_poll: Duration,
}

/// Connect to a wallet endpoint and start watching its chain id
pub async fn connect_wallet(
    config: ProviderConfig,
    chain_poll: Duration,
) -> Result<Arc<dyn WalletProvider>> {
    let endpoint = config.display();
    let provider = match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            ProviderBuilder::new().connect_http(rpc_url).erased()
        }
        ProviderConfig::WebSocket(url) => ProviderBuilder::new()
            .connect(&url)
            .await
            .context("Failed to create WebSocket provider")?
            .erased(),
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?
                .erased()
        }
    };

    let client_version = provider
        .get_client_version()
        .await
        .context("Failed to get client version")?;
    let identity = ProviderIdentity::from_client_version(client_version);
    info!(endpoint = %endpoint, kind = identity.kind.as_str(), "wallet endpoint connected");

    let (chain_tx, _) = broadcast::channel(16);
    let chain_watcher = spawn_chain_watcher(provider.clone(), chain_tx.clone(), chain_poll);

    Ok(Arc::new(AlloyWallet {
        provider,
        endpoint,
        identity,
        chain_tx,
        chain_watcher,
        receipt_poll: Duration::from_millis(500),
    }))
}

/// Poll `eth_chainId` and broadcast every change
fn spawn_chain_watcher(
    provider: DynProvider,
    chain_tx: broadcast::Sender<String>,
    poll: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll);
        let mut last: Option<String> = None;
        loop {
            ticker.tick().await;
            let current: String = match provider.raw_request("eth_chainId".into(), ()).await {
                Ok(chain_id) => chain_id,
                Err(err) => {
                    debug!("chain id poll failed: {err}");
                    continue;
                }
            };
            let current = current.to_lowercase();
            if last.as_ref().is_some_and(|prev| *prev != current) {
                info!(chain_id = %current, "wallet switched chains");
                let _ = chain_tx.send(current.clone());
            }
            last = Some(current);
        }
    })
}

#[async_trait::async_trait]
impl WalletProvider for AlloyWallet {
    fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let params = match params {
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };
        debug!(method, "wallet request");

        let result = self
            .provider
            .raw_request::<_, Value>(method.to_string().into(), params.clone())
            .await;

        match result {
            Ok(value) => Ok(value),
            // Plain nodes have no authorization prompt; their unlocked
            // accounts are the authorized ones.
            Err(err)
                if method == "eth_requestAccounts"
                    && err
                        .as_error_resp()
                        .is_some_and(|payload| payload.code == METHOD_NOT_FOUND) =>
            {
                Ok(self
                    .provider
                    .raw_request::<_, Value>("eth_accounts".into(), params)
                    .await?)
            }
            Err(err) => Err(err).with_context(|| format!("{method} failed")),
        }
    }

    fn subscribe_chain_changed(&self) -> broadcast::Receiver<String> {
        self.chain_tx.subscribe()
    }

    fn registry(&self, address: Address, signer: Address) -> Arc<dyn RegistryContract> {
        Arc::new(AlloyRegistry::new(
            self.provider.clone(),
            address,
            signer,
            self.receipt_poll,
        ))
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}

impl Drop for AlloyWallet {
    fn drop(&mut self) {
        self.chain_watcher.abort();
    }
}
