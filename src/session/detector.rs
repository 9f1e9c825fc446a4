//! Provider detection and the typed handle over a detected wallet

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::domain::error::{DappError, Result};
use crate::domain::ChainId;
use crate::infrastructure::ethereum::{ProviderIdentity, RegistryContract, WalletProvider};

/// A wallet that passed detection
#[derive(Clone)]
pub struct ProviderHandle {
    wallet: Arc<dyn WalletProvider>,
}

impl ProviderHandle {
    pub fn identity(&self) -> &ProviderIdentity {
        self.wallet.identity()
    }

    pub fn endpoint_name(&self) -> String {
        self.wallet.endpoint_name()
    }

    pub async fn chain_id(&self) -> anyhow::Result<ChainId> {
        let value = self.wallet.request("eth_chainId", json!([])).await?;
        let raw = value
            .as_str()
            .ok_or_else(|| anyhow!("eth_chainId returned {value}"))?;
        Ok(ChainId::new(raw))
    }

    /// Already-authorized accounts, never prompts
    pub async fn accounts(&self) -> anyhow::Result<Vec<Address>> {
        let value = self.wallet.request("eth_accounts", json!([])).await?;
        parse_accounts(value)
    }

    /// Ask the wallet to authorize accounts
    pub async fn request_accounts(&self) -> anyhow::Result<Vec<Address>> {
        let value = self.wallet.request("eth_requestAccounts", json!([])).await?;
        parse_accounts(value)
    }

    pub async fn add_chain(&self, params: Value) -> anyhow::Result<()> {
        self.wallet
            .request("wallet_addEthereumChain", json!([params]))
            .await?;
        Ok(())
    }

    /// The account transactions are sent from
    pub async fn signer(&self) -> anyhow::Result<Address> {
        self.accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("wallet has no authorized account to sign with"))
    }

    pub fn registry(&self, contract: Address, signer: Address) -> Arc<dyn RegistryContract> {
        self.wallet.registry(contract, signer)
    }

    pub fn subscribe_chain_changed(&self) -> broadcast::Receiver<String> {
        self.wallet.subscribe_chain_changed()
    }
}

fn parse_accounts(value: Value) -> anyhow::Result<Vec<Address>> {
    serde_json::from_value(value).context("Failed to parse account list")
}

/// Locates the injected wallet and checks it is the expected implementation
#[derive(Clone)]
pub struct ProviderDetector {
    slot: Option<Arc<dyn WalletProvider>>,
    expected: String,
}

impl ProviderDetector {
    pub fn new(slot: Option<Arc<dyn WalletProvider>>, expected: impl Into<String>) -> Self {
        Self {
            slot,
            expected: expected.into(),
        }
    }

    pub fn detect(&self) -> Result<ProviderHandle> {
        match self.slot.as_ref() {
            Some(wallet) if wallet.identity().is(&self.expected) => Ok(ProviderHandle {
                wallet: Arc::clone(wallet),
            }),
            _ => Err(DappError::NoProvider {
                expected: self.expected.clone(),
            }),
        }
    }
}
