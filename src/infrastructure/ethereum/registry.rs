//! Registry contract binding
//!
//! `RegistryContract` is the seam the orchestrator talks to; `AlloyRegistry`
//! implements it over the `sol!`-generated binding of the deployed contract.

use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::sol;
use anyhow::{Context, Result};

sol! {
    #[sol(rpc)]
    interface Domains {
        function register(string calldata name) external payable;
        function setRecord(string calldata name, string calldata record) external;
        function getAllNames() external view returns (string[] memory);
        function records(string calldata name) external view returns (string memory);
        function domains(string calldata name) external view returns (address);
    }
}

/// Confirmation outcome of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

#[async_trait::async_trait]
pub trait RegistryContract: Send + Sync {
    /// Submit `register(name)` carrying `value` wei
    async fn register(&self, name: &str, value: U256) -> Result<TxHash>;

    /// Submit `setRecord(name, record)`
    async fn set_record(&self, name: &str, record: &str) -> Result<TxHash>;

    /// Wait until the transaction is mined. No timeout.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt>;

    async fn get_all_names(&self) -> Result<Vec<String>>;

    /// Text record of `name`
    async fn records(&self, name: &str) -> Result<String>;

    /// Owner of `name`
    async fn domains(&self, name: &str) -> Result<Address>;
}

pub struct AlloyRegistry {
    contract: Domains::DomainsInstance<DynProvider>,
    signer: Address,
    receipt_poll: Duration,
}

impl AlloyRegistry {
    pub fn new(
        provider: DynProvider,
        address: Address,
        signer: Address,
        receipt_poll: Duration,
    ) -> Self {
        Self {
            contract: Domains::new(address, provider),
            signer,
            receipt_poll,
        }
    }
}

#[async_trait::async_trait]
impl RegistryContract for AlloyRegistry {
    async fn register(&self, name: &str, value: U256) -> Result<TxHash> {
        let pending = self
            .contract
            .register(name.to_string())
            .value(value)
            .from(self.signer)
            .send()
            .await
            .context("register submission failed")?;
        Ok(*pending.tx_hash())
    }

    async fn set_record(&self, name: &str, record: &str) -> Result<TxHash> {
        let pending = self
            .contract
            .setRecord(name.to_string(), record.to_string())
            .from(self.signer)
            .send()
            .await
            .context("setRecord submission failed")?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt> {
        loop {
            let receipt = self
                .contract
                .provider()
                .get_transaction_receipt(tx_hash)
                .await
                .context("Failed to fetch receipt")?;
            if let Some(receipt) = receipt {
                return Ok(TxReceipt {
                    tx_hash,
                    success: receipt.status(),
                    block_number: receipt.block_number,
                });
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
    }

    async fn get_all_names(&self) -> Result<Vec<String>> {
        self.contract
            .getAllNames()
            .call()
            .await
            .context("getAllNames failed")
    }

    async fn records(&self, name: &str) -> Result<String> {
        self.contract
            .records(name.to_string())
            .call()
            .await
            .with_context(|| format!("records({name}) failed"))
    }

    async fn domains(&self, name: &str) -> Result<Address> {
        self.contract
            .domains(name.to_string())
            .call()
            .await
            .with_context(|| format!("domains({name}) failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_selectors_match_registry_abi() {
        assert_eq!(Domains::registerCall::SIGNATURE, "register(string)");
        assert_eq!(
            Domains::setRecordCall::SIGNATURE,
            "setRecord(string,string)"
        );
        assert_eq!(Domains::getAllNamesCall::SIGNATURE, "getAllNames()");
        assert_eq!(Domains::recordsCall::SIGNATURE, "records(string)");
        assert_eq!(Domains::domainsCall::SIGNATURE, "domains(string)");
    }
}
