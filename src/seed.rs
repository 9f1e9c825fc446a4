//! Bootstrap: register the sample names against an already deployed registry

use alloy::primitives::{Address, TxHash, U256};
use anyhow::{bail, Result};
use tracing::info;

use crate::session::ProviderHandle;

pub const SAMPLE_NAMES: [&str; 2] = ["abdc", "defg"];

/// One native unit, far above any tier price
pub const SEED_VALUE_WEI: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub registered: Vec<(String, TxHash)>,
    /// `getAllNames()` after seeding
    pub names: Vec<String>,
}

/// Register every sample name in order, waiting for each confirmation
pub async fn seed_registry(provider: &ProviderHandle, contract: Address) -> Result<SeedReport> {
    let signer = provider.signer().await?;
    let registry = provider.registry(contract, signer);
    info!(contract = %contract, signer = %signer, "seeding registry");

    let mut registered = Vec::with_capacity(SAMPLE_NAMES.len());
    for name in SAMPLE_NAMES {
        let tx_hash = registry.register(name, U256::from(SEED_VALUE_WEI)).await?;
        let receipt = registry.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            bail!("register({name}) reverted in {tx_hash}");
        }
        info!(name, tx = %tx_hash, block = ?receipt.block_number, "sample name registered");
        registered.push((name.to_string(), tx_hash));
    }

    let names = registry.get_all_names().await?;
    Ok(SeedReport { registered, names })
}
