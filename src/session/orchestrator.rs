//! Transaction orchestrator - register, setRecord and enumerate
//!
//! Every operation follows the same protocol: detect the wallet, resolve the
//! signer, bind the registry, submit, wait for the receipt and branch on its
//! status. All of them hold the shared loading flag while they run.

use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::Address;
use futures::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::error::{DappError, Result};
use crate::domain::{DomainRegistration, LengthTier, MintBook, MintRecord, TargetNetwork};
use crate::infrastructure::ethereum::{RegistryContract, TxReceipt};

use super::detector::ProviderDetector;

/// Loading indicator shared by all operations. Counts holders so overlapping
/// operations keep it set until the last one exits.
#[derive(Debug)]
pub struct LoadingFlag {
    active: AtomicUsize,
    tx: watch::Sender<bool>,
}

pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl LoadingFlag {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            active: AtomicUsize::new(0),
            tx,
        }
    }

    pub fn begin(&self) -> LoadingGuard<'_> {
        if self.active.fetch_add(1, Ordering::SeqCst) == 0 {
            self.tx.send_replace(true);
        }
        LoadingGuard { flag: self }
    }

    pub fn is_loading(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.flag.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.flag.tx.send_replace(false);
        }
    }
}

/// What happened to the record attached to a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    NotRequested,
    Set(TxReceipt),
    /// The name stays registered; the record was not written
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub name: String,
    pub tier: LengthTier,
    pub receipt: TxReceipt,
    pub record: RecordOutcome,
}

impl RegisterOutcome {
    /// Registration and, if requested, the record both confirmed
    pub fn is_complete(&self) -> bool {
        !matches!(self.record, RecordOutcome::Failed(_))
    }
}

pub struct TransactionOrchestrator {
    detector: ProviderDetector,
    contract: Address,
    target: TargetNetwork,
    loading: LoadingFlag,
    mints: MintBook,
}

impl TransactionOrchestrator {
    pub fn new(detector: ProviderDetector, contract: Address, target: TargetNetwork) -> Self {
        Self {
            detector,
            contract,
            target,
            loading: LoadingFlag::new(),
            mints: MintBook::new(),
        }
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn mints(&self) -> Vec<MintRecord> {
        self.mints.snapshot()
    }

    async fn bind(&self) -> Result<std::sync::Arc<dyn RegistryContract>> {
        let provider = self.detector.detect()?;
        let signer = provider.signer().await?;
        Ok(provider.registry(self.contract, signer))
    }

    pub async fn register(&self, registration: &DomainRegistration) -> Result<RegisterOutcome> {
        let _loading = self.loading.begin();
        let registry = self.bind().await?;

        info!(
            name = %registration.name,
            price = registration.tier.price_label(),
            "registering name"
        );
        let tx_hash = registry
            .register(&registration.name, registration.price_wei)
            .await?;
        let receipt = registry.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            warn!(tx = %tx_hash, "register reverted");
            return Err(DappError::TransactionFailure);
        }

        let record = match registration.record.as_deref() {
            None => RecordOutcome::NotRequested,
            Some(record) => {
                match submit_record(registry.as_ref(), &registration.name, record).await {
                    Ok(receipt) => RecordOutcome::Set(receipt),
                    Err(err) => {
                        warn!(name = %registration.name, "record not set after register: {err}");
                        RecordOutcome::Failed(err.to_string())
                    }
                }
            }
        };

        let last_tx = match &record {
            RecordOutcome::Set(record_receipt) => record_receipt.tx_hash,
            _ => receipt.tx_hash,
        };
        info!("Domain minted! {}", self.target.tx_url(&last_tx.to_string()));

        Ok(RegisterOutcome {
            name: registration.name.clone(),
            tier: registration.tier,
            receipt,
            record,
        })
    }

    /// Empty name or record is a no-op
    pub async fn set_record(&self, name: &str, record: &str) -> Result<Option<TxReceipt>> {
        if name.is_empty() || record.is_empty() {
            return Ok(None);
        }
        let _loading = self.loading.begin();
        let registry = self.bind().await?;
        let receipt = submit_record(registry.as_ref(), name, record).await?;
        info!(
            "Domain updated: {}",
            self.target.tx_url(&receipt.tx_hash.to_string())
        );
        Ok(Some(receipt))
    }

    /// Fetch every registered name with its record and owner. Returns `None`
    /// when a refresh started later already replaced the list.
    pub async fn enumerate(&self) -> Result<Option<Vec<MintRecord>>> {
        let _loading = self.loading.begin();
        let ticket = self.mints.begin_refresh();
        let registry = self.bind().await?;

        let names = registry.get_all_names().await?;
        let registry = registry.as_ref();
        let mints = try_join_all(names.into_iter().enumerate().map(|(id, name)| async move {
            let (record, owner) =
                futures::try_join!(registry.records(&name), registry.domains(&name))?;
            Ok::<_, anyhow::Error>(MintRecord {
                id,
                name,
                record,
                owner,
            })
        }))
        .await?;

        if self.mints.replace(ticket, mints.clone()) {
            debug!(count = mints.len(), "mint list replaced");
            Ok(Some(mints))
        } else {
            debug!("mint refresh superseded");
            Ok(None)
        }
    }
}

async fn submit_record(
    registry: &dyn RegistryContract,
    name: &str,
    record: &str,
) -> Result<TxReceipt> {
    let tx_hash = registry.set_record(name, record).await?;
    let receipt = registry.wait_for_receipt(tx_hash).await?;
    if !receipt.success {
        warn!(tx = %tx_hash, "setRecord reverted");
        return Err(DappError::TransactionFailure);
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_flag_counts_holders() {
        let flag = LoadingFlag::new();
        let rx = flag.subscribe();
        assert!(!flag.is_loading());

        let first = flag.begin();
        let second = flag.begin();
        assert!(flag.is_loading());

        drop(first);
        assert!(flag.is_loading());
        drop(second);
        assert!(!flag.is_loading());
        assert!(!*rx.borrow());
    }
}
