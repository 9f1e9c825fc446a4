//! Session - the owned application state
//!
//! A `Session` holds everything that depends on the wallet and its current
//! chain: detection, connection, resolved network, loading flag and the mint
//! list. It is never patched after a chain change; the runtime drops it and
//! builds a new one, re-running `initialize` (detect, resolve network, check
//! connection).

mod connection;
mod detector;
mod orchestrator;
mod resolver;
mod switcher;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::domain::error::{DappError, Result};
use crate::domain::{ConnectionState, DomainRegistration, MintRecord, NetworkState, TargetNetwork};
use crate::infrastructure::ethereum::{TxReceipt, WalletProvider};

pub use connection::{ConnectOutcome, ConnectionManager};
pub use detector::{ProviderDetector, ProviderHandle};
pub use orchestrator::{
    LoadingFlag, LoadingGuard, RecordOutcome, RegisterOutcome, TransactionOrchestrator,
};
pub use resolver::{is_target_network, resolve_network};
pub use switcher::switch_network;

/// Fixed inputs of a session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Deployed registry contract
    pub contract: Address,
    pub target: TargetNetwork,
    /// Wallet kind detection accepts (`anvil`, `geth`, ...)
    pub expected_wallet: String,
    /// Pause between a confirmed registration and the mint list refresh
    pub refresh_delay: Duration,
}

/// What the initial check found
#[derive(Debug)]
pub struct InitReport {
    pub endpoint: String,
    /// Wallet implementation reported by the endpoint (`anvil`, `geth`, ...)
    pub wallet_kind: String,
    pub network: NetworkState,
    pub connection: ConnectionState,
}

pub struct Session {
    settings: SessionSettings,
    detector: ProviderDetector,
    connection: ConnectionManager,
    network: RwLock<Option<NetworkState>>,
    orchestrator: TransactionOrchestrator,
}

impl Session {
    pub fn new(slot: Option<Arc<dyn WalletProvider>>, settings: SessionSettings) -> Self {
        let detector = ProviderDetector::new(slot, settings.expected_wallet.clone());
        let orchestrator = TransactionOrchestrator::new(
            detector.clone(),
            settings.contract,
            settings.target.clone(),
        );
        Self {
            settings,
            detector,
            connection: ConnectionManager::new(),
            network: RwLock::new(None),
            orchestrator,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn network(&self) -> Option<NetworkState> {
        self.network.read().ok().and_then(|network| network.clone())
    }

    pub fn on_target_network(&self) -> bool {
        self.network()
            .is_some_and(|network| is_target_network(&network, &self.settings.target))
    }

    /// Connected to an account on the registry's network
    pub fn is_ready(&self) -> bool {
        self.connection_state().is_connected() && self.on_target_network()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.orchestrator.loading().subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.loading().is_loading()
    }

    pub fn mints(&self) -> Vec<MintRecord> {
        self.orchestrator.mints()
    }

    /// Chain switches of the detected wallet. `None` when detection fails.
    pub fn chain_changes(&self) -> Option<broadcast::Receiver<String>> {
        self.detector
            .detect()
            .ok()
            .map(|provider| provider.subscribe_chain_changed())
    }

    /// Detect, resolve the network, then check for authorized accounts
    pub async fn initialize(&self) -> Result<InitReport> {
        let provider = self.detector.detect()?;

        let network = resolve_network(&provider).await?;
        info!(chain_id = %network.chain_id, network = network.name.label(), "network resolved");
        if let Ok(mut slot) = self.network.write() {
            *slot = Some(network.clone());
        }

        let connection = self.connection.check_existing_connection(&provider).await?;
        Ok(InitReport {
            endpoint: provider.endpoint_name(),
            wallet_kind: provider.identity().kind.as_str().to_string(),
            network,
            connection,
        })
    }

    pub async fn request_connection(&self) -> Result<ConnectOutcome> {
        self.connection.request_connection(&self.detector).await
    }

    pub async fn switch_network(&self) -> Result<()> {
        let provider = self.detector.detect()?;
        switch_network(&provider, &self.settings.target).await
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.connection_state().is_connected() {
            return Err(DappError::NotConnected);
        }
        let required = self.settings.target.chain_name.to_string();
        match self.network() {
            Some(network) if is_target_network(&network, &self.settings.target) => Ok(()),
            Some(network) => Err(DappError::WrongNetwork {
                current: network.name.label().to_string(),
                required,
            }),
            None => Err(DappError::WrongNetwork {
                current: "an unknown network".to_string(),
                required,
            }),
        }
    }

    /// Register `name`, then attach `record` if one was given
    pub async fn mint(&self, name: &str, record: &str) -> Result<RegisterOutcome> {
        let registration = DomainRegistration::new(name, record)?;
        self.ensure_ready()?;
        self.orchestrator.register(&registration).await
    }

    /// Update the record of an owned name; empty input is a no-op
    pub async fn update_record(&self, name: &str, record: &str) -> Result<Option<TxReceipt>> {
        if name.is_empty() || record.is_empty() {
            return Ok(None);
        }
        self.ensure_ready()?;
        self.orchestrator.set_record(name, record).await
    }

    /// Reload the mint list. Skipped while not connected to the target network.
    pub async fn refresh_mints(&self) -> Result<Option<Vec<MintRecord>>> {
        if !self.is_ready() {
            debug!("mint refresh skipped, session not ready");
            return Ok(None);
        }
        self.orchestrator.enumerate().await
    }
}
