//! Async worker - owns the session and runs wallet operations as tasks

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::{ConnectionState, DappError, Visibility};
use crate::infrastructure::ethereum::{connect_wallet, ProviderConfig, WalletProvider};
use crate::infrastructure::runtime::bridge::{
    NoticeLevel, RuntimeCommand, RuntimeEvent, SessionEvent,
};
use crate::session::{ConnectOutcome, Session, SessionSettings};

/// Everything the worker needs to build sessions
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Wallet endpoint; `None` means no wallet is available
    pub wallet: Option<ProviderConfig>,
    /// How often the wallet's chain id is polled for changes
    pub chain_poll: Duration,
    pub session: SessionSettings,
    /// Show provider request failures in the status line instead of only logging them
    pub surface_provider_errors: bool,
}

/// Run the async worker loop
pub async fn run_async_worker(
    settings: WorkerSettings,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let slot = match settings.wallet.clone() {
        Some(config) => {
            let endpoint = config.display();
            match connect_wallet(config, settings.chain_poll).await {
                Ok(wallet) => Some(wallet),
                Err(err) => {
                    warn!("wallet endpoint {endpoint} unavailable: {err:#}");
                    None
                }
            }
        }
        None => None,
    };
    run_sessions(slot, settings, cmd_rx, evt_tx).await
}

/// Build a session, serve commands until the wallet switches chains, then
/// throw the session away and build the next one.
pub async fn run_sessions(
    slot: Option<Arc<dyn WalletProvider>>,
    settings: WorkerSettings,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut epoch = 0u64;
    loop {
        epoch += 1;
        let session = Arc::new(Session::new(slot.clone(), settings.session.clone()));
        let emitter = Emitter {
            epoch,
            tx: evt_tx.clone(),
            surface_provider_errors: settings.surface_provider_errors,
        };
        info!(epoch, "session started");
        let _ = evt_tx.send(RuntimeEvent::SessionStarted {
            epoch,
            contract: settings.session.contract,
        });

        forward_loading(&session, emitter.clone());
        // Subscribed before the initial check so a failed check still rebuilds on a switch
        let chain_changes = session.chain_changes();
        initialize(&session, &emitter).await;

        match serve(&session, &emitter, &cmd_rx, chain_changes).await {
            Served::Shutdown => return Ok(()),
            Served::ChainChanged => {
                info!(epoch, "rebuilding session after chain change");
            }
        }
    }
}

enum Served {
    Shutdown,
    ChainChanged,
}

#[derive(Clone)]
struct Emitter {
    epoch: u64,
    tx: Sender<RuntimeEvent>,
    surface_provider_errors: bool,
}

impl Emitter {
    fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(RuntimeEvent::Session {
            epoch: self.epoch,
            event,
        });
    }

    fn notice(&self, message: impl Into<String>, level: NoticeLevel) {
        self.emit(SessionEvent::Notice {
            message: message.into(),
            level,
        });
    }

    fn fail(&self, operation: &str, err: DappError) {
        match err.visibility() {
            Visibility::Alert => self.emit(SessionEvent::Alert(err.to_string())),
            Visibility::Report => self.notice(err.to_string(), NoticeLevel::Warn),
            Visibility::Silent => {
                warn!(epoch = self.epoch, "{operation} failed: {err}");
                if self.surface_provider_errors {
                    self.notice(format!("{operation} failed: {err}"), NoticeLevel::Error);
                }
            }
        }
    }
}

fn forward_loading(session: &Session, emitter: Emitter) {
    let mut loading = session.loading();
    tokio::spawn(async move {
        while loading.changed().await.is_ok() {
            let active = *loading.borrow_and_update();
            emitter.emit(SessionEvent::Loading(active));
        }
    });
}

async fn initialize(session: &Arc<Session>, emitter: &Emitter) {
    match session.initialize().await {
        Ok(report) => {
            emitter.emit(SessionEvent::ProviderReady {
                endpoint: report.endpoint,
                kind: report.wallet_kind,
            });
            emitter.emit(SessionEvent::NetworkResolved {
                on_target: session.on_target_network(),
                network: report.network,
            });
            emitter.emit(SessionEvent::ConnectionChanged(report.connection));
            if session.is_ready() {
                spawn_refresh(session, emitter);
            }
        }
        Err(err) => {
            if let Some(network) = session.network() {
                emitter.emit(SessionEvent::NetworkResolved {
                    on_target: session.on_target_network(),
                    network,
                });
            }
            match err {
                // Only the connect action alerts about a missing wallet
                DappError::NoProvider { .. } => {
                    warn!("Make sure you have a wallet: {err}");
                    emitter.notice(err.to_string(), NoticeLevel::Warn);
                }
                err => emitter.fail("initial connection check", err),
            }
        }
    }
}

async fn serve(
    session: &Arc<Session>,
    emitter: &Emitter,
    cmd_rx: &Receiver<RuntimeCommand>,
    mut chain_changes: Option<broadcast::Receiver<String>>,
) -> Served {
    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(RuntimeCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    return Served::Shutdown
                }
                Ok(cmd) => dispatch(session, emitter, cmd),
                Err(TryRecvError::Empty) => break,
            }
        }

        if let Some(rx) = chain_changes.as_mut() {
            match rx.try_recv() {
                Ok(chain_id) => {
                    info!(chain_id = %chain_id, "chainChanged");
                    return Served::ChainChanged;
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => return Served::ChainChanged,
                Err(broadcast::error::TryRecvError::Closed) => chain_changes = None,
                Err(broadcast::error::TryRecvError::Empty) => {}
            }
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn dispatch(session: &Arc<Session>, emitter: &Emitter, cmd: RuntimeCommand) {
    let session = Arc::clone(session);
    let emitter = emitter.clone();
    match cmd {
        RuntimeCommand::Connect => {
            tokio::spawn(async move {
                match session.request_connection().await {
                    Ok(ConnectOutcome::Connected(account)) => {
                        emitter.emit(SessionEvent::ConnectionChanged(
                            ConnectionState::Connected(account),
                        ));
                        if session.is_ready() {
                            refresh(&session, &emitter).await;
                        }
                    }
                    Ok(ConnectOutcome::NoAccounts) => {
                        emitter.emit(SessionEvent::ConnectionChanged(
                            ConnectionState::Disconnected,
                        ));
                        emitter.notice("Wallet authorized no accounts", NoticeLevel::Warn);
                    }
                    Ok(ConnectOutcome::AlreadyPending) => {
                        debug!("connect ignored, prompt already open");
                    }
                    Err(err) => emitter.fail("connect", err),
                }
            });
        }
        RuntimeCommand::SwitchNetwork => {
            tokio::spawn(async move {
                match session.switch_network().await {
                    Ok(()) => emitter.notice(
                        format!(
                            "Switch to {} requested",
                            session.settings().target.chain_name
                        ),
                        NoticeLevel::Info,
                    ),
                    Err(err) => emitter.fail("network switch", err),
                }
            });
        }
        RuntimeCommand::Register { name, record } => {
            tokio::spawn(async move {
                match session.mint(&name, &record).await {
                    Ok(outcome) => {
                        if !outcome.is_complete() {
                            emitter.notice(
                                format!("{} registered, but its record was not set", outcome.name),
                                NoticeLevel::Warn,
                            );
                        }
                        emitter.emit(SessionEvent::Registered {
                            name: outcome.name,
                            tx_hash: outcome.receipt.tx_hash,
                            record: outcome.record,
                        });
                        // The receipt is in; the delay only gives indexers time to catch up.
                        tokio::time::sleep(session.settings().refresh_delay).await;
                        refresh(&session, &emitter).await;
                    }
                    Err(err) => emitter.fail("register", err),
                }
            });
        }
        RuntimeCommand::SetRecord { name, record } => {
            tokio::spawn(async move {
                match session.update_record(&name, &record).await {
                    Ok(Some(receipt)) => emitter.emit(SessionEvent::RecordUpdated {
                        name,
                        tx_hash: receipt.tx_hash,
                    }),
                    Ok(None) => {}
                    Err(err) => emitter.fail("set record", err),
                }
            });
        }
        RuntimeCommand::RefreshMints => spawn_refresh(&session, &emitter),
        RuntimeCommand::Shutdown => {}
    }
}

fn spawn_refresh(session: &Arc<Session>, emitter: &Emitter) {
    let session = Arc::clone(session);
    let emitter = emitter.clone();
    tokio::spawn(async move {
        refresh(&session, &emitter).await;
    });
}

async fn refresh(session: &Session, emitter: &Emitter) {
    match session.refresh_mints().await {
        Ok(Some(mints)) => emitter.emit(SessionEvent::MintsReady(mints)),
        Ok(None) => {}
        Err(err) => emitter.fail("mint refresh", err),
    }
}
