//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The worker runs on a current-thread runtime: every wallet and contract
//! operation is a task on one cooperative scheduler, suspended at each await.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use alloy::primitives::{Address, TxHash};

use crate::domain::{ConnectionState, MintRecord, NetworkState};
use crate::infrastructure::runtime::worker::{run_async_worker, WorkerSettings};
use crate::session::RecordOutcome;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// Prompt the wallet for account authorization
    Connect,
    /// Ask the wallet to add/activate the target network
    SwitchNetwork,
    /// Register a name, optionally followed by its record
    Register { name: String, record: String },
    /// Update the record of an owned name
    SetRecord { name: String, record: String },
    /// Re-fetch the mint list
    RefreshMints,
    /// Shutdown the worker
    Shutdown,
}

/// Severity of a non-blocking notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Events belonging to one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ProviderReady { endpoint: String, kind: String },
    NetworkResolved { network: NetworkState, on_target: bool },
    ConnectionChanged(ConnectionState),
    Loading(bool),
    MintsReady(Vec<MintRecord>),
    Registered {
        name: String,
        tx_hash: TxHash,
        record: RecordOutcome,
    },
    RecordUpdated { name: String, tx_hash: TxHash },
    /// Blocking message the user has to dismiss
    Alert(String),
    Notice { message: String, level: NoticeLevel },
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A fresh session replaced the previous one; all derived state is stale
    SessionStarted { epoch: u64, contract: Address },
    Session { epoch: u64, event: SessionEvent },
    /// Worker-level failure
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(settings: WorkerSettings) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::Builder::new()
            .name("devns-worker".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Failed to create Tokio runtime: {err}"),
                        });
                        return;
                    }
                };
                rt.block_on(async {
                    if let Err(err) = run_async_worker(settings, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
