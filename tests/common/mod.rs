//! In-memory wallet and registry used by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, U256};
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tokio::sync::{broadcast, Notify};

use devns::domain::TargetNetwork;
use devns::infrastructure::ethereum::{
    ProviderIdentity, RegistryContract, TxReceipt, WalletProvider,
};
use devns::infrastructure::runtime::RuntimeEvent;
use devns::session::SessionSettings;

pub const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const OTHER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

pub const MUMBAI: &str = "0x13881";
pub const MAINNET: &str = "0x1";

pub fn settings() -> SessionSettings {
    SessionSettings {
        contract: CONTRACT,
        target: TargetNetwork::polygon_mumbai(),
        expected_wallet: "anvil".to_string(),
        refresh_delay: Duration::from_millis(2000),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    Register { name: String, value: U256 },
    SetRecord { name: String, record: String },
    WaitForReceipt(TxHash),
    GetAllNames,
    Records(String),
    Domains(String),
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    record: String,
    owner: Address,
}

#[derive(Default)]
pub struct MockRegistry {
    pub calls: Mutex<Vec<RegistryCall>>,
    entries: Mutex<Vec<Entry>>,
    receipts: Mutex<HashMap<TxHash, bool>>,
    signer: Mutex<Option<Address>>,
    next_tx: AtomicU8,
    pub revert_register: AtomicBool,
    pub reject_set_record: AtomicBool,
}

impl MockRegistry {
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that submit a transaction
    pub fn writes(&self) -> Vec<RegistryCall> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    RegistryCall::Register { .. } | RegistryCall::SetRecord { .. }
                )
            })
            .collect()
    }

    pub fn preload(&self, name: &str, record: &str, owner: Address) {
        self.entries.lock().unwrap().push(Entry {
            name: name.to_string(),
            record: record.to_string(),
            owner,
        });
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    fn record_call(&self, call: RegistryCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn issue_tx(&self, success: bool) -> TxHash {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = TxHash::with_last_byte(n);
        self.receipts.lock().unwrap().insert(hash, success);
        hash
    }

    fn set_signer(&self, signer: Address) {
        *self.signer.lock().unwrap() = Some(signer);
    }
}

#[async_trait::async_trait]
impl RegistryContract for MockRegistry {
    async fn register(&self, name: &str, value: U256) -> Result<TxHash> {
        self.record_call(RegistryCall::Register {
            name: name.to_string(),
            value,
        });
        if self.revert_register.load(Ordering::SeqCst) {
            return Ok(self.issue_tx(false));
        }
        let owner = self.signer.lock().unwrap().unwrap_or(Address::ZERO);
        self.entries.lock().unwrap().push(Entry {
            name: name.to_string(),
            record: String::new(),
            owner,
        });
        Ok(self.issue_tx(true))
    }

    async fn set_record(&self, name: &str, record: &str) -> Result<TxHash> {
        self.record_call(RegistryCall::SetRecord {
            name: name.to_string(),
            record: record.to_string(),
        });
        if self.reject_set_record.load(Ordering::SeqCst) {
            return Err(anyhow!("User denied transaction signature"));
        }
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|entry| entry.name == name) {
            entry.record = record.to_string();
        }
        drop(entries);
        Ok(self.issue_tx(true))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt> {
        self.record_call(RegistryCall::WaitForReceipt(tx_hash));
        let success = self
            .receipts
            .lock()
            .unwrap()
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| anyhow!("unknown transaction {tx_hash}"))?;
        Ok(TxReceipt {
            tx_hash,
            success,
            block_number: Some(1),
        })
    }

    async fn get_all_names(&self) -> Result<Vec<String>> {
        self.record_call(RegistryCall::GetAllNames);
        Ok(self.names())
    }

    async fn records(&self, name: &str) -> Result<String> {
        self.record_call(RegistryCall::Records(name.to_string()));
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| anyhow!("no such name"))
    }

    async fn domains(&self, name: &str) -> Result<Address> {
        self.record_call(RegistryCall::Domains(name.to_string()));
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.owner)
            .unwrap_or(Address::ZERO))
    }
}

pub struct MockWallet {
    identity: ProviderIdentity,
    chain_id: Mutex<String>,
    accounts: Mutex<Vec<Address>>,
    /// What `eth_requestAccounts` authorizes
    approvable: Mutex<Vec<Address>>,
    pub requests: Mutex<Vec<(String, Value)>>,
    pub reject_add_chain: AtomicBool,
    /// Number of upcoming `eth_accounts` calls that fail
    pub fail_accounts: AtomicU8,
    /// While set, `eth_requestAccounts` waits for a notification
    prompt_gate: Mutex<Option<Arc<Notify>>>,
    chain_tx: broadcast::Sender<String>,
    pub registry: Arc<MockRegistry>,
}

impl MockWallet {
    pub fn new(client_version: &str, chain_id: &str, accounts: Vec<Address>) -> Arc<Self> {
        let (chain_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            identity: ProviderIdentity::from_client_version(client_version),
            chain_id: Mutex::new(chain_id.to_string()),
            approvable: Mutex::new(accounts.clone()),
            accounts: Mutex::new(accounts),
            requests: Mutex::new(Vec::new()),
            reject_add_chain: AtomicBool::new(false),
            fail_accounts: AtomicU8::new(0),
            prompt_gate: Mutex::new(None),
            chain_tx,
            registry: Arc::new(MockRegistry::default()),
        })
    }

    /// anvil wallet with `accounts` already authorized
    pub fn anvil(chain_id: &str, accounts: Vec<Address>) -> Arc<Self> {
        Self::new("anvil/v0.2.0", chain_id, accounts)
    }

    pub fn slot(self: &Arc<Self>) -> Option<Arc<dyn WalletProvider>> {
        Some(Arc::clone(self) as Arc<dyn WalletProvider>)
    }

    pub fn set_approvable(&self, accounts: Vec<Address>) {
        *self.approvable.lock().unwrap() = accounts;
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    /// Keep account prompts open until the returned handle is notified
    pub fn hold_prompts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.prompt_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn release_prompts(&self) {
        *self.prompt_gate.lock().unwrap() = None;
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| m.as_str() == method).count()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Switch chains the way a user would inside the wallet
    pub fn change_chain(&self, chain_id: &str) {
        *self.chain_id.lock().unwrap() = chain_id.to_string();
        let _ = self.chain_tx.send(chain_id.to_string());
    }
}

#[async_trait::async_trait]
impl WalletProvider for MockWallet {
    fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));
        match method {
            "eth_chainId" => Ok(json!(self.chain_id.lock().unwrap().clone())),
            "eth_accounts" => {
                let failing = self
                    .fail_accounts
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok();
                if failing {
                    return Err(anyhow!("eth_accounts unavailable"));
                }
                Ok(json!(self.accounts.lock().unwrap().clone()))
            }
            "eth_requestAccounts" => {
                let gate = self.prompt_gate.lock().unwrap().clone();
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                let approved = self.approvable.lock().unwrap().clone();
                *self.accounts.lock().unwrap() = approved.clone();
                Ok(json!(approved))
            }
            "wallet_addEthereumChain" => {
                if self.reject_add_chain.load(Ordering::SeqCst) {
                    return Err(anyhow!("User rejected the request."));
                }
                let chain_id = params[0]["chainId"]
                    .as_str()
                    .ok_or_else(|| anyhow!("missing chainId"))?
                    .to_string();
                self.change_chain(&chain_id);
                Ok(Value::Null)
            }
            other => Err(anyhow!("unsupported method {other}")),
        }
    }

    fn subscribe_chain_changed(&self) -> broadcast::Receiver<String> {
        self.chain_tx.subscribe()
    }

    fn registry(&self, _address: Address, signer: Address) -> Arc<dyn RegistryContract> {
        self.registry.set_signer(signer);
        Arc::clone(&self.registry) as Arc<dyn RegistryContract>
    }

    fn endpoint_name(&self) -> String {
        "mock://wallet".to_string()
    }
}

/// Wait for the first event matching `pred`, draining everything before it
pub async fn wait_for_event(
    rx: &Receiver<RuntimeEvent>,
    mut pred: impl FnMut(&RuntimeEvent) -> bool,
) -> Option<RuntimeEvent> {
    for _ in 0..2000 {
        while let Ok(event) = rx.try_recv() {
            if pred(&event) {
                return Some(event);
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}
