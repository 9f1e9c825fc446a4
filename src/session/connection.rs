//! Connection manager - owns the connected-account state

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use alloy::primitives::Address;
use tracing::info;

use crate::domain::error::Result;
use crate::domain::ConnectionState;

use super::detector::{ProviderDetector, ProviderHandle};

/// Result of a user-initiated connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(Address),
    /// The wallet authorized nothing
    NoAccounts,
    /// Another prompt is still open; nothing was sent
    AlreadyPending,
}

#[derive(Debug, Default)]
pub struct ConnectionManager {
    state: Mutex<ConnectionState>,
    prompt_open: AtomicBool,
}

/// Clears the open-prompt flag on every exit path
struct PromptGuard<'a>(&'a AtomicBool);

impl Drop for PromptGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state.lock().map(|state| *state).unwrap_or_default()
    }

    fn set_state(&self, next: ConnectionState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// Silent check for accounts the wallet already authorized
    pub async fn check_existing_connection(
        &self,
        provider: &ProviderHandle,
    ) -> Result<ConnectionState> {
        self.set_state(ConnectionState::Checking);
        let accounts = match provider.accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(err.into());
            }
        };
        let next = match accounts.first() {
            Some(account) => {
                info!(account = %account, "found authorized account");
                ConnectionState::Connected(*account)
            }
            None => {
                info!("No authorized account found.");
                ConnectionState::Disconnected
            }
        };
        self.set_state(next);
        Ok(next)
    }

    /// User-initiated connect. Fails before touching the wallet when
    /// detection fails.
    pub async fn request_connection(&self, detector: &ProviderDetector) -> Result<ConnectOutcome> {
        let provider = detector.detect()?;
        if self.prompt_open.swap(true, Ordering::SeqCst) {
            return Ok(ConnectOutcome::AlreadyPending);
        }
        let _prompt = PromptGuard(&self.prompt_open);

        let accounts = provider.request_accounts().await?;
        match accounts.first() {
            Some(account) => {
                info!(account = %account, "wallet connected");
                self.set_state(ConnectionState::Connected(*account));
                Ok(ConnectOutcome::Connected(*account))
            }
            None => {
                self.set_state(ConnectionState::Disconnected);
                Ok(ConnectOutcome::NoAccounts)
            }
        }
    }
}
