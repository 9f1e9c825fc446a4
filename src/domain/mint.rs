//! Read model of registered names

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::primitives::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRecord {
    /// Position in the registry's name list
    pub id: usize,
    pub name: String,
    pub record: String,
    pub owner: Address,
}

impl MintRecord {
    pub fn is_owned_by(&self, account: Option<Address>) -> bool {
        account == Some(self.owner)
    }

    pub fn marketplace_url(&self, contract: &Address) -> String {
        format!(
            "https://testnets.opensea.io/assets/mumbai/{}/{}",
            contract, self.id
        )
    }
}

/// Ticket handed out when an enumeration starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug, Default)]
struct Snapshot {
    applied: u64,
    mints: Vec<MintRecord>,
}

/// Holds the latest mint list; writes are whole-list replacements and the
/// most recently started refresh wins.
#[derive(Debug, Default)]
pub struct MintBook {
    next: AtomicU64,
    snapshot: Mutex<Snapshot>,
}

impl MintBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Replace the list unless a later refresh already landed.
    /// Returns whether the list was replaced.
    pub fn replace(&self, ticket: RefreshTicket, mints: Vec<MintRecord>) -> bool {
        let Ok(mut snapshot) = self.snapshot.lock() else {
            return false;
        };
        if ticket.0 <= snapshot.applied {
            return false;
        }
        snapshot.applied = ticket.0;
        snapshot.mints = mints;
        true
    }

    pub fn snapshot(&self) -> Vec<MintRecord> {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.mints.clone())
            .unwrap_or_default()
    }
}
