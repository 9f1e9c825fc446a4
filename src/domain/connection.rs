//! Wallet connection state

use alloy::primitives::Address;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing has been asked yet
    #[default]
    Unchecked,
    /// Silent `eth_accounts` check in flight
    Checking,
    Disconnected,
    Connected(Address),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    pub fn account(&self) -> Option<Address> {
        match self {
            ConnectionState::Connected(account) => Some(*account),
            _ => None,
        }
    }

    /// `0x1234...abcd` when connected
    pub fn display_name(&self) -> String {
        match self {
            ConnectionState::Connected(account) => short_address(account),
            ConnectionState::Checking => "checking...".to_string(),
            ConnectionState::Unchecked | ConnectionState::Disconnected => {
                "Not connected".to_string()
            }
        }
    }
}

pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
