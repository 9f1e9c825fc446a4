//! Supported networks and the fixed target network descriptor

use std::fmt;

use serde::Serialize;

/// Opaque chain identifier as reported by `eth_chainId`, normalized to lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let payload = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let payload = payload.trim_start_matches('0');
        let payload = if payload.is_empty() { "0" } else { payload };
        Self(format!("0x{}", payload.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const KNOWN_NETWORKS: [(&str, &str); 10] = [
    ("0x1", "Mainnet"),
    ("0x3", "Ropsten"),
    ("0x2a", "Kovan"),
    ("0x4", "Rinkeby"),
    ("0x5", "Goerli"),
    ("0x61", "BSC Testnet"),
    ("0x38", "BSC Mainnet"),
    ("0x89", "Polygon Mainnet"),
    ("0x13881", "Polygon Mumbai Testnet"),
    ("0xa86a", "AVAX Mainnet"),
];

/// Resolved network label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkName {
    Known(&'static str),
    Unsupported,
}

impl NetworkName {
    pub fn lookup(chain_id: &ChainId) -> Self {
        KNOWN_NETWORKS
            .iter()
            .find(|(id, _)| *id == chain_id.as_str())
            .map(|(_, name)| NetworkName::Known(name))
            .unwrap_or(NetworkName::Unsupported)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NetworkName::Known(name) => name,
            NetworkName::Unsupported => "Unsupported network",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkState {
    pub chain_id: ChainId,
    pub name: NetworkName,
}

impl NetworkState {
    pub fn from_chain_id(chain_id: ChainId) -> Self {
        let name = NetworkName::lookup(&chain_id);
        Self { chain_id, name }
    }

    /// Whether this is the network the registry lives on
    pub fn is_target(&self, target: &TargetNetwork) -> bool {
        match self.name {
            NetworkName::Known(name) => name == target.chain_name,
            NetworkName::Unsupported => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// `wallet_addEthereumChain` parameter object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetNetwork {
    pub chain_id: &'static str,
    pub chain_name: &'static str,
    pub rpc_urls: Vec<&'static str>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<&'static str>,
}

impl TargetNetwork {
    pub fn polygon_mumbai() -> Self {
        Self {
            chain_id: "0x13881",
            chain_name: "Polygon Mumbai Testnet",
            rpc_urls: vec!["https://rpc-mumbai.maticvigil.com/"],
            native_currency: NativeCurrency {
                name: "Mumbai Matic",
                symbol: "MATIC",
                decimals: 18,
            },
            block_explorer_urls: vec!["https://mumbai.polygonscan.com"],
        }
    }

    /// Chain id as a number, e.g. for `anvil --chain-id`
    pub fn chain_id_number(&self) -> Option<u64> {
        let hex = self.chain_id.strip_prefix("0x")?;
        u64::from_str_radix(hex, 16).ok()
    }

    pub fn explorer_url(&self) -> &'static str {
        self.block_explorer_urls
            .first()
            .copied()
            .unwrap_or("https://mumbai.polygonscan.com")
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url(), tx_hash)
    }
}

impl Default for TargetNetwork {
    fn default() -> Self {
        Self::polygon_mumbai()
    }
}
