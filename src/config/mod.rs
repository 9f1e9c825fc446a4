use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const CONTRACT_ENV: &str = "DEVNS_CONTRACT_ADDRESS";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
    /// Wallet implementation detection accepts
    pub expected: Option<String>,
    pub chain_poll_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    pub address: Option<String>,
    pub tld: Option<String>,
    pub refresh_delay_ms: Option<u64>,
    #[serde(default)]
    pub surface_provider_errors: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub registry: RegistryConfig,
}

impl WalletConfig {
    pub fn expected(&self) -> String {
        self.expected
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "anvil".to_string())
    }

    pub fn chain_poll(&self) -> Duration {
        Duration::from_millis(self.chain_poll_ms.unwrap_or(1000).max(100))
    }
}

impl RegistryConfig {
    pub fn tld(&self) -> String {
        self.tld
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "dev".to_string())
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms.unwrap_or(2000))
    }
}

impl Config {
    /// Contract address: CLI flag, then the environment, then the file
    pub fn contract_address(&self, cli: Option<&str>) -> Result<alloy::primitives::Address> {
        let env = std::env::var(CONTRACT_ENV).ok();
        let raw = cli
            .map(str::to_string)
            .or(env)
            .or_else(|| self.registry.address.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "no registry contract address; pass --contract, set {CONTRACT_ENV} or [registry] address"
                )
            })?;
        raw.trim()
            .parse()
            .with_context(|| format!("Invalid contract address {raw}"))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content).unwrap_or_default()
}

pub fn parse(content: &str) -> Result<Config> {
    toml::from_str::<Config>(content).context("Failed to parse config")
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DEVNS_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("devns").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("devns").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "devns", "devns")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("devns"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("devns"));
    }
    directories::ProjectDirs::from("io", "devns", "devns")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("devns.log"))
}
