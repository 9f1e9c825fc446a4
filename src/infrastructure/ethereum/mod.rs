//! Ethereum infrastructure - wallet provider and registry contract over Alloy

mod registry;
mod wallet;

pub use registry::{AlloyRegistry, Domains, RegistryContract, TxReceipt};
pub use wallet::{
    connect_wallet, AlloyWallet, ProviderConfig, ProviderIdentity, WalletKind, WalletProvider,
};
