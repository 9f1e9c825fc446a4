//! Network resolution

use crate::domain::error::Result;
use crate::domain::{NetworkState, TargetNetwork};

use super::detector::ProviderHandle;

pub async fn resolve_network(provider: &ProviderHandle) -> Result<NetworkState> {
    let chain_id = provider.chain_id().await?;
    Ok(NetworkState::from_chain_id(chain_id))
}

pub fn is_target_network(state: &NetworkState, target: &TargetNetwork) -> bool {
    state.is_target(target)
}
