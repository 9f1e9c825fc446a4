//! Network switching

use tracing::{info, warn};

use crate::domain::error::{DappError, Result};
use crate::domain::TargetNetwork;

use super::detector::ProviderHandle;

/// Ask the wallet to add and activate `target`. One request, no retry.
pub async fn switch_network(provider: &ProviderHandle, target: &TargetNetwork) -> Result<()> {
    let params = serde_json::to_value(target)
        .map_err(|err| DappError::SwitchRejected(err.to_string()))?;
    match provider.add_chain(params).await {
        Ok(()) => {
            info!(chain = target.chain_name, "network switch accepted");
            Ok(())
        }
        Err(err) => {
            warn!("network switch rejected: {err:#}");
            Err(DappError::SwitchRejected(format!("{err:#}")))
        }
    }
}
