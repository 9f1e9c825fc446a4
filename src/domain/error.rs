//! Error taxonomy for wallet, network and registry operations

use thiserror::Error;

/// Rejections raised while building a registration request, before any call is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid domain")]
    EmptyName,

    #[error("Domain too short.")]
    TooShort,
}

/// How an error reaches the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Blocking alert that has to be dismissed
    Alert,
    /// Reported back to the caller as a status message
    Report,
    /// Logged only
    Silent,
}

/// Typed error enum for the orchestration layer, allowing the runtime to
/// decide per failure mode how it is surfaced.
#[derive(Debug, Error)]
pub enum DappError {
    /// No provider, or a provider that is not the expected wallet implementation.
    #[error("{expected} wallet not detected.")]
    NoProvider { expected: String },

    /// The wallet declined or failed the add/activate network request.
    #[error("Network switch rejected: {0}")]
    SwitchRejected(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Connect a wallet first.")]
    NotConnected,

    #[error("Connected to {current}, please switch to {required}.")]
    WrongNetwork { current: String, required: String },

    /// Receipt came back with a failure status.
    #[error("Transaction failed! Please try again")]
    TransactionFailure,

    /// Any rejection or exception from a wallet or contract call.
    #[error("provider request failed: {0:#}")]
    ProviderRequest(#[from] anyhow::Error),
}

impl DappError {
    pub fn visibility(&self) -> Visibility {
        match self {
            DappError::NoProvider { .. }
            | DappError::Validation(_)
            | DappError::NotConnected
            | DappError::WrongNetwork { .. }
            | DappError::TransactionFailure => Visibility::Alert,
            DappError::SwitchRejected(_) => Visibility::Report,
            DappError::ProviderRequest(_) => Visibility::Silent,
        }
    }
}

/// Alias for `std::result::Result<T, DappError>`.
pub type Result<T> = std::result::Result<T, DappError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmptyName.to_string(), "Invalid domain");
        assert_eq!(ValidationError::TooShort.to_string(), "Domain too short.");
        let err: DappError = ValidationError::TooShort.into();
        assert_eq!(err.to_string(), "Domain too short.");
    }

    #[test]
    fn test_visibility() {
        let no_provider = DappError::NoProvider {
            expected: "anvil".into(),
        };
        assert_eq!(no_provider.visibility(), Visibility::Alert);
        assert_eq!(DappError::TransactionFailure.visibility(), Visibility::Alert);
        assert_eq!(
            DappError::SwitchRejected("user rejected".into()).visibility(),
            Visibility::Report
        );
        let provider = DappError::from(anyhow::anyhow!("boom"));
        assert_eq!(provider.visibility(), Visibility::Silent);
    }
}
