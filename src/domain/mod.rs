//! Domain layer - registry request and read models, networks and errors
//!
//! Nothing in here talks to a wallet; the types are shared by the session,
//! the runtime worker and the view state.

pub mod connection;
pub mod error;
pub mod mint;
pub mod network;
pub mod pricing;
pub mod registration;

pub use connection::{short_address, ConnectionState};
pub use error::{DappError, ValidationError, Visibility};
pub use mint::{MintBook, MintRecord, RefreshTicket};
pub use network::{ChainId, NetworkName, NetworkState, TargetNetwork};
pub use pricing::LengthTier;
pub use registration::DomainRegistration;
