//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The wallet provider abstraction and its Alloy implementation
//! - The registry contract binding
//! - Tokio runtime bridge for async operations

pub mod ethereum;
pub mod runtime;
