//! Intended registration request, built fresh for every mint attempt

use alloy::primitives::U256;

use super::error::ValidationError;
use super::pricing::LengthTier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRegistration {
    pub name: String,
    pub tier: LengthTier,
    pub price_wei: U256,
    /// `None` when the record input was left empty
    pub record: Option<String>,
}

impl DomainRegistration {
    pub fn new(name: &str, record: &str) -> Result<Self, ValidationError> {
        let tier = LengthTier::for_name(name)?;
        let record = Some(record.to_string()).filter(|r| !r.is_empty());
        Ok(Self {
            name: name.to_string(),
            tier,
            price_wei: tier.price_wei(),
            record,
        })
    }
}
