//! Length-tiered registration pricing

use alloy::primitives::U256;

use super::error::ValidationError;

/// Shortest name the registry accepts
pub const MIN_NAME_LEN: usize = 3;

const WEI_PER_CENTI_ETHER: u128 = 10_000_000_000_000_000;

/// Price tier derived from the character length of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthTier {
    /// Exactly 3 characters
    Short,
    /// Exactly 4 characters
    Medium,
    /// 5 characters or more
    Standard,
}

impl LengthTier {
    pub fn for_name(name: &str) -> Result<Self, ValidationError> {
        match name.chars().count() {
            0 => Err(ValidationError::EmptyName),
            len if len < MIN_NAME_LEN => Err(ValidationError::TooShort),
            3 => Ok(LengthTier::Short),
            4 => Ok(LengthTier::Medium),
            _ => Ok(LengthTier::Standard),
        }
    }

    /// Price in wei
    pub fn price_wei(self) -> U256 {
        let centi = match self {
            LengthTier::Short => 5,
            LengthTier::Medium => 3,
            LengthTier::Standard => 1,
        };
        U256::from(centi * WEI_PER_CENTI_ETHER)
    }

    /// Price in native units, as shown to the user
    pub fn price_label(self) -> &'static str {
        match self {
            LengthTier::Short => "0.05",
            LengthTier::Medium => "0.03",
            LengthTier::Standard => "0.01",
        }
    }
}
