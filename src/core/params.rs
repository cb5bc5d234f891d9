//! Exchange parameters fixed at ledger creation
//!
//! The ledger converts between a base asset and a derived asset at an
//! exact integer ratio: `exchange_ratio` base units buy one derived unit.
//! No rounding ever happens. A base amount that is not a multiple of the
//! ratio is rejected rather than truncated.
//!
//! ## Defaults
//! - **Ratio**: 100 base units per derived unit
//! - **Cap**: 1,000,000 derived units

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Base units per derived unit when nothing is configured
pub const DEFAULT_EXCHANGE_RATIO: u64 = 100;

/// Derived supply cap when nothing is configured
pub const DEFAULT_MAX_DERIVED_SUPPLY: u64 = 1_000_000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct LedgerParams {
    exchange_ratio: u64,
    max_derived_supply: u64,
}

impl Default for LedgerParams {
    fn default() -> Self {
        LedgerParams {
            exchange_ratio: DEFAULT_EXCHANGE_RATIO,
            max_derived_supply: DEFAULT_MAX_DERIVED_SUPPLY,
        }
    }
}

impl LedgerParams {
    pub fn new(exchange_ratio: u64, max_derived_supply: u64) -> Result<LedgerParams> {
        if exchange_ratio == 0 {
            return Err(LedgerError::Config(
                "exchange ratio must be a positive integer".to_string(),
            ));
        }
        Ok(LedgerParams {
            exchange_ratio,
            max_derived_supply,
        })
    }

    pub fn exchange_ratio(&self) -> u64 {
        self.exchange_ratio
    }

    pub fn max_derived_supply(&self) -> u64 {
        self.max_derived_supply
    }

    /// Derived units minted for `base_amount`. The amount must be positive and
    /// an exact multiple of the ratio.
    pub fn base_to_derived(&self, base_amount: u64) -> Result<u64> {
        if base_amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "deposit amount must be positive".to_string(),
            ));
        }
        if base_amount % self.exchange_ratio != 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "{base_amount} is not a multiple of the exchange ratio {}",
                self.exchange_ratio
            )));
        }
        Ok(base_amount / self.exchange_ratio)
    }

    /// Base units returned for burning `derived_amount`
    pub fn derived_to_base(&self, derived_amount: u64) -> Result<u64> {
        if derived_amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "conversion amount must be positive".to_string(),
            ));
        }
        derived_amount
            .checked_mul(self.exchange_ratio)
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!(
                    "{derived_amount} derived units at ratio {} overflows the base amount",
                    self.exchange_ratio
                ))
            })
    }

    /// Check that minting `minted` on top of `issued` stays within the cap
    pub fn check_capacity(&self, issued: u64, minted: u64) -> Result<u64> {
        match issued.checked_add(minted) {
            Some(total) if total <= self.max_derived_supply => Ok(total),
            _ => Err(LedgerError::SupplyCapExceeded {
                requested: minted,
                issued,
                cap: self.max_derived_supply,
            }),
        }
    }
}
