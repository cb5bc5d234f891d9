//! Asset-transfer providers
//!
//! The ledger never holds base-asset balances itself. It asks a provider to
//! pull funds from a caller, push funds back out, and report how much it
//! currently holds in custody.

pub mod token;

pub use token::{TokenSnapshot, TokenVault};

use crate::error::Result;
use crate::utils::Address;

/// Fungible-asset interface the ledger depends on
///
/// A rejected transfer must return `LedgerError::TransferFailed` and leave
/// the provider's own state untouched.
pub trait AssetProvider: Send + Sync {
    /// Move `amount` from `spender` into the ledger's custody
    fn pull_from(&self, spender: &Address, amount: u64) -> Result<()>;

    /// Move `amount` out of custody to `recipient`
    fn push_to(&self, recipient: &Address, amount: u64) -> Result<()>;

    /// Base-asset units currently held in custody
    fn reserve_balance(&self) -> Result<u64>;
}

impl<P: AssetProvider + ?Sized> AssetProvider for std::sync::Arc<P> {
    fn pull_from(&self, spender: &Address, amount: u64) -> Result<()> {
        (**self).pull_from(spender, amount)
    }

    fn push_to(&self, recipient: &Address, amount: u64) -> Result<()> {
        (**self).push_to(recipient, amount)
    }

    fn reserve_balance(&self) -> Result<u64> {
        (**self).reserve_balance()
    }
}
