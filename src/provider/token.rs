use crate::error::{LedgerError, Result};
use crate::provider::AssetProvider;
use crate::utils::Address;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Persistable image of a `TokenVault`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TokenSnapshot {
    pub custodian: Address,
    pub total_supply: u64,
    pub balances: BTreeMap<Address, u64>,
    /// (owner, spender) -> remaining allowance
    pub allowances: BTreeMap<(Address, Address), u64>,
}

#[derive(Debug, Default)]
struct TokenBook {
    total_supply: u64,
    balances: BTreeMap<Address, u64>,
    allowances: BTreeMap<(Address, Address), u64>,
}

impl TokenBook {
    fn balance_of(&self, addr: &Address) -> u64 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn set_balance(&mut self, addr: Address, amount: u64) {
        if amount == 0 {
            self.balances.remove(&addr);
        } else {
            self.balances.insert(addr, amount);
        }
    }

    // Both sides are checked before either is written
    fn move_balance(&mut self, from: &Address, to: &Address, amount: u64) -> Result<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::TransferFailed(format!(
                "{from} holds {from_balance}, cannot send {amount}"
            )));
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::TransferFailed(format!("balance of {to} overflows")))?;
        self.set_balance(*from, from_balance - amount);
        self.set_balance(*to, to_balance);
        Ok(())
    }
}

/// ERC20-style fungible token kept in process memory
///
/// One account, the custodian, is the ledger's own holding account. The
/// `AssetProvider` impl moves funds in and out of it.
pub struct TokenVault {
    custodian: Address,
    inner: RwLock<TokenBook>,
}

impl TokenVault {
    pub fn new(custodian: Address) -> TokenVault {
        TokenVault {
            custodian,
            inner: RwLock::new(TokenBook::default()),
        }
    }

    pub fn from_snapshot(snapshot: TokenSnapshot) -> Result<TokenVault> {
        let sum = snapshot
            .balances
            .values()
            .try_fold(0u64, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| LedgerError::Database("token balances overflow".to_string()))?;
        if sum != snapshot.total_supply {
            return Err(LedgerError::Database(format!(
                "token snapshot inconsistent: balances sum to {sum}, total supply is {}",
                snapshot.total_supply
            )));
        }
        Ok(TokenVault {
            custodian: snapshot.custodian,
            inner: RwLock::new(TokenBook {
                total_supply: snapshot.total_supply,
                balances: snapshot.balances,
                allowances: snapshot.allowances,
            }),
        })
    }

    pub fn snapshot(&self) -> Result<TokenSnapshot> {
        let book = self.read()?;
        Ok(TokenSnapshot {
            custodian: self.custodian,
            total_supply: book.total_supply,
            balances: book.balances.clone(),
            allowances: book.allowances.clone(),
        })
    }

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, TokenBook>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Database("token lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, TokenBook>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Database("token lock poisoned".to_string()))
    }

    pub fn balance_of(&self, addr: &Address) -> Result<u64> {
        Ok(self.read()?.balance_of(addr))
    }

    pub fn total_supply(&self) -> Result<u64> {
        Ok(self.read()?.total_supply)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Result<u64> {
        Ok(self.read()?.allowance(owner, spender))
    }

    /// Create new tokens out of thin air (the faucet)
    pub fn mint(&self, to: &Address, amount: u64) -> Result<()> {
        let mut book = self.write()?;
        let total = book
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidAmount("token supply overflows".to_string()))?;
        let balance = book.balance_of(to) + amount;
        book.total_supply = total;
        book.set_balance(*to, balance);
        debug!("minted {amount} to {to}");
        Ok(())
    }

    /// Destroy tokens held by `from`
    pub fn burn(&self, from: &Address, amount: u64) -> Result<()> {
        let mut book = self.write()?;
        let balance = book.balance_of(from);
        if balance < amount {
            return Err(LedgerError::TransferFailed(format!(
                "{from} holds {balance}, cannot burn {amount}"
            )));
        }
        book.set_balance(*from, balance - amount);
        book.total_supply -= amount;
        Ok(())
    }

    /// Overwrite the allowance `owner` grants `spender`
    pub fn approve(&self, owner: &Address, spender: &Address, amount: u64) -> Result<()> {
        let mut book = self.write()?;
        if amount == 0 {
            book.allowances.remove(&(*owner, *spender));
        } else {
            book.allowances.insert((*owner, *spender), amount);
        }
        Ok(())
    }

    pub fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<()> {
        self.write()?.move_balance(from, to, amount)
    }

    /// Spend part of the allowance `from` granted `spender`
    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<()> {
        let mut book = self.write()?;
        let allowed = book.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::TransferFailed(format!(
                "allowance of {spender} over {from} is {allowed}, cannot spend {amount}"
            )));
        }
        book.move_balance(from, to, amount)?;
        let remaining = allowed - amount;
        if remaining == 0 {
            book.allowances.remove(&(*from, *spender));
        } else {
            book.allowances.insert((*from, *spender), remaining);
        }
        Ok(())
    }
}

impl AssetProvider for TokenVault {
    fn pull_from(&self, spender: &Address, amount: u64) -> Result<()> {
        if *spender == self.custodian {
            return Err(LedgerError::TransferFailed(format!(
                "custody account {spender} cannot deposit into itself"
            )));
        }
        debug!("pulling {amount} from {spender} into custody");
        self.transfer_from(&self.custodian, spender, &self.custodian, amount)
    }

    fn push_to(&self, recipient: &Address, amount: u64) -> Result<()> {
        debug!("pushing {amount} from custody to {recipient}");
        self.transfer(&self.custodian, recipient, amount)
    }

    fn reserve_balance(&self) -> Result<u64> {
        self.balance_of(&self.custodian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> (TokenVault, Address, Address) {
        let custodian = Address::from_seed("custody");
        let alice = Address::from_seed("alice");
        (TokenVault::new(custodian), custodian, alice)
    }

    #[test]
    fn test_mint_and_transfer() {
        let (token, custodian, alice) = vault();
        token.mint(&alice, 1_000).unwrap();
        token.transfer(&alice, &custodian, 400).unwrap();
        assert_eq!(token.balance_of(&alice).unwrap(), 600);
        assert_eq!(token.balance_of(&custodian).unwrap(), 400);
        assert_eq!(token.total_supply().unwrap(), 1_000);
    }

    #[test]
    fn test_transfer_insufficient_balance_changes_nothing() {
        let (token, custodian, alice) = vault();
        token.mint(&alice, 10).unwrap();
        let err = token.transfer(&alice, &custodian, 11).unwrap_err();
        assert!(matches!(err, LedgerError::TransferFailed(_)));
        assert_eq!(token.balance_of(&alice).unwrap(), 10);
        assert_eq!(token.balance_of(&custodian).unwrap(), 0);
    }

    #[test]
    fn test_pull_requires_allowance() {
        let (token, custodian, alice) = vault();
        token.mint(&alice, 1_000).unwrap();
        assert!(matches!(
            token.pull_from(&alice, 500),
            Err(LedgerError::TransferFailed(_))
        ));

        token.approve(&alice, &custodian, 500).unwrap();
        token.pull_from(&alice, 300).unwrap();
        assert_eq!(token.allowance(&alice, &custodian).unwrap(), 200);
        assert_eq!(token.reserve_balance().unwrap(), 300);

        // allowance left but not enough balance behind it
        token.approve(&alice, &custodian, 5_000).unwrap();
        assert!(token.pull_from(&alice, 800).is_err());
        assert_eq!(token.allowance(&alice, &custodian).unwrap(), 5_000);
        assert_eq!(token.balance_of(&alice).unwrap(), 700);
    }

    #[test]
    fn test_custodian_cannot_pull_from_itself() {
        let (token, custodian, _) = vault();
        token.mint(&custodian, 1_000).unwrap();
        token.approve(&custodian, &custodian, 1_000).unwrap();
        assert!(matches!(
            token.pull_from(&custodian, 1_000),
            Err(LedgerError::TransferFailed(_))
        ));
        assert_eq!(token.reserve_balance().unwrap(), 1_000);
        assert_eq!(token.allowance(&custodian, &custodian).unwrap(), 1_000);
    }

    #[test]
    fn test_push_limited_by_reserve() {
        let (token, custodian, alice) = vault();
        token.mint(&custodian, 100).unwrap();
        token.push_to(&alice, 60).unwrap();
        assert!(token.push_to(&alice, 41).is_err());
        assert_eq!(token.reserve_balance().unwrap(), 40);
        assert_eq!(token.balance_of(&alice).unwrap(), 60);
    }

    #[test]
    fn test_burn_drains_reserve() {
        let (token, custodian, _) = vault();
        token.mint(&custodian, 100).unwrap();
        token.burn(&custodian, 100).unwrap();
        assert_eq!(token.reserve_balance().unwrap(), 0);
        assert_eq!(token.total_supply().unwrap(), 0);
        assert!(token.burn(&custodian, 1).is_err());
    }

    #[test]
    fn test_snapshot_restore() {
        let (token, custodian, alice) = vault();
        token.mint(&alice, 250).unwrap();
        token.approve(&alice, &custodian, 100).unwrap();

        let restored = TokenVault::from_snapshot(token.snapshot().unwrap()).unwrap();
        assert_eq!(restored.custodian(), custodian);
        assert_eq!(restored.balance_of(&alice).unwrap(), 250);
        assert_eq!(restored.allowance(&alice, &custodian).unwrap(), 100);
    }

    #[test]
    fn test_inconsistent_snapshot_rejected() {
        let (token, _, alice) = vault();
        token.mint(&alice, 250).unwrap();
        let mut snapshot = token.snapshot().unwrap();
        snapshot.total_supply = 1;
        assert!(matches!(
            TokenVault::from_snapshot(snapshot),
            Err(LedgerError::Database(_))
        ));
    }
}
