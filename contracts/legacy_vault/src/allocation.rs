//! Heir allocation table.
//!
//! Shares are whole percentages. The table never holds more than 100% in
//! total; whatever is left unallocated goes to the vault's executor when the
//! vault is executed.

use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::errors::VaultError;
use crate::validation::{validate_heir_name, validate_relation, validate_share, MAX_SHARE};

pub type HeirId = u64;

/// A beneficiary entry. Entries are never edited in place; changing a share
/// means removing the heir and adding it again.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Heir {
    pub id: u64,
    pub name: String,
    pub relation: String,
    pub wallet: Address,
    pub share: u32,
}

/// Caller-supplied fields for a new heir.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewHeir {
    pub name: String,
    pub relation: String,
    pub wallet: Address,
    pub share: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllocationTable {
    heirs: Vec<Heir>,
    next_id: u64,
}

impl AllocationTable {
    pub fn new(env: &Env) -> Self {
        Self {
            heirs: Vec::new(env),
            next_id: 1,
        }
    }

    /// Append an heir and return its freshly assigned id.
    ///
    /// Fields are checked before the share, and the share before the running
    /// total, so the reported error is always the most specific one. The
    /// table is untouched on error.
    pub fn add(&mut self, heir: NewHeir) -> Result<HeirId, VaultError> {
        validate_heir_name(&heir.name)?;
        validate_relation(&heir.relation)?;
        validate_share(heir.share)?;

        if self.total_allocated() + heir.share > MAX_SHARE {
            return Err(VaultError::AllocationExceeded);
        }

        let id = self.next_id;
        self.heirs.push_back(Heir {
            id,
            name: heir.name,
            relation: heir.relation,
            wallet: heir.wallet,
            share: heir.share,
        });
        self.next_id += 1;
        Ok(id)
    }

    /// Remove an heir by id. Removing the same id twice fails the second
    /// time with `NotFound`.
    pub fn remove(&mut self, id: HeirId) -> Result<Heir, VaultError> {
        let index = self.position(id).ok_or(VaultError::NotFound)?;
        let heir = self.heirs.get(index).ok_or(VaultError::NotFound)?;
        self.heirs.remove(index);
        Ok(heir)
    }

    pub fn get(&self, id: HeirId) -> Option<Heir> {
        self.heirs.iter().find(|h| h.id == id)
    }

    pub fn total_allocated(&self) -> u32 {
        self.heirs.iter().map(|h| h.share).sum()
    }

    pub fn unallocated(&self) -> u32 {
        MAX_SHARE.saturating_sub(self.total_allocated())
    }

    /// Insertion-ordered copy of the heirs.
    pub fn snapshot(&self) -> Vec<Heir> {
        self.heirs.clone()
    }

    pub fn len(&self) -> u32 {
        self.heirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heirs.is_empty()
    }

    fn position(&self, id: HeirId) -> Option<u32> {
        self.heirs
            .iter()
            .position(|h| h.id == id)
            .map(|i| i as u32)
    }
}
